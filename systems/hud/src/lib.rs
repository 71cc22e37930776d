#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic heads-up display system that summarises the session for adapters.
//!
//! The system never queries the world. It folds the event stream into the
//! handful of strings and flags a frontend needs each frame.

use std::time::Duration;

use maze_escape_core::Event;

/// How long the locked-exit notice stays on screen.
pub const EXIT_NOTICE_DURATION: Duration = Duration::from_secs(2);

/// Timer text shown before the run starts.
pub const IDLE_TIMER_TEXT: &str = "00:00.000";

/// Hint displayed while the session waits for the first movement.
pub const IDLE_HINT: &str = "Use WASD to move and the mouse to look around. Press ESC to pause.";

/// Formats a duration as `MM:SS.mmm`; minutes keep growing past 99.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_millis = elapsed.as_millis();
    let minutes = total_millis / 60_000;
    let seconds = (total_millis / 1_000) % 60;
    let millis = total_millis % 1_000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

/// Formats checkpoint progress as `Checkpoints: n/m`.
#[must_use]
pub fn checkpoint_label(reached: u32, total: u32) -> String {
    format!("Checkpoints: {reached}/{total}")
}

/// Full-screen overlay a frontend should draw above the maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// The run has not started yet.
    Idle {
        /// Controls hint.
        hint: &'static str,
    },
    /// The session is paused.
    Paused,
    /// The maze was escaped.
    Victory {
        /// Final time formatted as `MM:SS.mmm`.
        time: String,
    },
}

/// Display-ready summary of the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudSnapshot {
    /// Timer text formatted as `MM:SS.mmm`.
    pub timer: String,
    /// Checkpoint progress formatted as `Checkpoints: n/m`.
    pub checkpoints: String,
    /// Overlay to draw, if any.
    pub overlay: Option<Overlay>,
    /// Transient notice, if any.
    pub notice: Option<String>,
}

/// Pure system that folds world events into a display summary.
#[derive(Debug)]
pub struct Hud {
    elapsed: Duration,
    running: bool,
    paused: bool,
    victory: Option<Duration>,
    reached: u32,
    total: u32,
    exit_notice: Option<ExitNotice>,
}

#[derive(Clone, Copy, Debug)]
struct ExitNotice {
    remaining: u32,
    time_left: Duration,
}

impl Hud {
    /// Creates a HUD for a maze with the provided number of checkpoints.
    #[must_use]
    pub fn new(checkpoint_total: u32) -> Self {
        Self {
            elapsed: Duration::ZERO,
            running: false,
            paused: false,
            victory: None,
            reached: 0,
            total: checkpoint_total,
            exit_notice: None,
        }
    }

    /// Consumes world events emitted during a frame.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FrameAdvanced { dt } => self.expire_notice(*dt),
                Event::ClockAdvanced { elapsed } => self.elapsed = *elapsed,
                Event::RunStarted => self.running = true,
                Event::PauseChanged { paused } => self.paused = *paused,
                Event::CheckpointReached { reached, total, .. } => {
                    self.reached = *reached;
                    self.total = *total;
                }
                Event::ExitLocked { remaining } => {
                    self.exit_notice = Some(ExitNotice {
                        remaining: *remaining,
                        time_left: EXIT_NOTICE_DURATION,
                    });
                }
                Event::VictoryAchieved { elapsed } => {
                    self.elapsed = *elapsed;
                    self.victory = Some(*elapsed);
                    self.exit_notice = None;
                }
                Event::SessionReset => {
                    let total = self.total;
                    *self = Self::new(total);
                }
                _ => {}
            }
        }
    }

    fn expire_notice(&mut self, dt: Duration) {
        if let Some(notice) = &mut self.exit_notice {
            notice.time_left = notice.time_left.saturating_sub(dt);
            if notice.time_left.is_zero() {
                self.exit_notice = None;
            }
        }
    }

    /// Reports whether the session was won.
    #[must_use]
    pub fn is_victorious(&self) -> bool {
        self.victory.is_some()
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Captures the current display summary.
    #[must_use]
    pub fn snapshot(&self) -> HudSnapshot {
        let timer = if self.running {
            format_elapsed(self.elapsed)
        } else {
            IDLE_TIMER_TEXT.to_owned()
        };

        let overlay = match (self.victory, self.paused, self.running) {
            (Some(time), _, _) => Some(Overlay::Victory {
                time: format_elapsed(time),
            }),
            (None, true, _) => Some(Overlay::Paused),
            (None, false, false) => Some(Overlay::Idle { hint: IDLE_HINT }),
            (None, false, true) => None,
        };

        let notice = self.exit_notice.map(|notice| {
            format!(
                "The exit is locked: {} checkpoint(s) remaining",
                notice.remaining
            )
        });

        HudSnapshot {
            timer,
            checkpoints: checkpoint_label(self.reached, self.total),
            overlay,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_uses_minutes_seconds_and_millis() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(1_234)), "00:01.234");
        assert_eq!(format_elapsed(Duration::from_millis(83_007)), "01:23.007");
        assert_eq!(format_elapsed(Duration::from_secs(6_000)), "100:00.000");
    }

    #[test]
    fn sub_millisecond_remainders_are_truncated() {
        assert_eq!(format_elapsed(Duration::from_micros(59_999_999)), "00:59.999");
    }

    #[test]
    fn checkpoint_label_matches_counter_format() {
        assert_eq!(checkpoint_label(1, 2), "Checkpoints: 1/2");
    }

    #[test]
    fn fresh_hud_shows_idle_state() {
        let snapshot = Hud::new(2).snapshot();
        assert_eq!(snapshot.timer, IDLE_TIMER_TEXT);
        assert_eq!(snapshot.checkpoints, "Checkpoints: 0/2");
        assert_eq!(snapshot.overlay, Some(Overlay::Idle { hint: IDLE_HINT }));
        assert!(snapshot.notice.is_none());
    }
}
