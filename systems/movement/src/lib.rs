#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that turns held intents into player moves.

use std::time::Duration;

use glam::Vec3;
use maze_escape_core::{
    horizontal_facing, movement_basis, Command, Event, MoveIntents, SessionPhase,
    DEFAULT_FACING, DEFAULT_WALK_SPEED,
};

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug)]
pub struct Movement {
    walk_speed: f32,
    phase: SessionPhase,
    facing: Vec3,
}

impl Movement {
    /// Creates a movement system that walks at the provided speed.
    #[must_use]
    pub fn new(walk_speed: f32) -> Self {
        Self {
            walk_speed,
            phase: SessionPhase::Idle,
            facing: DEFAULT_FACING,
        }
    }

    /// Consumes world events and the frame's input snapshot to emit movement commands.
    ///
    /// Commands are only produced for frames announced by
    /// [`Event::FrameAdvanced`]; other events merely update the tracked phase.
    pub fn handle(
        &mut self,
        events: &[Event],
        intents: MoveIntents,
        look: Vec3,
        out: &mut Vec<Command>,
    ) {
        let mut frame = None;
        for event in events {
            match event {
                Event::FrameAdvanced { dt } => frame = Some(*dt),
                Event::RunStarted => self.phase = SessionPhase::Running,
                Event::PauseChanged { paused } => {
                    self.phase = if *paused {
                        SessionPhase::Paused
                    } else {
                        SessionPhase::Running
                    };
                }
                Event::VictoryAchieved { .. } => self.phase = SessionPhase::Victorious,
                Event::SessionReset => self.phase = SessionPhase::Idle,
                Event::PlayerFaced { facing } => self.facing = *facing,
                Event::PlayerRespawned { .. } => self.facing = DEFAULT_FACING,
                _ => {}
            }
        }

        let Some(dt) = frame else {
            return;
        };

        if matches!(self.phase, SessionPhase::Paused | SessionPhase::Victorious) {
            return;
        }

        let facing = horizontal_facing(look).unwrap_or(self.facing);
        if facing != self.facing {
            out.push(Command::FacePlayer { facing });
        }

        if !intents.any() {
            return;
        }

        if self.phase == SessionPhase::Idle {
            out.push(Command::BeginRun);
        }

        let displacement = movement_vector(intents, facing, self.walk_speed, dt);
        if displacement != Vec3::ZERO {
            out.push(Command::MovePlayer { displacement });
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(DEFAULT_WALK_SPEED)
    }
}

/// Computes the displacement produced by holding `intents` for `dt`.
///
/// Opposing intents cancel out, and the combined direction is normalised so
/// diagonal movement is no faster than walking straight.
#[must_use]
pub fn movement_vector(intents: MoveIntents, facing: Vec3, speed: f32, dt: Duration) -> Vec3 {
    let (forward, right) = movement_basis(facing);
    let mut direction = Vec3::ZERO;
    if intents.forward {
        direction += forward;
    }
    if intents.backward {
        direction -= forward;
    }
    if intents.right {
        direction += right;
    }
    if intents.left {
        direction -= right;
    }

    if direction.length_squared() <= f32::EPSILON {
        return Vec3::ZERO;
    }
    direction.normalize() * speed * dt.as_secs_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn frame_event() -> Event {
        Event::FrameAdvanced { dt: FRAME }
    }

    #[test]
    fn zero_intents_produce_no_displacement() {
        let displacement = movement_vector(MoveIntents::NONE, Vec3::NEG_Z, 5.0, FRAME);
        assert_eq!(displacement, Vec3::ZERO);
    }

    #[test]
    fn opposing_intents_cancel() {
        let intents = MoveIntents::new(true, true, true, true);
        assert_eq!(movement_vector(intents, Vec3::NEG_Z, 5.0, FRAME), Vec3::ZERO);
    }

    #[test]
    fn diagonal_movement_is_normalised() {
        let intents = MoveIntents::new(true, false, false, true);
        let displacement = movement_vector(intents, Vec3::NEG_Z, 5.0, FRAME);
        let expected = 5.0 * FRAME.as_secs_f32();
        assert!((displacement.length() - expected).abs() < 1e-6);
        assert!(displacement.x > 0.0 && displacement.z < 0.0);
    }

    #[test]
    fn strafing_left_moves_toward_negative_x_when_facing_negative_z() {
        let intents = MoveIntents::new(false, false, true, false);
        let displacement = movement_vector(intents, Vec3::NEG_Z, 1.0, Duration::from_secs(1));
        assert!((displacement - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn first_intent_begins_the_run_and_moves() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let intents = MoveIntents::new(true, false, false, false);

        movement.handle(&[frame_event()], intents, Vec3::NEG_Z, &mut commands);

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], Command::BeginRun);
        assert!(matches!(commands[1], Command::MovePlayer { .. }));
    }

    #[test]
    fn idle_frames_without_intents_only_track_facing() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[frame_event()], MoveIntents::NONE, Vec3::X, &mut commands);

        assert_eq!(commands, vec![Command::FacePlayer { facing: Vec3::X }]);
    }

    #[test]
    fn paused_sessions_emit_nothing() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let intents = MoveIntents::new(true, false, false, false);

        movement.handle(
            &[Event::RunStarted, Event::PauseChanged { paused: true }],
            intents,
            Vec3::NEG_Z,
            &mut commands,
        );
        movement.handle(&[frame_event()], intents, Vec3::X, &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn events_without_a_frame_emit_nothing() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(
            &[Event::RunStarted],
            MoveIntents::new(true, false, false, false),
            Vec3::X,
            &mut commands,
        );

        assert!(commands.is_empty());
    }

    #[test]
    fn victory_stops_movement_until_reset() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let intents = MoveIntents::new(true, false, false, false);

        movement.handle(
            &[
                Event::RunStarted,
                Event::VictoryAchieved {
                    elapsed: Duration::from_secs(3),
                },
                frame_event(),
            ],
            intents,
            Vec3::NEG_Z,
            &mut commands,
        );
        assert!(commands.is_empty());

        movement.handle(
            &[Event::SessionReset, frame_event()],
            intents,
            Vec3::NEG_Z,
            &mut commands,
        );
        assert_eq!(commands[0], Command::BeginRun);
    }
}
