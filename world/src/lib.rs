#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.

mod checkpoints;
pub mod collision;
pub mod maze;

use std::time::Duration;

use glam::Vec3;
use log::{debug, info};
use maze_escape_core::{
    horizontal_facing, CellKind, Command, Event, PlayerTuning, SessionPhase, DEFAULT_FACING,
    WELCOME_BANNER,
};

use crate::checkpoints::CheckpointLedger;
pub use crate::maze::{LayoutError, Maze, CLASSIC_LAYOUT};

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec3,
    facing: Vec3,
}

/// Represents the authoritative Maze Escape world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    maze: Maze,
    tuning: PlayerTuning,
    player: Player,
    checkpoints: CheckpointLedger,
    phase: SessionPhase,
    elapsed: Duration,
    standing_on_exit: bool,
    tick_index: u64,
}

impl World {
    /// Creates a new world for the provided maze with the player on the start cell.
    #[must_use]
    pub fn new(maze: Maze, tuning: PlayerTuning) -> Self {
        let checkpoints = CheckpointLedger::from_maze(&maze);
        let player = Player {
            position: maze.world_position(maze.start()),
            facing: DEFAULT_FACING,
        };
        Self {
            banner: WELCOME_BANNER,
            maze,
            tuning,
            player,
            checkpoints,
            phase: SessionPhase::Idle,
            elapsed: Duration::ZERO,
            standing_on_exit: false,
            tick_index: 0,
        }
    }

    fn move_player(&mut self, displacement: Vec3, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Running {
            return;
        }

        let step = Vec3::new(displacement.x, 0.0, displacement.z);
        if !step.is_finite() || step.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }

        let from = self.player.position;
        let candidate = from + step;
        if collision::is_blocked(&self.maze, candidate, self.tuning.collision_radius) {
            debug!("movement to {candidate:?} blocked by a wall");
            out_events.push(Event::MovementBlocked {
                attempted: candidate,
            });
            return;
        }

        self.player.position = candidate;
        out_events.push(Event::PlayerMoved {
            from,
            to: candidate,
        });

        let total = self.checkpoints.total();
        let newly_reached = self
            .checkpoints
            .evaluate(candidate, self.tuning.checkpoint_reach);
        let mut reached = self.checkpoints.reached_count() - newly_reached.len() as u32;
        for checkpoint in newly_reached {
            reached += 1;
            debug!(
                "checkpoint {} reached ({reached}/{total})",
                checkpoint.get()
            );
            out_events.push(Event::CheckpointReached {
                checkpoint,
                reached,
                total,
            });
        }

        self.evaluate_exit(out_events);
    }

    fn evaluate_exit(&mut self, out_events: &mut Vec<Event>) {
        let position = self.player.position;
        if self.maze.cell_at(position.x, position.z) != CellKind::Exit {
            self.standing_on_exit = false;
            return;
        }

        let entered = !self.standing_on_exit;
        self.standing_on_exit = true;

        if self.checkpoints.all_reached() {
            self.phase = SessionPhase::Victorious;
            info!("maze escaped in {:.3}s", self.elapsed.as_secs_f32());
            out_events.push(Event::VictoryAchieved {
                elapsed: self.elapsed,
            });
        } else if entered {
            let remaining = self.checkpoints.total() - self.checkpoints.reached_count();
            debug!("exit locked, {remaining} checkpoint(s) remaining");
            out_events.push(Event::ExitLocked { remaining });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::FrameAdvanced { dt });

            if world.phase.accrues_time() {
                world.elapsed = world.elapsed.saturating_add(dt);
                out_events.push(Event::ClockAdvanced {
                    elapsed: world.elapsed,
                });
            }
        }
        Command::BeginRun => {
            if world.phase == SessionPhase::Idle {
                world.phase = SessionPhase::Running;
                info!("run started at frame {}", world.tick_index);
                out_events.push(Event::RunStarted);
            }
        }
        Command::FacePlayer { facing } => {
            if let Some(facing) = horizontal_facing(facing) {
                if facing != world.player.facing {
                    world.player.facing = facing;
                    out_events.push(Event::PlayerFaced { facing });
                }
            }
        }
        Command::MovePlayer { displacement } => {
            world.move_player(displacement, out_events);
        }
        Command::SetPaused { paused } => {
            let next = match (world.phase, paused) {
                (SessionPhase::Running, true) => SessionPhase::Paused,
                (SessionPhase::Paused, false) => SessionPhase::Running,
                _ => return,
            };
            world.phase = next;
            info!("session {}", if paused { "paused" } else { "resumed" });
            out_events.push(Event::PauseChanged { paused });
        }
        Command::ResetSession => {
            world.phase = SessionPhase::Idle;
            world.elapsed = Duration::ZERO;
            world.checkpoints.reset();
            world.standing_on_exit = false;
            info!("session reset");
            out_events.push(Event::SessionReset);
        }
        Command::RespawnPlayer => {
            let position = world.maze.world_position(world.maze.start());
            world.player = Player {
                position,
                facing: DEFAULT_FACING,
            };
            world.standing_on_exit = false;
            out_events.push(Event::PlayerRespawned { position });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_escape_core::{
        CellCoord, CellKind, CheckpointSnapshot, PlayerSnapshot, PlayerTuning, SessionPhase,
        SessionSnapshot,
    };

    use super::{Maze, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the immutable maze layout.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Player tuning the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> PlayerTuning {
        world.tuning
    }

    /// Captures the player's position and facing.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            facing: world.player.facing,
        }
    }

    /// Grid cell currently containing the player's centre.
    #[must_use]
    pub fn player_cell(world: &World) -> Option<CellCoord> {
        let position = world.player.position;
        world.maze.cell_coord_at(position.x, position.z)
    }

    /// Kind of the cell currently containing the player's centre.
    #[must_use]
    pub fn player_cell_kind(world: &World) -> CellKind {
        let position = world.player.position;
        world.maze.cell_at(position.x, position.z)
    }

    /// Current lifecycle phase of the session.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Time accrued while the session was running.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of frames processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the session clock, phase and checkpoint progress.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            phase: world.phase,
            elapsed: world.elapsed,
            checkpoints_reached: world.checkpoints.reached_count(),
            checkpoints_total: world.checkpoints.total(),
        }
    }

    /// Captures every checkpoint in layout scan order.
    #[must_use]
    pub fn checkpoints(world: &World) -> Vec<CheckpointSnapshot> {
        world.checkpoints.snapshots()
    }
}
