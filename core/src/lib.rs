#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Walking speed of the player measured in world units per second.
pub const DEFAULT_WALK_SPEED: f32 = 5.0;

/// Radius of the player's collision footprint in world units.
pub const DEFAULT_COLLISION_RADIUS: f32 = 0.3;

/// Distance below which a checkpoint counts as reached.
pub const DEFAULT_CHECKPOINT_REACH: f32 = 0.7;

/// Height above the floor at which checkpoint markers hover.
pub const CHECKPOINT_MARKER_HEIGHT: f32 = 0.5;

/// Facing assigned to the player when it spawns.
pub const DEFAULT_FACING: Vec3 = Vec3::NEG_Z;

/// World-space up axis.
pub const UP: Vec3 = Vec3::Y;

/// Lifecycle phase of a single play-through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Session loaded but the player has not moved yet.
    #[default]
    Idle,
    /// The clock runs and the player may move.
    Running,
    /// The clock and movement are frozen until resumed.
    Paused,
    /// Every checkpoint was collected and the exit reached.
    Victorious,
}

impl SessionPhase {
    /// Reports whether the session clock should accrue time in this phase.
    #[must_use]
    pub const fn accrues_time(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the frame clock by the provided delta time.
    Tick {
        /// Duration of wall time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Latches the session from idle into the running phase.
    BeginRun,
    /// Updates the direction the player is looking toward.
    FacePlayer {
        /// Look direction; only its horizontal projection is kept.
        facing: Vec3,
    },
    /// Requests that the player move by the provided world-space displacement.
    MovePlayer {
        /// Displacement to add to the current position when unobstructed.
        displacement: Vec3,
    },
    /// Requests that the session pause or resume.
    SetPaused {
        /// `true` pauses the session, `false` resumes it.
        paused: bool,
    },
    /// Clears the clock and every checkpoint, returning the session to idle.
    ResetSession,
    /// Places the player back on the start cell.
    RespawnPlayer,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that a rendered frame elapsed, regardless of the session phase.
    FrameAdvanced {
        /// Duration of the frame.
        dt: Duration,
    },
    /// Indicates that the session clock accrued time.
    ClockAdvanced {
        /// Total time accrued by the session so far.
        elapsed: Duration,
    },
    /// Announces that the first movement intent started the run.
    RunStarted,
    /// Announces that the session was paused or resumed.
    PauseChanged {
        /// Whether the session is now paused.
        paused: bool,
    },
    /// Confirms that the player's facing changed.
    PlayerFaced {
        /// Normalised horizontal facing now stored for the player.
        facing: Vec3,
    },
    /// Confirms that the player committed a move.
    PlayerMoved {
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// Reports that a move was discarded because it would overlap a wall.
    MovementBlocked {
        /// Candidate position that failed the collision test.
        attempted: Vec3,
    },
    /// Confirms that the player reached a checkpoint for the first time.
    CheckpointReached {
        /// Identifier of the checkpoint that was reached.
        checkpoint: CheckpointId,
        /// Number of checkpoints reached so far in the session.
        reached: u32,
        /// Total number of checkpoints in the maze.
        total: u32,
    },
    /// Reports that the player stepped onto the exit with checkpoints outstanding.
    ExitLocked {
        /// Number of checkpoints that still need to be reached.
        remaining: u32,
    },
    /// One-shot notification that the session was won.
    VictoryAchieved {
        /// Session time at the moment of victory.
        elapsed: Duration,
    },
    /// Confirms that the session returned to idle.
    SessionReset,
    /// Confirms that the player was placed back on the start cell.
    PlayerRespawned {
        /// Spawn position assigned to the player.
        position: Vec3,
    },
}

/// Kind of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Solid wall that blocks movement.
    Wall,
    /// Open floor.
    Path,
    /// Open floor where the player spawns.
    Start,
    /// Open floor that wins the session once every checkpoint is reached.
    Exit,
    /// Open floor that must be visited before the exit counts.
    Checkpoint,
}

impl CellKind {
    /// Reports whether the player may occupy the cell.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Columns grow along world `+X`, rows grow along world `+Z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Unique identifier assigned to a checkpoint in layout scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointId(u32);

impl CheckpointId {
    /// Creates a new checkpoint identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Logical movement directions held during a frame, independent of physical keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveIntents {
    /// Move along the facing direction.
    pub forward: bool,
    /// Move against the facing direction.
    pub backward: bool,
    /// Strafe to the left of the facing direction.
    pub left: bool,
    /// Strafe to the right of the facing direction.
    pub right: bool,
}

impl MoveIntents {
    /// Intent set with nothing held.
    pub const NONE: Self = Self::new(false, false, false, false);

    /// Creates a new intent set with explicit field values.
    #[must_use]
    pub const fn new(forward: bool, backward: bool, left: bool, right: bool) -> Self {
        Self {
            forward,
            backward,
            left,
            right,
        }
    }

    /// Reports whether at least one intent is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Player tuning shared by the world and the movement system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Radius of the sampled collision footprint.
    pub collision_radius: f32,
    /// Distance below which a checkpoint counts as reached.
    pub checkpoint_reach: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: DEFAULT_WALK_SPEED,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            checkpoint_reach: DEFAULT_CHECKPOINT_REACH,
        }
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current world-space position of the player.
    pub position: Vec3,
    /// Normalised horizontal facing of the player.
    pub facing: Vec3,
}

/// Immutable representation of a single checkpoint used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointSnapshot {
    /// Identifier of the checkpoint.
    pub id: CheckpointId,
    /// Grid cell that hosts the checkpoint.
    pub cell: CellCoord,
    /// World-space position of the checkpoint marker.
    pub position: Vec3,
    /// Whether the player reached the checkpoint this session.
    pub reached: bool,
}

/// Immutable representation of the session state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Time accrued while running.
    pub elapsed: Duration,
    /// Number of checkpoints reached so far.
    pub checkpoints_reached: u32,
    /// Total number of checkpoints in the maze.
    pub checkpoints_total: u32,
}

impl SessionSnapshot {
    /// Reports whether the first movement intent has started the run.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        !matches!(self.phase, SessionPhase::Idle)
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self.phase, SessionPhase::Paused)
    }
}

/// Projects a look direction onto the horizontal plane and normalises it.
///
/// Returns `None` when the look is vertical or degenerate.
#[must_use]
pub fn horizontal_facing(look: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(look.x, 0.0, look.z);
    if !flat.is_finite() || flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(flat.normalize())
}

/// Returns the unit forward and right vectors derived from a horizontal facing.
///
/// `right` is `facing × up`, so a player looking down `-Z` strafes toward `+X`.
#[must_use]
pub fn movement_basis(facing: Vec3) -> (Vec3, Vec3) {
    let forward = horizontal_facing(facing).unwrap_or(DEFAULT_FACING);
    let right = forward.cross(UP).normalize();
    (forward, right)
}
