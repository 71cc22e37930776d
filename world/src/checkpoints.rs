use glam::Vec3;
use maze_escape_core::{CellCoord, CheckpointId, CheckpointSnapshot, CHECKPOINT_MARKER_HEIGHT};

use crate::maze::Maze;

/// Tracks which checkpoints the player reached during the current session.
#[derive(Clone, Debug)]
pub(crate) struct CheckpointLedger {
    entries: Vec<CheckpointEntry>,
    reached: u32,
}

#[derive(Clone, Copy, Debug)]
struct CheckpointEntry {
    id: CheckpointId,
    cell: CellCoord,
    position: Vec3,
    reached: bool,
}

impl CheckpointLedger {
    pub(crate) fn from_maze(maze: &Maze) -> Self {
        let entries = maze
            .checkpoints()
            .iter()
            .enumerate()
            .map(|(index, cell)| CheckpointEntry {
                id: CheckpointId::new(index as u32),
                cell: *cell,
                position: maze.world_position(*cell) + Vec3::Y * CHECKPOINT_MARKER_HEIGHT,
                reached: false,
            })
            .collect();
        Self {
            entries,
            reached: 0,
        }
    }

    /// Marks every unreached checkpoint within `reach` of `position` and
    /// returns the newly reached identifiers in ledger order.
    pub(crate) fn evaluate(&mut self, position: Vec3, reach: f32) -> Vec<CheckpointId> {
        let mut newly_reached = Vec::new();
        for entry in self.entries.iter_mut().filter(|entry| !entry.reached) {
            if entry.position.distance(position) < reach {
                entry.reached = true;
                self.reached += 1;
                newly_reached.push(entry.id);
            }
        }
        newly_reached
    }

    pub(crate) fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.reached = false;
        }
        self.reached = 0;
    }

    pub(crate) fn reached_count(&self) -> u32 {
        self.reached
    }

    pub(crate) fn total(&self) -> u32 {
        self.entries.len() as u32
    }

    pub(crate) fn all_reached(&self) -> bool {
        self.reached == self.total()
    }

    pub(crate) fn snapshots(&self) -> Vec<CheckpointSnapshot> {
        self.entries
            .iter()
            .map(|entry| CheckpointSnapshot {
                id: entry.id,
                cell: entry.cell,
                position: entry.position,
                reached: entry.reached,
            })
            .collect()
    }
}
