#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Maze Escape experience.

use glam::Vec3;
use maze_escape_core::CheckpointSnapshot;
use maze_escape_world::{query, Maze, World};

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the maze layout required for rendering.
    #[must_use]
    pub fn maze<'world>(&self, world: &'world World) -> &'world Maze {
        query::maze(world)
    }

    /// World-space point where the player spawns.
    #[must_use]
    pub fn spawn_point(&self, world: &World) -> Vec3 {
        let maze = query::maze(world);
        maze.world_position(maze.start())
    }

    /// Exposes the checkpoints the player must collect.
    #[must_use]
    pub fn checkpoints(&self, world: &World) -> Vec<CheckpointSnapshot> {
        query::checkpoints(world)
    }

    /// Number of checkpoints that must be reached before the exit opens.
    #[must_use]
    pub fn checkpoint_total(&self, world: &World) -> u32 {
        query::session(world).checkpoints_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{PlayerTuning, WELCOME_BANNER};

    #[test]
    fn bootstrap_describes_the_classic_maze() {
        let world = World::new(
            Maze::classic().expect("classic layout is valid"),
            PlayerTuning::default(),
        );
        let bootstrap = Bootstrap;

        assert_eq!(bootstrap.welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(bootstrap.maze(&world).columns(), 13);
        assert_eq!(bootstrap.spawn_point(&world), Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(bootstrap.checkpoint_total(&world), 2);
        assert!(bootstrap
            .checkpoints(&world)
            .iter()
            .all(|checkpoint| !checkpoint.reached));
    }
}
