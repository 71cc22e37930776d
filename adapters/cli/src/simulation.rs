//! Per-frame driver that wires the world, the pure systems and the scene together.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::debug;
use maze_escape_core::{Command, Event, PlayerTuning, SessionPhase, WELCOME_BANNER};
use maze_escape_rendering::{
    CheckpointPresentation, FrameInput, FrameSimulationBreakdown, HudPresentation,
    MazePresentation, OverlayPresentation, PlayerPresentation, Scene,
};
use maze_escape_system_hud::{Hud, HudSnapshot, Overlay};
use maze_escape_system_movement::Movement;
use maze_escape_world::{self as world, query, Maze, World};

/// Upper bound on a single frame delta, whatever the walk speed.
pub(crate) const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Longest frame delta fed to the world for `walk_speed`.
///
/// The smaller of [`MAX_FRAME_DELTA`] and the time needed to walk one cell
/// edge, so a single step never carries the player across a wall.
pub(crate) fn frame_delta_limit(walk_speed: f32) -> Duration {
    if !(walk_speed.is_finite() && walk_speed > 0.0) {
        return MAX_FRAME_DELTA;
    }
    Duration::try_from_secs_f64(1.0 / f64::from(walk_speed))
        .map_or(MAX_FRAME_DELTA, |one_cell| one_cell.min(MAX_FRAME_DELTA))
}

/// Owns the authoritative world and the systems that react to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    hud: Hud,
    max_frame_delta: Duration,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates a session on the provided maze.
    pub(crate) fn new(maze: Maze, tuning: PlayerTuning) -> Self {
        let world = World::new(maze, tuning);
        let hud = Hud::new(query::session(&world).checkpoints_total);
        Self {
            world,
            movement: Movement::new(tuning.walk_speed),
            hud,
            max_frame_delta: frame_delta_limit(tuning.walk_speed),
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Read-only access to the world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances the session by one rendered frame.
    ///
    /// Restart wins over a pause toggle requested on the same frame.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) {
        if input.restart {
            self.submit(Command::ResetSession, input);
            self.submit(Command::RespawnPlayer, input);
        } else if input.pause_toggle {
            match query::phase(&self.world) {
                SessionPhase::Running => self.submit(Command::SetPaused { paused: true }, input),
                SessionPhase::Paused => self.submit(Command::SetPaused { paused: false }, input),
                SessionPhase::Idle | SessionPhase::Victorious => {}
            }
        }

        let dt = if dt > self.max_frame_delta {
            debug!("clamping a {}ms frame", dt.as_millis());
            self.max_frame_delta
        } else {
            dt
        };
        self.submit(Command::Tick { dt }, input);
    }

    /// Advances the session and refreshes `scene`, timing both halves.
    pub(crate) fn frame(
        &mut self,
        dt: Duration,
        input: &FrameInput,
        scene: &mut Scene,
    ) -> FrameSimulationBreakdown {
        let simulation_start = Instant::now();
        self.advance(dt, input);
        let simulation = simulation_start.elapsed();

        let population_start = Instant::now();
        self.populate_scene(scene);
        FrameSimulationBreakdown {
            simulation,
            scene_population: population_start.elapsed(),
        }
    }

    fn submit(&mut self, command: Command, input: &FrameInput) {
        world::apply(&mut self.world, command, &mut self.events);

        while !self.events.is_empty() {
            self.hud.handle(&self.events);
            self.movement
                .handle(&self.events, input.intents, input.look, &mut self.commands);
            self.events.clear();
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }
    }

    /// Builds the initial scene for the current world state.
    pub(crate) fn build_scene(&self) -> Result<Scene> {
        let maze = query::maze(&self.world);
        let cells = maze.iter().map(|(_, kind)| kind).collect();
        let presentation = MazePresentation::new(maze.columns(), maze.rows(), cells)
            .context("maze cannot be presented")?;

        let mut scene = Scene::new(
            presentation,
            self.player_presentation(),
            Vec::new(),
            HudPresentation::default(),
        );
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Copies the dynamic parts of the world into `scene`.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        scene.player = self.player_presentation();

        scene.checkpoints.clear();
        scene
            .checkpoints
            .extend(
                query::checkpoints(&self.world)
                    .into_iter()
                    .map(|checkpoint| CheckpointPresentation {
                        position: checkpoint.position,
                        reached: checkpoint.reached,
                    }),
            );

        scene.hud = hud_presentation(self.hud.snapshot());
    }

    fn player_presentation(&self) -> PlayerPresentation {
        let player = query::player(&self.world);
        PlayerPresentation {
            position: player.position,
            facing: player.facing,
            radius: query::tuning(&self.world).collision_radius,
        }
    }
}

fn hud_presentation(snapshot: HudSnapshot) -> HudPresentation {
    let HudSnapshot {
        timer,
        checkpoints,
        overlay,
        notice,
    } = snapshot;

    HudPresentation {
        timer,
        checkpoints,
        notice,
        overlay: overlay.map(overlay_presentation),
    }
}

fn overlay_presentation(overlay: Overlay) -> OverlayPresentation {
    match overlay {
        Overlay::Idle { hint } => OverlayPresentation {
            title: WELCOME_BANNER.to_owned(),
            lines: vec![hint.to_owned()],
            freezes_view: false,
        },
        Overlay::Paused => OverlayPresentation {
            title: "PAUSED".to_owned(),
            lines: vec![
                "Press ESC to resume".to_owned(),
                "Press R to restart".to_owned(),
            ],
            freezes_view: true,
        },
        Overlay::Victory { time } => OverlayPresentation {
            title: "YOU ESCAPED!".to_owned(),
            lines: vec![format!("Time: {time}"), "Press R to play again".to_owned()],
            freezes_view: true,
        },
    }
}
