#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Maze Escape experience.

mod config;
mod simulation;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use maze_escape_rendering::{Color, Presentation, RenderingBackend};
use maze_escape_rendering_macroquad::MacroquadBackend;
use maze_escape_system_bootstrap::Bootstrap;
use maze_escape_world::Maze;

use crate::{config::Config, simulation::Simulation};

const WINDOW_TITLE: &str = "Maze Escape";
const CLEAR_COLOR: Color = Color::from_rgb_u8(14, 14, 20);

/// First-person maze escape with checkpoints and a session timer.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", version, about)]
struct Cli {
    /// Text layout to load instead of the built-in maze.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print frame timings once per second.
    #[arg(long)]
    show_fps: bool,

    /// Force vertical sync on or off.
    #[arg(long, value_name = "BOOL")]
    vsync: Option<bool>,

    /// Print the banner and the validated layout, then exit without opening a window.
    #[arg(long)]
    print_layout: bool,
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let maze = load_maze(cli.layout.as_deref())?;

    let mut simulation = Simulation::new(maze, config.player);
    let bootstrap = Bootstrap;

    if cli.print_layout {
        println!("{}", bootstrap.welcome_banner(simulation.world()));
        print!("{}", bootstrap.maze(simulation.world()));
        return Ok(());
    }

    info!(
        "{} checkpoint(s) to collect, spawning at {:?}",
        bootstrap.checkpoint_total(simulation.world()),
        bootstrap.spawn_point(simulation.world())
    );

    let vsync = cli.vsync.or(config.window.vsync);
    let mut backend = MacroquadBackend::new()
        .with_show_fps(cli.show_fps || config.window.show_fps)
        .with_key_bindings(config.controls)
        .with_mouse_sensitivity(config.window.mouse_sensitivity)
        .with_turn_speed(config.window.turn_speed);
    if let Some(vsync) = vsync {
        backend = backend.with_vsync(vsync);
    }

    let scene = simulation.build_scene()?;
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);

    backend.run(presentation, move |dt, input, scene| {
        simulation.frame(dt, &input, scene)
    })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            info!("loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            info!("no configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

fn load_maze(path: Option<&Path>) -> Result<Maze> {
    let Some(path) = path else {
        info!("using the built-in layout");
        return Maze::classic().context("built-in layout is invalid");
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let maze =
        Maze::parse(&text).with_context(|| format!("invalid layout in {}", path.display()))?;
    if maze.columns() != maze.rows() {
        warn!(
            "layout {} is not square ({}x{}); the top-down view will letterbox it",
            path.display(),
            maze.columns(),
            maze.rows()
        );
    }
    info!(
        "loaded a {}x{} layout from {}",
        maze.columns(),
        maze.rows(),
        path.display()
    );
    Ok(maze)
}
