#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Maze Escape.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter draws a top-down view of the maze. Keyboard state is sampled
//! into a [`HeldKeys`] snapshot each frame and translated through the
//! configured [`KeyBindings`]; dragging with the left mouse button or holding
//! the turn keys rotates the look direction.

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{is_key_down, is_mouse_button_down, mouse_position, KeyCode, MouseButton},
};
use maze_escape_core::CellKind;
use maze_escape_rendering::{
    Action, CheckpointPresentation, Color, FrameInput, FrameSimulationBreakdown, HeldKeys,
    HudPresentation, KeyBindings, LookController, MazePresentation, OverlayPresentation,
    PhysicalKey, PlayerPresentation, Presentation, RenderingBackend, Scene,
};
use std::time::{Duration, Instant};

/// Radians of yaw or pitch applied per pixel of mouse drag.
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.004;
/// Radians per second applied while a turn key is held.
pub const DEFAULT_TURN_SPEED: f32 = 2.5;
const HUD_MARGIN: f32 = 16.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    bindings: KeyBindings,
    mouse_sensitivity: f32,
    turn_speed: f32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            bindings: KeyBindings::default(),
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Replaces the key-binding table.
    #[must_use]
    pub fn with_key_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Radians of yaw applied per pixel of mouse drag.
    #[must_use]
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Radians of yaw applied per second while a turn key is held.
    #[must_use]
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    scene_population: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    scene_population_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_scene_population: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.scene_population_accum += breakdown.scene_population;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_scene_population: self.scene_population_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            bindings,
            mouse_sensitivity,
            turn_speed,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 960,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut keys = HeldKeys::default();
            let mut look = LookController::new(mouse_sensitivity, turn_speed);
            let mut mouse_anchor: Option<Vec2> = None;

            loop {
                poll_keys(&bindings, &mut keys);
                if bindings.was_triggered(Action::Quit, &keys) {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let restart = bindings.was_triggered(Action::Restart, &keys);
                if restart {
                    look.reset();
                    mouse_anchor = None;
                } else if !view_frozen(&scene.hud) {
                    look.apply_turn(bindings.turn_axis(&keys), frame_dt);
                    mouse_anchor = drag_look(&mut look, mouse_anchor);
                }

                let frame_input = FrameInput {
                    intents: bindings.intents(&keys),
                    look: look.direction(),
                    pause_toggle: bindings.was_triggered(Action::Pause, &keys),
                    restart,
                };
                keys.end_frame();

                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_maze(
                    &scene.maze,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_maze(&scene.maze, &metrics);
                draw_checkpoints(&scene.checkpoints, &scene.maze, &metrics);
                draw_player(&scene.player, &scene.maze, &metrics);
                draw_hud(&scene.hud);
                if let Some(overlay) = &scene.hud.overlay {
                    draw_overlay(overlay);
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_breakdown.simulation,
                    scene_population: simulation_breakdown.scene_population,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_simulation,
                        avg_scene_population,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} | sim: {:>6.2}ms scene: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_scene_population.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn view_frozen(hud: &HudPresentation) -> bool {
    hud.overlay
        .as_ref()
        .map_or(false, |overlay| overlay.freezes_view)
}

fn poll_keys(bindings: &KeyBindings, keys: &mut HeldKeys) {
    for key in bindings.bound_keys() {
        if is_key_down(key_code(key)) {
            keys.press(key);
        } else {
            keys.release(key);
        }
    }
}

fn drag_look(look: &mut LookController, anchor: Option<Vec2>) -> Option<Vec2> {
    if !is_mouse_button_down(MouseButton::Left) {
        return None;
    }
    let (x, y) = mouse_position();
    let current = Vec2::new(x, y);
    if let Some(previous) = anchor {
        let delta = current - previous;
        look.apply_mouse(delta.x, delta.y);
    }
    Some(current)
}

fn key_code(key: PhysicalKey) -> KeyCode {
    match key {
        PhysicalKey::W => KeyCode::W,
        PhysicalKey::A => KeyCode::A,
        PhysicalKey::S => KeyCode::S,
        PhysicalKey::D => KeyCode::D,
        PhysicalKey::Q => KeyCode::Q,
        PhysicalKey::E => KeyCode::E,
        PhysicalKey::P => KeyCode::P,
        PhysicalKey::R => KeyCode::R,
        PhysicalKey::Up => KeyCode::Up,
        PhysicalKey::Down => KeyCode::Down,
        PhysicalKey::Left => KeyCode::Left,
        PhysicalKey::Right => KeyCode::Right,
        PhysicalKey::Space => KeyCode::Space,
        PhysicalKey::Escape => KeyCode::Escape,
        PhysicalKey::Enter => KeyCode::Enter,
        PhysicalKey::F10 => KeyCode::F10,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    cell_step: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_maze(maze: &MazePresentation, screen_width: f32, screen_height: f32) -> Self {
        let hud_band = HUD_MARGIN * 5.0;
        let available_height = (screen_height - hud_band).max(0.0);
        let cell_step = if maze.columns == 0 || maze.rows == 0 {
            0.0
        } else {
            (screen_width / maze.columns as f32).min(available_height / maze.rows as f32)
        };

        let scaled_width = maze.columns as f32 * cell_step;
        let scaled_height = maze.rows as f32 * cell_step;
        Self {
            cell_step,
            offset_x: ((screen_width - scaled_width) * 0.5).max(0.0),
            offset_y: hud_band + ((available_height - scaled_height) * 0.5).max(0.0),
        }
    }

    fn to_screen(&self, grid: (f32, f32)) -> Vec2 {
        Vec2::new(
            self.offset_x + grid.0 * self.cell_step,
            self.offset_y + grid.1 * self.cell_step,
        )
    }
}

fn cell_color(kind: CellKind) -> Color {
    match kind {
        CellKind::Wall => Color::from_rgb_u8(58, 52, 74),
        CellKind::Path | CellKind::Checkpoint => Color::from_rgb_u8(196, 188, 170),
        CellKind::Start => Color::from_rgb_u8(120, 176, 120),
        CellKind::Exit => Color::from_rgb_u8(232, 186, 64),
    }
}

fn draw_maze(maze: &MazePresentation, metrics: &SceneMetrics) {
    if metrics.cell_step <= f32::EPSILON {
        return;
    }

    for row in 0..maze.rows {
        for column in 0..maze.columns {
            let origin = metrics.to_screen((column as f32, row as f32));
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                metrics.cell_step,
                metrics.cell_step,
                to_macroquad_color(cell_color(maze.cell(column, row))),
            );
        }
    }
}

fn draw_checkpoints(
    checkpoints: &[CheckpointPresentation],
    maze: &MazePresentation,
    metrics: &SceneMetrics,
) {
    let unreached = Color::from_rgb_u8(64, 200, 232);
    let reached = unreached.lighten(0.6).with_alpha(0.5);

    for checkpoint in checkpoints {
        let center = metrics.to_screen(maze.world_to_grid(checkpoint.position));
        let color = if checkpoint.reached { reached } else { unreached };
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            metrics.cell_step * 0.25,
            to_macroquad_color(color),
        );
    }
}

fn draw_player(player: &PlayerPresentation, maze: &MazePresentation, metrics: &SceneMetrics) {
    let center = metrics.to_screen(maze.world_to_grid(player.position));
    let radius = player.radius * metrics.cell_step;
    let nose = center + Vec2::new(player.facing.x, player.facing.z) * radius * 2.0;

    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        radius,
        to_macroquad_color(Color::from_rgb_u8(220, 64, 64)),
    );
    macroquad::shapes::draw_line(center.x, center.y, nose.x, nose.y, 3.0, BLACK);
}

fn draw_hud(hud: &HudPresentation) {
    let _ = macroquad::text::draw_text(&hud.timer, HUD_MARGIN, HUD_MARGIN * 2.0, 36.0, WHITE);
    let _ = macroquad::text::draw_text(
        &hud.checkpoints,
        HUD_MARGIN,
        HUD_MARGIN * 4.0,
        24.0,
        WHITE,
    );

    if let Some(notice) = &hud.notice {
        let width = macroquad::window::screen_width();
        let height = macroquad::window::screen_height();
        draw_centered_text(notice, width * 0.5, height - HUD_MARGIN * 2.0, 24);
    }
}

fn draw_overlay(overlay: &OverlayPresentation) {
    let width = macroquad::window::screen_width();
    let height = macroquad::window::screen_height();
    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        width,
        height,
        to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.6)),
    );

    let mut y = height * 0.4;
    draw_centered_text(&overlay.title, width * 0.5, y, 64);
    for line in &overlay.lines {
        y += 40.0;
        draw_centered_text(line, width * 0.5, y, 28);
    }
}

fn draw_centered_text(text: &str, center_x: f32, baseline: f32, font_size: u16) {
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    let _ = macroquad::text::draw_text(
        text,
        center_x - dimensions.width * 0.5,
        baseline,
        f32::from(font_size),
        WHITE,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze(columns: u32, rows: u32) -> MazePresentation {
        MazePresentation::new(
            columns,
            rows,
            vec![CellKind::Path; columns as usize * rows as usize],
        )
        .expect("valid maze")
    }

    #[test]
    fn metrics_fit_the_maze_below_the_hud_band() {
        let metrics = SceneMetrics::from_maze(&maze(13, 13), 960.0, 960.0);

        assert!(metrics.offset_y >= HUD_MARGIN * 5.0);
        assert!(metrics.offset_y + 13.0 * metrics.cell_step <= 960.0 + 1e-3);
        assert!(metrics.offset_x + 13.0 * metrics.cell_step <= 960.0 + 1e-3);
    }

    #[test]
    fn metrics_centre_wide_screens_horizontally() {
        let metrics = SceneMetrics::from_maze(&maze(10, 10), 1600.0, 880.0);

        assert_eq!(metrics.cell_step, 80.0);
        assert_eq!(metrics.offset_x, 400.0);
    }

    #[test]
    fn zero_sized_screens_collapse_cell_step() {
        let metrics = SceneMetrics::from_maze(&maze(1, 1), 0.0, 0.0);
        assert_eq!(metrics.cell_step, 0.0);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = FrameBreakdown {
            frame: Duration::from_millis(250),
            simulation: Duration::from_millis(2),
            scene_population: Duration::from_millis(1),
            render: Duration::from_millis(4),
        };

        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        let metrics = counter.record_frame(frame).expect("one second elapsed");

        assert!((metrics.per_second - 4.0).abs() < 1e-4);
        assert_eq!(metrics.avg_simulation, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(4));
        assert!(counter.record_frame(frame).is_none());
    }

    #[test]
    fn every_physical_key_maps_to_a_distinct_key_code() {
        let codes: Vec<_> = PhysicalKey::ALL.iter().map(|key| key_code(*key)).collect();
        for (index, code) in codes.iter().enumerate() {
            assert!(!codes[index + 1..].contains(code));
        }
    }

    #[test]
    fn only_pause_and_victory_overlays_freeze_the_view() {
        let mut hud = HudPresentation::default();
        assert!(!view_frozen(&hud));

        hud.overlay = Some(OverlayPresentation {
            title: "MAZE ESCAPE".to_owned(),
            lines: Vec::new(),
            freezes_view: false,
        });
        assert!(!view_frozen(&hud));

        hud.overlay = Some(OverlayPresentation {
            title: "PAUSED".to_owned(),
            lines: Vec::new(),
            freezes_view: true,
        });
        assert!(view_frozen(&hud));
    }

    #[test]
    fn start_and_exit_stand_out_from_the_floor() {
        assert_ne!(cell_color(CellKind::Start), cell_color(CellKind::Path));
        assert_ne!(cell_color(CellKind::Exit), cell_color(CellKind::Path));
        assert_ne!(cell_color(CellKind::Wall), cell_color(CellKind::Path));
    }
}
