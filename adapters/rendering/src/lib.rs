#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Escape adapters.

use anyhow::Result as AnyResult;
use glam::Vec3;
use maze_escape_core::{CellKind, MoveIntents, DEFAULT_FACING};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, f32::consts::FRAC_PI_2, time::Duration};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Physical keyboard keys that may be bound to actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhysicalKey {
    /// The `W` key.
    W,
    /// The `A` key.
    A,
    /// The `S` key.
    S,
    /// The `D` key.
    D,
    /// The `Q` key.
    Q,
    /// The `E` key.
    E,
    /// The `P` key.
    P,
    /// The `R` key.
    R,
    /// The up arrow.
    Up,
    /// The down arrow.
    Down,
    /// The left arrow.
    Left,
    /// The right arrow.
    Right,
    /// The space bar.
    Space,
    /// The escape key.
    Escape,
    /// The enter key.
    Enter,
    /// The `F10` function key.
    F10,
}

impl PhysicalKey {
    /// Every key the binding layer understands.
    pub const ALL: [Self; 16] = [
        Self::W,
        Self::A,
        Self::S,
        Self::D,
        Self::Q,
        Self::E,
        Self::P,
        Self::R,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Space,
        Self::Escape,
        Self::Enter,
        Self::F10,
    ];
}

/// Logical actions produced by the key-binding layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Walk along the facing direction.
    MoveForward,
    /// Walk against the facing direction.
    MoveBackward,
    /// Strafe left.
    StrafeLeft,
    /// Strafe right.
    StrafeRight,
    /// Rotate the view counter-clockwise.
    TurnLeft,
    /// Rotate the view clockwise.
    TurnRight,
    /// Toggle the pause menu.
    Pause,
    /// Restart the session from the start cell.
    Restart,
    /// Close the window.
    Quit,
}

/// Declarative table mapping physical keys to logical actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Keys that walk forward.
    pub forward: Vec<PhysicalKey>,
    /// Keys that walk backward.
    pub backward: Vec<PhysicalKey>,
    /// Keys that strafe left.
    pub left: Vec<PhysicalKey>,
    /// Keys that strafe right.
    pub right: Vec<PhysicalKey>,
    /// Keys that rotate the view left.
    pub turn_left: Vec<PhysicalKey>,
    /// Keys that rotate the view right.
    pub turn_right: Vec<PhysicalKey>,
    /// Keys that toggle pause.
    pub pause: Vec<PhysicalKey>,
    /// Keys that restart the session.
    pub restart: Vec<PhysicalKey>,
    /// Keys that close the window.
    pub quit: Vec<PhysicalKey>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use PhysicalKey as K;

        Self {
            forward: vec![K::W, K::Up],
            backward: vec![K::S, K::Down],
            left: vec![K::A, K::Left],
            right: vec![K::D, K::Right],
            turn_left: vec![K::Q],
            turn_right: vec![K::E],
            pause: vec![K::Escape, K::P],
            restart: vec![K::R],
            quit: vec![K::F10],
        }
    }
}

impl KeyBindings {
    /// Keys bound to the provided action.
    #[must_use]
    pub fn keys_for(&self, action: Action) -> &[PhysicalKey] {
        match action {
            Action::MoveForward => &self.forward,
            Action::MoveBackward => &self.backward,
            Action::StrafeLeft => &self.left,
            Action::StrafeRight => &self.right,
            Action::TurnLeft => &self.turn_left,
            Action::TurnRight => &self.turn_right,
            Action::Pause => &self.pause,
            Action::Restart => &self.restart,
            Action::Quit => &self.quit,
        }
    }

    /// Every key referenced by at least one binding.
    #[must_use]
    pub fn bound_keys(&self) -> BTreeSet<PhysicalKey> {
        [
            &self.forward,
            &self.backward,
            &self.left,
            &self.right,
            &self.turn_left,
            &self.turn_right,
            &self.pause,
            &self.restart,
            &self.quit,
        ]
        .into_iter()
        .flatten()
        .copied()
        .collect()
    }

    /// Reports whether any key bound to `action` is currently held.
    #[must_use]
    pub fn is_active(&self, action: Action, keys: &HeldKeys) -> bool {
        self.keys_for(action).iter().any(|key| keys.is_held(*key))
    }

    /// Reports whether any key bound to `action` went down this frame.
    #[must_use]
    pub fn was_triggered(&self, action: Action, keys: &HeldKeys) -> bool {
        self.keys_for(action)
            .iter()
            .any(|key| keys.was_pressed(*key))
    }

    /// Movement intents derived from the held keys.
    #[must_use]
    pub fn intents(&self, keys: &HeldKeys) -> MoveIntents {
        MoveIntents::new(
            self.is_active(Action::MoveForward, keys),
            self.is_active(Action::MoveBackward, keys),
            self.is_active(Action::StrafeLeft, keys),
            self.is_active(Action::StrafeRight, keys),
        )
    }

    /// Keyboard turn direction: `-1.0` left, `1.0` right, `0.0` when balanced.
    #[must_use]
    pub fn turn_axis(&self, keys: &HeldKeys) -> f32 {
        let left = self.is_active(Action::TurnLeft, keys);
        let right = self.is_active(Action::TurnRight, keys);
        match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Set of keys currently held down, plus the keys that went down this frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    held: BTreeSet<PhysicalKey>,
    pressed: BTreeSet<PhysicalKey>,
}

impl HeldKeys {
    /// Records a key press.
    pub fn press(&mut self, key: PhysicalKey) {
        if self.held.insert(key) {
            let _ = self.pressed.insert(key);
        }
    }

    /// Records a key release.
    pub fn release(&mut self, key: PhysicalKey) {
        let _ = self.held.remove(&key);
    }

    /// Forgets the keys that went down this frame; held keys stay held.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Releases every key, for example when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    /// Reports whether the key is held.
    #[must_use]
    pub fn is_held(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    /// Reports whether the key went down this frame.
    #[must_use]
    pub fn was_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }
}

/// Maximum pitch magnitude in radians, just shy of straight up or down.
pub const MAX_PITCH: f32 = FRAC_PI_2 - 0.05;

/// Yaw/pitch look state driven by the mouse and the turn keys.
///
/// Yaw `0` looks down `-Z`; positive yaw turns toward `+X`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookController {
    yaw: f32,
    pitch: f32,
    mouse_sensitivity: f32,
    turn_speed: f32,
}

impl LookController {
    /// Creates a controller looking along the default facing.
    #[must_use]
    pub const fn new(mouse_sensitivity: f32, turn_speed: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            mouse_sensitivity,
            turn_speed,
        }
    }

    /// Applies a mouse delta measured in pixels.
    pub fn apply_mouse(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.mouse_sensitivity;
        self.pitch = (self.pitch - delta_y * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Rotates the view by the keyboard turn axis for `dt`.
    pub fn apply_turn(&mut self, axis: f32, dt: Duration) {
        self.yaw += axis * self.turn_speed * dt.as_secs_f32();
    }

    /// Returns to the spawn orientation.
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Current yaw in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Unit look direction including pitch.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        look_direction(self.yaw, self.pitch)
    }
}

/// Converts yaw and pitch angles into a unit look direction.
#[must_use]
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInput {
    /// Movement intents held during the frame.
    pub intents: MoveIntents,
    /// Look direction at the end of the frame.
    pub look: Vec3,
    /// Whether a pause toggle was requested on this frame.
    pub pause_toggle: bool,
    /// Whether a restart was requested on this frame.
    pub restart: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            intents: MoveIntents::NONE,
            look: DEFAULT_FACING,
            pause_toggle: false,
            restart: false,
        }
    }
}

/// Top-down description of the maze grid.
#[derive(Clone, Debug, PartialEq)]
pub struct MazePresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    cells: Vec<CellKind>,
}

impl MazePresentation {
    /// Creates a new maze descriptor from row-major cells.
    ///
    /// Returns an error when the grid is empty or the cell count does not
    /// match the dimensions.
    pub fn new(
        columns: u32,
        rows: u32,
        cells: Vec<CellKind>,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyMaze { columns, rows });
        }
        let expected = columns as usize * rows as usize;
        if cells.len() != expected {
            return Err(RenderingError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Kind of the cell at the provided coordinates; outside the grid is a wall.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> CellKind {
        if column >= self.columns || row >= self.rows {
            return CellKind::Wall;
        }
        self.cells
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
            .unwrap_or(CellKind::Wall)
    }

    /// Converts a world-space floor point into fractional grid units.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> (f32, f32) {
        (
            position.x + self.columns as f32 / 2.0,
            position.z + self.rows as f32 / 2.0,
        )
    }
}

/// Player marker drawn above the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// World-space position.
    pub position: Vec3,
    /// Horizontal facing.
    pub facing: Vec3,
    /// Collision radius.
    pub radius: f32,
}

/// Checkpoint marker drawn above the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointPresentation {
    /// World-space position of the marker.
    pub position: Vec3,
    /// Whether the marker was collected.
    pub reached: bool,
}

/// Full-screen overlay text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayPresentation {
    /// Headline.
    pub title: String,
    /// Supporting lines shown below the headline.
    pub lines: Vec<String>,
    /// Whether the look direction stays fixed while the overlay is shown.
    pub freezes_view: bool,
}

/// Heads-up display text drawn on top of the scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HudPresentation {
    /// Timer text.
    pub timer: String,
    /// Checkpoint counter text.
    pub checkpoints: String,
    /// Transient notice.
    pub notice: Option<String>,
    /// Overlay covering the scene.
    pub overlay: Option<OverlayPresentation>,
}

/// Scene description combining the maze, its markers and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Maze grid.
    pub maze: MazePresentation,
    /// Player marker.
    pub player: PlayerPresentation,
    /// Checkpoint markers in layout order.
    pub checkpoints: Vec<CheckpointPresentation>,
    /// Heads-up display.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        maze: MazePresentation,
        player: PlayerPresentation,
        checkpoints: Vec<CheckpointPresentation>,
        hud: HudPresentation,
    ) -> Self {
        Self {
            maze,
            player,
            checkpoints,
            hud,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Time spent by the simulation while producing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent applying commands and running systems.
    pub simulation: Duration,
    /// Time spent copying world state into the scene.
    pub scene_population: Duration,
}

/// Rendering backend capable of presenting Maze Escape scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The maze must have at least one row and one column.
    #[error("maze must not be empty (received {columns}x{rows})")]
    EmptyMaze {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// The number of cells must equal `columns * rows`.
    #[error("maze expects {expected} cells but received {found}")]
    CellCountMismatch {
        /// Cell count implied by the dimensions.
        expected: usize,
        /// Cell count actually supplied.
        found: usize,
    },
}
