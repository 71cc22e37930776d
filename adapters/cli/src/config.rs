//! TOML configuration for the command-line adapter.
//!
//! Every table is optional. Missing keys fall back to the engine defaults, so
//! an empty file is a valid configuration.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use log::warn;
use maze_escape_core::PlayerTuning;
use maze_escape_rendering::{Action, KeyBindings};
use maze_escape_rendering_macroquad::{DEFAULT_MOUSE_SENSITIVITY, DEFAULT_TURN_SPEED};
use serde::Deserialize;

/// Half of a cell edge; a footprint this wide cannot fit in a corridor.
const MAX_COLLISION_RADIUS: f32 = 0.5;

const CHECKED_ACTIONS: [Action; 4] = [
    Action::MoveForward,
    Action::Pause,
    Action::Restart,
    Action::Quit,
];

/// Parsed contents of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Movement, collision and checkpoint tuning.
    pub(crate) player: PlayerTuning,
    /// Key bindings per logical action.
    pub(crate) controls: KeyBindings,
    /// Window and look settings.
    pub(crate) window: WindowConfig,
}

/// `[window]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    /// Forces vertical sync on or off; unset keeps the platform default.
    pub(crate) vsync: Option<bool>,
    /// Prints frame timings once per second.
    pub(crate) show_fps: bool,
    pub(crate) mouse_sensitivity: f32,
    pub(crate) turn_speed: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            vsync: None,
            show_fps: false,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }
}

impl Config {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("malformed TOML")?;
        config.validate()?;
        config.warn_about_unbound_actions();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let PlayerTuning {
            walk_speed,
            collision_radius,
            checkpoint_reach,
        } = self.player;

        if !(walk_speed.is_finite() && walk_speed > 0.0) {
            bail!("player.walk_speed must be a positive number, got {walk_speed}");
        }
        if !(collision_radius.is_finite()
            && collision_radius > 0.0
            && collision_radius < MAX_COLLISION_RADIUS)
        {
            bail!(
                "player.collision_radius must lie in (0, {MAX_COLLISION_RADIUS}), got {collision_radius}"
            );
        }
        if !(checkpoint_reach.is_finite() && checkpoint_reach > 0.0) {
            bail!("player.checkpoint_reach must be a positive number, got {checkpoint_reach}");
        }

        let WindowConfig {
            mouse_sensitivity,
            turn_speed,
            ..
        } = self.window;
        if !(mouse_sensitivity.is_finite() && mouse_sensitivity >= 0.0) {
            bail!("window.mouse_sensitivity must be non-negative, got {mouse_sensitivity}");
        }
        if !(turn_speed.is_finite() && turn_speed >= 0.0) {
            bail!("window.turn_speed must be non-negative, got {turn_speed}");
        }
        Ok(())
    }

    fn warn_about_unbound_actions(&self) {
        for action in CHECKED_ACTIONS {
            if self.controls.keys_for(action).is_empty() {
                warn!("no keys are bound to {action:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{DEFAULT_COLLISION_RADIUS, DEFAULT_WALK_SPEED};
    use maze_escape_rendering::PhysicalKey;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").expect("empty configuration is valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.player.walk_speed, DEFAULT_WALK_SPEED);
        assert_eq!(config.player.collision_radius, DEFAULT_COLLISION_RADIUS);
        assert_eq!(config.window.vsync, None);
    }

    #[test]
    fn sections_override_only_the_keys_they_name() {
        let config = Config::parse(
            r#"
            [player]
            walk_speed = 3.5

            [controls]
            pause = ["P"]

            [window]
            vsync = false
            show_fps = true
            "#,
        )
        .expect("configuration parses");

        assert_eq!(config.player.walk_speed, 3.5);
        assert_eq!(config.player.collision_radius, DEFAULT_COLLISION_RADIUS);
        assert_eq!(config.controls.pause, vec![PhysicalKey::P]);
        assert_eq!(config.controls.forward, KeyBindings::default().forward);
        assert_eq!(config.window.vsync, Some(false));
        assert!(config.window.show_fps);
        assert_eq!(config.window.turn_speed, DEFAULT_TURN_SPEED);
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(Config::parse("[audio]\nvolume = 1.0").is_err());
        assert!(Config::parse("[window]\nfullscreen = true").is_err());
    }

    #[test]
    fn unknown_key_names_are_rejected() {
        assert!(Config::parse("[controls]\nforward = [\"Z\"]").is_err());
    }

    #[test]
    fn collision_radius_must_fit_in_a_corridor() {
        assert!(Config::parse("[player]\ncollision_radius = 0.5").is_err());
        assert!(Config::parse("[player]\ncollision_radius = 0.0").is_err());
        assert!(Config::parse("[player]\ncollision_radius = 0.45").is_ok());
    }

    #[test]
    fn non_positive_speeds_are_rejected() {
        assert!(Config::parse("[player]\nwalk_speed = 0.0").is_err());
        assert!(Config::parse("[player]\ncheckpoint_reach = -1.0").is_err());
        assert!(Config::parse("[window]\nturn_speed = -2.0").is_err());
    }

    #[test]
    fn unbound_actions_are_allowed() {
        let config = Config::parse("[controls]\nquit = []").expect("empty binding is valid");
        assert!(config.controls.quit.is_empty());
    }
}
