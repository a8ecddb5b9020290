//! Game settings loaded from an optional JSON file.
//!
//! Every field falls back to the shipped tuning, so `{}` is a valid config.
//! Velocities are pixels per millisecond and accelerations pixels per
//! millisecond squared, because physics integrates the raw frame delta.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub acceleration: f32,
    pub deceleration: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub jump_velocity: f32,
    pub dash_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.0025,
            deceleration: 0.0008,
            max_speed: 0.1,
            gravity: 0.00125,
            max_fall_speed: 0.4,
            jump_velocity: 0.4,
            dash_velocity: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub first_level: u32,
    pub life_count: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub anim_fps: u32,
    pub death_line_seed: u64,
    /// Optional clip table asset overriding the built-in character clips.
    pub clip_file: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            first_level: 1,
            life_count: 99,
            screen_width: 176,
            screen_height: 208,
            anim_fps: 15,
            death_line_seed: 0,
            clip_file: None,
        }
    }
}

pub fn parse_config(raw: &str, origin: &str) -> Result<GameConfig, String> {
    let config: GameConfig = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse config JSON {origin}: {e}"))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_config(&raw, &path.display().to_string())
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    let physics = &config.physics;
    let positive = [
        ("acceleration", physics.acceleration),
        ("deceleration", physics.deceleration),
        ("max_speed", physics.max_speed),
        ("gravity", physics.gravity),
        ("max_fall_speed", physics.max_fall_speed),
        ("jump_velocity", physics.jump_velocity),
        ("dash_velocity", physics.dash_velocity),
    ];
    for (name, value) in positive {
        if !(value > 0.0) || !value.is_finite() {
            return Err(format!(
                "Config validation failed: physics.{} must be > 0 (got {})",
                name, value
            ));
        }
    }
    if config.screen_width == 0 || config.screen_height == 0 {
        return Err("Config validation failed: screen size must be > 0".to_string());
    }
    if config.anim_fps == 0 {
        return Err("Config validation failed: anim_fps must be > 0".to_string());
    }
    if config.first_level == 0 {
        return Err("Config validation failed: first_level starts at 1".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kero_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config = parse_config("{}", "inline").expect("defaults are valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.physics.max_speed, 0.1);
        assert_eq!((config.screen_width, config.screen_height), (176, 208));
    }

    #[test]
    fn partial_physics_override() {
        let config = parse_config(r#"{ "physics": { "gravity": 0.002 }, "life_count": 3 }"#, "inline")
            .expect("valid config");
        assert_eq!(config.physics.gravity, 0.002);
        assert_eq!(config.physics.acceleration, 0.0025);
        assert_eq!(config.life_count, 3);
    }

    #[test]
    fn rejects_non_positive_gravity() {
        let err = parse_config(r#"{ "physics": { "gravity": 0.0 } }"#, "inline")
            .expect_err("zero gravity should fail");
        assert!(err.contains("physics.gravity"));
    }

    #[test]
    fn rejects_zero_screen() {
        let err = parse_config(r#"{ "screen_width": 0 }"#, "inline").expect_err("zero screen");
        assert!(err.contains("screen size"));
    }

    #[test]
    fn load_config_from_path_reads_file() {
        let path = temp_file_path("valid");
        fs::write(&path, r#"{ "first_level": 2, "death_line_seed": 7 }"#).expect("write config");
        let config = load_config_from_path(&path).expect("config should load");
        assert_eq!(config.first_level, 2);
        assert_eq!(config.death_line_seed, 7);
        let _ = fs::remove_file(path);
    }
}
