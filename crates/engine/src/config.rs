use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "OVERWORLD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub follow_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { follow_speed: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementConfig {
    pub speed_px_per_ms: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed_px_per_ms: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    pub fade_duration_ms: f32,
    pub hold_duration_ms: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: 400.0,
            hold_duration_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeOfDayConfig {
    pub cycle_duration_ms: f32,
    pub speed: f32,
    pub start_hour: f32,
    pub paused: bool,
}

impl Default for TimeOfDayConfig {
    fn default() -> Self {
        Self {
            cycle_duration_ms: 1_440_000.0,
            speed: 1.0,
            start_hour: 10.0,
            paused: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProximityConfig {
    pub door_radius_tiles: f32,
    pub npc_radius_tiles: f32,
    pub building_radius_tiles: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            door_radius_tiles: 1.5,
            npc_radius_tiles: 1.5,
            building_radius_tiles: 1.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteriorConfig {
    pub wall_padding_px: f32,
    pub exit_zone_width_px: f32,
    pub exit_zone_depth_px: f32,
}

impl Default for InteriorConfig {
    fn default() -> Self {
        Self {
            wall_padding_px: 24.0,
            exit_zone_width_px: 64.0,
            exit_zone_depth_px: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub tile_size: f32,
    pub max_frame_delta_ms: f32,
    pub camera: CameraConfig,
    pub movement: MovementConfig,
    pub transition: TransitionConfig,
    pub time_of_day: TimeOfDayConfig,
    pub proximity: ProximityConfig,
    pub interior: InteriorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            max_frame_delta_ms: 250.0,
            camera: CameraConfig::default(),
            movement: MovementConfig::default(),
            transition: TransitionConfig::default(),
            time_of_day: TimeOfDayConfig::default(),
            proximity: ProximityConfig::default(),
            interior: InteriorConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode config at {path}: {message}")]
    Decode { path: String, message: String },
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let deserializer = &mut serde_json::Deserializer::from_str(raw);
        let config: EngineConfig =
            serde_path_to_error::deserialize(deserializer).map_err(|error| {
                ConfigError::Decode {
                    path: error.path().to_string(),
                    message: error.inner().to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tileSize", self.tile_size)?;
        require_positive("maxFrameDeltaMs", self.max_frame_delta_ms)?;
        require_positive("movement.speedPxPerMs", self.movement.speed_px_per_ms)?;
        require_positive(
            "transition.fadeDurationMs",
            self.transition.fade_duration_ms,
        )?;
        require_positive(
            "timeOfDay.cycleDurationMs",
            self.time_of_day.cycle_duration_ms,
        )?;
        let hold = self.transition.hold_duration_ms;
        if !hold.is_finite() || hold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "transition.holdDurationMs",
                reason: "must be finite and not negative",
            });
        }
        let follow = self.camera.follow_speed;
        if !follow.is_finite() || follow <= 0.0 || follow > 1.0 {
            return Err(ConfigError::Invalid {
                field: "camera.followSpeed",
                reason: "must be in (0, 1]",
            });
        }
        if !(0.0..24.0).contains(&self.time_of_day.start_hour) {
            return Err(ConfigError::Invalid {
                field: "timeOfDay.startHour",
                reason: "must be in [0, 24)",
            });
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and greater than zero",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transition.fade_duration_ms, 400.0);
        assert_eq!(config.transition.hold_duration_ms, 100.0);
        assert!(config.time_of_day.paused);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config =
            EngineConfig::from_json_str(r#"{"tileSize":16,"camera":{"followSpeed":0.25}}"#)
                .expect("config");
        assert_eq!(config.tile_size, 16.0);
        assert_eq!(config.camera.follow_speed, 0.25);
        assert_eq!(config.movement, MovementConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected_with_field_name() {
        let error = EngineConfig::from_json_str(r#"{"camera":{"followSpeed":1.5}}"#)
            .expect_err("follow speed out of range");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "camera.followSpeed",
                ..
            }
        ));

        let error = EngineConfig::from_json_str(r#"{"tileSize":0}"#).expect_err("zero tile");
        assert!(matches!(error, ConfigError::Invalid { field: "tileSize", .. }));
    }

    #[test]
    fn decode_error_reports_path() {
        let error = EngineConfig::from_json_str(r#"{"transition":{"fadeDurationMs":"slow"}}"#)
            .expect_err("wrong type");
        match error {
            ConfigError::Decode { path, .. } => assert_eq!(path, "transition.fadeDurationMs"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("overworld.json");
        fs::write(&path, r#"{"maxFrameDeltaMs":100}"#).expect("write");
        let config = EngineConfig::from_json_file(&path).expect("config");
        assert_eq!(config.max_frame_delta_ms, 100.0);
    }
}
