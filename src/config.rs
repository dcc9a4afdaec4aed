use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::camera::CameraSettings;
use crate::error::ConfigError;
use crate::input::InputSettings;
use crate::player::animations::AnimationSettings;
use crate::player::ground::GroundCheckSettings;
use crate::player::locomotion::LocomotionSettings;
use crate::player::stance::StanceShapes;

/// Where native builds look for tuning overrides.
pub const CONFIG_PATH: &str = "assets/controller.ron";

/// Every tunable of the controller. Fields left out of a config file keep
/// their defaults.
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct ControllerConfig {
    pub locomotion: LocomotionSettings,
    pub ground: GroundCheckSettings,
    pub camera: CameraSettings,
    pub stance_shapes: StanceShapes,
    pub animation: AnimationSettings,
    pub input: InputSettings,
}

impl ControllerConfig {
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&source)
    }

    /// Loads [`CONFIG_PATH`] when present, otherwise defaults.
    pub fn load_or_default() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        if Path::new(CONFIG_PATH).exists() {
            return match Self::from_file(CONFIG_PATH) {
                Ok(config) => {
                    info!("loaded controller config from {CONFIG_PATH}");
                    config
                }
                Err(err) => {
                    warn!("{err}, using default controller config");
                    Self::default()
                }
            };
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::YawWrap;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ControllerConfig::from_ron("()").unwrap(), ControllerConfig::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = ControllerConfig::from_ron(
            "(locomotion: (sprint_speed: 8.0), camera: (yaw_wrap: Modulo, top_clamp: 60.0))",
        )
        .unwrap();
        assert_eq!(config.locomotion.sprint_speed, 8.0);
        assert_eq!(config.locomotion.move_speed, 2.0);
        assert_eq!(config.camera.yaw_wrap, YawWrap::Modulo);
        assert_eq!(config.camera.top_clamp, 60.0);
        assert_eq!(config.camera.bottom_clamp, -30.0);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = ControllerConfig::from_ron("(locomotion: (move_speed: \"fast\"))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ControllerConfig::from_file("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.ron"));
    }

    #[test]
    fn shipped_config_parses() {
        let source = include_str!("../assets/controller.ron");
        assert!(ControllerConfig::from_ron(source).is_ok());
    }
}
