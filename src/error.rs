use bevy::prelude::*;
use thiserror::Error;

/// Failures while wiring a started client to its camera and input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RigError {
    #[error("no camera tagged as main camera")]
    MainCameraMissing,
    #[error("{0} cameras tagged as main camera, expected one")]
    MainCameraAmbiguous(usize),
    #[error("main camera {0} has no follow component")]
    CameraFollowMissing(Entity),
    #[error("virtual input target resource is missing")]
    VirtualInputMissing,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing controller config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
