pub mod controller;

pub use controller::*;

use bevy::prelude::*;

use crate::player::ControllerSystems;

/// Third-person look rig and the camera that trails it.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (controller::rotate_camera_rigs, controller::follow_camera_rig)
                .chain()
                .in_set(ControllerSystems::Camera),
        );
    }
}
