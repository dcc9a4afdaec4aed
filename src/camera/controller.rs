use bevy::prelude::*;
use serde::Deserialize;

use crate::config::ControllerConfig;
use crate::input::{InputState, LookSource};
use crate::math::clamp_angle;

/// How yaw is kept bounded as it accumulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Deserialize)]
pub enum YawWrap {
    /// Fold back by one turn when past ±360 degrees, once per update.
    #[default]
    FoldOnce,
    /// Remainder of a full turn, always inside (-360, 360).
    Modulo,
}

#[derive(Debug, Clone, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Degrees the camera may look up.
    pub top_clamp: f32,
    /// Degrees the camera may look down, negative.
    pub bottom_clamp: f32,
    /// Added to pitch when building the rotation, for fine tuning.
    pub angle_override: f32,
    pub lock_camera_position: bool,
    /// Scale pointer look by frame time too, for look driven by UI.
    pub force_delta_time_look: bool,
    /// Squared look magnitude below which input is ignored.
    pub look_threshold: f32,
    pub yaw_wrap: YawWrap,
    /// Rig pivot above the character's feet.
    pub pivot_offset: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            top_clamp: 70.0,
            bottom_clamp: -30.0,
            angle_override: 0.0,
            lock_camera_position: false,
            force_delta_time_look: false,
            look_threshold: 0.01,
            yaw_wrap: YawWrap::FoldOnce,
            pivot_offset: Vec3::new(0.0, 1.375, 0.0),
        }
    }
}

/// Accumulated look angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraState {
    pub fn rotate(&mut self, look: Vec2, source: LookSource, dt: f32, settings: &CameraSettings) {
        if !settings.lock_camera_position && look.length_squared() >= settings.look_threshold {
            // pointer deltas are already per frame
            let multiplier = if source == LookSource::Pointer && !settings.force_delta_time_look {
                1.0
            } else {
                dt
            };
            self.yaw += look.x * multiplier;
            self.pitch += look.y * multiplier;
        }

        self.yaw = match settings.yaw_wrap {
            YawWrap::FoldOnce => clamp_angle(self.yaw, f32::MIN, f32::MAX),
            YawWrap::Modulo => self.yaw % 360.0,
        };
        self.pitch = clamp_angle(self.pitch, settings.bottom_clamp, settings.top_clamp);
    }

    /// Orientation handed to the follow camera.
    pub fn rotation(&self, settings: &CameraSettings) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            -self.yaw.to_radians(),
            -(self.pitch + settings.angle_override).to_radians(),
            0.0,
        )
    }
}

/// Look target of one character. Only rotates; the camera that follows it is
/// a separate entity.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CameraRig {
    pub state: CameraState,
}

impl CameraRig {
    pub fn new(initial_yaw: f32) -> Self {
        Self {
            state: CameraState {
                yaw: initial_yaw,
                pitch: 0.0,
            },
        }
    }
}

/// The scene's main camera, the one movement input is relative to.
#[derive(Component, Debug, Default)]
pub struct MainCamera;

/// Keeps a camera behind a [`CameraRig`].
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CameraFollow {
    /// Character carrying the rig, bound when the local client starts.
    pub target: Option<Entity>,
    pub distance: f32,
    /// Offset in rig space, positive `x` is over the right shoulder.
    pub shoulder_offset: Vec3,
    /// Higher is snappier.
    pub follow_speed: f32,
}

impl Default for CameraFollow {
    fn default() -> Self {
        Self {
            target: None,
            distance: 4.0,
            shoulder_offset: Vec3::new(1.0, 0.0, 0.0),
            follow_speed: 12.0,
        }
    }
}

impl CameraFollow {
    pub fn desired_position(&self, pivot: Vec3, rotation: Quat) -> Vec3 {
        pivot + rotation * (self.shoulder_offset + Vec3::Z * self.distance)
    }
}

pub fn rotate_camera_rigs(
    mut rigs: Query<(&mut CameraRig, &InputState)>,
    config: Res<ControllerConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    for (mut rig, input) in rigs.iter_mut() {
        rig.state
            .rotate(input.look, input.look_source, dt, &config.camera);
    }
}

pub fn follow_camera_rig(
    mut cameras: Query<(&mut Transform, &CameraFollow), With<MainCamera>>,
    rigs: Query<(&Transform, &CameraRig), Without<MainCamera>>,
    config: Res<ControllerConfig>,
    time: Res<Time>,
) {
    for (mut camera_transform, follow) in cameras.iter_mut() {
        let Some(target) = follow.target else {
            continue;
        };
        let Ok((target_transform, rig)) = rigs.get(target) else {
            warn!("camera follow target {target} has no rig");
            continue;
        };

        let rotation = rig.state.rotation(&config.camera);
        let pivot = target_transform.translation + config.camera.pivot_offset;
        let desired = follow.desired_position(pivot, rotation);

        // exponential smoothing keeps a little lag behind the character
        let smoothing = 1.0 - (-time.delta_secs() * follow.follow_speed).exp();
        camera_transform.translation = camera_transform.translation.lerp(desired, smoothing);
        camera_transform.rotation = rotation;
    }
}
