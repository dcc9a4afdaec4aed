use avian3d::prelude::*;
use bevy::prelude::*;

use crate::camera::CameraRig;
use crate::config::ControllerConfig;
use crate::input::InputState;
use crate::math::{yaw_of, yaw_rotation};
use crate::network::ViewCamera;
use crate::player::Character;
use crate::player::animations::AnimatorParameters;
use crate::player::ground::SpatialGround;
use crate::player::locomotion::{LocomotionState, TickContext};
use crate::player::motor::{CharacterMotor, KinematicMover, SpatialSweep, capsule_collider};
use crate::player::stance::CapsuleShape;

/// Child carrying the character's physics capsule, with the shape it was
/// last built from.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CharacterCollider(pub CapsuleShape);

/// Child holding the visual model, turned independently of the root.
#[derive(Component, Debug, Default)]
pub struct CharacterModel;

pub fn drive_locomotion(
    spatial: SpatialQuery,
    config: Res<ControllerConfig>,
    time: Res<Time>,
    mut characters: Query<
        (
            &mut Transform,
            &mut InputState,
            &mut LocomotionState,
            &mut CharacterMotor,
            &mut AnimatorParameters,
            &CameraRig,
            Option<&ViewCamera>,
        ),
        With<Character>,
    >,
    cameras: Query<&GlobalTransform, Without<Character>>,
) {
    let ground = SpatialGround::new(&spatial);
    let sweep = SpatialSweep::new(&spatial);
    let dt = time.delta_secs();

    for (mut transform, mut input, mut state, mut motor, mut anim, rig, view) in
        characters.iter_mut()
    {
        let camera_yaw = view
            .and_then(|ViewCamera(camera)| cameras.get(*camera).ok())
            .map_or(rig.state.yaw, |camera| yaw_of(camera.rotation()));

        let ctx = TickContext {
            dt,
            position: transform.translation,
            camera_yaw,
            settings: &config.locomotion,
            ground: &config.ground,
            shapes: &config.stance_shapes,
        };
        let mut mover = KinematicMover::new(&sweep, transform.translation, *motor);
        state.tick(&mut input, ctx, &ground, &mut mover, &mut *anim);

        transform.translation = mover.position;
        *motor = mover.motor;
    }
}

/// Rebuilds the capsule collider after a stance change.
pub fn sync_collider(
    mut colliders: Query<(&ChildOf, &mut CharacterCollider, &mut Collider, &mut Transform)>,
    motors: Query<&CharacterMotor>,
) {
    for (child_of, mut shape, mut collider, mut transform) in colliders.iter_mut() {
        let Ok(motor) = motors.get(child_of.parent()) else {
            warn!("character collider without a motor on its parent");
            continue;
        };
        if shape.0 == motor.capsule {
            continue;
        }
        shape.0 = motor.capsule;
        *collider = capsule_collider(&motor.capsule);
        transform.translation = motor.capsule.center;
    }
}

pub fn sync_model_yaw(
    mut models: Query<(&ChildOf, &mut Transform), With<CharacterModel>>,
    states: Query<&LocomotionState>,
) {
    for (child_of, mut transform) in models.iter_mut() {
        let Ok(state) = states.get(child_of.parent()) else {
            continue;
        };
        transform.rotation = yaw_rotation(state.model_yaw);
    }
}
