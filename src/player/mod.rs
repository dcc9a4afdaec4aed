use avian3d::prelude::*;
use bevy::prelude::*;

use crate::assets::{GameAssets, GameState};
use crate::camera::CameraRig;
use crate::config::ControllerConfig;
use crate::game::GameLayer;
use crate::input::InputState;
use crate::math::yaw_of;
use crate::player::animations::*;
use crate::player::controller::*;
use crate::player::locomotion::LocomotionState;
use crate::player::motor::{CharacterMotor, capsule_collider};

pub mod animations;
pub mod controller;
pub mod ground;
pub mod locomotion;
pub mod motor;
pub mod stance;

/// Root of a controllable character, placed at its feet.
#[derive(Component, Default)]
#[require(Transform, InheritedVisibility)]
pub struct Character;

/// Per-frame order of the controller.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSystems {
    Input,
    Locomotion,
    Animation,
    Camera,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ControllerSystems::Input,
                ControllerSystems::Locomotion,
                ControllerSystems::Animation,
                ControllerSystems::Camera,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
        app.add_observer(on_character_spawn);
        app.add_observer(on_animator_linked);
        app.add_systems(
            Update,
            (drive_locomotion, sync_collider, sync_model_yaw)
                .chain()
                .in_set(ControllerSystems::Locomotion),
        );
        app.add_systems(
            Update,
            (
                link_animation_players,
                clip_weights_from_parameters,
                apply_clip_weights,
            )
                .chain()
                .in_set(ControllerSystems::Animation),
        );
    }
}

pub fn on_character_spawn(
    on: On<Add, Character>,
    mut commands: Commands,
    assets: Option<Res<GameAssets>>,
    config: Res<ControllerConfig>,
    transforms: Query<&Transform>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let character = on.event_target();
    let standing = config.stance_shapes.standing;
    let initial_yaw = transforms.get(character).map_or(0.0, |t| yaw_of(t.rotation));
    debug!("spawning character {character} facing {initial_yaw}");

    commands.entity(character).insert((
        InputState::default(),
        LocomotionState::new(&config.locomotion),
        CharacterMotor::new(standing),
        AnimatorParameters {
            grounded: true,
            motion_speed: 1.0,
            ..default()
        },
        CameraRig::new(initial_yaw),
        RigidBody::Kinematic,
        children![(
            CharacterCollider(standing),
            capsule_collider(&standing),
            CollisionLayers::new(GameLayer::Player, [GameLayer::Default, GameLayer::Ground]),
            Transform::from_translation(standing.center),
        )],
    ));

    let model = commands
        .spawn((
            CharacterModel,
            Transform::default(),
            Visibility::default(),
            ChildOf(character),
        ))
        .id();
    match assets {
        Some(assets) => {
            commands
                .entity(model)
                .insert(SceneRoot(assets.character.clone()));
        }
        None => {
            commands.entity(model).with_child((
                Mesh3d(meshes.add(Capsule3d::new(
                    standing.radius,
                    standing.segment_length(),
                ))),
                MeshMaterial3d(materials.add(Color::srgb(0.8, 0.55, 0.3))),
                Transform::from_translation(standing.center),
            ));
        }
    }
}
