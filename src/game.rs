use std::f32::consts::PI;

use avian3d::prelude::*;
use bevy::light::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::assets::GameState;
use crate::camera::{CameraFollow, MainCamera};
use crate::config::ControllerConfig;
use crate::network::ClientStarted;
use crate::player::Character;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum GameLayer {
    #[default]
    Default,
    /// Anything a character can stand on.
    Ground,
    Player,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default());
        app.add_plugins(EguiPlugin::default());

        #[cfg(not(target_arch = "wasm32"))]
        app.add_plugins(WorldInspectorPlugin::new());

        app.insert_resource(ControllerConfig::load_or_default());
        app.add_plugins(crate::assets::AssetPlugin);
        app.add_plugins(crate::input::InputPlugin);
        app.add_plugins(crate::player::PlayerPlugin);
        app.add_plugins(crate::camera::CameraPlugin);
        app.add_plugins(crate::network::NetworkPlugin);
        app.insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.85)));
        app.add_systems(OnEnter(GameState::Playing), setup);
    }
}

/// Test level: a floor, a few blocks and a staircase to climb.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ambient_light: ResMut<AmbientLight>,
) {
    ambient_light.brightness = 100.0;

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_x(-PI / 4.),
            ..default()
        },
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 4.0,
            maximum_distance: 100.0,
            ..default()
        }
        .build(),
    ));

    let stone = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.45, 0.4),
        perceptual_roughness: 1.0,
        ..default()
    });

    // floor top sits at y = 0
    commands.spawn((
        Name::new("Floor"),
        Mesh3d(meshes.add(Cuboid::new(40.0, 0.2, 40.0))),
        MeshMaterial3d(stone.clone()),
        Transform::from_xyz(0.0, -0.1, 0.0),
        RigidBody::Static,
        Collider::cuboid(40.0, 0.2, 40.0),
        CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
    ));

    for (i, size) in [Vec3::new(2.0, 1.0, 2.0), Vec3::new(1.0, 2.0, 4.0)].into_iter().enumerate() {
        commands.spawn((
            Name::new("Block"),
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(stone.clone()),
            Transform::from_xyz(-4.0 - 3.0 * i as f32, size.y / 2.0, -3.0),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
        ));
    }

    for i in 0..8 {
        let step = Vec3::new(1.5, 0.2, 0.5);
        commands.spawn((
            Name::new("Stairs"),
            Mesh3d(meshes.add(Cuboid::from_size(step))),
            MeshMaterial3d(stone.clone()),
            Transform::from_xyz(4.0, 0.1 + 0.2 * i as f32, -2.0 - 0.5 * i as f32),
            RigidBody::Static,
            Collider::cuboid(step.x, step.y, step.z),
            CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
        ));
    }

    commands.spawn((
        Name::new("Main Camera"),
        Camera3d::default(),
        MainCamera,
        CameraFollow::default(),
        Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    ));

    let character = commands
        .spawn((Character, Name::new("Player"), Transform::default()))
        .id();

    // single player: this client owns the only character
    commands.trigger(ClientStarted {
        entity: character,
        is_owner: true,
    });
}
