use bevy::prelude::*;
use bevy::window::CursorOptions;

use tps_control::camera::{CameraFollow, MainCamera};
use tps_control::config::ControllerConfig;
use tps_control::input::{
    InputState, VirtualControl, VirtualInputTarget, forward_virtual_controls,
};
use tps_control::network::{ClientStarted, LocallyControlled, NetworkPlugin, ViewCamera};

fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(NetworkPlugin);
    app.add_message::<VirtualControl>();
    app.init_resource::<VirtualInputTarget>();
    app.add_systems(Update, forward_virtual_controls);
    app
}

#[test]
fn virtual_controls_are_dropped_until_bound() {
    let mut app = app();
    let character = app.world_mut().spawn(InputState::default()).id();

    app.world_mut()
        .write_message(VirtualControl::Move(Vec2::new(1.0, 0.0)));
    app.update();
    assert_eq!(
        app.world().get::<InputState>(character),
        Some(&InputState::default())
    );

    app.world_mut()
        .resource_mut::<VirtualInputTarget>()
        .bind(character);
    app.world_mut().write_message(VirtualControl::Jump(true));
    app.update();

    let input = app.world().get::<InputState>(character).unwrap();
    assert!(input.jump);
    assert_eq!(input.movement, Vec2::ZERO);
}

#[test]
fn owner_start_binds_camera_and_input() {
    let mut app = app();
    let camera = app
        .world_mut()
        .spawn((MainCamera, CameraFollow::default()))
        .id();
    let character = app.world_mut().spawn(InputState::default()).id();

    app.world_mut().trigger(ClientStarted {
        entity: character,
        is_owner: true,
    });
    app.update();

    let world = app.world();
    assert_eq!(world.get::<CameraFollow>(camera).unwrap().target, Some(character));
    assert!(world.get::<LocallyControlled>(character).is_some());
    assert_eq!(world.get::<ViewCamera>(character), Some(&ViewCamera(camera)));
    assert_eq!(world.resource::<VirtualInputTarget>().target(), Some(character));

    app.world_mut().write_message(VirtualControl::Crouch(true));
    app.update();
    assert!(app.world().get::<InputState>(character).unwrap().crouching);
}

#[test]
fn remote_start_binds_nothing() {
    let mut app = app();
    let camera = app
        .world_mut()
        .spawn((MainCamera, CameraFollow::default()))
        .id();
    let character = app.world_mut().spawn(InputState::default()).id();

    app.world_mut().trigger(ClientStarted {
        entity: character,
        is_owner: false,
    });
    app.update();

    let world = app.world();
    assert_eq!(world.get::<CameraFollow>(camera).unwrap().target, None);
    assert!(world.get::<LocallyControlled>(character).is_none());
    assert_eq!(world.resource::<VirtualInputTarget>().target(), None);
}

#[test]
fn held_virtual_controls_survive_idle_devices() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        bevy::input::InputPlugin,
        tps_control::input::InputPlugin,
    ));
    app.insert_resource(ControllerConfig::default());
    app.world_mut().spawn(CursorOptions::default());
    let character = app
        .world_mut()
        .spawn((InputState::default(), LocallyControlled))
        .id();
    app.world_mut()
        .resource_mut::<VirtualInputTarget>()
        .bind(character);

    app.world_mut().write_message(VirtualControl::Move(Vec2::Y));
    app.world_mut().write_message(VirtualControl::Sprint(true));
    app.update();
    app.update();

    let input = app.world().get::<InputState>(character).unwrap();
    assert_eq!(input.movement, Vec2::Y);
    assert!(input.sprint);

    // a key press still takes over, and its release clears it
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::KeyS);
    app.update();
    assert_eq!(
        app.world().get::<InputState>(character).unwrap().movement,
        Vec2::NEG_Y
    );

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(KeyCode::KeyS);
    app.update();
    let input = app.world().get::<InputState>(character).unwrap();
    assert_eq!(input.movement, Vec2::ZERO);
    assert!(input.sprint);
}
