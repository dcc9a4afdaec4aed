use bevy::prelude::*;

use crate::camera::{CameraFollow, MainCamera};
use crate::error::RigError;
use crate::input::VirtualInputTarget;

/// A networked character became live on this client.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct ClientStarted {
    pub entity: Entity,
    /// Whether this client has authority over the character.
    pub is_owner: bool,
}

/// Input on this machine drives the character.
#[derive(Component, Debug, Default)]
pub struct LocallyControlled;

/// Camera whose yaw the character's movement input is relative to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCamera(pub Entity);

pub struct NetworkPlugin;

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_client_started);
    }
}

pub fn resolve_main_camera(cameras: impl IntoIterator<Item = Entity>) -> Result<Entity, RigError> {
    let cameras: Vec<Entity> = cameras.into_iter().collect();
    match cameras.as_slice() {
        [] => Err(RigError::MainCameraMissing),
        [camera] => Ok(*camera),
        many => Err(RigError::MainCameraAmbiguous(many.len())),
    }
}

pub fn on_client_started(
    started: On<ClientStarted>,
    mut commands: Commands,
    mut cameras: Query<(Entity, Option<&mut CameraFollow>), With<MainCamera>>,
    virtual_target: Option<ResMut<VirtualInputTarget>>,
) -> Result {
    let character = started.entity;
    if !started.is_owner {
        debug!("remote character {character} started, leaving input unbound");
        return Ok(());
    }

    let camera = resolve_main_camera(cameras.iter().map(|(entity, _)| entity))?;
    let Some(mut virtual_target) = virtual_target else {
        return Err(RigError::VirtualInputMissing.into());
    };
    let (_, follow) = cameras.get_mut(camera)?;
    let Some(mut follow) = follow else {
        return Err(RigError::CameraFollowMissing(camera).into());
    };

    follow.target = Some(character);
    virtual_target.bind(character);
    commands
        .entity(character)
        .insert((LocallyControlled, ViewCamera(camera)));

    info!("local character {character} bound to camera {camera}");
    Ok(())
}
