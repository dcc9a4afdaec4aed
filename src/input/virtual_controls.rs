use bevy::prelude::*;

use super::{InputState, LookSource};

/// Events from on-screen controls (joysticks, buttons).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum VirtualControl {
    Move(Vec2),
    Look(Vec2),
    Jump(bool),
    Sprint(bool),
    Crouch(bool),
    Prone(bool),
}

impl VirtualControl {
    pub fn apply(self, input: &mut InputState) {
        match self {
            VirtualControl::Move(direction) => input.move_input(direction),
            VirtualControl::Look(look) => input.look_input(look, LookSource::Virtual),
            VirtualControl::Jump(pressed) => input.jump_input(pressed),
            VirtualControl::Sprint(pressed) => input.sprint_input(pressed),
            VirtualControl::Crouch(pressed) => input.crouch_input(pressed),
            VirtualControl::Prone(pressed) => input.prone_input(pressed),
        }
    }
}

/// The character on-screen controls drive. Bound when the local client
/// starts; until then virtual controls are dropped.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VirtualInputTarget(Option<Entity>);

impl VirtualInputTarget {
    pub fn bind(&mut self, entity: Entity) {
        self.0 = Some(entity);
    }

    pub fn target(&self) -> Option<Entity> {
        self.0
    }
}

pub fn forward_virtual_controls(
    mut controls: MessageReader<VirtualControl>,
    target: Res<VirtualInputTarget>,
    mut inputs: Query<&mut InputState>,
) {
    let Some(mut input) = target.target().and_then(|e| inputs.get_mut(e).ok()) else {
        controls.clear();
        return;
    };

    for control in controls.read() {
        control.apply(&mut input);
    }
}
