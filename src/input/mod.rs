use bevy::prelude::*;
use serde::Deserialize;

use crate::player::stance::Stance;

pub mod device;
pub mod virtual_controls;

pub use device::*;
pub use virtual_controls::*;

/// Where the current look vector came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum LookSource {
    /// Per-frame pointer delta, already framerate independent.
    #[default]
    Pointer,
    /// Stick deflection, a rate that is scaled by frame time.
    Stick,
    /// On-screen control, treated like a stick.
    Virtual,
}

/// Current control values for one character.
///
/// Plain data: setters never validate. The only rule applied here is that
/// crouch and prone toggles clear each other.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct InputState {
    /// `x` is right, `y` is forward.
    pub movement: Vec2,
    pub look: Vec2,
    pub look_source: LookSource,
    pub jump: bool,
    pub sprint: bool,
    pub crouching: bool,
    pub prone: bool,
    /// Use the magnitude of `movement` instead of full speed.
    pub analog_movement: bool,
}

impl InputState {
    pub fn move_input(&mut self, direction: Vec2) {
        self.movement = direction;
    }

    pub fn look_input(&mut self, look: Vec2, source: LookSource) {
        self.look = look;
        self.look_source = source;
    }

    pub fn jump_input(&mut self, pressed: bool) {
        self.jump = pressed;
    }

    pub fn sprint_input(&mut self, pressed: bool) {
        self.sprint = pressed;
    }

    /// Toggles crouching on a press, leaving prone.
    pub fn crouch_input(&mut self, pressed: bool) {
        if pressed {
            self.crouching = !self.crouching;
            self.prone = false;
        }
    }

    /// Toggles prone on a press, leaving crouch.
    pub fn prone_input(&mut self, pressed: bool) {
        if pressed {
            self.prone = !self.prone;
            self.crouching = false;
        }
    }

    /// The stance these flags ask for.
    pub fn stance(&self) -> Stance {
        if self.crouching {
            Stance::Crouching
        } else if self.prone {
            Stance::Prone
        } else {
            Stance::Standing
        }
    }
}

/// Device binding tunables.
#[derive(Debug, Clone, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Pointer delta multiplier applied before the camera rig sees it.
    pub mouse_sensitivity: f32,
    /// Degrees per second at full right-stick deflection.
    pub stick_look_speed: f32,
    /// Sticks below this deflection are ignored.
    pub stick_dead_zone: f32,
    /// Grab the cursor on click and only rotate while it is grabbed.
    pub cursor_locked: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.12,
            stick_look_speed: 180.0,
            stick_dead_zone: 0.1,
            cursor_locked: true,
        }
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<VirtualControl>();
        app.init_resource::<VirtualInputTarget>();
        app.add_systems(
            Update,
            (
                device::lock_cursor,
                device::read_device_input,
                virtual_controls::forward_virtual_controls,
            )
                .chain()
                .in_set(crate::player::ControllerSystems::Input),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crouch_and_prone_are_exclusive() {
        let mut input = InputState::default();
        let presses = [true, false, true, true, false, true, true, true, false, true];
        for (i, pressed) in presses.into_iter().enumerate() {
            if i % 3 == 0 {
                input.prone_input(pressed);
            } else {
                input.crouch_input(pressed);
            }
            assert!(!(input.crouching && input.prone), "step {i}: {input:?}");
        }
    }

    #[test]
    fn toggles_only_on_press() {
        let mut input = InputState::default();
        input.crouch_input(true);
        assert_eq!(input.stance(), Stance::Crouching);
        input.crouch_input(false);
        assert_eq!(input.stance(), Stance::Crouching);
        input.prone_input(true);
        assert_eq!(input.stance(), Stance::Prone);
        assert!(!input.crouching);
        input.prone_input(true);
        assert_eq!(input.stance(), Stance::Standing);
    }

    #[test]
    fn setters_forward_values_unchanged() {
        let mut input = InputState::default();
        input.move_input(Vec2::new(0.3, -2.0));
        input.look_input(Vec2::new(4.0, 1.0), LookSource::Stick);
        input.jump_input(true);
        input.sprint_input(true);
        assert_eq!(input.movement, Vec2::new(0.3, -2.0));
        assert_eq!(input.look, Vec2::new(4.0, 1.0));
        assert_eq!(input.look_source, LookSource::Stick);
        assert!(input.jump && input.sprint);
    }
}
