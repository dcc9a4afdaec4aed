use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};

use super::{InputSettings, InputState, LookSource};
use crate::config::ControllerConfig;
use crate::network::LocallyControlled;

/// Everything the devices reported this frame, already mapped to actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFrame {
    pub movement: Vec2,
    pub analog: bool,
    pub look: Vec2,
    pub look_source: LookSource,
    pub jump_pressed: bool,
    pub sprint_held: bool,
    pub crouch_pressed: bool,
    pub prone_pressed: bool,
}

impl DeviceFrame {
    /// Pushes what changed since `previous` through the [`InputState`]
    /// setters. Values the devices keep reporting unchanged are left alone,
    /// so on-screen controls written in between stay in effect.
    pub fn apply(&self, previous: &DeviceFrame, input: &mut InputState) {
        if self.movement != previous.movement || self.analog != previous.analog {
            input.move_input(self.movement);
            input.analog_movement = self.analog;
        }
        if self.look != previous.look || self.look_source != previous.look_source {
            input.look_input(self.look, self.look_source);
        }
        // jump latches until the controller consumes it in the air
        if self.jump_pressed {
            input.jump_input(true);
        }
        if self.sprint_held != previous.sprint_held {
            input.sprint_input(self.sprint_held);
        }
        input.crouch_input(self.crouch_pressed);
        input.prone_input(self.prone_pressed);
    }
}

/// Zeroes sticks inside the dead zone.
pub fn apply_dead_zone(stick: Vec2, dead_zone: f32) -> Vec2 {
    if stick.length() < dead_zone {
        Vec2::ZERO
    } else {
        stick.clamp_length_max(1.0)
    }
}

fn keyboard_axis(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let axis = |pos: [KeyCode; 2], neg: [KeyCode; 2]| {
        keyboard.any_pressed(pos) as i8 as f32 - keyboard.any_pressed(neg) as i8 as f32
    };
    Vec2::new(
        axis(
            [KeyCode::KeyD, KeyCode::ArrowRight],
            [KeyCode::KeyA, KeyCode::ArrowLeft],
        ),
        axis(
            [KeyCode::KeyW, KeyCode::ArrowUp],
            [KeyCode::KeyS, KeyCode::ArrowDown],
        ),
    )
    .normalize_or_zero()
}

pub fn read_device_frame(
    keyboard: &ButtonInput<KeyCode>,
    gamepad: Option<&Gamepad>,
    mouse_delta: Vec2,
    pointer_active: bool,
    settings: &InputSettings,
) -> DeviceFrame {
    let mut frame = DeviceFrame {
        movement: keyboard_axis(keyboard),
        jump_pressed: keyboard.just_pressed(KeyCode::Space),
        sprint_held: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        crouch_pressed: keyboard.just_pressed(KeyCode::KeyC),
        prone_pressed: keyboard.just_pressed(KeyCode::KeyZ),
        ..default()
    };

    if pointer_active && mouse_delta != Vec2::ZERO {
        frame.look = mouse_delta * settings.mouse_sensitivity;
        frame.look_source = LookSource::Pointer;
    }

    let Some(gamepad) = gamepad else {
        return frame;
    };

    let left = apply_dead_zone(gamepad.left_stick(), settings.stick_dead_zone);
    if frame.movement == Vec2::ZERO && left != Vec2::ZERO {
        frame.movement = left;
        frame.analog = true;
    }

    let right = apply_dead_zone(gamepad.right_stick(), settings.stick_dead_zone);
    if frame.look == Vec2::ZERO && right != Vec2::ZERO {
        // stick up looks up, which is negative pitch
        frame.look = Vec2::new(right.x, -right.y) * settings.stick_look_speed;
        frame.look_source = LookSource::Stick;
    }

    frame.jump_pressed |= gamepad.just_pressed(GamepadButton::South);
    frame.sprint_held |= gamepad.pressed(GamepadButton::LeftTrigger2);
    frame.crouch_pressed |= gamepad.just_pressed(GamepadButton::East);
    frame.prone_pressed |= gamepad.just_pressed(GamepadButton::North);
    frame
}

/// Feeds the locally controlled characters from the keyboard, mouse and the
/// first gamepad.
pub fn read_device_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    gamepads: Query<&Gamepad>,
    cursor_options: Single<&CursorOptions>,
    config: Res<ControllerConfig>,
    mut previous: Local<DeviceFrame>,
    mut players: Query<&mut InputState, With<LocallyControlled>>,
) {
    let mut mouse_delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        mouse_delta += event.delta;
    }

    let pointer_active =
        !config.input.cursor_locked || cursor_options.grab_mode != CursorGrabMode::None;
    let frame = read_device_frame(
        &keyboard,
        gamepads.iter().next(),
        mouse_delta,
        pointer_active,
        &config.input,
    );

    for mut input in players.iter_mut() {
        frame.apply(&previous, &mut input);
    }
    *previous = frame;
}

/// Grabs the cursor on click, releases it on Escape.
pub fn lock_cursor(
    mut cursor_options: Single<&mut CursorOptions>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    config: Res<ControllerConfig>,
) {
    if !config.input.cursor_locked {
        return;
    }

    if mouse.just_pressed(MouseButton::Left) {
        cursor_options.grab_mode = CursorGrabMode::Locked;
        cursor_options.visible = false;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        cursor_options.grab_mode = CursorGrabMode::None;
        cursor_options.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard(pressed: &[KeyCode]) -> ButtonInput<KeyCode> {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        for key in pressed {
            keyboard.press(*key);
        }
        keyboard
    }

    #[test]
    fn diagonal_keys_are_normalized() {
        let frame = read_device_frame(
            &keyboard(&[KeyCode::KeyW, KeyCode::KeyD]),
            None,
            Vec2::ZERO,
            true,
            &InputSettings::default(),
        );
        assert!((frame.movement.length() - 1.0).abs() < 1e-6);
        assert!(!frame.analog);
    }

    #[test]
    fn mouse_is_ignored_without_pointer_lock() {
        let settings = InputSettings::default();
        let keys = keyboard(&[]);
        let locked = read_device_frame(&keys, None, Vec2::new(10.0, 0.0), true, &settings);
        let free = read_device_frame(&keys, None, Vec2::new(10.0, 0.0), false, &settings);
        assert_eq!(locked.look, Vec2::new(10.0 * settings.mouse_sensitivity, 0.0));
        assert_eq!(locked.look_source, LookSource::Pointer);
        assert_eq!(free.look, Vec2::ZERO);
    }

    #[test]
    fn jump_latches_until_consumed() {
        let mut input = InputState::default();
        let pressed = DeviceFrame {
            jump_pressed: true,
            ..default()
        };
        pressed.apply(&DeviceFrame::default(), &mut input);
        DeviceFrame::default().apply(&pressed, &mut input);
        assert!(input.jump);
    }

    #[test]
    fn unchanged_frame_leaves_input_alone() {
        let mut input = InputState::default();
        input.move_input(Vec2::Y);
        input.sprint_input(true);
        input.look_input(Vec2::new(3.0, 0.0), LookSource::Virtual);

        let idle = DeviceFrame::default();
        idle.apply(&idle, &mut input);
        assert_eq!(input.movement, Vec2::Y);
        assert!(input.sprint);
        assert_eq!(input.look_source, LookSource::Virtual);

        let walking = DeviceFrame {
            movement: Vec2::X,
            ..default()
        };
        walking.apply(&idle, &mut input);
        assert_eq!(input.movement, Vec2::X);
        assert!(input.sprint);

        idle.apply(&walking, &mut input);
        assert_eq!(input.movement, Vec2::ZERO);
    }

    #[test]
    fn dead_zone_drops_small_deflection() {
        assert_eq!(apply_dead_zone(Vec2::new(0.05, 0.02), 0.1), Vec2::ZERO);
        assert_eq!(apply_dead_zone(Vec2::new(0.5, 0.0), 0.1), Vec2::new(0.5, 0.0));
    }
}
