//! Per-frame locomotion state machine.
//!
//! The character is either grounded or airborne. Grounded characters may
//! jump once the jump timeout has run out; airborne ones count the fall
//! timeout down before switching to free fall. Gravity is integrated every
//! frame. Horizontal speed eases toward a stance dependent target and is
//! applied along the input direction relative to the camera yaw.

use bevy::prelude::*;
use serde::Deserialize;

use crate::input::InputState;
use crate::math::{damp_angle, lerp_clamped, round_to, yaw_direction};
use crate::player::animations::{AnimationParameter, AnimationSink};
use crate::player::ground::{GroundCheckSettings, GroundQuery};
use crate::player::motor::CharacterMover;
use crate::player::stance::{Stance, StanceShapes};

#[derive(Debug, Clone, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct LocomotionSettings {
    /// m/s
    pub move_speed: f32,
    /// m/s
    pub sprint_speed: f32,
    /// Seconds for the model to turn toward the camera.
    pub rotation_smooth_time: f32,
    /// Acceleration and deceleration.
    pub speed_change_rate: f32,
    pub jump_height: f32,
    /// Own gravity, negative is down.
    pub gravity: f32,
    /// Seconds before another jump is allowed.
    pub jump_timeout: f32,
    /// Seconds airborne before free fall kicks in. Helps on stairs.
    pub fall_timeout: f32,
    pub terminal_velocity: f32,
    /// Dead band around the target speed.
    pub speed_offset: f32,
    /// Animation blend below this snaps to zero.
    pub blend_snap_threshold: f32,
    /// Vertical velocity kept while standing so the capsule stays pressed
    /// to the ground.
    pub grounded_velocity: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            sprint_speed: 5.335,
            rotation_smooth_time: 0.12,
            speed_change_rate: 10.0,
            jump_height: 1.2,
            gravity: -15.0,
            jump_timeout: 0.5,
            fall_timeout: 0.15,
            terminal_velocity: 53.0,
            speed_offset: 0.1,
            blend_snap_threshold: 0.01,
            grounded_velocity: -2.0,
        }
    }
}

/// Everything a tick needs besides the collaborators.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub dt: f32,
    /// Feet position before the move.
    pub position: Vec3,
    /// Yaw of the camera the input is relative to, in degrees.
    pub camera_yaw: f32,
    pub settings: &'a LocomotionSettings,
    pub ground: &'a GroundCheckSettings,
    pub shapes: &'a StanceShapes,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LocomotionState {
    pub grounded: bool,
    pub vertical_velocity: f32,
    pub speed: f32,
    pub animation_blend: f32,
    /// Degrees, yaw of the last movement direction.
    pub target_move_yaw: f32,
    /// Degrees, smoothed yaw of the visual model.
    pub model_yaw: f32,
    pub rotation_velocity: f32,
    pub jump_timeout_remaining: f32,
    pub fall_timeout_remaining: f32,
    pub stance: Stance,
}

impl LocomotionState {
    pub fn new(settings: &LocomotionSettings) -> Self {
        Self {
            grounded: true,
            vertical_velocity: 0.0,
            speed: 0.0,
            animation_blend: 0.0,
            target_move_yaw: 0.0,
            model_yaw: 0.0,
            rotation_velocity: 0.0,
            jump_timeout_remaining: settings.jump_timeout,
            fall_timeout_remaining: settings.fall_timeout,
            stance: Stance::Standing,
        }
    }

    /// One full frame: stance, jump and gravity, grounding, then movement.
    pub fn tick(
        &mut self,
        input: &mut InputState,
        ctx: TickContext,
        ground: &impl GroundQuery,
        mover: &mut impl CharacterMover,
        anim: &mut impl AnimationSink,
    ) {
        self.sync_stance(input.stance(), ctx.shapes, mover, anim);
        anim.set_bool(AnimationParameter::Run, input.sprint);
        self.jump_and_gravity(input, ctx.settings, ctx.dt, anim);
        self.ground_check(ground, ctx.position, ctx.ground, anim);
        self.movement(input, ctx.settings, ctx.camera_yaw, ctx.dt, mover, anim);
    }

    /// Switches to the requested stance, resizing the capsule.
    pub fn sync_stance(
        &mut self,
        requested: Stance,
        shapes: &StanceShapes,
        mover: &mut impl CharacterMover,
        anim: &mut impl AnimationSink,
    ) {
        if requested == self.stance {
            return;
        }
        debug!("stance {:?} -> {:?}", self.stance, requested);
        self.stance = requested;
        mover.set_capsule(shapes.shape(requested));
        anim.set_bool(AnimationParameter::Crunch, requested == Stance::Crouching);
        anim.set_bool(AnimationParameter::Prone, requested == Stance::Prone);
    }

    pub fn jump_and_gravity(
        &mut self,
        input: &mut InputState,
        settings: &LocomotionSettings,
        dt: f32,
        anim: &mut impl AnimationSink,
    ) {
        if self.grounded {
            self.fall_timeout_remaining = settings.fall_timeout;

            anim.set_bool(AnimationParameter::Jump, false);
            anim.set_bool(AnimationParameter::FreeFall, false);

            if self.vertical_velocity < 0.0 {
                self.vertical_velocity = settings.grounded_velocity;
            }

            if input.jump && self.jump_timeout_remaining <= 0.0 {
                // v = sqrt(h * -2 * g) reaches height h
                self.vertical_velocity = (settings.jump_height * -2.0 * settings.gravity).sqrt();
                anim.set_bool(AnimationParameter::Jump, true);
                debug!("jump with {} m/s", self.vertical_velocity);
            }

            if self.jump_timeout_remaining >= 0.0 {
                self.jump_timeout_remaining -= dt;
            }
        } else {
            self.jump_timeout_remaining = settings.jump_timeout;

            if self.fall_timeout_remaining >= 0.0 {
                self.fall_timeout_remaining -= dt;
            } else {
                anim.set_bool(AnimationParameter::FreeFall, true);
            }

            // no jumping mid-air
            input.jump = false;
        }

        if self.vertical_velocity < settings.terminal_velocity {
            self.vertical_velocity += settings.gravity * dt;
        }
    }

    pub fn ground_check(
        &mut self,
        ground: &impl GroundQuery,
        position: Vec3,
        settings: &GroundCheckSettings,
        anim: &mut impl AnimationSink,
    ) {
        let grounded = ground.check_sphere(settings.probe_center(position), settings.grounded_radius);
        if grounded != self.grounded {
            debug!("grounded: {grounded}");
        }
        self.grounded = grounded;
        anim.set_bool(AnimationParameter::Grounded, grounded);
    }

    /// Speed the stance and sprint flag allow, zero without move input.
    pub fn target_speed(&self, input: &InputState, settings: &LocomotionSettings) -> f32 {
        if input.movement == Vec2::ZERO {
            return 0.0;
        }
        match self.stance {
            Stance::Crouching if input.sprint => settings.move_speed * 2.0,
            Stance::Crouching => settings.move_speed,
            Stance::Prone => settings.move_speed / 2.0,
            Stance::Standing if input.sprint => settings.sprint_speed,
            Stance::Standing => settings.move_speed,
        }
    }

    pub fn movement(
        &mut self,
        input: &InputState,
        settings: &LocomotionSettings,
        camera_yaw: f32,
        dt: f32,
        mover: &mut impl CharacterMover,
        anim: &mut impl AnimationSink,
    ) {
        let target_speed = self.target_speed(input, settings);
        let velocity = mover.velocity();
        let current_horizontal_speed = Vec3::new(velocity.x, 0.0, velocity.z).length();
        let input_magnitude = if input.analog_movement {
            input.movement.length()
        } else {
            1.0
        };

        let rate = dt * settings.speed_change_rate;
        if current_horizontal_speed < target_speed - settings.speed_offset
            || current_horizontal_speed > target_speed + settings.speed_offset
        {
            let eased = lerp_clamped(current_horizontal_speed, target_speed * input_magnitude, rate);
            self.speed = round_to(eased, 3);
        } else {
            self.speed = target_speed;
        }

        self.animation_blend = lerp_clamped(self.animation_blend, target_speed, rate);
        if self.animation_blend < settings.blend_snap_threshold {
            self.animation_blend = 0.0;
        }

        if input.movement != Vec2::ZERO {
            self.target_move_yaw = input.movement.x.atan2(input.movement.y).to_degrees() + camera_yaw;
            self.model_yaw = damp_angle(
                self.model_yaw,
                camera_yaw,
                &mut self.rotation_velocity,
                settings.rotation_smooth_time,
                dt,
            );
        }

        let displacement = yaw_direction(self.target_move_yaw) * (self.speed * dt)
            + Vec3::new(0.0, self.vertical_velocity, 0.0) * dt;
        mover.move_by(displacement, dt);

        anim.set_float(AnimationParameter::Speed, self.animation_blend);
        anim.set_float(AnimationParameter::Vertical, input.movement.y);
        anim.set_float(AnimationParameter::Horizontal, input.movement.x);
        anim.set_float(AnimationParameter::MotionSpeed, input_magnitude);
    }
}
