//! Scalar helpers shared by the locomotion controller and the camera rig.
//!
//! Angles in this crate are in degrees, measured clockwise when seen from
//! above, with positive pitch looking down. Only [`yaw_rotation`] and
//! [`yaw_direction`] know about Bevy's right-handed `-Z` forward frame.

use bevy::prelude::*;

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Rounds to `decimals` places, ties go to the even neighbour.
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Wraps `t` into `[0, length]`.
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Shortest signed difference between two angles, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = repeat(target - current, 360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Critically damped spring toward `target`. `velocity` carries the spring
/// state between calls.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // never overshoot
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { 0.0 };
    }
    output
}

/// [`smooth_damp`] along the shortest arc between two angles.
pub fn damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Folds the angle back by a single turn when it leaves `[-360, 360]`, then
/// clamps it into `[min, max]`.
pub fn clamp_angle(mut angle: f32, min: f32, max: f32) -> f32 {
    if angle < -360.0 {
        angle += 360.0;
    }
    if angle > 360.0 {
        angle -= 360.0;
    }
    angle.clamp(min, max)
}

/// Rotation about the up axis for a yaw in degrees.
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw.to_radians())
}

/// Horizontal unit vector the character faces at `yaw` degrees.
pub fn yaw_direction(yaw: f32) -> Vec3 {
    yaw_rotation(yaw) * Vec3::NEG_Z
}

/// Inverse of [`yaw_rotation`] for an arbitrary rotation, in `(-180, 180]`.
pub fn yaw_of(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    forward.x.atan2(-forward.z).to_degrees()
}
