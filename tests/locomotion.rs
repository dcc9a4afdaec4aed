use approx::assert_relative_eq;
use bevy::prelude::*;

use tps_control::config::ControllerConfig;
use tps_control::input::InputState;
use tps_control::player::animations::AnimatorParameters;
use tps_control::player::ground::GroundQuery;
use tps_control::player::locomotion::{LocomotionState, TickContext};
use tps_control::player::motor::{CharacterMotor, KinematicMover, SweepCaster, SweepHit};
use tps_control::player::stance::{CapsuleShape, Stance};

const DT: f32 = 0.02;

/// Endless flat floor at `y = 0`.
struct Flat;

impl SweepCaster for Flat {
    fn cast_capsule(
        &self,
        capsule: &CapsuleShape,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<SweepHit> {
        if direction.y >= 0.0 {
            return None;
        }
        let bottom = origin.y - capsule.height / 2.0;
        let distance = bottom / -direction.y;
        (distance <= max_distance).then_some(SweepHit {
            distance: distance.max(0.0),
            normal: Vec3::Y,
        })
    }
}

impl GroundQuery for Flat {
    fn check_sphere(&self, center: Vec3, radius: f32) -> bool {
        center.y - radius <= 0.0
    }
}

struct Sim {
    config: ControllerConfig,
    state: LocomotionState,
    input: InputState,
    motor: CharacterMotor,
    anim: AnimatorParameters,
    position: Vec3,
}

impl Sim {
    fn new() -> Self {
        let config = ControllerConfig::default();
        Self {
            state: LocomotionState::new(&config.locomotion),
            motor: CharacterMotor::new(config.stance_shapes.standing),
            input: InputState::default(),
            anim: AnimatorParameters::default(),
            position: Vec3::ZERO,
            config,
        }
    }

    fn step(&mut self, camera_yaw: f32) {
        let ctx = TickContext {
            dt: DT,
            position: self.position,
            camera_yaw,
            settings: &self.config.locomotion,
            ground: &self.config.ground,
            shapes: &self.config.stance_shapes,
        };
        let mut mover = KinematicMover::new(&Flat, self.position, self.motor);
        self.state
            .tick(&mut self.input, ctx, &Flat, &mut mover, &mut self.anim);
        self.position = mover.position;
        self.motor = mover.motor;
    }

    fn run(&mut self, frames: usize, camera_yaw: f32) {
        for _ in 0..frames {
            self.step(camera_yaw);
        }
    }
}

#[test]
fn idle_character_rests_on_the_floor() {
    let mut sim = Sim::new();
    sim.run(100, 0.0);

    assert!(sim.state.grounded);
    assert!(sim.anim.grounded);
    assert!(sim.position.y >= 0.0 && sim.position.y < 0.05, "{}", sim.position);
    assert_eq!(sim.position.xz(), Vec2::ZERO);
    assert_eq!(sim.anim.speed, 0.0);
}

#[test]
fn jump_arc_lands_back_on_the_floor() {
    let mut sim = Sim::new();
    sim.run(30, 0.0);
    sim.input.jump_input(true);

    let mut peak = 0.0_f32;
    let mut saw_free_fall = false;
    let mut left_ground = false;
    for _ in 0..300 {
        sim.step(0.0);
        peak = peak.max(sim.position.y);
        saw_free_fall |= sim.anim.free_fall;
        left_ground |= !sim.state.grounded;
        if left_ground && sim.state.grounded {
            break;
        }
    }

    assert!(left_ground);
    assert!(sim.state.grounded);
    assert!(peak > 1.1 && peak < 1.6, "peak {peak}");
    assert!(saw_free_fall);
    assert!(!sim.input.jump, "jump is consumed in the air");

    sim.step(0.0);
    assert!(!sim.anim.jump);
    assert!(!sim.anim.free_fall);
    assert!(sim.position.y < 0.05);
}

#[test]
fn walking_follows_camera_yaw() {
    let mut sim = Sim::new();
    sim.input.move_input(Vec2::Y);
    sim.run(100, 90.0);

    assert!(sim.position.x > 3.0 && sim.position.x < 4.1, "{}", sim.position);
    assert_relative_eq!(sim.position.z, 0.0, epsilon = 1e-3);
    assert_relative_eq!(sim.anim.speed, 2.0, epsilon = 1e-2);
    assert_relative_eq!(sim.state.model_yaw, 90.0, epsilon = 0.5);
    assert!(!sim.anim.run);
}

#[test]
fn sprint_sets_run_flag_and_speeds_up() {
    let mut sim = Sim::new();
    sim.input.move_input(Vec2::Y);
    sim.input.sprint_input(true);
    sim.run(100, 0.0);

    assert!(sim.anim.run);
    assert_relative_eq!(sim.motor.velocity.xz().length(), 5.335, epsilon = 0.06);
    assert!(sim.position.z < -8.0, "{}", sim.position);
}

#[test]
fn prone_crawls_at_half_speed_with_small_capsule() {
    let mut sim = Sim::new();
    sim.input.prone_input(true);
    sim.input.move_input(Vec2::Y);
    sim.run(150, 0.0);

    assert_eq!(sim.state.stance, Stance::Prone);
    assert_eq!(sim.motor.capsule, sim.config.stance_shapes.prone);
    assert!(sim.anim.prone && !sim.anim.crunch);
    assert_relative_eq!(sim.motor.velocity.xz().length(), 1.0, epsilon = 0.05);

    sim.input.crouch_input(true);
    sim.step(0.0);
    assert_eq!(sim.state.stance, Stance::Crouching);
    assert!(sim.anim.crunch && !sim.anim.prone);
    assert_eq!(sim.motor.capsule, sim.config.stance_shapes.crouching);
}
