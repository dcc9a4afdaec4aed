use avian3d::prelude::*;
use bevy::prelude::*;

use crate::game::GameLayer;
use crate::player::stance::CapsuleShape;

/// Extra gap kept between the capsule and whatever it hits.
const SKIN: f32 = 0.02;
const MAX_SLIDES: usize = 4;
const MIN_MOVE: f32 = 0.0001;

/// Collide-and-slide character movement, fed one displacement per frame.
pub trait CharacterMover {
    /// Velocity actually achieved by the last move.
    fn velocity(&self) -> Vec3;
    fn move_by(&mut self, displacement: Vec3, dt: f32);
    fn set_capsule(&mut self, capsule: CapsuleShape);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub distance: f32,
    /// Surface normal of the obstacle, pointing back at the capsule.
    pub normal: Vec3,
}

/// Casts a capsule through the world.
pub trait SweepCaster {
    fn cast_capsule(
        &self,
        capsule: &CapsuleShape,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<SweepHit>;
}

/// Resolved kinematic state of a character, kept between frames.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CharacterMotor {
    pub velocity: Vec3,
    pub capsule: CapsuleShape,
}

impl CharacterMotor {
    pub fn new(capsule: CapsuleShape) -> Self {
        Self {
            velocity: Vec3::ZERO,
            capsule,
        }
    }
}

/// Moves `feet` by `displacement`, sliding along whatever gets in the way.
pub fn slide(
    caster: &impl SweepCaster,
    capsule: &CapsuleShape,
    feet: Vec3,
    displacement: Vec3,
) -> Vec3 {
    let mut position = feet;
    let mut remaining = displacement;

    for _ in 0..MAX_SLIDES {
        let length = remaining.length();
        if length < MIN_MOVE {
            break;
        }
        let Ok(direction) = Dir3::new(remaining) else {
            break;
        };

        let Some(hit) = caster.cast_capsule(capsule, position + capsule.center, direction, length + SKIN)
        else {
            position += remaining;
            break;
        };

        let travel = (hit.distance - SKIN).clamp(0.0, length);
        position += direction * travel;

        let left = direction * (length - travel);
        let into_surface = left.dot(hit.normal);
        remaining = if into_surface < 0.0 {
            left - hit.normal * into_surface
        } else {
            left
        };
    }

    position
}

/// [`CharacterMover`] over a caster, writing back into a feet position.
pub struct KinematicMover<'a, C: SweepCaster> {
    caster: &'a C,
    pub position: Vec3,
    pub motor: CharacterMotor,
}

impl<'a, C: SweepCaster> KinematicMover<'a, C> {
    pub fn new(caster: &'a C, position: Vec3, motor: CharacterMotor) -> Self {
        Self {
            caster,
            position,
            motor,
        }
    }
}

impl<C: SweepCaster> CharacterMover for KinematicMover<'_, C> {
    fn velocity(&self) -> Vec3 {
        self.motor.velocity
    }

    fn move_by(&mut self, displacement: Vec3, dt: f32) {
        let start = self.position;
        self.position = slide(self.caster, &self.motor.capsule, start, displacement);
        self.motor.velocity = if dt > 0.0 {
            (self.position - start) / dt
        } else {
            Vec3::ZERO
        };
    }

    fn set_capsule(&mut self, capsule: CapsuleShape) {
        self.motor.capsule = capsule;
    }
}

/// Avian collider for a capsule shape.
pub fn capsule_collider(capsule: &CapsuleShape) -> Collider {
    Collider::capsule(capsule.radius, capsule.segment_length())
}

/// Sweeps against static level geometry and other bodies, never against
/// other characters.
pub struct SpatialSweep<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> SpatialSweep<'a, 'w, 's> {
    pub fn new(spatial: &'a SpatialQuery<'w, 's>) -> Self {
        Self {
            spatial,
            filter: SpatialQueryFilter::from_mask([GameLayer::Default, GameLayer::Ground]),
        }
    }
}

impl SweepCaster for SpatialSweep<'_, '_, '_> {
    fn cast_capsule(
        &self,
        capsule: &CapsuleShape,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<SweepHit> {
        let config = ShapeCastConfig {
            ignore_origin_penetration: true,
            ..ShapeCastConfig::from_max_distance(max_distance)
        };
        self.spatial
            .cast_shape(
                &capsule_collider(capsule),
                origin,
                Quat::IDENTITY,
                direction,
                &config,
                &self.filter,
            )
            .map(|hit| SweepHit {
                distance: hit.distance,
                normal: hit.normal1,
            })
    }
}
