use avian3d::prelude::*;
use bevy::prelude::*;
use serde::Deserialize;

use crate::game::GameLayer;

/// Answers whether a sphere touches anything the character may stand on.
pub trait GroundQuery {
    fn check_sphere(&self, center: Vec3, radius: f32) -> bool;
}

#[derive(Debug, Clone, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct GroundCheckSettings {
    /// Subtracted from the feet height to place the probe, negative lifts it.
    pub grounded_offset: f32,
    /// Should match the capsule radius.
    pub grounded_radius: f32,
}

impl Default for GroundCheckSettings {
    fn default() -> Self {
        Self {
            grounded_offset: -0.14,
            grounded_radius: 0.28,
        }
    }
}

impl GroundCheckSettings {
    pub fn probe_center(&self, feet: Vec3) -> Vec3 {
        Vec3::new(feet.x, feet.y - self.grounded_offset, feet.z)
    }
}

/// Ground probe backed by avian's spatial queries.
pub struct SpatialGround<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> SpatialGround<'a, 'w, 's> {
    pub fn new(spatial: &'a SpatialQuery<'w, 's>) -> Self {
        Self {
            spatial,
            filter: SpatialQueryFilter::from_mask(GameLayer::Ground),
        }
    }
}

impl GroundQuery for SpatialGround<'_, '_, '_> {
    fn check_sphere(&self, center: Vec3, radius: f32) -> bool {
        !self
            .spatial
            .shape_intersections(&Collider::sphere(radius), center, Quat::IDENTITY, &self.filter)
            .is_empty()
    }
}
