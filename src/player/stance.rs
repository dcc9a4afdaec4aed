use bevy::prelude::*;
use serde::Deserialize;

/// Exclusive posture of a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Deserialize)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
    Prone,
}

/// Collision capsule measured from the character's feet.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Deserialize)]
pub struct CapsuleShape {
    pub center: Vec3,
    /// Full height including both caps.
    pub height: f32,
    pub radius: f32,
}

impl CapsuleShape {
    /// Length of the cylindrical part, zero when the caps touch.
    pub fn segment_length(&self) -> f32 {
        (self.height - 2.0 * self.radius).max(0.0)
    }
}

/// Capsule used for each stance.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct StanceShapes {
    pub standing: CapsuleShape,
    pub crouching: CapsuleShape,
    pub prone: CapsuleShape,
}

impl StanceShapes {
    pub fn shape(&self, stance: Stance) -> CapsuleShape {
        match stance {
            Stance::Standing => self.standing,
            Stance::Crouching => self.crouching,
            Stance::Prone => self.prone,
        }
    }
}

impl Default for StanceShapes {
    fn default() -> Self {
        const RADIUS: f32 = 0.28;
        Self {
            standing: CapsuleShape {
                center: Vec3::new(0.0, 1.0, 0.0),
                height: 2.0,
                radius: RADIUS,
            },
            crouching: CapsuleShape {
                center: Vec3::new(0.0, 0.5, 0.0),
                height: 1.0,
                radius: RADIUS,
            },
            prone: CapsuleShape {
                center: Vec3::new(0.0, 0.25, 0.0),
                height: 0.5,
                radius: RADIUS,
            },
        }
    }
}
