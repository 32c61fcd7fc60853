//! Reference bodies, gravity, and liquid density.
//!
//! The environment is host-provided, read-only context: which body the
//! vessel moves around, whether that body has a liquid surface at all, and
//! the ambient gravity vector at a position.
//!
//! Density is intentionally simple: one constant per body kind, no depth
//! dependence. At the bottom of a deep ocean the liquid is under two
//! percent denser than at the surface, which is noise next to the rest of
//! this model.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::fault::Fault;

/// Surface liquid density for a primary body, in tons per cubic meter.
pub const DENSITY_PRIMARY: f32 = 1.025;

/// Surface liquid density for the alternate body, in tons per cubic meter.
pub const DENSITY_ALTERNATE: f32 = 1.021;

/// Vessel altitude above which the whole tick is skipped.
pub const DEFAULT_UPDATE_CEILING: f32 = 600.0;

/// Which density constant a body uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// The standard reference body.
    Primary,
    /// The designated alternate body with its own liquid.
    Alternate,
}

/// A reference body the vessel moves around.
///
/// The liquid surface is the sphere of `radius` around `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Which density constant applies.
    pub kind: BodyKind,
    /// World position of the body center.
    pub center: Vec3,
    /// Body radius; the notional waterline.
    pub radius: f32,
    /// Gravity magnitude at the surface.
    pub surface_gravity: f32,
    /// Whether the body carries a liquid surface at all.
    pub has_ocean: bool,
}

impl BodyConfig {
    /// A primary body with an ocean, centered at the origin.
    #[must_use]
    pub fn primary(radius: f32, surface_gravity: f32) -> Self {
        Self {
            kind: BodyKind::Primary,
            center: Vec3::ZERO,
            radius,
            surface_gravity,
            has_ocean: true,
        }
    }

    /// The alternate body with an ocean, centered at the origin.
    #[must_use]
    pub fn alternate(radius: f32, surface_gravity: f32) -> Self {
        Self {
            kind: BodyKind::Alternate,
            ..Self::primary(radius, surface_gravity)
        }
    }
}

/// Host-provided environmental context for a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// The reference body.
    pub body: BodyConfig,
    /// Vessel altitude above which ticks are skipped entirely.
    pub update_ceiling: f32,
}

impl Environment {
    /// Creates an environment around the given body with the default
    /// update ceiling.
    #[must_use]
    pub fn new(body: BodyConfig) -> Self {
        Self {
            body,
            update_ceiling: DEFAULT_UPDATE_CEILING,
        }
    }

    /// Ambient gravity vector at a world position: toward the body center,
    /// surface magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::DegenerateGravity`] when the position coincides
    /// with the body center and no direction exists.
    pub fn gravity_at(&self, position: Vec3) -> Result<Vec3, Fault> {
        let toward_center = self.body.center - position;
        toward_center
            .try_normalize()
            .map(|dir| dir * self.body.surface_gravity)
            .ok_or(Fault::DegenerateGravity { position })
    }

    /// Liquid density at a unit, given its splashed state. Zero out of the
    /// liquid or on a body without an ocean.
    #[must_use]
    pub fn liquid_density(&self, splashed: bool) -> f32 {
        if !splashed || !self.body.has_ocean {
            return 0.0;
        }
        match self.body.kind {
            BodyKind::Primary => DENSITY_PRIMARY,
            BodyKind::Alternate => DENSITY_ALTERNATE,
        }
    }

    /// Vessel altitude above the waterline for the update-ceiling gate.
    #[must_use]
    pub fn altitude_of(&self, position: Vec3) -> f32 {
        position.distance(self.body.center) - self.body.radius
    }
}
