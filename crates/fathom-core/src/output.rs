//! Tick outputs: forces and drag for the host to apply, plus the events
//! and fault log of one tick.
//!
//! The core never integrates part motion. Everything it wants done to the
//! physical world leaves through a [`TickReport`]; the host applies the
//! forces and drag, reacts to the events, and feeds the next tick fresh
//! part state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::fault::FaultLog;
use crate::part::PartId;
use crate::unit::UnitId;

/// A force to apply at a point on a part, for one tick.
///
/// This is the only actuation path of the model: a unit that did not run
/// this tick contributes no force at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedForce {
    /// The part receiving the force.
    pub part: PartId,
    /// Force vector.
    pub force: Vec3,
    /// Application point (the part's center of mass).
    pub at: Vec3,
}

/// A drag coefficient update for a part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragUpdate {
    /// The part to update.
    pub part: PartId,
    /// New drag multiplier; zero restores the dry default.
    pub drag: f32,
}

/// Something notable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    /// A unit crossed below the splash threshold.
    SplashedDown {
        /// The unit that entered the liquid.
        unit: UnitId,
    },
    /// A unit crossed back above the splash threshold.
    Surfaced {
        /// The unit that left the liquid.
        unit: UnitId,
    },
    /// A part hit the liquid harder than its tolerance and broke up.
    PartDestroyed {
        /// The destroyed part.
        part: PartId,
        /// Impact speed at entry.
        impact_speed: f32,
    },
    /// The resolved coordinator changed.
    CoordinatorChanged {
        /// Previous coordinator, if any.
        from: Option<UnitId>,
        /// New coordinator, if any.
        to: Option<UnitId>,
    },
    /// Hold-position asked the host to slow the vessel.
    VelocityClamped {
        /// Speed the host should converge the vessel toward.
        target_speed: f32,
    },
}

impl TickEvent {
    /// Returns `true` for the destructive structural-failure event.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::PartDestroyed { .. })
    }
}

/// Everything one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Forces for the host to apply this tick.
    pub forces: Vec<AppliedForce>,
    /// Drag updates for the host to apply.
    pub drag: Vec<DragUpdate>,
    /// Events raised during the tick.
    pub events: Vec<TickEvent>,
    /// Faults recorded by degraded sub-steps.
    pub faults: FaultLog,
    /// The tick was skipped entirely (vessel above the update ceiling).
    pub skipped: bool,
}

impl TickReport {
    /// An empty report for a skipped tick.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// The force applied to a given part this tick, if any.
    #[must_use]
    pub fn force_on(&self, part: PartId) -> Option<&AppliedForce> {
        self.forces.iter().find(|applied| applied.part == part)
    }
}
