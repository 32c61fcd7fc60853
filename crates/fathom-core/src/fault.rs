//! Typed per-tick fault values and the tick fault log.
//!
//! Every independent sub-step of a tick is isolated: a transient
//! computation fault inside one step degrades that step to its neutral
//! output (zero force, zero depth) and is recorded here, and the tick
//! continues. Nothing is ever surfaced to the pilot and nothing propagates
//! between units.
//!
//! Structural conditions (an empty group, no coordinator elected yet) are
//! normal states, not faults; the dependent steps short-circuit silently
//! and never appear in the log.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::part::PartId;
use crate::unit::UnitId;

/// A transient computation fault inside one tick sub-step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// The part backing a unit has no rigid body to receive force.
    #[error("part {part} has no rigid body")]
    MissingRigidBody {
        /// The part lacking a body.
        part: PartId,
    },
    /// Gravity could not be resolved at a position (degenerate direction).
    #[error("degenerate gravity direction at {position:?}")]
    DegenerateGravity {
        /// The offending position.
        position: Vec3,
    },
    /// The configured vertical operating window has zero width, so the
    /// submersion falloff cannot be evaluated.
    #[error("degenerate operating window: top {top}, bottom {bottom}, float {float_offset}")]
    DegenerateWindow {
        /// Upper window edge.
        top: f32,
        /// Lower window edge.
        bottom: f32,
        /// Float line offset.
        float_offset: f32,
    },
}

/// The tick sub-step a fault was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickStep {
    /// Group rebuild and auto-attach.
    Discovery,
    /// Coordinator resolution.
    Election,
    /// Depth sensing and splash transitions.
    Sensing,
    /// Buoyant force computation and application.
    ForceModel,
    /// Vessel-wide totals.
    Aggregation,
    /// Target redistribution and depth hold.
    Allocation,
    /// Rate-limited fill convergence.
    Convergence,
}

impl fmt::Display for TickStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovery => "discovery",
            Self::Election => "election",
            Self::Sensing => "sensing",
            Self::ForceModel => "force",
            Self::Aggregation => "aggregation",
            Self::Allocation => "allocation",
            Self::Convergence => "convergence",
        };
        write!(f, "{name}")
    }
}

/// One recorded fault with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultEntry {
    /// The unit whose step faulted, if the step was unit-local.
    pub unit: Option<UnitId>,
    /// The sub-step that faulted.
    pub step: TickStep,
    /// The fault itself.
    pub fault: Fault,
}

/// Per-tick fault log.
///
/// Recording a fault also emits a `tracing` warning so the degradation is
/// observable without inspecting the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultLog {
    entries: Vec<FaultEntry>,
}

impl FaultLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault from a unit-local step.
    pub fn record(&mut self, unit: Option<UnitId>, step: TickStep, fault: Fault) {
        tracing::warn!(?unit, %step, %fault, "tick sub-step degraded to neutral output");
        self.entries.push(FaultEntry { unit, step, fault });
    }

    /// Returns the recorded entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[FaultEntry] {
        &self.entries
    }

    /// Returns `true` if no step faulted this tick.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded faults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
