//! Ballast units: configuration, published state, and pilot trim intent.
//!
//! A [`BallastUnit`] is one buoyancy-control element attached to a part. Its
//! [`UnitConfig`] is loaded once at creation and treated as immutable; its
//! [`UnitState`] carries the mutable fields that UI and camera collaborators
//! read every frame.
//!
//! The ballast/buoyant split is stored as a single fill fraction in [0, 1];
//! the buoyant fraction is derived as its complement, so the two always sum
//! to one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::part::PartId;
use crate::vessel::VesselTotals;

/// Unique identifier for a ballast unit within a vessel.
///
/// Ordered by numeric value; the lowest id wins deterministic tie-breaks
/// during coordinator election.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Persisted per-unit configuration, loaded once at creation.
///
/// The vertical geometry fields define the unit's operating window relative
/// to the liquid surface: `float_offset` is how high the unit rides on the
/// water (iceberg-style, applied on the world vertical axis), and
/// `bottom_bound`/`top_bound` bracket the band in which buoyant force fades
/// out near the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Maximum internal volume in cubic meters.
    pub volume: f32,
    /// Ballast gained per second while submerged, as a fraction of volume.
    pub fill_rate: f32,
    /// Ballast lost per second, as a fraction of volume.
    pub drain_rate: f32,
    /// Whether this unit may act as the vessel coordinator.
    pub can_coordinate: bool,
    /// Upper edge of the operating window, relative to the float line.
    pub top_bound: f32,
    /// Lower edge of the operating window, relative to the float line.
    pub bottom_bound: f32,
    /// How high the unit floats on the liquid, in length units.
    pub float_offset: f32,
    /// Drag multiplier applied to the part while submerged.
    pub water_drag: f32,
    /// Scales the part's crash tolerance into the catastrophic impact
    /// threshold for liquid entry.
    pub impact_tolerance_factor: f32,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            volume: 3.0,
            fill_rate: 0.1,
            drain_rate: 0.1,
            can_coordinate: true,
            top_bound: 0.5,
            bottom_bound: -0.5,
            float_offset: 0.0,
            water_drag: 1.0,
            impact_tolerance_factor: 10.0,
        }
    }
}

impl UnitConfig {
    /// Configuration for an auto-attached inert float: fixed volume, rates
    /// forced to zero, never a coordinator. It holds whatever buoyancy it
    /// was created with and never changes state.
    #[must_use]
    pub fn inert(volume: f32) -> Self {
        Self {
            volume,
            fill_rate: 0.0,
            drain_rate: 0.0,
            can_coordinate: false,
            ..Self::default()
        }
    }
}

/// Published mutable state of a unit.
///
/// Collaborators read these fields every frame; the core overwrites them
/// every tick the unit runs. `coordinator` and `is_coordinator` are plain
/// data resolved by the election pass, not live references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    /// Ballast fill fraction in [0, 1]. The buoyant fraction is its
    /// complement.
    pub fill_fraction: f32,
    /// Signed depth: positive submerged, negative above the waterline.
    pub depth: f32,
    /// Whether the sensed depth places the unit below the splash threshold.
    pub splashed: bool,
    /// Scalar projection of the applied force onto "up" (opposite gravity).
    pub net_force: f32,
    /// Theoretical maximum force magnitude at full buoyancy.
    pub net_force_max: f32,
    /// Pilot-set per-unit trim offset in [-1, 1].
    pub trim: f32,
    /// The coordinator this unit currently recognizes.
    pub coordinator: Option<UnitId>,
    /// Whether this unit is the resolved coordinator.
    pub is_coordinator: bool,
    /// Target fill fraction received from the allocator, in [0, 1].
    pub target_fraction: f32,
    /// Per-tick mirror of the vessel totals, written by the coordinator.
    pub totals: VesselTotals,
}

impl Default for UnitState {
    fn default() -> Self {
        Self {
            fill_fraction: 0.0,
            depth: 0.0,
            splashed: false,
            net_force: 0.0,
            net_force_max: 0.0,
            trim: 0.0,
            coordinator: None,
            is_coordinator: false,
            target_fraction: 0.0,
            totals: VesselTotals::default(),
        }
    }
}

/// One buoyancy-control element attached to a part of a vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallastUnit {
    id: UnitId,
    part: PartId,
    config: UnitConfig,
    /// Published mutable state.
    pub state: UnitState,
}

impl BallastUnit {
    /// Creates a unit bound to a part, fully buoyant.
    #[must_use]
    pub fn new(id: UnitId, part: PartId, config: UnitConfig) -> Self {
        Self {
            id,
            part,
            config,
            state: UnitState::default(),
        }
    }

    /// Creates a unit with an initial fill fraction (clamped to [0, 1]).
    #[must_use]
    pub fn with_fill(id: UnitId, part: PartId, config: UnitConfig, fill: f32) -> Self {
        let mut unit = Self::new(id, part, config);
        unit.state.fill_fraction = fill.clamp(0.0, 1.0);
        unit
    }

    /// Returns the unit's identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Returns the id of the part this unit is attached to.
    #[must_use]
    pub const fn part(&self) -> PartId {
        self.part
    }

    /// Returns the unit's immutable configuration.
    #[must_use]
    pub const fn config(&self) -> &UnitConfig {
        &self.config
    }

    /// Returns the current ballast fill fraction.
    #[must_use]
    pub fn fill_fraction(&self) -> f32 {
        self.state.fill_fraction
    }

    /// Returns the buoyant fraction, the complement of the fill fraction.
    #[must_use]
    pub fn buoyant_fraction(&self) -> f32 {
        1.0 - self.state.fill_fraction
    }

    /// Whether this unit may be elected coordinator.
    #[must_use]
    pub fn coordinator_eligible(&self) -> bool {
        self.config.can_coordinate
    }

    /// Whether this unit can change its ballast at all. Inert floats have
    /// both rates zeroed and contribute only unchanging force.
    #[must_use]
    pub fn is_controllable(&self) -> bool {
        self.config.fill_rate > 0.0 || self.config.drain_rate > 0.0
    }

    // Pilot trim intent. Plain field writes with clamping; collaborators
    // invoke these in response to user input.

    /// Coarse trim increase (+0.01).
    pub fn trim_up(&mut self) {
        self.adjust_trim(0.01);
    }

    /// Fine trim increase (+0.001).
    pub fn trim_up_fine(&mut self) {
        self.adjust_trim(0.001);
    }

    /// Fine trim decrease (-0.001).
    pub fn trim_down_fine(&mut self) {
        self.adjust_trim(-0.001);
    }

    /// Coarse trim decrease (-0.01).
    pub fn trim_down(&mut self) {
        self.adjust_trim(-0.01);
    }

    /// Sets trim to its maximum (+1).
    pub fn trim_max(&mut self) {
        self.state.trim = 1.0;
    }

    /// Sets trim to its minimum (-1).
    pub fn trim_min(&mut self) {
        self.state.trim = -1.0;
    }

    /// Clears any trim adjustment.
    pub fn trim_reset(&mut self) {
        self.state.trim = 0.0;
    }

    fn adjust_trim(&mut self, delta: f32) {
        self.state.trim = (self.state.trim + delta).clamp(-1.0, 1.0);
    }
}
