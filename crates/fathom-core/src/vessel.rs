//! The vessel: part and unit storage, condition flags, pilot intent, and
//! coordinator-written totals.
//!
//! # Determinism
//!
//! Parts and units live in `BTreeMap`s keyed by their ids. IDs are assigned
//! monotonically, so iteration order is creation order and identical across
//! runs and platforms. Discovery, election, and aggregation all walk these
//! maps in sorted order.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::part::{PartId, PartState};
use crate::unit::{BallastUnit, UnitConfig, UnitId};

bitflags! {
    /// Vessel-level condition flags maintained by the sensor pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VesselFlags: u8 {
        /// Some non-person-scale unit is below the splash threshold.
        const SPLASHED = 1 << 0;
        /// Some part is touching the liquid.
        const WATER_CONTACT = 1 << 1;
    }
}

/// Pilot-set intent, written by collaborators as plain fields.
///
/// The only validation is the clamping documented on the setters; the core
/// trusts these values otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotIntent {
    /// Vessel-wide target ballast fraction in [0, 1].
    pub target_fraction: f32,
    /// Target vertical speed for depth hold, in length units per second.
    pub target_vertical_speed: f32,
    /// Whether the depth-hold feedback loop is engaged.
    pub depth_hold: bool,
    /// Whether the vessel should be slowed to a stationary state.
    pub hold_position: bool,
    /// Maximum speed at which hold-position may engage.
    pub stationary_speed_max: f32,
    /// Speed the hold-position clamp converges toward.
    pub stationary_speed_clamp: f32,
}

impl Default for PilotIntent {
    fn default() -> Self {
        Self {
            target_fraction: 0.0,
            target_vertical_speed: 0.0,
            depth_hold: false,
            hold_position: false,
            stationary_speed_max: 1.0,
            stationary_speed_clamp: 0.0,
        }
    }
}

/// How much of the vessel the aggregation pass actually covered.
///
/// Parts without units contribute mass and weight but no controllable
/// force; when some exist the totals describe a partial view, which this
/// makes explicit instead of truncating the sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationCoverage {
    /// Units that contributed to the force totals.
    pub units_counted: usize,
    /// Parts on the vessel when the totals were computed.
    pub parts_total: usize,
}

impl AggregationCoverage {
    /// Whether every part carried a unit when the totals were computed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.units_counted >= self.parts_total
    }
}

/// Vessel-wide totals computed by the coordinator.
///
/// Overwritten each tick a coordinator runs and mirrored onto every unit;
/// stale between ticks if no coordinator ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselTotals {
    /// Total vessel mass, all parts.
    pub mass: f32,
    /// Total gravity-force magnitude on the vessel.
    pub gravity_force: f32,
    /// Sum of all units' current net force.
    pub net_force: f32,
    /// Sum of net force over units that cannot be controlled.
    pub net_force_unchanging: f32,
    /// Sum of all units' theoretical maximum force.
    pub net_force_max: f32,
    /// How complete the sums are.
    pub coverage: AggregationCoverage,
}

/// A composite vehicle: parts, their ballast units, and vessel-level state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vessel {
    parts: BTreeMap<PartId, PartState>,
    units: BTreeMap<UnitId, BallastUnit>,
    flags: VesselFlags,
    pilot: PilotIntent,
    totals: VesselTotals,
    /// Host-measured vertical speed; when absent it is derived from part
    /// velocities at tick time.
    pub vertical_speed_override: Option<f32>,
    next_part_id: u64,
    next_unit_id: u64,
}

impl Vessel {
    /// Creates an empty vessel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part, assigning it the next id.
    pub fn spawn_part(&mut self, mut part: PartState) -> PartId {
        let id = PartId::new(self.next_part_id);
        self.next_part_id += 1;
        part.assign_id(id);
        self.parts.insert(id, part);
        id
    }

    /// Attaches a ballast unit to a part, assigning it the next id.
    pub fn attach_unit(&mut self, part: PartId, config: UnitConfig) -> UnitId {
        self.attach_unit_with_fill(part, config, 0.0)
    }

    /// Attaches a unit with a persisted initial fill fraction.
    pub fn attach_unit_with_fill(
        &mut self,
        part: PartId,
        config: UnitConfig,
        fill: f32,
    ) -> UnitId {
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, BallastUnit::with_fill(id, part, config, fill));
        id
    }

    /// Removes a part and any unit attached to it.
    pub fn remove_part(&mut self, id: PartId) -> Option<PartState> {
        let removed = self.parts.remove(&id);
        if removed.is_some() {
            self.units.retain(|_, unit| unit.part() != id);
        }
        removed
    }

    /// Returns a part by id.
    #[must_use]
    pub fn part(&self, id: PartId) -> Option<&PartState> {
        self.parts.get(&id)
    }

    /// Returns a mutable part by id.
    #[must_use]
    pub fn part_mut(&mut self, id: PartId) -> Option<&mut PartState> {
        self.parts.get_mut(&id)
    }

    /// Returns a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&BallastUnit> {
        self.units.get(&id)
    }

    /// Returns a mutable unit by id.
    #[must_use]
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut BallastUnit> {
        self.units.get_mut(&id)
    }

    /// Iterates parts in id order.
    pub fn parts_sorted(&self) -> impl Iterator<Item = &PartState> {
        self.parts.values()
    }

    /// Iterates units in id order.
    pub fn units_sorted(&self) -> impl Iterator<Item = &BallastUnit> {
        self.units.values()
    }

    /// Iterates units mutably in id order.
    pub fn units_sorted_mut(&mut self) -> impl Iterator<Item = &mut BallastUnit> {
        self.units.values_mut()
    }

    /// The unit attached to a part, if any.
    #[must_use]
    pub fn unit_for_part(&self, part: PartId) -> Option<UnitId> {
        self.units
            .values()
            .find(|unit| unit.part() == part)
            .map(BallastUnit::id)
    }

    /// Number of parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Current vessel condition flags.
    #[must_use]
    pub fn flags(&self) -> VesselFlags {
        self.flags
    }

    /// Mutable access to the condition flags (sensor pass).
    pub fn flags_mut(&mut self) -> &mut VesselFlags {
        &mut self.flags
    }

    /// Recomputes the condition flags from unit and part state.
    ///
    /// Person-scale units are excluded from the splashed check: a swimmer
    /// alongside must not force the whole vessel into the splashed state.
    pub fn recheck_splashed(&mut self) {
        let splashed = self.units.values().any(|unit| {
            unit.state.splashed
                && self
                    .parts
                    .get(&unit.part())
                    .is_some_and(|part| !part.person_scale)
        });
        let contact = self.parts.values().any(|part| part.water_contact);

        self.flags.set(VesselFlags::SPLASHED, splashed);
        self.flags.set(VesselFlags::WATER_CONTACT, contact);
    }

    /// Current pilot intent.
    #[must_use]
    pub fn pilot(&self) -> &PilotIntent {
        &self.pilot
    }

    /// Mutable pilot intent (allocator feedback writes through this).
    pub fn pilot_mut(&mut self) -> &mut PilotIntent {
        &mut self.pilot
    }

    /// Sets the vessel-wide target fraction (clamped to [0, 1]).
    ///
    /// A manual target write disengages depth hold, mirroring the control
    /// surface this field is driven from.
    pub fn set_target_fraction(&mut self, fraction: f32) {
        self.pilot.target_fraction = fraction.clamp(0.0, 1.0);
        self.pilot.depth_hold = false;
    }

    /// Sets the depth-hold target vertical speed.
    pub fn set_target_vertical_speed(&mut self, speed: f32) {
        self.pilot.target_vertical_speed = speed;
    }

    /// Toggles the depth-hold feedback loop. Disengaging it zeroes the
    /// target vertical speed.
    pub fn toggle_depth_hold(&mut self) {
        self.pilot.depth_hold = !self.pilot.depth_hold;
        if !self.pilot.depth_hold {
            self.pilot.target_vertical_speed = 0.0;
        }
    }

    /// Toggles hold-position.
    pub fn toggle_hold_position(&mut self) {
        self.pilot.hold_position = !self.pilot.hold_position;
    }

    /// The last coordinator-written totals.
    #[must_use]
    pub fn totals(&self) -> &VesselTotals {
        &self.totals
    }

    /// Overwrites the vessel totals (coordinator pass).
    pub fn set_totals(&mut self, totals: VesselTotals) {
        self.totals = totals;
    }

    /// Total vessel mass over all parts.
    #[must_use]
    pub fn total_mass(&self) -> f32 {
        self.parts.values().map(|part| part.mass).sum()
    }

    /// Mass-weighted center of mass. `None` for an empty or massless
    /// vessel.
    #[must_use]
    pub fn center_of_mass(&self) -> Option<Vec3> {
        let mass = self.total_mass();
        if mass <= 0.0 || self.parts.is_empty() {
            return None;
        }
        let weighted: Vec3 = self
            .parts
            .values()
            .map(|part| part.position * part.mass)
            .sum();
        Some(weighted / mass)
    }

    /// Mass-weighted vessel velocity. Zero for an empty or massless
    /// vessel.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        let mass = self.total_mass();
        if mass <= 0.0 {
            return Vec3::ZERO;
        }
        let weighted: Vec3 = self
            .parts
            .values()
            .map(|part| part.velocity * part.mass)
            .sum();
        weighted / mass
    }

    /// Vessel vertical speed: the host override when present, otherwise
    /// the mass-weighted velocity projected on "up" at the center of mass.
    #[must_use]
    pub fn vertical_speed(&self, up: Vec3) -> f32 {
        self.vertical_speed_override
            .unwrap_or_else(|| self.velocity().dot(up))
    }
}
