//! The per-tick execution loop.
//!
//! [`Simulation::step`] runs one vessel through one fixed-timestep physics
//! tick in four phases:
//!
//! 1. **DISCOVER**: rebuild the group from the part list (auto-attaching
//!    inert floats where needed) and resolve the coordinator from the
//!    membership snapshot.
//! 2. **LOCAL**: every unit, in id order, senses its submersion and
//!    computes its buoyant force from its own current state, publishing a
//!    [`UnitReport`] into the tick snapshot. No unit reads another unit's
//!    live state.
//! 3. **COORDINATOR**: if a coordinator resolved, vessel totals are
//!    aggregated strictly from the completed snapshot, depth-hold feedback
//!    and target redistribution run, and the totals are mirrored onto
//!    every unit.
//! 4. **APPLY**: every unit converges its fill fraction toward its
//!    (possibly just-updated) target under its rate limits, and destroyed
//!    parts are removed.
//!
//! Redistributed targets therefore reach each unit's force model on the
//! next tick, never the current one.
//!
//! # Fault isolation
//!
//! Each unit-local sub-step is isolated: a transient fault (missing rigid
//! body, degenerate math) records into the report's [`FaultLog`] and that
//! step degrades to its neutral output; the tick always runs to
//! completion. Structural states such as an empty group or a
//! coordinatorless tick short-circuit their dependent phases silently.
//!
//! [`FaultLog`]: crate::fault::FaultLog

use crate::aggregate::{self, UnitReport};
use crate::allocator;
use crate::discovery;
use crate::election::{self, Candidate};
use crate::environment::Environment;
use crate::fault::{Fault, TickStep};
use crate::force::{self, ForceResult};
use crate::output::{AppliedForce, DragUpdate, TickEvent, TickReport};
use crate::part::PartId;
use crate::sensor::{self, SplashTransition};
use crate::unit::UnitId;
use crate::vessel::{Vessel, VesselFlags};

/// Drives vessels through fixed-timestep ticks in one environment.
///
/// The simulation is single-threaded and cooperative: everything happens
/// synchronously inside [`step`](Self::step), and a vessel is only ever
/// mutated by its own tick.
#[derive(Debug, Clone)]
pub struct Simulation {
    environment: Environment,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation in the given environment, at tick 0.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            tick: 0,
        }
    }

    /// The environment vessels tick in.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs one tick over a vessel and returns what it produced.
    ///
    /// `dt` is the elapsed tick duration in seconds, host-provided.
    pub fn step(&mut self, vessel: &mut Vessel, dt: f32) -> TickReport {
        self.tick += 1;

        // Out of reach of any liquid: skip the whole tick.
        if let Some(com) = vessel.center_of_mass() {
            if self.environment.altitude_of(com) > self.environment.update_ceiling {
                return TickReport::skipped();
            }
        }

        let mut report = TickReport::default();

        // PHASE 1: DISCOVER - rebuild the group, resolve the coordinator.
        let group = discovery::discover(vessel, self.environment.body.has_ocean);
        let resolved = self.run_election(vessel, &group, &mut report);

        // PHASE 2: LOCAL - sense and compute force per unit, publish the
        // snapshot.
        let reports = self.run_local_phase(vessel, &group, &mut report);
        vessel.recheck_splashed();

        // PHASE 3: COORDINATOR - aggregate and allocate from the snapshot.
        if resolved.is_some() {
            self.run_coordinator_phase(vessel, &group, &reports, dt, &mut report);
        }

        // PHASE 4: APPLY - converge fill fractions, drop destroyed parts.
        for &unit_id in &group {
            if let Some(unit) = vessel.unit_mut(unit_id) {
                allocator::converge_fill(unit, dt);
            }
        }
        Self::remove_destroyed(vessel);

        report
    }

    fn run_election(
        &self,
        vessel: &mut Vessel,
        group: &[UnitId],
        report: &mut TickReport,
    ) -> Option<UnitId> {
        if group.is_empty() {
            return None;
        }

        let previous = group
            .iter()
            .filter_map(|&id| vessel.unit(id))
            .find(|unit| unit.state.is_coordinator)
            .map(|unit| unit.id());

        let candidates: Vec<Candidate> = group
            .iter()
            .filter_map(|&id| vessel.unit(id))
            .map(Candidate::of)
            .collect();
        let resolved = election::resolve(&candidates);

        election::write_back(
            vessel
                .units_sorted_mut()
                .filter(|unit| group.contains(&unit.id())),
            resolved,
        );

        if resolved != previous {
            tracing::debug!(?previous, ?resolved, "coordinator changed");
            report.events.push(TickEvent::CoordinatorChanged {
                from: previous,
                to: resolved,
            });
        }
        resolved
    }

    fn run_local_phase(
        &self,
        vessel: &mut Vessel,
        group: &[UnitId],
        report: &mut TickReport,
    ) -> Vec<UnitReport> {
        let mut reports = Vec::with_capacity(group.len());

        for &unit_id in group {
            let Some(unit) = vessel.unit(unit_id) else {
                continue;
            };
            let part_id = unit.part();
            let config = unit.config().clone();
            let controllable = unit.is_controllable();
            let was_splashed = unit.state.splashed;

            let Some(part) = vessel.part(part_id) else {
                continue;
            };
            // Inactive parts are outside the update path and get no force.
            if !part.active {
                continue;
            }
            let position = part.position;
            let impact_speed = part.velocity.length();
            let has_rigid_body = part.has_rigid_body;
            let person_scale = part.person_scale;
            let crash_tolerance = part.crash_tolerance;

            let sensed = sensor::sense(position, was_splashed, &self.environment.body, &config);
            if let Some(unit) = vessel.unit_mut(unit_id) {
                unit.state.depth = sensed.depth;
                unit.state.splashed = sensed.splashed;
            }

            let mut destroyed = false;
            match sensed.transition {
                Some(SplashTransition::Entered) => {
                    if let Some(part) = vessel.part_mut(part_id) {
                        part.water_contact = !person_scale;
                    }
                    report.events.push(TickEvent::SplashedDown { unit: unit_id });

                    if sensor::impact_exceeds_tolerance(
                        impact_speed,
                        crash_tolerance,
                        config.impact_tolerance_factor,
                    ) {
                        if let Some(part) = vessel.part_mut(part_id) {
                            part.destroyed = true;
                        }
                        tracing::debug!(part = %part_id, impact_speed, "hit the liquid too fast");
                        report.events.push(TickEvent::PartDestroyed {
                            part: part_id,
                            impact_speed,
                        });
                        destroyed = true;
                    }
                }
                Some(SplashTransition::Left) => {
                    if let Some(part) = vessel.part_mut(part_id) {
                        part.water_contact = false;
                    }
                    report.events.push(TickEvent::Surfaced { unit: unit_id });
                }
                None => {}
            }
            if destroyed {
                continue;
            }

            // Without a rigid body there is nothing to push against; the
            // force step degrades to its neutral output.
            let result = if has_rigid_body {
                self.run_force_step(vessel, unit_id, &sensed, report)
            } else {
                report.faults.record(
                    Some(unit_id),
                    TickStep::ForceModel,
                    Fault::MissingRigidBody { part: part_id },
                );
                if let Some(unit) = vessel.unit_mut(unit_id) {
                    unit.state.net_force = 0.0;
                    unit.state.net_force_max = 0.0;
                }
                ForceResult::zero()
            };

            if has_rigid_body {
                report.forces.push(AppliedForce {
                    part: part_id,
                    force: result.force,
                    at: position,
                });
                report.drag.push(DragUpdate {
                    part: part_id,
                    drag: if sensed.splashed { config.water_drag } else { 0.0 },
                });
            }

            reports.push(UnitReport {
                unit: unit_id,
                part: part_id,
                controllable,
                splashed: sensed.splashed,
                net_force: result.net_force,
                net_force_max: result.net_force_max,
            });
        }

        reports
    }

    /// Runs the force model for one unit, degrading to zero on any fault.
    fn run_force_step(
        &self,
        vessel: &mut Vessel,
        unit_id: UnitId,
        sensed: &sensor::SenseResult,
        report: &mut TickReport,
    ) -> ForceResult {
        let Some(unit) = vessel.unit(unit_id) else {
            return ForceResult::zero();
        };
        let config = unit.config().clone();
        let fill = unit.fill_fraction();
        let part_id = unit.part();
        let Some(part) = vessel.part(part_id) else {
            return ForceResult::zero();
        };
        let position = part.position;

        let density = self.environment.liquid_density(sensed.splashed);
        let result = self
            .environment
            .gravity_at(position)
            .and_then(|gravity| force::compute(&config, fill, sensed.elevation, density, gravity))
            .unwrap_or_else(|fault| {
                report.faults.record(Some(unit_id), TickStep::ForceModel, fault);
                ForceResult::zero()
            });

        if let Some(unit) = vessel.unit_mut(unit_id) {
            unit.state.net_force = result.net_force;
            unit.state.net_force_max = result.net_force_max;
        }
        result
    }

    fn run_coordinator_phase(
        &self,
        vessel: &mut Vessel,
        group: &[UnitId],
        reports: &[UnitReport],
        dt: f32,
        report: &mut TickReport,
    ) {
        let totals = aggregate::aggregate(
            reports,
            vessel.total_mass(),
            self.environment.body.surface_gravity,
            vessel.part_count(),
        );
        vessel.set_totals(totals);
        for &unit_id in group {
            if let Some(unit) = vessel.unit_mut(unit_id) {
                unit.state.totals = totals;
            }
        }

        let splashed = vessel.flags().contains(VesselFlags::SPLASHED);
        let vertical_speed = self.vessel_vertical_speed(vessel);
        allocator::apply_depth_hold(vessel.pilot_mut(), splashed, vertical_speed, dt);

        let target = vessel.pilot().target_fraction;
        allocator::distribute(
            vessel
                .units_sorted_mut()
                .filter(|unit| group.contains(&unit.id())),
            target,
        );

        // Hold position: ask the host to bleed speed off once the vessel
        // is in the water and still moving.
        let pilot = vessel.pilot();
        if pilot.hold_position && splashed {
            let speed = vessel.velocity().length();
            if speed > pilot.stationary_speed_clamp {
                report.events.push(TickEvent::VelocityClamped {
                    target_speed: pilot.stationary_speed_clamp * 0.9,
                });
            }
        }
    }

    /// Vertical speed at the vessel's center of mass, positive up.
    fn vessel_vertical_speed(&self, vessel: &Vessel) -> f32 {
        let up = vessel
            .center_of_mass()
            .and_then(|com| self.environment.gravity_at(com).ok())
            .and_then(glam::Vec3::try_normalize)
            .map_or(glam::Vec3::ZERO, |down| -down);
        vessel.vertical_speed(up)
    }

    fn remove_destroyed(vessel: &mut Vessel) {
        let destroyed: Vec<PartId> = vessel
            .parts_sorted()
            .filter(|part| part.destroyed)
            .map(|part| part.id())
            .collect();
        if destroyed.is_empty() {
            return;
        }
        for part_id in destroyed {
            vessel.remove_part(part_id);
        }
        vessel.recheck_splashed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BodyConfig;
    use crate::part::PartState;
    use crate::unit::UnitConfig;
    use glam::Vec3;

    const RADIUS: f32 = 600_000.0;
    const GRAVITY: f32 = 9.81;

    fn test_sim() -> Simulation {
        Simulation::new(Environment::new(BodyConfig::primary(RADIUS, GRAVITY)))
    }

    /// A position `elevation` above the waterline, on the +Y axis.
    fn at_elevation(elevation: f32) -> Vec3 {
        Vec3::new(0.0, RADIUS + elevation, 0.0)
    }

    fn submerged_tank(vessel: &mut Vessel, fill: f32) -> (crate::part::PartId, UnitId) {
        let part = vessel.spawn_part(PartState::new(at_elevation(-5.0), 2.0));
        let unit = vessel.attach_unit_with_fill(part, UnitConfig::default(), fill);
        (part, unit)
    }

    #[test]
    fn tick_counter_advances() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        sim.step(&mut vessel, 0.02);
        sim.step(&mut vessel, 0.02);
        assert_eq!(sim.tick(), 2);
    }

    #[test]
    fn empty_vessel_ticks_cleanly() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let report = sim.step(&mut vessel, 0.02);
        assert!(report.faults.is_clean());
        assert!(report.forces.is_empty());
    }

    #[test]
    fn high_altitude_skips_the_tick() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        vessel.spawn_part(PartState::new(at_elevation(10_000.0), 2.0));

        let report = sim.step(&mut vessel, 0.02);
        assert!(report.skipped);
        assert_eq!(vessel.unit_count(), 0, "no discovery on a skipped tick");
    }

    #[test]
    fn buoyant_tank_pushes_up_and_reports_state() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let (part, unit) = submerged_tank(&mut vessel, 0.0);

        let report = sim.step(&mut vessel, 0.02);

        let applied = report.force_on(part).expect("force applied every tick");
        assert!(applied.force.y > 0.0, "empty tank must push up");

        let unit = vessel.unit(unit).unwrap();
        assert!(unit.state.splashed);
        assert!(unit.state.depth > 0.0);
        assert!(unit.state.net_force > 0.0);
        assert!(unit.state.net_force <= unit.state.net_force_max + 1e-3);
    }

    #[test]
    fn single_unit_elects_itself() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let (_, unit_id) = submerged_tank(&mut vessel, 0.5);

        let report = sim.step(&mut vessel, 0.02);

        let unit = vessel.unit(unit_id).unwrap();
        assert!(unit.state.is_coordinator);
        assert_eq!(unit.state.coordinator, Some(unit_id));
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::CoordinatorChanged { .. })));
    }

    #[test]
    fn coordinator_writes_totals_onto_every_unit() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let (_, a) = submerged_tank(&mut vessel, 0.5);
        let (_, b) = submerged_tank(&mut vessel, 0.5);

        sim.step(&mut vessel, 0.02);

        let totals_a = vessel.unit(a).unwrap().state.totals;
        let totals_b = vessel.unit(b).unwrap().state.totals;
        assert_eq!(totals_a, totals_b);
        assert!((totals_a.mass - 4.0).abs() < 1e-6);
        assert!(totals_a.coverage.is_complete());
    }

    #[test]
    fn inactive_part_contributes_nothing() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let part = vessel.spawn_part(PartState::new(at_elevation(-5.0), 2.0));
        // An inert unit on an inactive part: not eligible, so discovery
        // leaves the part inactive.
        vessel.attach_unit(part, UnitConfig::inert(2.0));
        vessel.part_mut(part).unwrap().active = false;

        let report = sim.step(&mut vessel, 0.02);
        assert!(report.force_on(part).is_none());
    }

    #[test]
    fn missing_rigid_body_degrades_instead_of_halting() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();

        let mut ghost = PartState::new(at_elevation(-5.0), 1.0);
        ghost.has_rigid_body = false;
        let ghost_id = vessel.spawn_part(ghost);
        vessel.attach_unit(ghost_id, UnitConfig::default());

        let (sound_part, _) = submerged_tank(&mut vessel, 0.0);

        let report = sim.step(&mut vessel, 0.02);

        assert!(!report.faults.is_clean());
        assert!(report.force_on(ghost_id).is_none());
        // The fault stayed contained: the sound unit still got its force.
        assert!(report.force_on(sound_part).is_some());
    }

    #[test]
    fn splash_entry_and_exit_raise_events() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let part = vessel.spawn_part(PartState::new(at_elevation(-2.0), 2.0));
        vessel.attach_unit(part, UnitConfig::default());

        let report = sim.step(&mut vessel, 0.02);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::SplashedDown { .. })));
        assert!(vessel.flags().contains(VesselFlags::SPLASHED));

        vessel.part_mut(part).unwrap().position = at_elevation(5.0);
        let report = sim.step(&mut vessel, 0.02);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::Surfaced { .. })));
        assert!(!vessel.flags().contains(VesselFlags::SPLASHED));
    }

    #[test]
    fn hard_impact_destroys_the_part() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let mut part = PartState::new(at_elevation(-1.0), 2.0);
        part.velocity = Vec3::new(0.0, -500.0, 0.0);
        part.crash_tolerance = 12.0;
        let part_id = vessel.spawn_part(part);
        vessel.attach_unit(part_id, UnitConfig::default());

        let report = sim.step(&mut vessel, 0.02);

        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::PartDestroyed { .. })));
        assert!(vessel.part(part_id).is_none());
        assert_eq!(vessel.unit_count(), 0);
    }

    #[test]
    fn drag_follows_submersion() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let (part, _) = submerged_tank(&mut vessel, 0.5);

        let report = sim.step(&mut vessel, 0.02);
        let drag = report.drag.iter().find(|d| d.part == part).unwrap();
        assert!((drag.drag - 1.0).abs() < 1e-6);

        vessel.part_mut(part).unwrap().position = at_elevation(5.0);
        let report = sim.step(&mut vessel, 0.02);
        let drag = report.drag.iter().find(|d| d.part == part).unwrap();
        assert_eq!(drag.drag, 0.0);
    }

    #[test]
    fn hold_position_asks_for_a_velocity_clamp() {
        let mut sim = test_sim();
        let mut vessel = Vessel::new();
        let (part, _) = submerged_tank(&mut vessel, 0.5);
        vessel.part_mut(part).unwrap().velocity = Vec3::new(0.6, 0.0, 0.0);
        vessel.toggle_depth_hold();
        vessel.toggle_hold_position();

        let report = sim.step(&mut vessel, 0.02);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::VelocityClamped { .. })));
    }
}
