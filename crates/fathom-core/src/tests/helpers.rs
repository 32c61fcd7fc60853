//! Test helper functions for setting up vessels and stepping them.

use glam::Vec3;

use crate::environment::{BodyConfig, Environment};
use crate::output::TickReport;
use crate::part::{PartId, PartState};
use crate::simulation::Simulation;
use crate::unit::{UnitConfig, UnitId};
use crate::vessel::Vessel;

/// Waterline radius of the test body.
pub const TEST_RADIUS: f32 = 600_000.0;

/// Surface gravity of the test body.
pub const TEST_GRAVITY: f32 = 9.81;

/// A simulation around the standard test body (primary, with ocean).
pub fn test_simulation() -> Simulation {
    Simulation::new(Environment::new(BodyConfig::primary(
        TEST_RADIUS,
        TEST_GRAVITY,
    )))
}

/// A world position `elevation` above the waterline, on the +Y axis.
pub fn at_elevation(elevation: f32) -> Vec3 {
    Vec3::new(0.0, TEST_RADIUS + elevation, 0.0)
}

/// Spawns a standard ballast tank at the given elevation.
pub fn spawn_tank(vessel: &mut Vessel, elevation: f32, fill: f32) -> (PartId, UnitId) {
    let part = vessel.spawn_part(PartState::new(at_elevation(elevation), 2.0));
    let unit = vessel.attach_unit_with_fill(part, UnitConfig::default(), fill);
    (part, unit)
}

/// Spawns `n` standard tanks, all submerged well below the falloff window.
pub fn spawn_tanks(vessel: &mut Vessel, n: usize, fill: f32) -> Vec<(PartId, UnitId)> {
    (0..n)
        .map(|_| spawn_tank(vessel, -10.0, fill))
        .collect()
}

/// Minimal host-side integrator: applies the reported forces to part
/// velocities and integrates positions, the way the owning physics engine
/// would.
pub fn integrate(vessel: &mut Vessel, report: &TickReport, dt: f32) {
    for applied in &report.forces {
        if let Some(part) = vessel.part_mut(applied.part) {
            if part.mass > 0.0 {
                part.velocity += applied.force / part.mass * dt;
            }
        }
    }
    let moved: Vec<PartId> = vessel.parts_sorted().map(PartState::id).collect();
    for id in moved {
        if let Some(part) = vessel.part_mut(id) {
            let velocity = part.velocity;
            part.position += velocity * dt;
        }
    }
}

/// The single coordinator of a group, asserting there is exactly one.
pub fn sole_coordinator(vessel: &Vessel) -> UnitId {
    let coordinators: Vec<UnitId> = vessel
        .units_sorted()
        .filter(|unit| unit.state.is_coordinator)
        .map(|unit| unit.id())
        .collect();
    assert_eq!(
        coordinators.len(),
        1,
        "expected exactly one coordinator, found {coordinators:?}"
    );
    coordinators[0]
}
