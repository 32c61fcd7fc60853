//! Unit discovery: rebuilding the cooperating group every tick.
//!
//! Group membership is never persisted. Each tick the vessel's parts are
//! traversed in id order and the set of units on attached parts becomes
//! the group for this tick; units whose parts detached or died simply stop
//! appearing.
//!
//! Discovery also owns the auto-attach factory. When the environment has a
//! liquid surface, any part that could end up in it without a unit (a
//! rigid body, no wheel contact) gets an inert float constructed
//! synchronously, before the rest of the tick runs: person-scale parts get
//! a near-neutral 0.09 m3 float, crewed parts one cubic meter per crew
//! seat, anything else zero volume. Auto-attached units cannot change
//! their ballast and are never coordinator-eligible.
//!
//! Finally, coordinator-eligible units on parts the host has not yet
//! activated are activated here, so a late-activating dedicated tank joins
//! the group the tick it is needed.

use crate::part::PartId;
use crate::unit::{UnitConfig, UnitId};
use crate::vessel::Vessel;

/// Internal air volume granted to a person-scale float. Close to neutral
/// buoyancy for a body in water.
pub const PERSON_FLOAT_VOLUME: f32 = 0.09;

/// Rebuilds the group for this tick and returns it in unit-id order.
///
/// `liquid_present` gates the auto-attach factory; on a dry body no new
/// units are fabricated.
pub fn discover(vessel: &mut Vessel, liquid_present: bool) -> Vec<UnitId> {
    if liquid_present {
        auto_attach(vessel);
    }

    // Late activation: a dedicated tank must run even if the host has not
    // activated its part yet.
    let to_activate: Vec<PartId> = vessel
        .units_sorted()
        .filter(|unit| unit.coordinator_eligible())
        .map(|unit| unit.part())
        .collect();
    for part_id in to_activate {
        if let Some(part) = vessel.part_mut(part_id) {
            part.active = true;
        }
    }

    vessel
        .units_sorted()
        .filter(|unit| {
            vessel
                .part(unit.part())
                .is_some_and(|part| part.attached && !part.destroyed)
        })
        .map(|unit| unit.id())
        .collect()
}

/// Constructs inert units for bare parts that satisfy the capability
/// predicate: rigid body present, no wheel contact, no unit yet.
fn auto_attach(vessel: &mut Vessel) {
    let bare: Vec<PartId> = vessel
        .parts_sorted()
        .filter(|part| {
            part.has_rigid_body && !part.has_wheel_contact && !part.destroyed
        })
        .map(|part| part.id())
        .filter(|&id| vessel.unit_for_part(id).is_none())
        .collect();

    for part_id in bare {
        let Some(part) = vessel.part(part_id) else {
            continue;
        };
        let volume = if part.person_scale {
            PERSON_FLOAT_VOLUME
        } else {
            part.crew_capacity as f32
        };

        let unit = vessel.attach_unit(part_id, UnitConfig::inert(volume));
        tracing::debug!(%unit, part = %part_id, volume, "auto-attached inert float");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PartState;
    use glam::Vec3;

    fn bare_vessel() -> Vessel {
        Vessel::new()
    }

    #[test]
    fn crewed_part_gets_a_crew_sized_inert_float() {
        let mut vessel = bare_vessel();
        let cabin = vessel.spawn_part(PartState::crewed(Vec3::ZERO, 4.0, 3));

        let group = discover(&mut vessel, true);
        assert_eq!(group.len(), 1);

        let unit = vessel.unit(group[0]).unwrap();
        assert_eq!(unit.part(), cabin);
        assert!((unit.config().volume - 3.0).abs() < f32::EPSILON);
        assert_eq!(unit.config().fill_rate, 0.0);
        assert_eq!(unit.config().drain_rate, 0.0);
        assert!(!unit.coordinator_eligible());
    }

    #[test]
    fn person_scale_part_gets_the_neutral_float() {
        let mut vessel = bare_vessel();
        vessel.spawn_part(PartState::person(Vec3::ZERO, 0.09));

        let group = discover(&mut vessel, true);
        let unit = vessel.unit(group[0]).unwrap();
        assert!((unit.config().volume - PERSON_FLOAT_VOLUME).abs() < f32::EPSILON);
    }

    #[test]
    fn wheeled_and_bodyless_parts_are_skipped() {
        let mut vessel = bare_vessel();
        let mut rover = PartState::new(Vec3::ZERO, 1.0);
        rover.has_wheel_contact = true;
        vessel.spawn_part(rover);

        let mut ghost = PartState::new(Vec3::ZERO, 0.5);
        ghost.has_rigid_body = false;
        vessel.spawn_part(ghost);

        let group = discover(&mut vessel, true);
        assert!(group.is_empty());
        assert_eq!(vessel.unit_count(), 0);
    }

    #[test]
    fn no_fabrication_on_a_dry_body() {
        let mut vessel = bare_vessel();
        vessel.spawn_part(PartState::crewed(Vec3::ZERO, 4.0, 2));

        let group = discover(&mut vessel, false);
        assert!(group.is_empty());
    }

    #[test]
    fn existing_units_are_not_duplicated() {
        let mut vessel = bare_vessel();
        let hull = vessel.spawn_part(PartState::new(Vec3::ZERO, 2.0));
        vessel.attach_unit(hull, UnitConfig::default());

        discover(&mut vessel, true);
        discover(&mut vessel, true);
        assert_eq!(vessel.unit_count(), 1);
    }

    #[test]
    fn detached_parts_leave_the_group() {
        let mut vessel = bare_vessel();
        let hull = vessel.spawn_part(PartState::new(Vec3::ZERO, 2.0));
        vessel.attach_unit(hull, UnitConfig::default());
        vessel.part_mut(hull).unwrap().attached = false;

        let group = discover(&mut vessel, true);
        assert!(group.is_empty());
    }

    #[test]
    fn eligible_units_activate_their_parts() {
        let mut vessel = bare_vessel();
        let tank = vessel.spawn_part(PartState::new(Vec3::ZERO, 2.0));
        vessel.part_mut(tank).unwrap().active = false;
        vessel.attach_unit(tank, UnitConfig::default());

        discover(&mut vessel, true);
        assert!(vessel.part(tank).unwrap().active);
    }
}
