//! Host-side rigid-body parts.
//!
//! A vessel is a composite of parts. The host physics engine owns part
//! motion: position, velocity, and mass are written by the host before each
//! tick and consumed read-only by the core. The core never integrates them;
//! it emits forces for the host to apply instead.
//!
//! The one field the core writes back is [`PartState::water_contact`],
//! maintained by the submersion sensor.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a part within a vessel.
///
/// `PartId` is a newtype wrapper around `u64`. IDs are assigned
/// monotonically by the vessel and ordered by their numeric value, which
/// gives deterministic traversal order during discovery.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId(u64);

impl PartId {
    /// Creates a new `PartId` from a raw `u64` value.
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

impl fmt::Debug for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartId({})", self.0)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PartId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Mirror of one host rigid-body part.
///
/// Everything except `water_contact` and `destroyed` is host-owned input.
/// The capability fields (`has_rigid_body`, `has_wheel_contact`,
/// `crew_capacity`, `person_scale`) drive the discovery pass's auto-attach
/// predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartState {
    id: PartId,
    /// World position of the part's center of mass.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// Part mass in tons.
    pub mass: f32,
    /// Maximum crew the part can hold. Sizes auto-attached units.
    pub crew_capacity: u32,
    /// Whether the host simulates this part as a rigid body. Parts without
    /// one can carry no force and are skipped by auto-attach.
    pub has_rigid_body: bool,
    /// Whether the part touches the ground through a wheel. Wheeled parts
    /// are excluded from auto-attach.
    pub has_wheel_contact: bool,
    /// Person-scale mobile part. Its submersion never forces the whole
    /// vessel into the splashed state.
    pub person_scale: bool,
    /// Impact speed the part survives, before the tolerance factor.
    pub crash_tolerance: f32,
    /// Whether the part is attached to the vessel this tick. Detached
    /// parts are not discovered into the group.
    pub attached: bool,
    /// Whether the part has been activated by the host. Units on inactive
    /// parts do not run and apply no force.
    pub active: bool,
    /// Written by the sensor: the part is touching the liquid.
    pub water_contact: bool,
    /// Marked by the catastrophic-impact check; the part and its unit are
    /// removed at the end of the tick.
    pub destroyed: bool,
}

impl PartState {
    /// Creates a part at a world position with the given mass.
    ///
    /// All capability flags default to a plain structural part: rigid body
    /// present, no wheels, no crew, attached and active.
    #[must_use]
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self {
            id: PartId::new(0),
            position,
            velocity: Vec3::ZERO,
            mass,
            crew_capacity: 0,
            has_rigid_body: true,
            has_wheel_contact: false,
            person_scale: false,
            crash_tolerance: 12.0,
            attached: true,
            active: true,
            water_contact: false,
            destroyed: false,
        }
    }

    /// Creates a crewed part (capacity sizes any auto-attached unit).
    #[must_use]
    pub fn crewed(position: Vec3, mass: f32, crew_capacity: u32) -> Self {
        Self {
            crew_capacity,
            ..Self::new(position, mass)
        }
    }

    /// Creates a person-scale mobile part.
    #[must_use]
    pub fn person(position: Vec3, mass: f32) -> Self {
        Self {
            person_scale: true,
            ..Self::new(position, mass)
        }
    }

    /// Returns the part's identifier.
    #[must_use]
    pub const fn id(&self) -> PartId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: PartId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod part_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_numeric_value() {
            let a = PartId::new(1);
            let b = PartId::new(2);
            assert!(a < b);

            let mut ids = vec![b, a];
            ids.sort();
            assert_eq!(ids, vec![a, b]);
        }

        #[test]
        fn display_and_debug_formats() {
            let id = PartId::new(7);
            assert_eq!(format!("{id}"), "7");
            assert_eq!(format!("{id:?}"), "PartId(7)");
        }

        #[test]
        fn from_u64() {
            let id: PartId = 42u64.into();
            assert_eq!(id.as_u64(), 42);
        }
    }

    mod part_state_tests {
        use super::*;

        #[test]
        fn new_defaults_to_plain_structural_part() {
            let part = PartState::new(Vec3::ZERO, 2.0);
            assert!(part.has_rigid_body);
            assert!(!part.has_wheel_contact);
            assert!(!part.person_scale);
            assert_eq!(part.crew_capacity, 0);
            assert!(part.attached);
            assert!(part.active);
            assert!(!part.water_contact);
        }

        #[test]
        fn crewed_sets_capacity() {
            let part = PartState::crewed(Vec3::ZERO, 4.0, 3);
            assert_eq!(part.crew_capacity, 3);
        }

        #[test]
        fn person_sets_scale_flag() {
            let part = PartState::person(Vec3::ZERO, 0.09);
            assert!(part.person_scale);
        }

        #[test]
        fn serialization_roundtrip() {
            let part = PartState::crewed(Vec3::new(1.0, 2.0, 3.0), 4.0, 2);
            let json = serde_json::to_string(&part).unwrap();
            let back: PartState = serde_json::from_str(&json).unwrap();
            assert_eq!(part, back);
        }
    }
}
