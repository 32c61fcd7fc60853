//! Coordinator election.
//!
//! Exactly one unit per group runs the vessel-wide aggregation and control
//! allocation. There is no central registry: every tick, discovery hands
//! this module a snapshot of the group (id, eligibility, and each member's
//! previously recognized coordinator) and [`resolve`] returns the one
//! coordinator the whole group converges on.
//!
//! Resolution is a pure function over that snapshot. Units hold their
//! belief as plain data, never as live references into each other.
//!
//! # Rules
//!
//! 1. A surviving belief wins: scanning members in ascending id order, the
//!    first recognized coordinator that is still a group member is adopted
//!    group-wide. An established coordinator is therefore stable across
//!    membership growth.
//! 2. With no surviving belief, the lowest-id eligible member promotes
//!    itself. The id order makes the tie-break deterministic regardless of
//!    how discovery happened to traverse the vessel.
//! 3. A group with neither is simply coordinatorless this tick. That is a
//!    normal state (for example, a vessel of only inert auto-attached
//!    floats), not an error.
//!
//! After a membership change the group re-resolves on the same tick, so
//! the result is eventually consistent with at most one tick of lag behind
//! the change itself.

use crate::unit::{BallastUnit, UnitId};

/// One group member as seen by the election pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The member's id.
    pub id: UnitId,
    /// Whether the member may itself act as coordinator.
    pub eligible: bool,
    /// The coordinator this member recognized last tick, if any.
    pub belief: Option<UnitId>,
}

impl Candidate {
    /// Builds a candidate from a unit's current state.
    #[must_use]
    pub fn of(unit: &BallastUnit) -> Self {
        Self {
            id: unit.id(),
            eligible: unit.coordinator_eligible(),
            belief: unit.state.coordinator,
        }
    }
}

/// Resolves the group's coordinator from a membership snapshot.
///
/// The input order does not matter; members are considered in ascending id
/// order internally.
#[must_use]
pub fn resolve(members: &[Candidate]) -> Option<UnitId> {
    let mut sorted: Vec<&Candidate> = members.iter().collect();
    sorted.sort_by_key(|candidate| candidate.id);

    let is_member = |id: UnitId| sorted.iter().any(|candidate| candidate.id == id);

    // A recognized coordinator that is still in the group survives.
    for candidate in &sorted {
        if let Some(belief) = candidate.belief {
            if is_member(belief) {
                return Some(belief);
            }
        }
    }

    // Otherwise the lowest-id eligible member promotes itself.
    sorted
        .iter()
        .find(|candidate| candidate.eligible)
        .map(|candidate| candidate.id)
}

/// Writes a resolution onto every group member: the recognized coordinator
/// reference and the `is_coordinator` flag.
pub fn write_back<'a, I>(members: I, resolved: Option<UnitId>)
where
    I: IntoIterator<Item = &'a mut BallastUnit>,
{
    for unit in members {
        unit.state.coordinator = resolved;
        unit.state.is_coordinator = resolved == Some(unit.id());
    }
}
