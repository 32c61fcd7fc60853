//! # Fathom Core
//!
//! Buoyancy and depth-control simulation core for composite vessels.
//!
//! A vessel is a set of rigid-body parts owned by a host physics engine.
//! Ballast units attached to those parts cooperate, without any central
//! registry, to keep the vessel at the depth the pilot asked for: every
//! tick the group re-discovers itself, elects a single coordinator,
//! publishes per-unit submersion and force into a shared snapshot, and the
//! coordinator redistributes the pilot's target across the group under
//! physical rate limits.
//!
//! ## Tick phases
//!
//! See [`simulation::Simulation::step`] for the four-phase execution loop:
//! DISCOVER, LOCAL, COORDINATOR, APPLY.
//!
//! ## Usage
//!
//! ```rust
//! use fathom_core::environment::{BodyConfig, Environment};
//! use fathom_core::part::PartState;
//! use fathom_core::simulation::Simulation;
//! use fathom_core::unit::UnitConfig;
//! use fathom_core::vessel::Vessel;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(Environment::new(BodyConfig::primary(600_000.0, 9.81)));
//!
//! let mut vessel = Vessel::new();
//! let hull = vessel.spawn_part(PartState::new(Vec3::new(0.0, 599_995.0, 0.0), 2.0));
//! vessel.attach_unit(hull, UnitConfig::default());
//! vessel.set_target_fraction(0.5);
//!
//! let report = sim.step(&mut vessel, 0.02);
//! assert!(report.force_on(hull).is_some());
//! ```
//!
//! The core is headless and single-threaded: it never integrates part
//! motion itself, it only emits forces, drag, and events through the
//! [`output::TickReport`] for the host to apply.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod allocator;
pub mod discovery;
pub mod election;
pub mod environment;
pub mod fault;
pub mod force;
pub mod output;
pub mod part;
pub mod sensor;
pub mod simulation;
pub mod unit;
pub mod vessel;

// Re-exports for convenience
pub use environment::{BodyConfig, BodyKind, Environment};
pub use fault::{Fault, FaultLog, TickStep};
pub use output::{AppliedForce, DragUpdate, TickEvent, TickReport};
pub use part::{PartId, PartState};
pub use simulation::Simulation;
pub use unit::{BallastUnit, UnitConfig, UnitId, UnitState};
pub use vessel::{PilotIntent, Vessel, VesselFlags, VesselTotals};

#[cfg(test)]
mod tests;
