//! Control allocation: depth-hold feedback, target redistribution, and
//! rate-limited fill convergence.
//!
//! The first two steps run only on the coordinator, strictly from the
//! completed tick snapshot. Convergence is unit-local: every unit nudges
//! its own fill fraction toward its received target, every tick, under its
//! configured rates.

use crate::unit::BallastUnit;
use crate::vessel::PilotIntent;

/// Divisor applied to the depth-hold proportional correction.
///
/// The controller is proportional-only: each tick folds a fraction of the
/// vertical-speed error into the pilot target.
pub const DEPTH_HOLD_GAIN_DIVISOR: f32 = 100.0;

/// Runs the depth-hold feedback step on the pilot intent.
///
/// Only acts when depth hold is engaged and the vessel is actually in
/// contact with the surface; holding a depth in air is meaningless. While
/// depth hold is disengaged, hold-position is forced off as well, since
/// the stationary feature is only reachable through the depth-control
/// surface.
pub fn apply_depth_hold(
    pilot: &mut PilotIntent,
    vessel_splashed: bool,
    vertical_speed: f32,
    dt: f32,
) {
    if !pilot.depth_hold {
        pilot.hold_position = false;
        return;
    }
    if !vessel_splashed {
        return;
    }

    let error = vertical_speed - pilot.target_vertical_speed;
    pilot.target_fraction =
        (pilot.target_fraction + error * dt / DEPTH_HOLD_GAIN_DIVISOR).clamp(0.0, 1.0);
}

/// Redistributes the vessel-wide pilot target across the group.
///
/// Each unit receives `clamp01(own trim + vessel target)`. The sum of all
/// trims is deliberately not part of the formula; it is emitted as a trace
/// diagnostic only.
pub fn distribute<'a, I>(units: I, vessel_target: f32)
where
    I: IntoIterator<Item = &'a mut BallastUnit>,
{
    let mut trim_sum = 0.0;
    for unit in units {
        trim_sum += unit.state.trim;
        unit.state.target_fraction = (unit.state.trim + vessel_target).clamp(0.0, 1.0);
    }
    tracing::trace!(trim_sum, vessel_target, "ballast targets distributed");
}

/// Converges one unit's fill fraction toward its received target.
///
/// The step is clamped to the configured drain rate downward and fill rate
/// upward, and filling is only permitted while the unit is splashed: a unit
/// out of the liquid can vent ballast but has nothing to pump in.
pub fn converge_fill(unit: &mut BallastUnit, dt: f32) {
    let config = unit.config();
    let max_drain = config.drain_rate * dt;
    let max_fill = if unit.state.splashed {
        config.fill_rate * dt
    } else {
        0.0
    };

    let delta = (unit.state.target_fraction - unit.state.fill_fraction).clamp(-max_drain, max_fill);
    unit.state.fill_fraction = (unit.state.fill_fraction + delta).clamp(0.0, 1.0);
}
