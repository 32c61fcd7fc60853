//! Submersion sensing.
//!
//! Depth is measured against the float line: the sphere sitting
//! `float_offset` below the body's waterline radius. Elevation is positive
//! above that line; the published depth is its negation, so positive depth
//! means submerged.
//!
//! A unit is splashed once its elevation falls strictly below the negated
//! bottom bound of its operating window. There is no hysteresis band: the
//! single threshold decides, and at exactly the boundary value the unit is
//! dry. The transition also drives catastrophic-impact detection: hitting
//! the liquid faster than the part tolerates breaks the part up, which is
//! domain behavior rather than an error.

use glam::Vec3;

use crate::environment::BodyConfig;
use crate::unit::UnitConfig;

/// Direction of a splash-state change this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashTransition {
    /// The unit crossed below the threshold.
    Entered,
    /// The unit crossed back above the threshold.
    Left,
}

/// One unit's sensed submersion for a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseResult {
    /// Elevation above the float line (positive above).
    pub elevation: f32,
    /// Published depth (positive submerged).
    pub depth: f32,
    /// Splashed state after this reading.
    pub splashed: bool,
    /// State change relative to the previous tick, if any.
    pub transition: Option<SplashTransition>,
}

/// Elevation of a position above the unit's float line.
#[must_use]
pub fn elevation(position: Vec3, body: &BodyConfig, float_offset: f32) -> f32 {
    position.distance(body.center) - (body.radius - float_offset)
}

/// The splash rule: strictly below the negated bottom bound.
#[must_use]
pub fn is_splashed(elevation: f32, bottom_bound: f32) -> bool {
    elevation < -bottom_bound
}

/// Senses one unit's submersion and splash transition.
#[must_use]
pub fn sense(
    position: Vec3,
    was_splashed: bool,
    body: &BodyConfig,
    config: &UnitConfig,
) -> SenseResult {
    let elevation = elevation(position, body, config.float_offset);
    let splashed = body.has_ocean && is_splashed(elevation, config.bottom_bound);

    let transition = match (was_splashed, splashed) {
        (false, true) => Some(SplashTransition::Entered),
        (true, false) => Some(SplashTransition::Left),
        _ => None,
    };

    SenseResult {
        elevation,
        depth: -elevation,
        splashed,
        transition,
    }
}

/// Whether an entry impact exceeds the part's structural tolerance.
#[must_use]
pub fn impact_exceeds_tolerance(speed: f32, crash_tolerance: f32, factor: f32) -> bool {
    speed > crash_tolerance * factor
}
