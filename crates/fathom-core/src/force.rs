//! The buoyant force model.
//!
//! Base force is the linear ballast law: the ballast/buoyant split times
//! volume, liquid density, and ambient gravity. A ballast-heavy unit is
//! forced along gravity and sinks; a buoyant-heavy unit is forced against
//! it and rises; the force is exactly zero at a half-and-half split.
//!
//! Near the surface the force fades through two bands of the unit's
//! vertical operating window (elevation `e` above the float line, window
//! `bottom < float < top`):
//!
//! - `float < e < top`: `0.5 * (top + float - e) / (top - float)`,
//!   falling from half strength at the float line to zero at the top edge
//! - `bottom < e < float`: `0.5 * (1 + e / (bottom - float))`,
//!   falling from full strength at the bottom edge to half at the float
//!   line
//!
//! At or below the bottom edge the force is undiminished. The band
//! conditions are strict, so the float line itself evaluates at full
//! strength; the formulas are kept exactly as the model defines them.

use glam::Vec3;

use crate::fault::Fault;
use crate::unit::UnitConfig;

/// Computed force for one unit, one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceResult {
    /// Force vector to apply at the unit's center of mass.
    pub force: Vec3,
    /// Scalar projection of the force onto "up" (positive rises).
    pub net_force: f32,
    /// Theoretical maximum magnitude at this density, independent of the
    /// current fill fraction.
    pub net_force_max: f32,
}

impl ForceResult {
    /// A zero result, the neutral output of a degraded force step.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            force: Vec3::ZERO,
            net_force: 0.0,
            net_force_max: 0.0,
        }
    }
}

/// Submersion falloff scale for an elevation above the float line.
///
/// # Errors
///
/// Returns [`Fault::DegenerateWindow`] when the configured window does not
/// satisfy `bottom < float < top`.
pub fn submersion_scale(elevation: f32, config: &UnitConfig) -> Result<f32, Fault> {
    let top = config.top_bound;
    let bottom = config.bottom_bound;
    let float = config.float_offset;

    if !(bottom < float && float < top) {
        return Err(Fault::DegenerateWindow {
            top,
            bottom,
            float_offset: float,
        });
    }

    if elevation > float && elevation < top {
        Ok(0.5 * (top + float - elevation) / (top - float))
    } else if elevation > bottom && elevation < float {
        Ok(0.5 * (1.0 + elevation / (bottom - float)))
    } else {
        Ok(1.0)
    }
}

/// Computes one unit's buoyant force.
///
/// `density` is the liquid density at the unit (zero when dry), `gravity`
/// the ambient gravity vector at its position.
///
/// # Errors
///
/// Returns [`Fault::DegenerateWindow`] when the unit is in liquid but its
/// operating window cannot be evaluated. The caller degrades to
/// [`ForceResult::zero`].
pub fn compute(
    config: &UnitConfig,
    fill_fraction: f32,
    elevation: f32,
    density: f32,
    gravity: Vec3,
) -> Result<ForceResult, Fault> {
    if density <= 0.0 {
        return Ok(ForceResult::zero());
    }

    let scale = submersion_scale(elevation, config)?;

    let buoyant_fraction = 1.0 - fill_fraction;
    let base = (fill_fraction - buoyant_fraction) * config.volume * density * gravity;
    let force = base * scale;

    let up = gravity.try_normalize().map_or(Vec3::ZERO, |down| -down);

    Ok(ForceResult {
        force,
        net_force: force.dot(up),
        net_force_max: config.volume * density * gravity.length(),
    })
}
