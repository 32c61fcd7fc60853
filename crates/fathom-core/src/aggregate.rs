//! Vessel-wide aggregation, run only by the coordinator.
//!
//! The coordinator never reads live unit state. It consumes the completed
//! snapshot of [`UnitReport`]s the local phase published, so the totals are
//! independent of traversal order within the tick.
//!
//! Parts without units still weigh the vessel down: total mass and gravity
//! force cover every part, while the force sums cover the units that
//! actually reported. The [`AggregationCoverage`] in the result makes a
//! partial view explicit instead of silently truncating the sums.
//!
//! [`AggregationCoverage`]: crate::vessel::AggregationCoverage

use crate::part::PartId;
use crate::unit::UnitId;
use crate::vessel::{AggregationCoverage, VesselTotals};

/// One unit's published outputs for the tick, as aggregation inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitReport {
    /// The reporting unit.
    pub unit: UnitId,
    /// The part it is attached to.
    pub part: PartId,
    /// Whether the unit can change its ballast (inert floats cannot).
    pub controllable: bool,
    /// Splashed state this tick.
    pub splashed: bool,
    /// Net force the unit applied, projected on "up".
    pub net_force: f32,
    /// The unit's theoretical maximum force.
    pub net_force_max: f32,
}

/// Sums the snapshot into fresh vessel totals.
///
/// `total_mass` and `gravity_magnitude` come from the whole part list;
/// `parts_total` sizes the coverage record.
#[must_use]
pub fn aggregate(
    reports: &[UnitReport],
    total_mass: f32,
    gravity_magnitude: f32,
    parts_total: usize,
) -> VesselTotals {
    let mut totals = VesselTotals {
        mass: total_mass,
        gravity_force: total_mass * gravity_magnitude,
        ..VesselTotals::default()
    };

    for report in reports {
        totals.net_force += report.net_force;
        totals.net_force_max += report.net_force_max;
        if !report.controllable {
            totals.net_force_unchanging += report.net_force;
        }
    }

    totals.coverage = AggregationCoverage {
        units_counted: reports.len(),
        parts_total,
    };
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(unit: u64, controllable: bool, net: f32, max: f32) -> UnitReport {
        UnitReport {
            unit: UnitId::new(unit),
            part: PartId::new(unit),
            controllable,
            splashed: true,
            net_force: net,
            net_force_max: max,
        }
    }

    #[test]
    fn totals_sum_over_all_reports() {
        let reports = [
            report(1, true, 10.0, 30.0),
            report(2, true, -5.0, 30.0),
            report(3, false, 2.0, 2.0),
        ];
        let totals = aggregate(&reports, 12.0, 9.81, 3);

        assert!((totals.mass - 12.0).abs() < 1e-6);
        assert!((totals.gravity_force - 12.0 * 9.81).abs() < 1e-3);
        assert!((totals.net_force - 7.0).abs() < 1e-6);
        assert!((totals.net_force_max - 62.0).abs() < 1e-6);
    }

    #[test]
    fn only_inert_units_feed_the_unchanging_total() {
        let reports = [report(1, true, 10.0, 30.0), report(2, false, 2.0, 2.0)];
        let totals = aggregate(&reports, 5.0, 9.81, 2);
        assert!((totals.net_force_unchanging - 2.0).abs() < 1e-6);
    }

    #[test]
    fn partial_coverage_is_reported_not_truncated() {
        // Two units on a five-part vessel: the sums still cover both.
        let reports = [report(1, true, 4.0, 8.0), report(2, true, 4.0, 8.0)];
        let totals = aggregate(&reports, 20.0, 9.81, 5);

        assert!((totals.net_force - 8.0).abs() < 1e-6);
        assert!(!totals.coverage.is_complete());
        assert_eq!(totals.coverage.units_counted, 2);
        assert_eq!(totals.coverage.parts_total, 5);
    }

    #[test]
    fn empty_snapshot_still_weighs_the_vessel() {
        let totals = aggregate(&[], 7.0, 9.81, 2);
        assert!((totals.gravity_force - 7.0 * 9.81).abs() < 1e-3);
        assert_eq!(totals.net_force, 0.0);
        assert_eq!(totals.net_force_max, 0.0);
    }
}
