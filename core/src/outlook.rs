//! Single-quarter planning view.
//!
//! A read-only projection of the same totals the scheduler uses: how much of
//! the backlog fits in the current quarter, what overflows, and a coarse
//! quarter-granularity burn-down at a flat quarterly capacity. It does not
//! reconcile with the calendar-exact breakdown in `scheduler`.

use crate::{
    calendar::Quarter,
    capacity::CapacitySource,
    error::{PlanError, PlanResult},
    types::{SprintPoints, EFFORT_EPSILON, MAX_QUARTERS},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MIN_BURNDOWN_QUARTERS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuarterBurndown {
    pub quarter:              String,
    pub capacity:             SprintPoints,
    pub planned_work:         SprintPoints,
    pub remaining_work:       SprintPoints,
    /// Completed by the end of this quarter.
    pub cumulative_completed: SprintPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuarterOutlook {
    pub quarter:                    String,
    pub total_effort:               SprintPoints,
    pub quarter_capacity:           SprintPoints,
    pub planned_work:               SprintPoints,
    pub overflow:                   SprintPoints,
    /// effort / capacity × 100; 0 when there is no capacity.
    pub utilization_pct:            f64,
    pub can_complete_in_quarter:    bool,
    pub additional_quarters_needed: u32,
    pub completion_quarter:         String,
    /// Unused quarter capacity when the work fits; 0 otherwise.
    pub spare_capacity:             SprintPoints,
    /// Extra person-weeks that would absorb the overflow at the current
    /// effectiveness: ceil(overflow / quarter capacity × man-weeks).
    pub additional_man_weeks:       u32,
    pub burndown:                   Vec<QuarterBurndown>,
}

pub fn quarter_outlook<C: CapacitySource + ?Sized>(
    total_effort: SprintPoints,
    source: &C,
    start: NaiveDate,
) -> PlanResult<QuarterOutlook> {
    let total_effort = total_effort.max(0.0);
    let quarter_capacity = source.capacity_per_quarter();
    let has_work = total_effort > EFFORT_EPSILON;

    if has_work && (!quarter_capacity.is_finite() || quarter_capacity <= 0.0) {
        return Err(PlanError::InvalidCapacity {
            capacity_per_sprint: source.capacity_per_sprint(),
        });
    }
    let quarter_capacity = quarter_capacity.max(0.0);

    let current = Quarter::containing(start);
    let overflow = (total_effort - quarter_capacity).max(0.0);
    let can_complete_in_quarter = total_effort <= quarter_capacity;
    let utilization_pct = if quarter_capacity > 0.0 {
        total_effort / quarter_capacity * 100.0
    } else {
        0.0
    };

    let additional_quarters_needed = if can_complete_in_quarter {
        0
    } else {
        let needed = (overflow / quarter_capacity).ceil() as usize;
        if needed >= MAX_QUARTERS {
            return Err(PlanError::IterationLimit { limit: MAX_QUARTERS });
        }
        needed as u32
    };

    let additional_man_weeks = if overflow > EFFORT_EPSILON {
        (overflow * source.man_weeks_per_quarter().max(0.0) / quarter_capacity).ceil() as u32
    } else {
        0
    };

    let burndown = burndown(current, total_effort, quarter_capacity);

    Ok(QuarterOutlook {
        quarter: current.label(),
        total_effort,
        quarter_capacity,
        planned_work: total_effort.min(quarter_capacity),
        overflow,
        utilization_pct,
        can_complete_in_quarter,
        additional_quarters_needed,
        completion_quarter: current.offset(additional_quarters_needed).label(),
        spare_capacity: (quarter_capacity - total_effort).max(0.0),
        additional_man_weeks,
        burndown,
    })
}

fn burndown(first: Quarter, total_effort: SprintPoints, quarter_capacity: SprintPoints) -> Vec<QuarterBurndown> {
    let quarters_needed = if quarter_capacity > 0.0 {
        (total_effort / quarter_capacity).ceil() as usize + 1
    } else {
        0
    };
    let rows = quarters_needed.clamp(MIN_BURNDOWN_QUARTERS, MAX_QUARTERS);

    let mut remaining = total_effort;
    (0..rows)
        .map(|i| {
            let planned = remaining.min(quarter_capacity);
            remaining = (remaining - quarter_capacity).max(0.0);
            QuarterBurndown {
                quarter:              first.offset(i as u32).label(),
                capacity:             quarter_capacity,
                planned_work:         planned,
                remaining_work:       remaining,
                cumulative_completed: total_effort - remaining,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityProfile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reference_backlog_overflows_the_quarter() {
        let profile = CapacityProfile::new(40.0, 2.0).unwrap();
        let outlook = quarter_outlook(97.0, &profile, date(2024, 7, 1)).unwrap();

        assert_eq!(outlook.quarter, "2024 Q3");
        assert_eq!(outlook.quarter_capacity, 20.0);
        assert_eq!(outlook.planned_work, 20.0);
        assert_eq!(outlook.overflow, 77.0);
        assert!((outlook.utilization_pct - 485.0).abs() < 1e-9);
        assert!(!outlook.can_complete_in_quarter);
        assert_eq!(outlook.additional_quarters_needed, 4);
        assert_eq!(outlook.completion_quarter, "2025 Q3");
        assert_eq!(outlook.spare_capacity, 0.0);
    }

    #[test]
    fn overflow_recommendations() {
        let profile = CapacityProfile::new(40.0, 2.0).unwrap();
        let over = quarter_outlook(97.0, &profile, date(2024, 7, 1)).unwrap();
        // 77 / 20 × 40
        assert_eq!(over.additional_man_weeks, 154);

        let under = quarter_outlook(12.5, &profile, date(2024, 7, 1)).unwrap();
        assert_eq!(under.additional_man_weeks, 0);
        assert_eq!(under.spare_capacity, 7.5);
    }

    #[test]
    fn burndown_drains_to_zero_and_shows_at_least_four_quarters() {
        let profile = CapacityProfile::new(40.0, 2.0).unwrap();
        let outlook = quarter_outlook(97.0, &profile, date(2024, 7, 1)).unwrap();

        // ceil(97 / 20) + 1
        assert_eq!(outlook.burndown.len(), 6);
        assert_eq!(outlook.burndown[0].planned_work, 20.0);
        assert_eq!(outlook.burndown[0].remaining_work, 77.0);
        assert_eq!(outlook.burndown[4].planned_work, 17.0);
        assert_eq!(outlook.burndown[4].remaining_work, 0.0);
        assert_eq!(outlook.burndown[5].planned_work, 0.0);
        assert_eq!(outlook.burndown[5].cumulative_completed, 97.0);

        let small = quarter_outlook(5.0, &profile, date(2024, 7, 1)).unwrap();
        assert_eq!(small.burndown.len(), 4);
        assert!(small.can_complete_in_quarter);
        assert_eq!(small.additional_quarters_needed, 0);
        assert_eq!(small.completion_quarter, "2024 Q3");
    }

    #[test]
    fn overflow_matches_effort_minus_quarter_capacity() {
        let profile = CapacityProfile::new(26.0, 2.0).unwrap();
        let outlook = quarter_outlook(10.0, &profile, date(2024, 1, 15)).unwrap();
        assert_eq!(outlook.overflow, 0.0);
        assert!((outlook.utilization_pct - 10.0 / 13.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_capacity_with_work_is_rejected() {
        let profile = CapacityProfile::new(0.0, 2.0).unwrap();
        assert!(matches!(
            quarter_outlook(3.0, &profile, date(2024, 1, 1)),
            Err(PlanError::InvalidCapacity { .. })
        ));
        let idle = quarter_outlook(0.0, &profile, date(2024, 1, 1)).unwrap();
        assert_eq!(idle.utilization_pct, 0.0);
        assert!(idle.can_complete_in_quarter);
    }
}
