//! Quarterly scheduler: allocates total effort against successive
//! calendar quarters and projects a completion date.
//!
//! ALGORITHM:
//!   1. total sprints = ceil(effort / capacity per sprint)
//!   2. completion    = start + total sprints × sprint length (calendar weeks)
//!   3. walk calendar quarters from the one containing `start`:
//!        sprints in quarter = floor(weeks in quarter / sprint length)
//!        allocate min(remaining effort, sprints × capacity per sprint)
//!      until the quarter starts on/after the completion date AND no effort
//!      is left over. A quarter shorter than one sprint allocates nothing and
//!      the effort rolls forward.
//!
//! The walk is capped at MAX_QUARTERS.

use crate::{
    calendar::{add_weeks, Quarter},
    capacity::{check_sprint_length, CapacitySource},
    error::{PlanError, PlanResult},
    types::{SprintPoints, Weeks, EFFORT_EPSILON, MAX_QUARTERS},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuarterlyBreakdown {
    pub quarter:            String,
    pub start_date:         NaiveDate,
    pub end_date:           NaiveDate,
    pub sprints:            u32,
    pub features_completed: SprintPoints,
    /// Always equal to `features_completed`.
    pub capacity_used:      SprintPoints,
    pub remaining_capacity: SprintPoints,
}

impl QuarterlyBreakdown {
    pub fn quarter_capacity(&self) -> SprintPoints {
        self.capacity_used + self.remaining_capacity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionEstimate {
    pub total_effort:        SprintPoints,
    pub capacity_per_sprint: SprintPoints,
    pub sprint_length_weeks: Weeks,
    pub start_date:          NaiveDate,
    pub total_sprints:       u64,
    pub total_weeks:         Weeks,
    pub completion_date:     NaiveDate,
    pub quarterly_breakdown: Vec<QuarterlyBreakdown>,
}

impl CompletionEstimate {
    /// Effort allocated across all breakdown rows.
    pub fn allocated_effort(&self) -> SprintPoints {
        self.quarterly_breakdown
            .iter()
            .map(|q| q.features_completed)
            .sum()
    }
}

/// Project completion of `total_effort` sprint-points from `start`.
///
/// Fails with `InvalidCapacity` when there is work but the source delivers
/// nothing per sprint; the estimate would otherwise be infinite.
pub fn estimate_completion<C: CapacitySource + ?Sized>(
    total_effort: SprintPoints,
    source: &C,
    start: NaiveDate,
) -> PlanResult<CompletionEstimate> {
    let sprint_length = source.sprint_length_weeks();
    check_sprint_length(sprint_length)?;
    let capacity_per_sprint = source.capacity_per_sprint();
    let total_effort = total_effort.max(0.0);

    if total_effort <= EFFORT_EPSILON {
        return Ok(CompletionEstimate {
            total_effort,
            capacity_per_sprint,
            sprint_length_weeks: sprint_length,
            start_date: start,
            total_sprints: 0,
            total_weeks: 0.0,
            completion_date: start,
            quarterly_breakdown: Vec::new(),
        });
    }

    if !capacity_per_sprint.is_finite() || capacity_per_sprint <= 0.0 {
        log::warn!("estimate rejected: {total_effort:.1} sprint-points against {capacity_per_sprint} capacity");
        return Err(PlanError::InvalidCapacity { capacity_per_sprint });
    }

    let total_sprints = (total_effort / capacity_per_sprint).ceil() as u64;
    let total_weeks = total_sprints as f64 * sprint_length;
    let completion_date = add_weeks(start, total_weeks);

    let quarterly_breakdown = quarterly_breakdown(
        start,
        completion_date,
        total_effort,
        capacity_per_sprint,
        sprint_length,
    )?;

    log::info!(
        "estimate: {total_effort:.1} sprint-points at {capacity_per_sprint:.2}/sprint -> \
         {total_sprints} sprints, done {completion_date} across {} quarters",
        quarterly_breakdown.len()
    );

    Ok(CompletionEstimate {
        total_effort,
        capacity_per_sprint,
        sprint_length_weeks: sprint_length,
        start_date: start,
        total_sprints,
        total_weeks,
        completion_date,
        quarterly_breakdown,
    })
}

fn quarterly_breakdown(
    start: NaiveDate,
    completion_date: NaiveDate,
    total_effort: SprintPoints,
    capacity_per_sprint: SprintPoints,
    sprint_length: Weeks,
) -> PlanResult<Vec<QuarterlyBreakdown>> {
    let mut rows = Vec::new();
    let mut quarter = Quarter::containing(start);
    let mut remaining = total_effort;

    while quarter.start() < completion_date || remaining > EFFORT_EPSILON {
        if rows.len() >= MAX_QUARTERS {
            return Err(PlanError::IterationLimit { limit: MAX_QUARTERS });
        }

        let sprints = (quarter.weeks() / sprint_length).floor().max(0.0);
        let quarter_capacity = sprints * capacity_per_sprint;
        let completed = remaining.min(quarter_capacity);
        remaining -= completed;
        if remaining < EFFORT_EPSILON {
            remaining = 0.0;
        }

        rows.push(QuarterlyBreakdown {
            quarter:            quarter.label(),
            start_date:         quarter.start(),
            end_date:           quarter.end(),
            sprints:            sprints as u32,
            features_completed: completed,
            capacity_used:      completed,
            remaining_capacity: quarter_capacity - completed,
        });

        quarter = quarter.next();
    }

    Ok(rows)
}
