//! Capacity sources: the seam between the two planning modes and the
//! scheduler.
//!
//! Simple mode: a flat man-weeks budget (`CapacityProfile`).
//! Team mode:   the aggregated roster (`TeamCapacity`).
//! Both produce the same per-sprint / per-quarter figures, so the scheduler
//! has exactly one code path.

use crate::{
    error::{PlanError, PlanResult},
    member_capacity::EffectiveCapacity,
    types::{SprintPoints, Weeks},
};
use serde::{Deserialize, Serialize};

pub trait CapacitySource {
    fn sprint_length_weeks(&self) -> Weeks;

    /// Sprint-points delivered per sprint.
    fn capacity_per_sprint(&self) -> SprintPoints;

    /// Sprint-points available in one planning quarter.
    fn capacity_per_quarter(&self) -> SprintPoints;

    /// Nominal person-weeks behind `capacity_per_quarter`, before any
    /// effectiveness discount.
    fn man_weeks_per_quarter(&self) -> Weeks;
}

pub(crate) fn check_sprint_length(weeks: Weeks) -> PlanResult<()> {
    if !weeks.is_finite() || weeks <= 0.0 {
        return Err(PlanError::InvalidSprintLength { weeks });
    }
    Ok(())
}

// ── Simple mode ────────────────────────────────────────────────────

/// A flat man-weeks budget for the planning quarter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CapacityProfile {
    pub total_man_weeks:     Weeks,
    pub sprint_length_weeks: Weeks,
}

impl CapacityProfile {
    pub fn new(total_man_weeks: Weeks, sprint_length_weeks: Weeks) -> PlanResult<Self> {
        check_sprint_length(sprint_length_weeks)?;
        if !total_man_weeks.is_finite() || total_man_weeks < 0.0 {
            return Err(PlanError::InvalidCapacity {
                capacity_per_sprint: total_man_weeks,
            });
        }
        Ok(Self {
            total_man_weeks,
            sprint_length_weeks,
        })
    }
}

impl CapacitySource for CapacityProfile {
    fn sprint_length_weeks(&self) -> Weeks {
        self.sprint_length_weeks
    }

    fn capacity_per_sprint(&self) -> SprintPoints {
        self.total_man_weeks / self.sprint_length_weeks
    }

    /// The man-weeks figure is the quarter's budget, expressed in sprints.
    /// This is the same number as `capacity_per_sprint`.
    fn capacity_per_quarter(&self) -> SprintPoints {
        self.total_man_weeks / self.sprint_length_weeks
    }

    fn man_weeks_per_quarter(&self) -> Weeks {
        self.total_man_weeks
    }
}

// ── Team mode ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamCapacity {
    pub members:               Vec<EffectiveCapacity>,
    pub sprint_length_weeks:   Weeks,
    pub capacity_per_sprint:   SprintPoints,
    pub capacity_per_quarter:  SprintPoints,
    /// Σ base capacity over the sprints of one quarter.
    pub man_weeks_per_quarter: Weeks,
}

impl TeamCapacity {
    /// Sum member capacities. An empty roster yields zero capacity, which
    /// the scheduler rejects as `InvalidCapacity` once there is work to do.
    pub fn aggregate(
        members: Vec<EffectiveCapacity>,
        sprint_length_weeks: Weeks,
        weeks_per_quarter: Weeks,
    ) -> PlanResult<Self> {
        check_sprint_length(sprint_length_weeks)?;
        let capacity_per_sprint: SprintPoints = members
            .iter()
            .map(|m| m.effective_capacity_per_sprint.max(0.0))
            .sum();
        let sprints_per_quarter = weeks_per_quarter / sprint_length_weeks;
        let capacity_per_quarter = capacity_per_sprint * sprints_per_quarter;
        let man_weeks_per_quarter = members
            .iter()
            .map(|m| m.base_capacity_per_sprint.max(0.0))
            .sum::<Weeks>()
            * sprints_per_quarter;

        log::debug!(
            "team capacity: {} members, {capacity_per_sprint:.2}/sprint, {capacity_per_quarter:.2}/quarter",
            members.len()
        );

        Ok(Self {
            members,
            sprint_length_weeks,
            capacity_per_sprint,
            capacity_per_quarter,
            man_weeks_per_quarter,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl CapacitySource for TeamCapacity {
    fn sprint_length_weeks(&self) -> Weeks {
        self.sprint_length_weeks
    }

    fn capacity_per_sprint(&self) -> SprintPoints {
        self.capacity_per_sprint
    }

    fn capacity_per_quarter(&self) -> SprintPoints {
        self.capacity_per_quarter
    }

    fn man_weeks_per_quarter(&self) -> Weeks {
        self.man_weeks_per_quarter
    }
}
