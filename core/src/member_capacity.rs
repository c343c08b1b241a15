//! Member capacity calculator.
//!
//! effective = base × role effectiveness × tenure modifier × (1 − holiday reduction)
//!
//! Every factor is in [0, 1], so effective capacity never exceeds base.
//! Results are recomputed on every call and must not be cached across a
//! change to the member, the window, or the config tables.

use crate::{
    calendar::weeks_between,
    config::{RoleEffectiveness, TenureModifiers},
    error::{PlanError, PlanResult},
    member::{HolidayPeriod, Role, TeamMember},
    types::{EntityId, Weeks},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open calendar interval [start, end) over which capacity is evaluated.
/// Deserialization goes through `new`, so an inverted window never loads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "WindowBounds")]
pub struct PlanningWindow {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end:   NaiveDate,
}

impl TryFrom<WindowBounds> for PlanningWindow {
    type Error = PlanError;

    fn try_from(bounds: WindowBounds) -> PlanResult<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl PlanningWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> PlanResult<Self> {
        if end < start {
            return Err(PlanError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn weeks(&self) -> Weeks {
        weeks_between(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveCapacity {
    pub member_id:                     EntityId,
    pub member_name:                   String,
    pub role:                          Role,
    pub base_capacity_per_sprint:      Weeks,
    pub role_effectiveness:            f64,
    pub tenure_modifier:               f64,
    /// Holiday weeks inside the window, summed across periods.
    pub holiday_weeks:                 Weeks,
    pub holiday_reduction:             f64,
    pub effective_capacity_per_sprint: Weeks,
}

/// Weeks of `holiday` that fall inside `window`.
///
/// `max(0, min(end, window end) - max(start, window start))`, measured
/// between the boundary dates. A single-day period therefore spans zero
/// weeks and Monday to Friday spans four days. Malformed periods yield 0.
pub fn holiday_overlap_weeks(holiday: &HolidayPeriod, window: &PlanningWindow) -> Weeks {
    let overlap_start = holiday.start.max(window.start);
    let overlap_end = holiday.end.min(window.end);
    weeks_between(overlap_start, overlap_end).max(0.0)
}

/// Fraction of the window lost to time off, clamped to [0, 1].
///
/// Overlapping periods of the same member are summed as-is, so two periods
/// covering the same week count that week twice before clamping.
pub fn holiday_reduction(member: &TeamMember, window: &PlanningWindow) -> (Weeks, f64) {
    let holiday_weeks: Weeks = member
        .holidays
        .iter()
        .map(|h| holiday_overlap_weeks(h, window))
        .sum();

    let window_weeks = window.weeks();
    if window_weeks <= 0.0 {
        return (holiday_weeks, 0.0);
    }
    (holiday_weeks, (holiday_weeks / window_weeks).clamp(0.0, 1.0))
}

pub struct MemberCapacityCalculator<'a> {
    roles:  &'a RoleEffectiveness,
    tenure: &'a TenureModifiers,
}

impl<'a> MemberCapacityCalculator<'a> {
    pub fn new(roles: &'a RoleEffectiveness, tenure: &'a TenureModifiers) -> Self {
        Self { roles, tenure }
    }

    pub fn calculate(&self, member: &TeamMember, window: &PlanningWindow) -> EffectiveCapacity {
        let base = member.base_capacity_per_sprint.max(0.0);
        let role_effectiveness = self.roles.get(member.role).clamp(0.0, 1.0);
        let tenure_modifier = self.tenure.modifier(member).clamp(0.0, 1.0);
        let (holiday_weeks, reduction) = holiday_reduction(member, window);

        let effective = (base * role_effectiveness * tenure_modifier * (1.0 - reduction))
            .clamp(0.0, base);

        log::debug!(
            "capacity {} ({}): base={base:.2} role={role_effectiveness:.2} \
             tenure={tenure_modifier:.3} holiday={reduction:.3} -> {effective:.3}",
            member.name,
            member.role,
        );

        EffectiveCapacity {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            role: member.role,
            base_capacity_per_sprint: base,
            role_effectiveness,
            tenure_modifier,
            holiday_weeks,
            holiday_reduction: reduction,
            effective_capacity_per_sprint: effective,
        }
    }
}
