//! Sprint-by-sprint progress sequence for visualisation.
//!
//! `Timeline` holds only its inputs; every call to `iter()` starts a fresh
//! pass, so the sequence can be replayed any number of times. It is finite:
//! construction rejects zero capacity and runs that would exceed MAX_SPRINTS.

use crate::{
    calendar::{add_weeks, Quarter},
    capacity::{check_sprint_length, CapacitySource},
    error::{PlanError, PlanResult},
    types::{SprintPoints, Weeks, EFFORT_EPSILON, MAX_SPRINTS},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SprintSnapshot {
    pub quarter_label:        String,
    /// 1-based week number in which the sprint begins.
    pub week_offset:          Weeks,
    pub sprint_start:         NaiveDate,
    pub cumulative_completed: SprintPoints,
    pub remaining_work:       SprintPoints,
    pub capacity_used:        SprintPoints,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    total_effort:        SprintPoints,
    capacity_per_sprint: SprintPoints,
    sprint_length_weeks: Weeks,
    start:               NaiveDate,
}

impl Timeline {
    pub fn new<C: CapacitySource + ?Sized>(
        total_effort: SprintPoints,
        source: &C,
        start: NaiveDate,
    ) -> PlanResult<Self> {
        let sprint_length_weeks = source.sprint_length_weeks();
        check_sprint_length(sprint_length_weeks)?;
        let total_effort = total_effort.max(0.0);
        let capacity_per_sprint = source.capacity_per_sprint();

        if total_effort > EFFORT_EPSILON {
            if !capacity_per_sprint.is_finite() || capacity_per_sprint <= 0.0 {
                return Err(PlanError::InvalidCapacity { capacity_per_sprint });
            }
            if (total_effort / capacity_per_sprint).ceil() > MAX_SPRINTS as f64 {
                return Err(PlanError::IterationLimit { limit: MAX_SPRINTS });
            }
        }

        Ok(Self {
            total_effort,
            capacity_per_sprint,
            sprint_length_weeks,
            start,
        })
    }

    pub fn iter(&self) -> TimelineIter {
        TimelineIter {
            timeline:      *self,
            remaining:     self.total_effort,
            elapsed_weeks: 0.0,
            emitted:       0,
        }
    }
}

impl IntoIterator for &Timeline {
    type Item = SprintSnapshot;
    type IntoIter = TimelineIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct TimelineIter {
    timeline:      Timeline,
    remaining:     SprintPoints,
    elapsed_weeks: Weeks,
    emitted:       usize,
}

impl Iterator for TimelineIter {
    type Item = SprintSnapshot;

    fn next(&mut self) -> Option<SprintSnapshot> {
        if self.remaining <= EFFORT_EPSILON || self.emitted >= MAX_SPRINTS {
            return None;
        }

        let t = &self.timeline;
        let work = self.remaining.min(t.capacity_per_sprint);
        self.remaining -= work;
        if self.remaining < EFFORT_EPSILON {
            self.remaining = 0.0;
        }

        let sprint_start = add_weeks(t.start, self.elapsed_weeks);
        let snapshot = SprintSnapshot {
            quarter_label:        Quarter::containing(sprint_start).label(),
            week_offset:          self.elapsed_weeks + 1.0,
            sprint_start,
            cumulative_completed: t.total_effort - self.remaining,
            remaining_work:       self.remaining,
            capacity_used:        work,
        };

        self.elapsed_weeks += t.sprint_length_weeks;
        self.emitted += 1;
        Some(snapshot)
    }
}

impl FusedIterator for TimelineIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityProfile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reference_backlog_takes_five_sprints() {
        let profile = CapacityProfile::new(40.0, 2.0).unwrap();
        let timeline = Timeline::new(97.0, &profile, date(2024, 3, 4)).unwrap();
        let snaps: Vec<_> = timeline.iter().collect();

        assert_eq!(snaps.len(), 5);
        let weeks: Vec<f64> = snaps.iter().map(|s| s.week_offset).collect();
        assert_eq!(weeks, vec![1.0, 3.0, 5.0, 7.0, 9.0]);

        assert_eq!(snaps[0].capacity_used, 20.0);
        assert_eq!(snaps[0].cumulative_completed, 20.0);
        assert_eq!(snaps[4].capacity_used, 17.0);
        assert_eq!(snaps[4].remaining_work, 0.0);
        assert_eq!(snaps[4].cumulative_completed, 97.0);

        assert_eq!(snaps[0].quarter_label, "2024 Q1");
        assert_eq!(snaps[2].sprint_start, date(2024, 4, 1));
        assert_eq!(snaps[2].quarter_label, "2024 Q2");
    }

    #[test]
    fn timeline_is_restartable() {
        let profile = CapacityProfile::new(6.0, 2.0).unwrap();
        let timeline = Timeline::new(10.0, &profile, date(2024, 1, 1)).unwrap();
        let first: Vec<_> = timeline.iter().collect();
        let second: Vec<_> = (&timeline).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn zero_effort_yields_empty_sequence() {
        let profile = CapacityProfile::new(0.0, 2.0).unwrap();
        let timeline = Timeline::new(0.0, &profile, date(2024, 1, 1)).unwrap();
        assert_eq!(timeline.iter().count(), 0);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let profile = CapacityProfile::new(0.0, 2.0).unwrap();
        assert!(matches!(
            Timeline::new(5.0, &profile, date(2024, 1, 1)),
            Err(PlanError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn runaway_sequence_is_rejected_up_front() {
        let profile = CapacityProfile::new(0.001, 1.0).unwrap();
        assert!(matches!(
            Timeline::new(1_000.0, &profile, date(2024, 1, 1)),
            Err(PlanError::IterationLimit { .. })
        ));
    }
}
