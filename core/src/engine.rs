//! The planning engine: one entry point over the calculators.
//!
//! FLOW:
//!   feature counts ──► effort estimator ─────────────┐
//!   roster ──► member capacity ──► team aggregator ──┼──► scheduler ──► timeline
//!   (or a flat man-weeks profile) ───────────────────┘        │
//!   roster + member capacities ──► insights                   └──► quarter outlook
//!
//! RULES:
//!   - The engine owns only its config tables. It holds no roster, no
//!     counts, and no cached results; every call recomputes from inputs.
//!   - Roster records are validated here, at the boundary, before any
//!     arithmetic touches them.

use crate::{
    capacity::{CapacityProfile, CapacitySource, TeamCapacity},
    config::PlanningConfig,
    effort::{self, EffortShare, FeatureCounts},
    error::PlanResult,
    insights::{self, TeamInsights},
    member::TeamMember,
    member_capacity::{EffectiveCapacity, MemberCapacityCalculator, PlanningWindow},
    outlook::{self, QuarterOutlook},
    scheduler::{self, CompletionEstimate},
    timeline::{SprintSnapshot, Timeline},
    types::{SprintPoints, Weeks},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Everything one planning run produces, ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanReport {
    pub total_effort:         SprintPoints,
    pub effort_breakdown:     Vec<EffortShare>,
    pub capacity_per_sprint:  SprintPoints,
    pub capacity_per_quarter: SprintPoints,
    pub estimate:             CompletionEstimate,
    pub outlook:              QuarterOutlook,
    pub timeline:             Vec<SprintSnapshot>,
    /// Empty in man-weeks mode.
    pub member_capacities:    Vec<EffectiveCapacity>,
    /// `None` in man-weeks mode.
    pub insights:             Option<TeamInsights>,
}

pub struct PlanningEngine {
    config: PlanningConfig,
}

impl PlanningEngine {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// Planning start: the given date, or today (UTC).
    pub fn start_or_today(start: Option<NaiveDate>) -> NaiveDate {
        start.unwrap_or_else(|| Utc::now().date_naive())
    }

    // ── Effort ─────────────────────────────────────────────────

    pub fn total_effort(&self, counts: &FeatureCounts) -> SprintPoints {
        effort::total_effort(counts, &self.config.catalog)
    }

    pub fn effort_breakdown(&self, counts: &FeatureCounts) -> Vec<EffortShare> {
        effort::effort_breakdown(counts, &self.config.catalog)
    }

    // ── Capacity ───────────────────────────────────────────────

    fn calculator(&self) -> MemberCapacityCalculator<'_> {
        MemberCapacityCalculator::new(&self.config.role_effectiveness, &self.config.tenure)
    }

    pub fn member_capacity(&self, member: &TeamMember, window: &PlanningWindow) -> EffectiveCapacity {
        self.calculator().calculate(member, window)
    }

    pub fn member_capacities(
        &self,
        members: &[TeamMember],
        window: &PlanningWindow,
    ) -> Vec<EffectiveCapacity> {
        let calculator = self.calculator();
        members.iter().map(|m| calculator.calculate(m, window)).collect()
    }

    /// Validate the roster snapshot and aggregate it into team capacity.
    pub fn team_capacity(
        &self,
        members: &[TeamMember],
        window: &PlanningWindow,
        sprint_length_weeks: Weeks,
    ) -> PlanResult<TeamCapacity> {
        for m in members {
            m.validate_for_sprint(sprint_length_weeks)?;
        }
        TeamCapacity::aggregate(
            self.member_capacities(members, window),
            sprint_length_weeks,
            self.config.weeks_per_quarter,
        )
    }

    // ── Scheduling ─────────────────────────────────────────────

    pub fn estimate<C: CapacitySource + ?Sized>(
        &self,
        counts: &FeatureCounts,
        source: &C,
        start: Option<NaiveDate>,
    ) -> PlanResult<CompletionEstimate> {
        scheduler::estimate_completion(self.total_effort(counts), source, Self::start_or_today(start))
    }

    pub fn timeline<C: CapacitySource + ?Sized>(
        &self,
        counts: &FeatureCounts,
        source: &C,
        start: Option<NaiveDate>,
    ) -> PlanResult<Timeline> {
        Timeline::new(self.total_effort(counts), source, Self::start_or_today(start))
    }

    pub fn outlook<C: CapacitySource + ?Sized>(
        &self,
        counts: &FeatureCounts,
        source: &C,
        start: Option<NaiveDate>,
    ) -> PlanResult<QuarterOutlook> {
        outlook::quarter_outlook(self.total_effort(counts), source, Self::start_or_today(start))
    }

    // ── Insights ───────────────────────────────────────────────

    pub fn insights(&self, members: &[TeamMember], window: &PlanningWindow) -> TeamInsights {
        let capacities = self.member_capacities(members, window);
        insights::analyze_team(members, &capacities, &self.config.insights)
    }

    // ── Full runs ──────────────────────────────────────────────

    /// Man-weeks mode.
    pub fn plan_with_profile(
        &self,
        counts: &FeatureCounts,
        profile: &CapacityProfile,
        start: Option<NaiveDate>,
    ) -> PlanResult<PlanReport> {
        self.build_report(counts, profile, Self::start_or_today(start), Vec::new(), None)
    }

    /// Team mode. Holiday impact is measured over `window`.
    pub fn plan_with_team(
        &self,
        counts: &FeatureCounts,
        members: &[TeamMember],
        sprint_length_weeks: Weeks,
        window: &PlanningWindow,
        start: Option<NaiveDate>,
    ) -> PlanResult<PlanReport> {
        let team = self.team_capacity(members, window, sprint_length_weeks)?;
        let insights = insights::analyze_team(members, &team.members, &self.config.insights);
        let member_capacities = team.members.clone();
        self.build_report(
            counts,
            &team,
            Self::start_or_today(start),
            member_capacities,
            Some(insights),
        )
    }

    fn build_report<C: CapacitySource + ?Sized>(
        &self,
        counts: &FeatureCounts,
        source: &C,
        start: NaiveDate,
        member_capacities: Vec<EffectiveCapacity>,
        insights: Option<TeamInsights>,
    ) -> PlanResult<PlanReport> {
        let total_effort = self.total_effort(counts);
        let estimate = scheduler::estimate_completion(total_effort, source, start)?;
        let outlook = outlook::quarter_outlook(total_effort, source, start)?;
        let timeline = Timeline::new(total_effort, source, start)?.iter().collect();

        Ok(PlanReport {
            total_effort,
            effort_breakdown: self.effort_breakdown(counts),
            capacity_per_sprint: source.capacity_per_sprint(),
            capacity_per_quarter: source.capacity_per_quarter(),
            estimate,
            outlook,
            timeline,
            member_capacities,
            insights,
        })
    }
}

impl Default for PlanningEngine {
    fn default() -> Self {
        Self::new(PlanningConfig::default())
    }
}
