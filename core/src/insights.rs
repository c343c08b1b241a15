//! Team insights: staffing flags derived from roster composition and the
//! computed member capacities.
//!
//! RULES:
//!   - Every rule is evaluated independently; all that apply fire.
//!   - Either/or groups: new-starter (high | moderate), holiday
//!     (significant | moderate), seniority (strong | light | balanced),
//!     upskilling (high | in progress).
//!   - Percentages are rounded to whole numbers before comparison.
//!   - Insight order is fixed: onboarding, holidays, seniority, upskilling,
//!     testing coverage, infrastructure coverage, mentoring.

use crate::{
    config::InsightThresholds,
    member::{Role, TeamMember},
    member_capacity::EffectiveCapacity,
    types::Weeks,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TenureBucket {
    New,
    Ramping,
    Established,
}

impl TenureBucket {
    pub fn for_months(months: u32, thresholds: &InsightThresholds) -> Self {
        if months < thresholds.ramping_from_months {
            TenureBucket::New
        } else if months < thresholds.established_from_months {
            TenureBucket::Ramping
        } else {
            TenureBucket::Established
        }
    }

    pub fn label(&self, thresholds: &InsightThresholds) -> String {
        match self {
            TenureBucket::New => format!("New (< {} months)", thresholds.ramping_from_months),
            TenureBucket::Ramping => format!(
                "Ramping ({}-{} months)",
                thresholds.ramping_from_months, thresholds.established_from_months
            ),
            TenureBucket::Established => {
                format!("Established ({}+ months)", thresholds.established_from_months)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleCapacity {
    pub role:             Role,
    pub count:            usize,
    pub total_capacity:   Weeks,
    pub average_capacity: Weeks,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureCapacity {
    pub bucket:         TenureBucket,
    pub label:          String,
    pub count:          usize,
    pub total_capacity: Weeks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamInsights {
    pub new_starters:             usize,
    pub holiday_impacted_members: usize,
    pub total_holiday_days:       i64,
    pub upskilling_members:       usize,
    pub senior_capacity:          Weeks,
    pub other_capacity:           Weeks,
    pub capacity_by_role:         Vec<RoleCapacity>,
    pub capacity_by_tenure:       Vec<TenureCapacity>,
    pub key_insights:             Vec<String>,
}

fn pct(part: usize, whole: usize) -> f64 {
    (part as f64 / whole as f64 * 100.0).round()
}

/// Analyse `members` using the capacities already computed for them.
///
/// Capacities are matched to members by id; a member without a matching
/// entry contributes zero capacity.
pub fn analyze_team(
    members: &[TeamMember],
    capacities: &[EffectiveCapacity],
    thresholds: &InsightThresholds,
) -> TeamInsights {
    if members.is_empty() {
        return TeamInsights::default();
    }

    let capacity_of: HashMap<&str, Weeks> = capacities
        .iter()
        .map(|c| (c.member_id.as_str(), c.effective_capacity_per_sprint))
        .collect();
    let capacity = |m: &TeamMember| capacity_of.get(m.id.as_str()).copied().unwrap_or(0.0);
    let team_size = members.len();

    let new_starters = members
        .iter()
        .filter(|m| m.team_tenure_months < thresholds.new_starter_months)
        .count();
    let holiday_impacted_members = members.iter().filter(|m| !m.holidays.is_empty()).count();
    let total_holiday_days: i64 = members
        .iter()
        .flat_map(|m| m.holidays.iter())
        .map(|h| h.days())
        .sum();
    let upskilling_members = members.iter().filter(|m| m.is_upskilling).count();

    let (senior_capacity, other_capacity) = members.iter().fold((0.0, 0.0), |(senior, other), m| {
        if thresholds.senior_roles.contains(&m.role) {
            (senior + capacity(m), other)
        } else {
            (senior, other + capacity(m))
        }
    });

    let mut by_role: BTreeMap<Role, (usize, Weeks)> = BTreeMap::new();
    let mut by_tenure: BTreeMap<TenureBucket, (usize, Weeks)> = BTreeMap::new();
    for m in members {
        let c = capacity(m);
        let role_entry = by_role.entry(m.role).or_insert((0, 0.0));
        role_entry.0 += 1;
        role_entry.1 += c;

        let bucket = TenureBucket::for_months(m.team_tenure_months, thresholds);
        let tenure_entry = by_tenure.entry(bucket).or_insert((0, 0.0));
        tenure_entry.0 += 1;
        tenure_entry.1 += c;
    }

    let capacity_by_role: Vec<RoleCapacity> = by_role
        .into_iter()
        .map(|(role, (count, total))| RoleCapacity {
            role,
            count,
            total_capacity: total,
            average_capacity: total / count as f64,
        })
        .collect();
    let capacity_by_tenure: Vec<TenureCapacity> = by_tenure
        .into_iter()
        .map(|(bucket, (count, total))| TenureCapacity {
            bucket,
            label: bucket.label(thresholds),
            count,
            total_capacity: total,
        })
        .collect();

    let mut key_insights = Vec::new();

    // ── Onboarding ─────────────────────────────────────────────
    if new_starters > 0 {
        let share = pct(new_starters, team_size);
        if share >= thresholds.new_starter_high_pct {
            key_insights.push(format!(
                "High new starter impact: {new_starters} members ({share:.0}%) are new to the team \
                 (<{}mo), reducing overall velocity",
                thresholds.new_starter_months
            ));
        } else if share >= thresholds.new_starter_moderate_pct {
            key_insights.push(format!(
                "Moderate onboarding load: {new_starters} new team members may need additional support"
            ));
        }
    }

    // ── Holidays ───────────────────────────────────────────────
    if holiday_impacted_members > 0 {
        let share = pct(holiday_impacted_members, team_size);
        if share >= thresholds.holiday_significant_pct {
            key_insights.push(format!(
                "Significant holiday impact: {holiday_impacted_members} members ({share:.0}%) have \
                 planned time off totaling {total_holiday_days} days"
            ));
        } else if total_holiday_days >= thresholds.holiday_moderate_days {
            key_insights.push(format!(
                "Moderate holiday impact: {total_holiday_days} total holiday days across \
                 {holiday_impacted_members} members"
            ));
        }
    }

    // ── Seniority ──────────────────────────────────────────────
    let total_capacity = senior_capacity + other_capacity;
    if total_capacity > 0.0 {
        let share = (senior_capacity / total_capacity * 100.0).round();
        let senior_codes = thresholds
            .senior_roles
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join("/");
        if share >= thresholds.senior_strong_pct {
            key_insights.push(format!(
                "Strong senior capacity: {share:.0}% of capacity from {senior_codes} level \
                 ({senior_capacity:.1}w/sprint) - good for complex features"
            ));
        } else if share <= thresholds.senior_light_pct {
            key_insights.push(format!(
                "Junior-heavy team: only {share:.0}% senior capacity - may need more mentoring \
                 time for complex features"
            ));
        } else {
            key_insights.push(format!(
                "Balanced experience mix: {share:.0}% senior capacity provides good balance of \
                 delivery and mentoring"
            ));
        }
    }

    // ── Upskilling ─────────────────────────────────────────────
    if upskilling_members > 0 {
        let share = pct(upskilling_members, team_size);
        if share >= thresholds.upskilling_high_pct {
            key_insights.push(format!(
                "High learning overhead: {upskilling_members} members ({share:.0}%) are upskilling, \
                 reducing sprint capacity by ~20%"
            ));
        } else if upskilling_members >= thresholds.upskilling_min_members {
            key_insights.push(format!(
                "Learning in progress: {upskilling_members} members are upskilling in new \
                 technologies/domains"
            ));
        }
    }

    // ── Role coverage ──────────────────────────────────────────
    let has_role = |roles: &[Role]| capacity_by_role.iter().any(|r| roles.contains(&r.role));
    if !has_role(&thresholds.testing_roles) && team_size >= thresholds.testing_gap_min_team {
        key_insights.push(
            "No dedicated QE capacity - development team will need to handle testing, \
             potentially slowing feature delivery"
                .to_string(),
        );
    }
    if !has_role(&thresholds.infra_roles) && team_size >= thresholds.infra_gap_min_team {
        key_insights.push(
            "No dedicated DevOps capacity - deployment and infrastructure work may slow down \
             development velocity"
                .to_string(),
        );
    }

    // ── Mentoring ──────────────────────────────────────────────
    let very_new = capacity_by_tenure
        .iter()
        .find(|t| t.bucket == TenureBucket::New)
        .map(|t| t.count)
        .unwrap_or(0);
    if very_new > 0 && team_size <= thresholds.mentoring_max_team {
        key_insights.push(format!(
            "High mentoring need: {very_new} very new members in small team will require \
             significant senior support"
        ));
    }

    log::debug!(
        "insights: {team_size} members, {new_starters} new, {holiday_impacted_members} on leave, \
         {} insights",
        key_insights.len()
    );

    TeamInsights {
        new_starters,
        holiday_impacted_members,
        total_holiday_days,
        upskilling_members,
        senior_capacity,
        other_capacity,
        capacity_by_role,
        capacity_by_tenure,
        key_insights,
    }
}
