//! Team insight rules against hand-built rosters.

use chrono::NaiveDate;
use planner_core::{
    engine::PlanningEngine,
    insights::TenureBucket,
    member::{HolidayKind, HolidayPeriod, Role, TeamMember},
    member_capacity::PlanningWindow,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn window() -> PlanningWindow {
    PlanningWindow::new(date(2024, 1, 1), date(2024, 4, 1)).unwrap()
}

fn veteran(name: &str, role: Role) -> TeamMember {
    TeamMember::new(name, 2.0).with_role(role).with_tenure(36, 24)
}

fn five_day_leave() -> HolidayPeriod {
    HolidayPeriod::new(date(2024, 2, 5), date(2024, 2, 9), HolidayKind::PlannedLeave)
}

/// An empty roster yields empty insights rather than dividing by zero.
#[test]
fn empty_roster_has_no_insights() {
    let insights = PlanningEngine::default().insights(&[], &window());
    assert!(insights.key_insights.is_empty());
    assert!(insights.capacity_by_role.is_empty());
    assert_eq!(insights.senior_capacity, 0.0);
}

/// Five established engineers: no seniors, no QE, no DevOps.
#[test]
fn all_engineer_team_flags_coverage_gaps() {
    let members: Vec<_> = (0..5).map(|i| veteran(&format!("dev{i}"), Role::Se)).collect();
    let insights = PlanningEngine::default().insights(&members, &window());

    assert_eq!(insights.key_insights.len(), 3, "{:?}", insights.key_insights);
    assert!(insights.key_insights[0].starts_with("Junior-heavy team: only 0% senior capacity"));
    assert!(insights.key_insights[1].starts_with("No dedicated QE capacity"));
    assert!(insights.key_insights[2].starts_with("No dedicated DevOps capacity"));
}

/// A QE and a DevOps engineer close both coverage gaps.
#[test]
fn covered_roles_suppress_gap_insights() {
    let members = vec![
        veteran("a", Role::Se),
        veteran("b", Role::Se),
        veteran("c", Role::Sqe),
        veteran("d", Role::DevOps),
        veteran("e", Role::Sse),
    ];
    let insights = PlanningEngine::default().insights(&members, &window());
    assert!(insights.key_insights.iter().all(|i| !i.starts_with("No dedicated")));
}

/// Half of a four-person team is brand new: high onboarding impact and
/// a mentoring warning.
#[test]
fn new_starters_in_small_team() {
    let members = vec![
        veteran("lead", Role::El),
        veteran("senior", Role::Sse),
        TeamMember::new("fresh1", 2.0).with_tenure(2, 2),
        TeamMember::new("fresh2", 2.0).with_tenure(14, 1),
    ];
    let insights = PlanningEngine::default().insights(&members, &window());

    assert_eq!(insights.new_starters, 2);
    assert_eq!(
        insights.key_insights[0],
        "High new starter impact: 2 members (50%) are new to the team (<6mo), reducing overall velocity"
    );
    assert_eq!(
        insights.key_insights.last().map(String::as_str),
        Some("High mentoring need: 2 very new members in small team will require significant senior support")
    );
}

/// 40% of the team on leave is significant; a single member with ten days
/// off is moderate.
#[test]
fn holiday_impact_levels() {
    let engine = PlanningEngine::default();

    let mut members: Vec<_> = (0..5).map(|i| veteran(&format!("m{i}"), Role::Se)).collect();
    members[0].holidays.push(five_day_leave());
    members[1].holidays.push(five_day_leave());
    let insights = engine.insights(&members, &window());
    assert_eq!(insights.holiday_impacted_members, 2);
    assert_eq!(insights.total_holiday_days, 10);
    assert!(insights.key_insights.contains(
        &"Significant holiday impact: 2 members (40%) have planned time off totaling 10 days".to_string()
    ));

    members[1].holidays.clear();
    members[0].holidays.push(HolidayPeriod::new(
        date(2024, 3, 4),
        date(2024, 3, 8),
        HolidayKind::Training,
    ));
    let insights = engine.insights(&members, &window());
    assert!(insights.key_insights.contains(
        &"Moderate holiday impact: 10 total holiday days across 1 members".to_string()
    ));
}

/// Upskilling only raises a flag once it reaches a quarter of the team or
/// two people.
#[test]
fn upskilling_thresholds() {
    let engine = PlanningEngine::default();
    let mut members: Vec<_> = (0..8).map(|i| veteran(&format!("m{i}"), Role::Se)).collect();

    members[0].is_upskilling = true;
    let one = engine.insights(&members, &window());
    assert!(one.key_insights.iter().all(|i| !i.contains("upskilling")));

    members[1].is_upskilling = true;
    let two = engine.insights(&members, &window());
    assert!(two
        .key_insights
        .iter()
        .any(|i| i.starts_with("High learning overhead: 2 members (25%) are upskilling")));
}

/// Senior share picks exactly one of strong, junior-heavy or balanced.
#[test]
fn seniority_mix() {
    let engine = PlanningEngine::default();

    let strong = vec![veteran("a", Role::Sse), veteran("b", Role::Sse), veteran("c", Role::Qe)];
    let insights = engine.insights(&strong, &window());
    assert!(insights.key_insights[0].starts_with("Strong senior capacity"));
    assert!(insights.key_insights[0].contains("SSE/EL"));

    let balanced = vec![
        veteran("a", Role::Sse),
        veteran("b", Role::Sse),
        veteran("c", Role::Se),
        veteran("d", Role::Qe),
    ];
    let insights = engine.insights(&balanced, &window());
    assert!(insights.key_insights[0].starts_with("Balanced experience mix"));
    assert!(insights.senior_capacity > 0.0 && insights.other_capacity > insights.senior_capacity);
}

/// Role and tenure groupings come out in a stable order with the counts
/// and capacities of their members.
#[test]
fn capacity_groupings() {
    let members = vec![
        veteran("qe", Role::Qe),
        veteran("se1", Role::Se),
        TeamMember::new("se2", 2.0).with_tenure(12, 4),
        TeamMember::new("se3", 2.0).with_tenure(12, 0),
    ];
    let insights = PlanningEngine::default().insights(&members, &window());

    let roles: Vec<_> = insights.capacity_by_role.iter().map(|r| (r.role, r.count)).collect();
    assert_eq!(roles, vec![(Role::Se, 3), (Role::Qe, 1)]);

    let se = &insights.capacity_by_role[0];
    assert!((se.average_capacity - se.total_capacity / 3.0).abs() < 1e-12);
    // 1.7 + 1.445 + 0.85
    assert!((se.total_capacity - 3.995).abs() < 1e-9);

    let buckets: Vec<_> = insights
        .capacity_by_tenure
        .iter()
        .map(|t| (t.bucket, t.count))
        .collect();
    assert_eq!(
        buckets,
        vec![
            (TenureBucket::New, 1),
            (TenureBucket::Ramping, 1),
            (TenureBucket::Established, 2),
        ]
    );
    assert_eq!(insights.capacity_by_tenure[2].label, "Established (12+ months)");
}

/// Between 15% and 30% new starters is a moderate load, not a high impact.
#[test]
fn onboarding_load_bands() {
    let engine = PlanningEngine::default();
    let mut members: Vec<_> = (0..20).map(|i| veteran(&format!("m{i}"), Role::Se)).collect();

    // 2 of 20 is 10%: below both bands.
    members[0].team_tenure_months = 4;
    members[1].team_tenure_months = 4;
    let quiet = engine.insights(&members, &window());
    assert_eq!(quiet.new_starters, 2);
    assert!(quiet.key_insights.iter().all(|i| !i.contains("onboarding") && !i.contains("new starter")));

    // 3 of 20 is exactly 15%.
    members[2].team_tenure_months = 4;
    let moderate = engine.insights(&members, &window());
    assert_eq!(
        moderate.key_insights[0],
        "Moderate onboarding load: 3 new team members may need additional support"
    );

    // 6 of 20 is exactly 30%.
    for m in &mut members[3..6] {
        m.team_tenure_months = 4;
    }
    let high = engine.insights(&members, &window());
    assert!(high.key_insights[0].starts_with("High new starter impact: 6 members (30%)"));
}

/// Two upskilling members below a quarter of the team are "in progress".
#[test]
fn learning_in_progress_below_a_quarter() {
    let engine = PlanningEngine::default();
    let mut members: Vec<_> = (0..10).map(|i| veteran(&format!("m{i}"), Role::Se)).collect();
    members[0].is_upskilling = true;
    members[1].is_upskilling = true;

    let insights = engine.insights(&members, &window());
    assert_eq!(insights.upskilling_members, 2);
    assert!(insights.key_insights.contains(
        &"Learning in progress: 2 members are upskilling in new technologies/domains".to_string()
    ));
    assert!(insights.key_insights.iter().all(|i| !i.starts_with("High learning overhead")));
}

/// SSE and DevOps share one effectiveness, so head counts set the senior
/// share exactly: 60% is strong, 30% is junior-heavy, either side is balanced.
#[test]
fn seniority_thresholds_are_inclusive() {
    let engine = PlanningEngine::default();
    let team = |seniors: usize, others: usize| -> Vec<TeamMember> {
        (0..seniors)
            .map(|i| veteran(&format!("s{i}"), Role::Sse))
            .chain((0..others).map(|i| veteran(&format!("o{i}"), Role::DevOps)))
            .collect()
    };
    let seniority = |members: &[TeamMember]| -> String {
        engine
            .insights(members, &window())
            .key_insights
            .into_iter()
            .find(|i| {
                i.starts_with("Strong senior")
                    || i.starts_with("Junior-heavy")
                    || i.starts_with("Balanced experience")
            })
            .unwrap_or_default()
    };

    assert!(seniority(&team(3, 2)).starts_with("Strong senior capacity: 60%"));
    assert!(seniority(&team(4, 3)).starts_with("Balanced experience mix: 57%"));
    assert!(seniority(&team(3, 7)).starts_with("Junior-heavy team: only 30%"));
    assert!(seniority(&team(4, 9)).starts_with("Balanced experience mix: 31%"));
}

/// Just under 40% of the team on leave falls back to the day count.
#[test]
fn holiday_share_just_below_significant() {
    let engine = PlanningEngine::default();
    let mut members: Vec<_> = (0..8).map(|i| veteran(&format!("m{i}"), Role::Se)).collect();

    members[0].holidays.push(five_day_leave());
    let one = engine.insights(&members, &window());
    assert!(one.key_insights.iter().all(|i| !i.contains("holiday impact")));

    // 3 of 8 rounds to 38%.
    members[1].holidays.push(five_day_leave());
    members[2].holidays.push(five_day_leave());
    let three = engine.insights(&members, &window());
    assert_eq!(three.total_holiday_days, 15);
    assert!(three.key_insights.contains(
        &"Moderate holiday impact: 15 total holiday days across 3 members".to_string()
    ));
    assert!(three.key_insights.iter().all(|i| !i.starts_with("Significant holiday")));
}
