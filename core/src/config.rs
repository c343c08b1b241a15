//! Tunable tables for the planning engine.
//!
//! Every constant the calculators depend on lives here so callers can inject
//! alternative tunings (tests, other teams) without touching the algorithms.
//! `PlanningConfig::load` reads the JSON files under `data/`;
//! `PlanningConfig::default()` carries the same values built in.

use crate::{
    error::{PlanError, PlanResult},
    member::{Role, TeamMember},
    size_catalog::{SizeCatalog, SizeDefinition},
    types::Weeks,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WEEKS_PER_QUARTER: Weeks = 13.0;

// ── Role effectiveness ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoleFactor {
    pub role:          Role,
    /// Share of nominal time spent on feature delivery.
    pub effectiveness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleEffectiveness {
    table: HashMap<Role, f64>,
}

impl RoleEffectiveness {
    pub fn from_factors(factors: Vec<RoleFactor>) -> PlanResult<Self> {
        let mut table = HashMap::new();
        for f in factors {
            if !(f.effectiveness > 0.0 && f.effectiveness <= 1.0) {
                return Err(PlanError::InvalidConfig(format!(
                    "role {} effectiveness {} outside (0, 1]",
                    f.role, f.effectiveness
                )));
            }
            table.insert(f.role, f.effectiveness);
        }
        if let Some(missing) = Role::ALL.iter().find(|r| !table.contains_key(r)) {
            return Err(PlanError::InvalidConfig(format!(
                "role {missing} has no effectiveness factor"
            )));
        }
        Ok(Self { table })
    }

    pub fn standard() -> Self {
        let table = [
            (Role::Se, 0.85),
            (Role::Sse, 0.70),
            (Role::El, 0.50),
            (Role::Qe, 0.80),
            (Role::Sqe, 0.75),
            (Role::DevOps, 0.70),
        ]
        .into_iter()
        .collect();
        Self { table }
    }

    pub fn get(&self, role: Role) -> f64 {
        // from_factors guarantees every role is present
        self.table.get(&role).copied().unwrap_or(0.0)
    }
}

impl Default for RoleEffectiveness {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Tenure / ramp-up ───────────────────────────────────────────────

/// Applies `factor` while tenure is strictly below `below_months`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TenureStep {
    pub below_months: u32,
    pub factor:       f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureModifiers {
    pub team_tenure:       Vec<TenureStep>,
    pub company_tenure:    Vec<TenureStep>,
    pub upskilling_factor: f64,
}

impl TenureModifiers {
    pub fn standard() -> Self {
        let step = |below_months, factor| TenureStep { below_months, factor };
        Self {
            team_tenure:       vec![step(1, 0.5), step(3, 0.7), step(6, 0.85)],
            company_tenure:    vec![step(1, 0.8), step(6, 0.9)],
            upskilling_factor: 0.8,
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        for (name, steps) in [("team_tenure", &self.team_tenure), ("company_tenure", &self.company_tenure)] {
            let ascending = steps.windows(2).all(|w| w[0].below_months < w[1].below_months);
            if !ascending {
                return Err(PlanError::InvalidConfig(format!(
                    "{name} steps must have strictly ascending thresholds"
                )));
            }
            if let Some(bad) = steps.iter().find(|s| !(s.factor > 0.0 && s.factor <= 1.0)) {
                return Err(PlanError::InvalidConfig(format!(
                    "{name} factor {} outside (0, 1]",
                    bad.factor
                )));
            }
        }
        if !(self.upskilling_factor > 0.0 && self.upskilling_factor <= 1.0) {
            return Err(PlanError::InvalidConfig(format!(
                "upskilling factor {} outside (0, 1]",
                self.upskilling_factor
            )));
        }
        Ok(())
    }

    /// team step × company step × upskilling factor.
    pub fn modifier(&self, member: &TeamMember) -> f64 {
        let upskilling = if member.is_upskilling { self.upskilling_factor } else { 1.0 };
        step_factor(&self.team_tenure, member.team_tenure_months)
            * step_factor(&self.company_tenure, member.company_tenure_months)
            * upskilling
    }
}

impl Default for TenureModifiers {
    fn default() -> Self {
        Self::standard()
    }
}

fn step_factor(steps: &[TenureStep], months: u32) -> f64 {
    steps
        .iter()
        .find(|s| months < s.below_months)
        .map(|s| s.factor)
        .unwrap_or(1.0)
}

// ── Insight rules ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightThresholds {
    /// Team tenure below this counts as a new starter.
    pub new_starter_months:       u32,
    pub new_starter_high_pct:     f64,
    pub new_starter_moderate_pct: f64,
    pub holiday_significant_pct:  f64,
    pub holiday_moderate_days:    i64,
    pub senior_strong_pct:        f64,
    pub senior_light_pct:         f64,
    pub upskilling_high_pct:      f64,
    pub upskilling_min_members:   usize,
    pub testing_gap_min_team:     usize,
    pub infra_gap_min_team:       usize,
    pub mentoring_max_team:       usize,
    /// Tenure bucket boundaries: New < ramping_from <= Ramping < established_from.
    pub ramping_from_months:      u32,
    pub established_from_months:  u32,
    pub senior_roles:             Vec<Role>,
    pub testing_roles:            Vec<Role>,
    pub infra_roles:              Vec<Role>,
}

impl InsightThresholds {
    pub fn standard() -> Self {
        Self {
            new_starter_months:       6,
            new_starter_high_pct:     30.0,
            new_starter_moderate_pct: 15.0,
            holiday_significant_pct:  40.0,
            holiday_moderate_days:    10,
            senior_strong_pct:        60.0,
            senior_light_pct:         30.0,
            upskilling_high_pct:      25.0,
            upskilling_min_members:   2,
            testing_gap_min_team:     3,
            infra_gap_min_team:       5,
            mentoring_max_team:       4,
            ramping_from_months:      3,
            established_from_months:  12,
            senior_roles:             vec![Role::Sse, Role::El],
            testing_roles:            vec![Role::Qe, Role::Sqe],
            infra_roles:              vec![Role::DevOps],
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.new_starter_moderate_pct > self.new_starter_high_pct {
            return Err(PlanError::InvalidConfig(
                "new starter moderate threshold above high threshold".into(),
            ));
        }
        if self.senior_light_pct > self.senior_strong_pct {
            return Err(PlanError::InvalidConfig(
                "senior light threshold above strong threshold".into(),
            ));
        }
        if self.ramping_from_months >= self.established_from_months {
            return Err(PlanError::InvalidConfig(
                "tenure buckets must have ramping_from < established_from".into(),
            ));
        }
        Ok(())
    }
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

// ── File formats ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct SizeCatalogFile {
    sizes: Vec<SizeDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct RoleEffectivenessFile {
    roles: Vec<RoleFactor>,
}

// ── PlanningConfig ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PlanningConfig {
    pub catalog:            SizeCatalog,
    pub role_effectiveness: RoleEffectiveness,
    pub tenure:             TenureModifiers,
    pub insights:           InsightThresholds,
    pub weeks_per_quarter:  Weeks,
}

impl PlanningConfig {
    /// Load from the data/ directory.
    /// In tests, use PlanningConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let catalog_path = format!("{data_dir}/catalog/size_catalog.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let catalog_file: SizeCatalogFile = serde_json::from_str(&catalog_content)?;
        let catalog = SizeCatalog::from_definitions(catalog_file.sizes)?;

        let role_path = format!("{data_dir}/team/role_effectiveness.json");
        let role_content = std::fs::read_to_string(&role_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {role_path}: {e}"))?;
        let role_file: RoleEffectivenessFile = serde_json::from_str(&role_content)?;
        let role_effectiveness = RoleEffectiveness::from_factors(role_file.roles)?;

        let tenure_path = format!("{data_dir}/team/tenure_modifiers.json");
        let tenure_content = std::fs::read_to_string(&tenure_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {tenure_path}: {e}"))?;
        let tenure: TenureModifiers = serde_json::from_str(&tenure_content)?;
        tenure.validate()?;

        let insights_path = format!("{data_dir}/insights/insight_thresholds.json");
        let insights_content = std::fs::read_to_string(&insights_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {insights_path}: {e}"))?;
        let insights: InsightThresholds = serde_json::from_str(&insights_content)?;
        insights.validate()?;

        log::debug!("planning config loaded from {data_dir}");

        Ok(Self {
            catalog,
            role_effectiveness,
            tenure,
            insights,
            weeks_per_quarter: WEEKS_PER_QUARTER,
        })
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            catalog:            SizeCatalog::standard(),
            role_effectiveness: RoleEffectiveness::standard(),
            tenure:             TenureModifiers::standard(),
            insights:           InsightThresholds::standard(),
            weeks_per_quarter:  WEEKS_PER_QUARTER,
        }
    }
}
