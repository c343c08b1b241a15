//! Team roster records: members, roles, and time-off periods.
//!
//! RULE: The engine never mutates these. The roster store owns them and
//! hands the engine a snapshot slice at calculation time.

use crate::{
    error::{PlanError, PlanResult},
    types::{EntityId, Weeks},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    #[serde(rename = "SE")]
    Se,
    #[serde(rename = "SSE")]
    Sse,
    #[serde(rename = "EL")]
    El,
    #[serde(rename = "QE")]
    Qe,
    #[serde(rename = "SQE")]
    Sqe,
    #[serde(rename = "DevOps")]
    DevOps,
}

impl Role {
    pub const ALL: [Role; 6] = [Role::Se, Role::Sse, Role::El, Role::Qe, Role::Sqe, Role::DevOps];

    /// Short code used in storage and messages.
    pub fn code(&self) -> &'static str {
        match self {
            Role::Se     => "SE",
            Role::Sse    => "SSE",
            Role::El     => "EL",
            Role::Qe     => "QE",
            Role::Sqe    => "SQE",
            Role::DevOps => "DevOps",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Se     => "Software Engineer",
            Role::Sse    => "Senior Software Engineer",
            Role::El     => "Engineering Lead",
            Role::Qe     => "Quality Engineer",
            Role::Sqe    => "Senior Quality Engineer",
            Role::DevOps => "DevOps Engineer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlanError::InvalidConfig(format!("unknown role '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    PlannedLeave,
    CompanyHoliday,
    SickLeave,
    Training,
    Conference,
}

impl HolidayKind {
    pub fn code(&self) -> &'static str {
        match self {
            HolidayKind::PlannedLeave   => "planned_leave",
            HolidayKind::CompanyHoliday => "company_holiday",
            HolidayKind::SickLeave      => "sick_leave",
            HolidayKind::Training       => "training",
            HolidayKind::Conference     => "conference",
        }
    }
}

impl FromStr for HolidayKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned_leave"   => Ok(HolidayKind::PlannedLeave),
            "company_holiday" => Ok(HolidayKind::CompanyHoliday),
            "sick_leave"      => Ok(HolidayKind::SickLeave),
            "training"        => Ok(HolidayKind::Training),
            "conference"      => Ok(HolidayKind::Conference),
            other => Err(PlanError::InvalidConfig(format!("unknown holiday type '{other}'"))),
        }
    }
}

/// Fresh UUID v4, also used for records deserialized without an id.
fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}

/// A block of time off. `days()` counts both ends; capacity overlap is
/// measured between the boundary dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HolidayPeriod {
    #[serde(default = "new_entity_id")]
    pub id:          EntityId,
    pub start:       NaiveDate,
    pub end:         NaiveDate,
    pub kind:        HolidayKind,
    #[serde(default)]
    pub description: String,
}

impl HolidayPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate, kind: HolidayKind) -> Self {
        Self {
            id: new_entity_id(),
            start,
            end,
            kind,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }

    /// Inclusive day count. A malformed period counts as zero days.
    pub fn days(&self) -> i64 {
        if self.is_well_formed() {
            (self.end - self.start).num_days() + 1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    #[serde(default = "new_entity_id")]
    pub id:                       EntityId,
    pub name:                     String,
    pub role:                     Role,
    /// Nominal weeks of availability per sprint.
    pub base_capacity_per_sprint: Weeks,
    pub company_tenure_months:    u32,
    pub team_tenure_months:       u32,
    pub is_upskilling:            bool,
    #[serde(default)]
    pub holidays:                 Vec<HolidayPeriod>,
}

impl TeamMember {
    /// A fresh member with the defaults the roster form starts from:
    /// a full-time SE, one year at the company, six months on the team.
    pub fn new(name: impl Into<String>, sprint_length_weeks: Weeks) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            role: Role::Se,
            base_capacity_per_sprint: sprint_length_weeks,
            company_tenure_months: 12,
            team_tenure_months: 6,
            is_upskilling: false,
            holidays: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_tenure(mut self, company_months: u32, team_months: u32) -> Self {
        self.company_tenure_months = company_months;
        self.team_tenure_months = team_months;
        self
    }

    pub fn with_base_capacity(mut self, weeks: Weeks) -> Self {
        self.base_capacity_per_sprint = weeks;
        self
    }

    pub fn upskilling(mut self, flag: bool) -> Self {
        self.is_upskilling = flag;
        self
    }

    pub fn with_holiday(mut self, holiday: HolidayPeriod) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// Input-boundary checks. Rejects negative or non-finite base capacity
    /// and holiday periods that end before they start.
    pub fn validate(&self) -> PlanResult<()> {
        if self.id.trim().is_empty() {
            return Err(PlanError::InvalidMember {
                member_id: self.id.clone(),
                reason: "id must not be empty".into(),
            });
        }
        if !self.base_capacity_per_sprint.is_finite() || self.base_capacity_per_sprint < 0.0 {
            return Err(PlanError::InvalidMember {
                member_id: self.id.clone(),
                reason: format!(
                    "base capacity {} must be a non-negative number",
                    self.base_capacity_per_sprint
                ),
            });
        }
        if let Some(bad) = self.holidays.iter().find(|h| !h.is_well_formed()) {
            return Err(PlanError::MalformedPeriod {
                member_id: self.id.clone(),
                holiday_id: bad.id.clone(),
            });
        }
        Ok(())
    }

    /// `validate`, plus base capacity must fit inside one sprint.
    pub fn validate_for_sprint(&self, sprint_length_weeks: Weeks) -> PlanResult<()> {
        self.validate()?;
        if self.base_capacity_per_sprint > sprint_length_weeks {
            return Err(PlanError::InvalidMember {
                member_id: self.id.clone(),
                reason: format!(
                    "base capacity {} exceeds sprint length {sprint_length_weeks}",
                    self.base_capacity_per_sprint
                ),
            });
        }
        Ok(())
    }
}
