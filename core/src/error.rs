use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Undefined completion: capacity per sprint is {capacity_per_sprint}, must be > 0")]
    InvalidCapacity { capacity_per_sprint: f64 },

    #[error("Invalid sprint length: {weeks} weeks")]
    InvalidSprintLength { weeks: f64 },

    #[error("Planning window ends ({end}) before it starts ({start})")]
    InvalidWindow { start: chrono::NaiveDate, end: chrono::NaiveDate },

    #[error("Holiday '{holiday_id}' of member '{member_id}' ends before it starts")]
    MalformedPeriod { member_id: String, holiday_id: String },

    #[error("Invalid member '{member_id}': {reason}")]
    InvalidMember { member_id: String, reason: String },

    #[error("Member '{member_id}' not found")]
    MemberNotFound { member_id: String },

    #[error("Schedule did not converge within {limit} iterations")]
    IterationLimit { limit: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;
