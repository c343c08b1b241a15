//! Shared primitive types used across the planning engine.

/// Effort unit: one sprint of one contributor's focused work.
pub type SprintPoints = f64;

/// A duration in calendar weeks. Fractional values are allowed.
pub type Weeks = f64;

/// A stable, unique identifier for a team member or holiday period.
pub type EntityId = String;

/// Upper bound on quarters walked by the scheduler (100 years).
pub const MAX_QUARTERS: usize = 400;

/// Upper bound on sprints emitted by the timeline generator.
pub const MAX_SPRINTS: usize = 5_000;

/// Tolerance used when deciding that remaining effort has reached zero.
pub const EFFORT_EPSILON: f64 = 1e-9;
