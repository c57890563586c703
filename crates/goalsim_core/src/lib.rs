//! Goal outcome simulation library
//!
//! This crate provides a Monte Carlo engine for estimating probabilistic
//! outcomes of long-horizon financial goals. It supports:
//! - Goal-type specializations (retirement, education, emergency fund,
//!   home purchase, debt repayment, and more) layered over one core loop
//! - Blended asset allocations with configurable return distributions
//! - Percentile bands, success probabilities, and achievement timelines
//! - Chunked parallel execution with per-worker seeding and failure
//!   isolation
//!
//! ```ignore
//! use goalsim_core::model::{Allocation, ContributionPattern, GoalKind, GoalSpec,
//!     ReturnAssumptions};
//! use goalsim_core::simulation::run_simulation;
//!
//! let goal = GoalSpec {
//!     target_amount: 3_600_000.0,
//!     current_amount: 0.0,
//!     contributions: ContributionPattern::Monthly { amount: 30_000.0 },
//!     horizon_years: Some(10),
//!     target_date: None,
//!     allocation: Allocation::moderate(),
//!     kind: GoalKind::Custom,
//! };
//! let result = run_simulation(&goal, &ReturnAssumptions::baseline(), 0.05, 1_000, None)?;
//! ```

#![warn(clippy::all)]

pub mod adjust;
pub mod analysis;
pub mod error;
pub mod numeric;
pub mod parallel;
pub mod simulation;

pub mod model;

#[cfg(test)]
mod tests;

pub use error::{NumericError, SimulationError};
pub use model::{GoalSpec, ReturnAssumptions, SimulationResult};
pub use simulation::run_simulation;
