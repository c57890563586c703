//! Simulation output types
//!
//! [`SimulationResult`] is created once per run and immutable afterwards;
//! goal-type layers clone it to attach derived metrics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Row-major `[trajectories x years]` matrix of simulated balances.
///
/// Entry `(t, y)` is trajectory `t`'s balance at the end of year `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryMatrix {
    years: usize,
    values: Vec<f64>,
}

impl TrajectoryMatrix {
    #[must_use]
    pub fn new(years: usize) -> Self {
        Self {
            years,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(years: usize, trajectories: usize) -> Self {
        Self {
            years,
            values: Vec::with_capacity(years * trajectories),
        }
    }

    /// Append one trajectory's year-end balances.
    ///
    /// # Panics
    /// Panics if the row length does not match the matrix horizon.
    pub fn push_trajectory(&mut self, row: &[f64]) {
        assert_eq!(row.len(), self.years, "trajectory row length mismatch");
        self.values.extend_from_slice(row);
    }

    /// Concatenate another matrix with the same horizon (parallel merge)
    pub fn extend(&mut self, other: &TrajectoryMatrix) {
        assert_eq!(other.years, self.years, "trajectory horizon mismatch");
        self.values.extend_from_slice(&other.values);
    }

    #[must_use]
    pub fn years(&self) -> usize {
        self.years
    }

    #[must_use]
    pub fn num_trajectories(&self) -> usize {
        if self.years == 0 {
            0
        } else {
            self.values.len() / self.years
        }
    }

    #[must_use]
    pub fn trajectory(&self, index: usize) -> &[f64] {
        &self.values[index * self.years..(index + 1) * self.years]
    }

    pub fn trajectories(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.years)
    }

    /// Final-year balance of every trajectory
    #[must_use]
    pub fn final_values(&self) -> Vec<f64> {
        self.trajectories().map(|row| row[self.years - 1]).collect()
    }
}

/// Trajectory outcomes at the standard percentile ranks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl PercentileBand {
    /// Percentile values must never decrease as the rank increases
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.p10 <= self.p25 && self.p25 <= self.p50 && self.p50 <= self.p75 && self.p75 <= self.p90
    }
}

/// Median point at which trajectories first reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementTimeline {
    pub years: u32,
    pub months: u32,
}

impl AchievementTimeline {
    /// Build from a fractional year count (e.g. 3.25 years -> 3y 3m)
    #[must_use]
    pub fn from_fractional_years(years: f64) -> Self {
        let years = years.max(0.0);
        let whole = years.floor();
        let months = ((years - whole) * 12.0).round() as u32;
        if months == 12 {
            Self {
                years: whole as u32 + 1,
                months: 0,
            }
        } else {
            Self {
                years: whole as u32,
                months,
            }
        }
    }
}

/// Output record of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub success_probability: f64,
    pub percentiles: PercentileBand,
    #[serde(rename = "goal_achievement_timeline")]
    pub timeline: AchievementTimeline,
    /// Trajectories that actually contributed to the statistics; less than
    /// requested when parallel worker chunks failed
    pub effective_simulations: usize,
    pub requested_simulations: usize,
    /// Goal-type-specific metrics, serialized as top-level fields
    #[serde(flatten)]
    pub derived: BTreeMap<String, f64>,
}

impl SimulationResult {
    /// Result for a goal that is already met (zero target): certain
    /// success, no sampling performed
    #[must_use]
    pub fn immediate_success(simulations: usize, current_amount: f64) -> Self {
        Self {
            success_probability: 1.0,
            percentiles: PercentileBand {
                p10: current_amount,
                p25: current_amount,
                p50: current_amount,
                p75: current_amount,
                p90: current_amount,
            },
            timeline: AchievementTimeline { years: 0, months: 0 },
            effective_simulations: simulations,
            requested_simulations: simulations,
            derived: BTreeMap::new(),
        }
    }

    /// Clone with one more derived metric attached
    #[must_use]
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.derived.insert(name.to_string(), value);
        self
    }
}
