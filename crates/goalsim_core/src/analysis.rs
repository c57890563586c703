//! Probability analyzer: reduces raw trajectories to distribution metrics.
//!
//! All reductions go through [`crate::numeric`] policies, so scalar and
//! vector inputs behave identically and empty input degrades instead of
//! panicking.

use crate::model::{AchievementTimeline, PercentileBand, TrajectoryMatrix};
use crate::numeric;

/// Percentile of `values` at rank `q` (0..=1) with linear interpolation
/// between order statistics.
///
/// A single value is its own percentile at every rank; empty input yields
/// `None`.
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if values.len() == 1 {
        return Some(values[0]);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Standard 10/25/50/75/90 band over final values
#[must_use]
pub fn percentile_band(final_values: &[f64]) -> PercentileBand {
    let at = |q| percentile(final_values, q).unwrap_or(0.0);
    PercentileBand {
        p10: at(0.10),
        p25: at(0.25),
        p50: at(0.50),
        p75: at(0.75),
        p90: at(0.90),
    }
}

/// Fraction of final values meeting or exceeding the target, always in
/// [0, 1]. Empty input counts as certain failure unless the target is
/// already non-positive.
#[must_use]
pub fn success_probability(final_values: &[f64], target: f64) -> f64 {
    if target <= 0.0 {
        return 1.0;
    }
    if final_values.is_empty() {
        return 0.0;
    }
    let successes = final_values.iter().filter(|v| **v >= target).count();
    (successes as f64 / final_values.len() as f64).clamp(0.0, 1.0)
}

/// First point (in fractional years) at which one trajectory reaches the
/// target, interpolating within the crossing year. Trajectories that never
/// reach it report the terminal year.
fn first_crossing(trajectory: &[f64], start_value: f64, target: f64) -> f64 {
    if start_value >= target {
        return 0.0;
    }
    let mut previous = start_value;
    for (year, value) in trajectory.iter().enumerate() {
        if *value >= target {
            let gained = value - previous;
            let fraction = if gained > 0.0 {
                ((target - previous) / gained).clamp(0.0, 1.0)
            } else {
                1.0
            };
            return year as f64 + fraction;
        }
        previous = *value;
    }
    trajectory.len() as f64
}

/// Median first-crossing time across all trajectories
#[must_use]
pub fn achievement_timeline(
    matrix: &TrajectoryMatrix,
    start_value: f64,
    target: f64,
) -> AchievementTimeline {
    let crossings: Vec<f64> = matrix
        .trajectories()
        .map(|row| first_crossing(row, start_value, target))
        .collect();

    let median = numeric::safe_median(&crossings).unwrap_or(matrix.years() as f64);
    AchievementTimeline::from_fractional_years(median)
}

/// Full reduction of a trajectory matrix against a target
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryAnalysis {
    pub success_probability: f64,
    pub percentiles: PercentileBand,
    pub timeline: AchievementTimeline,
    pub final_values: Vec<f64>,
}

/// Analyze a raw trajectory matrix: percentiles, success probability, and
/// achievement timeline in one pass over the final values.
#[must_use]
pub fn analyze(matrix: &TrajectoryMatrix, start_value: f64, target: f64) -> TrajectoryAnalysis {
    let final_values = matrix.final_values();
    TrajectoryAnalysis {
        success_probability: success_probability(&final_values, target),
        percentiles: percentile_band(&final_values),
        timeline: achievement_timeline(matrix, start_value, target),
        final_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];

        assert_eq!(percentile(&values, 0.0), Some(10.0));
        assert_eq!(percentile(&values, 1.0), Some(40.0));
        // Rank 0.5 lands between the 2nd and 3rd order statistics
        assert_eq!(percentile(&values, 0.5), Some(25.0));
        assert_eq!(percentile(&values, 0.25), Some(17.5));
    }

    #[test]
    fn test_percentile_scalar_and_empty() {
        assert_eq!(percentile(&[42.0], 0.1), Some(42.0));
        assert_eq!(percentile(&[42.0], 0.9), Some(42.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_band_is_monotonic() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 3.7).collect();
        let band = percentile_band(&values);
        assert!(band.is_monotonic());
    }

    #[test]
    fn test_success_probability_bounds() {
        assert_eq!(success_probability(&[1.0, 2.0, 3.0, 4.0], 2.5), 0.5);
        assert_eq!(success_probability(&[1.0], 2.0), 0.0);
        assert_eq!(success_probability(&[1.0], 1.0), 1.0);
        assert_eq!(success_probability(&[], 5.0), 0.0);
        // Non-positive target is already met
        assert_eq!(success_probability(&[], 0.0), 1.0);
    }

    #[test]
    fn test_first_crossing_interpolation() {
        // Starts at 0, reaches 100 at end of year 0, 200 at end of year 1
        let trajectory = [100.0, 200.0];

        // Target 150 crossed halfway through year 1
        assert!((first_crossing(&trajectory, 0.0, 150.0) - 1.5).abs() < 1e-12);
        // Already achieved at the start
        assert_eq!(first_crossing(&trajectory, 300.0, 250.0), 0.0);
        // Never achieved: terminal year
        assert_eq!(first_crossing(&trajectory, 0.0, 1_000.0), 2.0);
    }

    #[test]
    fn test_achievement_timeline_median() {
        let mut matrix = TrajectoryMatrix::new(2);
        matrix.push_trajectory(&[100.0, 200.0]); // crosses 150 at 1.5y
        matrix.push_trajectory(&[150.0, 300.0]); // crosses 150 at 1.0y
        matrix.push_trajectory(&[0.0, 0.0]); // never: 2.0y

        let timeline = achievement_timeline(&matrix, 0.0, 150.0);
        assert_eq!(timeline, AchievementTimeline { years: 1, months: 6 });
    }
}
