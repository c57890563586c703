//! Tests for core simulation mechanics and distribution properties
//!
//! These tests verify that:
//! - Success probabilities stay in [0, 1] and percentile bands are
//!   monotonic for valid inputs
//! - Identical seeds reproduce identical results
//! - Zero targets succeed immediately without sampling
//! - Degenerate inputs (zero horizon, empty allocation) normalize to safe
//!   defaults instead of erroring

use crate::model::{
    Allocation, ContributionPattern, GoalKind, GoalSpec, ReturnAssumptions, ReturnModel,
};
use crate::simulation::{TrajectoryPlan, run_simulation, run_simulation_seeded, simulate_chunk};

fn moderate_goal() -> GoalSpec {
    GoalSpec {
        target_amount: 3_600_000.0,
        current_amount: 0.0,
        contributions: ContributionPattern::Monthly { amount: 30_000.0 },
        horizon_years: Some(10),
        target_date: None,
        allocation: Allocation::moderate(),
        kind: GoalKind::Custom,
    }
}

#[test]
fn test_moderate_goal_distribution() {
    let result = run_simulation(
        &moderate_goal(),
        &ReturnAssumptions::baseline(),
        0.05,
        1_000,
        None,
    )
    .unwrap();

    // Probabilities are proper fractions and the band never inverts
    assert!(result.success_probability > 0.0 && result.success_probability < 1.0);
    assert!(result.percentiles.is_monotonic());
    assert!(result.percentiles.p50 > 0.0);
    assert_eq!(result.effective_simulations, 1_000);
    assert_eq!(result.requested_simulations, 1_000);
}

#[test]
fn test_identical_seed_reproduces_result() {
    let goal = moderate_goal();
    let assumptions = ReturnAssumptions::baseline();

    let a = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 99).unwrap();
    let b = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 99).unwrap();

    assert_eq!(a.success_probability, b.success_probability);
    assert_eq!(a.percentiles, b.percentiles);
    assert_eq!(a.timeline, b.timeline);
}

#[test]
fn test_different_seeds_diverge() {
    let goal = moderate_goal();
    let assumptions = ReturnAssumptions::baseline();

    let a = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 1).unwrap();
    let b = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 2).unwrap();

    assert_ne!(a.percentiles.p50, b.percentiles.p50);
}

#[test]
fn test_zero_target_succeeds_without_sampling() {
    let goal = GoalSpec {
        target_amount: 0.0,
        current_amount: 25_000.0,
        ..moderate_goal()
    };

    let result = run_simulation(&goal, &ReturnAssumptions::baseline(), 0.05, 1_000, None).unwrap();

    assert_eq!(result.success_probability, 1.0);
    assert_eq!(result.timeline.years, 0);
    assert_eq!(result.timeline.months, 0);
    // Percentiles collapse to the current balance; no trajectories drawn
    assert_eq!(result.percentiles.p50, 25_000.0);
}

#[test]
fn test_horizon_override_beats_goal_horizon() {
    let goal = moderate_goal();
    let assumptions = ReturnAssumptions::baseline();

    let short = run_simulation_seeded(&goal, &assumptions, 0.05, 200, Some(2), 7).unwrap();
    let long = run_simulation_seeded(&goal, &assumptions, 0.05, 200, Some(20), 7).unwrap();

    // Two years of 360k contributions cannot plausibly reach ~4M
    assert!(short.success_probability < long.success_probability);
}

#[test]
fn test_zero_horizon_normalizes_to_one_year() {
    let goal = GoalSpec {
        horizon_years: Some(0),
        ..moderate_goal()
    };

    let result = run_simulation(&goal, &ReturnAssumptions::baseline(), 0.05, 100, None).unwrap();

    // One simulated year: timeline can never exceed it
    assert!(result.timeline.years <= 1);
}

#[test]
fn test_empty_allocation_falls_back() {
    let goal = GoalSpec {
        allocation: Allocation::from_pairs(&[]),
        ..moderate_goal()
    };

    // Must not error: blending substitutes the moderate default
    let result = run_simulation(&goal, &ReturnAssumptions::baseline(), 0.05, 200, None).unwrap();
    assert!(result.success_probability >= 0.0 && result.success_probability <= 1.0);
}

#[test]
fn test_chunk_growth_with_zero_volatility() {
    // Degenerate distribution: every trajectory is the deterministic
    // compound-growth path
    let plan = TrajectoryPlan {
        initial_amount: 1_000.0,
        annual_contributions: vec![0.0, 0.0],
        blended: crate::model::BlendedReturn {
            mean: 0.10,
            volatility: 0.0,
        },
        model: ReturnModel::Normal,
    };

    let matrix = simulate_chunk(&plan, 3, 11).unwrap();
    for row in matrix.trajectories() {
        assert!((row[0] - 1_100.0).abs() < 1e-9);
        assert!((row[1] - 1_210.0).abs() < 1e-9);
    }
}

#[test]
fn test_fat_tailed_model_is_deterministic_and_bounded() {
    let goal = moderate_goal();
    let assumptions =
        ReturnAssumptions::baseline().with_model(ReturnModel::StudentT { df: 5.0 });

    let a = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 23).unwrap();
    let b = run_simulation_seeded(&goal, &assumptions, 0.05, 500, None, 23).unwrap();

    assert_eq!(a.percentiles, b.percentiles);
    assert!(a.success_probability >= 0.0 && a.success_probability <= 1.0);
    assert!(a.percentiles.is_monotonic());
}

#[test]
fn test_balance_clamps_at_zero() {
    // A guaranteed catastrophic return wipes the balance; it must clamp
    // to zero, not go negative
    let plan = TrajectoryPlan {
        initial_amount: 1_000.0,
        annual_contributions: vec![0.0, 0.0],
        blended: crate::model::BlendedReturn {
            mean: -1.5,
            volatility: 0.0,
        },
        model: ReturnModel::Normal,
    };

    let matrix = simulate_chunk(&plan, 2, 3).unwrap();
    for row in matrix.trajectories() {
        assert!(row.iter().all(|v| *v == 0.0));
    }
}
