//! Tests for the chunked parallel executor

use crate::error::SimulationError;
use crate::model::{
    Allocation, ContributionPattern, GoalKind, GoalSpec, ReturnAssumptions, TrajectoryMatrix,
};
use crate::parallel::{ParallelRequest, run_goal_parallel, run_parallel};
use crate::simulation::{TrajectoryPlan, simulate_chunk};

const BASE_SEED: u64 = 4_000;

fn request(simulations: usize) -> ParallelRequest {
    ParallelRequest {
        initial_amount: 50_000.0,
        contributions: ContributionPattern::Monthly { amount: 25_000.0 },
        years: 10,
        allocation: Allocation::moderate(),
        assumptions: ReturnAssumptions::baseline(),
        target_amount: 5_000_000.0,
        simulations,
        confidence_levels: vec![0.10, 0.25, 0.50, 0.75, 0.90],
        seed: BASE_SEED,
        max_workers: Some(4),
        chunk_size: None,
    }
}

fn failing_chunk(
    plan: &TrajectoryPlan,
    count: usize,
    seed: u64,
) -> Result<TrajectoryMatrix, SimulationError> {
    // Second worker raises; everyone else simulates normally
    if seed == BASE_SEED + 1 {
        panic!("forced worker failure");
    }
    simulate_chunk(plan, count, seed)
}

fn always_failing_chunk(
    _plan: &TrajectoryPlan,
    _count: usize,
    _seed: u64,
) -> Result<TrajectoryMatrix, SimulationError> {
    Err(SimulationError::InvalidDistributionParameters {
        model: "Normal return",
        mean: f64::NAN,
        std_dev: -1.0,
        reason: "std_dev must be non-negative and finite",
    })
}

#[test]
fn test_full_batch_aggregation() {
    let req = request(1_000);
    let result = run_parallel(&req, simulate_chunk).unwrap();

    assert_eq!(result.effective_simulations, 1_000);
    assert_eq!(result.requested_simulations, 1_000);
    assert_eq!(result.failed_chunks, 0);
    assert!(result.success_probability >= 0.0 && result.success_probability <= 1.0);
    assert!(result.percentiles.is_monotonic());

    // Requested confidence levels line up with the standard band
    let p50 = result
        .confidence
        .iter()
        .find(|(q, _)| (*q - 0.50).abs() < 1e-9)
        .map(|(_, v)| *v)
        .unwrap();
    assert_eq!(p50, result.percentiles.p50);
}

#[test]
fn test_reproducible_given_fixed_seed_and_workers() {
    let req = request(800);

    let a = run_parallel(&req, simulate_chunk).unwrap();
    let b = run_parallel(&req, simulate_chunk).unwrap();

    assert_eq!(a.success_probability, b.success_probability);
    assert_eq!(a.percentiles, b.percentiles);
}

#[test]
fn test_worker_failure_is_isolated() {
    let req = request(1_000);
    let result = run_parallel(&req, failing_chunk).unwrap();

    // One of four 250-trajectory chunks dropped
    assert_eq!(result.failed_chunks, 1);
    assert_eq!(result.effective_simulations, 750);
    assert!(result.effective_simulations < result.requested_simulations);
    assert!(result.percentiles.is_monotonic());
}

#[test]
fn test_all_workers_failing_is_an_error() {
    let req = request(400);
    let err = run_parallel(&req, always_failing_chunk).unwrap_err();

    match err {
        SimulationError::AllWorkersFailed { requested, seed } => {
            assert_eq!(requested, 400);
            assert_eq!(seed, BASE_SEED);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_explicit_chunk_size_covers_remainder() {
    let req = ParallelRequest {
        chunk_size: Some(300),
        ..request(1_000)
    };

    // 300 + 300 + 300 + 100
    let result = run_parallel(&req, simulate_chunk).unwrap();
    assert_eq!(result.effective_simulations, 1_000);
}

#[test]
fn test_goal_level_parallel_matches_contract() {
    let goal = GoalSpec {
        target_amount: 3_600_000.0,
        current_amount: 0.0,
        contributions: ContributionPattern::Monthly { amount: 30_000.0 },
        horizon_years: Some(10),
        target_date: None,
        allocation: Allocation::moderate(),
        kind: GoalKind::Custom,
    };

    let a = run_goal_parallel(
        &goal,
        &ReturnAssumptions::baseline(),
        0.05,
        1_000,
        None,
        BASE_SEED,
        Some(4),
    )
    .unwrap();
    let b = run_goal_parallel(
        &goal,
        &ReturnAssumptions::baseline(),
        0.05,
        1_000,
        None,
        BASE_SEED,
        Some(4),
    )
    .unwrap();

    assert!(a.success_probability > 0.0 && a.success_probability < 1.0);
    assert!(a.percentiles.p50 > 0.0);
    assert_eq!(a.success_probability, b.success_probability);
    assert_eq!(a.percentiles, b.percentiles);
}
