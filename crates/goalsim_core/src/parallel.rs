//! Parallel executor: fans a large simulation request out across CPU
//! workers and merges the partial trajectory sets.
//!
//! Each worker chunk gets `seed + worker_index`, so streams are
//! statistically independent but the whole batch is reproducible from the
//! base seed. A failed chunk is isolated: its trajectories are dropped,
//! the failure is logged, and the aggregate records that it rests on
//! fewer simulations than requested.

use std::panic::{self, AssertUnwindSafe};

use crate::adjust;
use crate::analysis;
use crate::error::SimulationError;
use crate::model::{
    AchievementTimeline, Allocation, ContributionPattern, GoalSpec, PercentileBand,
    ReturnAssumptions, SimulationResult, TrajectoryMatrix,
};
use crate::simulation::{self, TrajectoryPlan};

/// Per-chunk simulation step.
///
/// A plain function pointer over plain data: nothing holding live
/// resources crosses the worker boundary.
pub type ChunkFn = fn(&TrajectoryPlan, usize, u64) -> Result<TrajectoryMatrix, SimulationError>;

/// A large simulation request ready to be split into worker chunks
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelRequest {
    pub initial_amount: f64,
    pub contributions: ContributionPattern,
    pub years: u32,
    pub allocation: Allocation,
    pub assumptions: ReturnAssumptions,
    pub target_amount: f64,
    pub simulations: usize,
    /// Extra percentile ranks (0..=1) reported alongside the standard band
    pub confidence_levels: Vec<f64>,
    pub seed: u64,
    /// Defaults to the machine's available parallelism
    pub max_workers: Option<usize>,
    /// Defaults to an even split across workers
    pub chunk_size: Option<usize>,
}

impl ParallelRequest {
    fn plan(&self) -> TrajectoryPlan {
        let years = self.years.max(1) as usize;
        TrajectoryPlan {
            initial_amount: self.initial_amount,
            annual_contributions: (0..years)
                .map(|y| self.contributions.annual_amount(y))
                .collect(),
            blended: self.allocation.blend(&self.assumptions),
            model: self.assumptions.model(),
        }
    }
}

/// Merged outcome of a chunked run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    pub success_probability: f64,
    pub percentiles: PercentileBand,
    /// Requested confidence levels and their final-value percentiles
    pub confidence: Vec<(f64, f64)>,
    pub timeline: AchievementTimeline,
    pub effective_simulations: usize,
    pub requested_simulations: usize,
    pub failed_chunks: usize,
}

impl AggregatedResult {
    /// Collapse into the common result record (confidence levels beyond
    /// the standard band are dropped)
    #[must_use]
    pub fn into_simulation_result(self) -> SimulationResult {
        SimulationResult {
            success_probability: self.success_probability,
            percentiles: self.percentiles,
            timeline: self.timeline,
            effective_simulations: self.effective_simulations,
            requested_simulations: self.requested_simulations,
            derived: Default::default(),
        }
    }
}

fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(feature = "parallel")]
fn map_chunks<F>(num_chunks: usize, worker: F) -> Vec<Result<TrajectoryMatrix, String>>
where
    F: Fn(usize) -> Result<TrajectoryMatrix, String> + Sync + Send,
{
    use rayon::iter::{IntoParallelIterator, ParallelIterator};
    (0..num_chunks).into_par_iter().map(worker).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_chunks<F>(num_chunks: usize, worker: F) -> Vec<Result<TrajectoryMatrix, String>>
where
    F: Fn(usize) -> Result<TrajectoryMatrix, String> + Sync,
{
    (0..num_chunks).map(worker).collect()
}

/// Split `request.simulations` into chunks, run `simulate_fn` on each with
/// an offset seed, and aggregate the surviving trajectories.
///
/// Errors only when every chunk fails; the error carries the originating
/// request parameters.
pub fn run_parallel(
    request: &ParallelRequest,
    simulate_fn: ChunkFn,
) -> Result<AggregatedResult, SimulationError> {
    let workers = request.max_workers.unwrap_or_else(available_workers).max(1);
    let chunk_size = request
        .chunk_size
        .unwrap_or_else(|| request.simulations.div_ceil(workers))
        .max(1);
    // A zero-simulation request still runs one empty chunk so the caller
    // gets a degenerate aggregate instead of an error
    let num_chunks = request.simulations.div_ceil(chunk_size).max(1);
    let plan = request.plan();

    let partials = map_chunks(num_chunks, |index| {
        let count = chunk_size.min(request.simulations - index * chunk_size);
        let worker_seed = request.seed.wrapping_add(index as u64);
        match panic::catch_unwind(AssertUnwindSafe(|| simulate_fn(&plan, count, worker_seed))) {
            Ok(Ok(matrix)) => Ok(matrix),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("worker panicked".to_string()),
        }
    });

    let mut merged: Option<TrajectoryMatrix> = None;
    let mut failed_chunks = 0;
    for (index, partial) in partials.into_iter().enumerate() {
        match partial {
            Ok(matrix) => match &mut merged {
                Some(acc) => acc.extend(&matrix),
                None => merged = Some(matrix),
            },
            Err(reason) => {
                failed_chunks += 1;
                tracing::warn!(chunk = index, reason, "simulation chunk failed; excluding it");
            }
        }
    }

    let Some(matrix) = merged else {
        return Err(SimulationError::AllWorkersFailed {
            requested: request.simulations,
            seed: request.seed,
        });
    };

    let reduced = analysis::analyze(&matrix, request.initial_amount, request.target_amount);
    let confidence = request
        .confidence_levels
        .iter()
        .map(|q| {
            (
                *q,
                analysis::percentile(&reduced.final_values, *q).unwrap_or(0.0),
            )
        })
        .collect();

    if failed_chunks > 0 {
        tracing::warn!(
            failed_chunks,
            effective = matrix.num_trajectories(),
            requested = request.simulations,
            "aggregate based on fewer simulations than requested"
        );
    }

    Ok(AggregatedResult {
        success_probability: reduced.success_probability,
        percentiles: reduced.percentiles,
        confidence,
        timeline: reduced.timeline,
        effective_simulations: matrix.num_trajectories(),
        requested_simulations: request.simulations,
        failed_chunks,
    })
}

/// Goal-level counterpart of [`crate::simulation::run_simulation`] that
/// fans out across workers: same specialization layer, same derived
/// metrics, chunked execution.
pub fn run_goal_parallel(
    goal: &GoalSpec,
    assumptions: &ReturnAssumptions,
    inflation_rate: f64,
    simulation_count: usize,
    time_horizon_years: Option<u32>,
    seed: u64,
    max_workers: Option<usize>,
) -> Result<SimulationResult, SimulationError> {
    let today = jiff::Zoned::now().date();
    let params = adjust::prepare(goal, inflation_rate, time_horizon_years, today);

    if params.effective_target <= 0.0 {
        let result = SimulationResult::immediate_success(simulation_count, goal.current_amount);
        return Ok(adjust::attach_derived_metrics(goal, &params, result));
    }

    let request = ParallelRequest {
        initial_amount: goal.current_amount,
        contributions: ContributionPattern::Schedule {
            amounts: params.annual_contributions.clone(),
        },
        years: params.horizon_years,
        allocation: params.allocation.clone(),
        assumptions: assumptions.clone(),
        target_amount: params.effective_target,
        simulations: simulation_count,
        confidence_levels: Vec::new(),
        seed,
        max_workers,
        chunk_size: None,
    };

    let aggregated = run_parallel(&request, simulation::simulate_chunk)?;
    Ok(adjust::attach_derived_metrics(
        goal,
        &params,
        aggregated.into_simulation_result(),
    ))
}
