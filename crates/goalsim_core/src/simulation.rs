//! Monte Carlo simulation core.
//!
//! One trajectory walks a goal balance forward a year at a time: the
//! year's contribution lands, an annual return is drawn from the blended
//! allocation distribution, and the balance clamps at zero. Everything a
//! trajectory needs is captured up front in a [`TrajectoryPlan`] — plain
//! data, so the same step runs identically on one thread or fanned out
//! across workers.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::adjust;
use crate::analysis;
use crate::error::SimulationError;
use crate::model::{
    BlendedReturn, GoalSpec, ReturnAssumptions, ReturnModel, SimulationResult, TrajectoryMatrix,
};

/// Base seed used when the caller does not supply one; fixed so repeated
/// runs of the same inputs agree
pub const DEFAULT_BASE_SEED: u64 = 42;

/// Plain-data inputs for the per-trajectory loop
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPlan {
    pub initial_amount: f64,
    /// One entry per simulated year
    pub annual_contributions: Vec<f64>,
    pub blended: BlendedReturn,
    pub model: ReturnModel,
}

impl TrajectoryPlan {
    #[must_use]
    pub fn years(&self) -> usize {
        self.annual_contributions.len()
    }
}

/// Run `trajectories` independent trajectories of `plan`.
///
/// Seeding is deterministic: a seed stream derived from `seed` hands each
/// trajectory its own rng, so results are reproducible and chunks seeded
/// differently are statistically independent.
pub fn simulate_chunk(
    plan: &TrajectoryPlan,
    trajectories: usize,
    seed: u64,
) -> Result<TrajectoryMatrix, SimulationError> {
    let years = plan.years();
    let mut seed_stream = SmallRng::seed_from_u64(seed);
    let mut matrix = TrajectoryMatrix::with_capacity(years, trajectories);
    let mut row = vec![0.0; years];

    for _ in 0..trajectories {
        let mut rng = SmallRng::seed_from_u64(seed_stream.next_u64());
        let mut value = plan.initial_amount;
        for (year, slot) in row.iter_mut().enumerate() {
            let contribution = plan.annual_contributions[year];
            let annual_return = plan.model.sample(plan.blended, &mut rng)?;
            value = ((value + contribution) * (1.0 + annual_return)).max(0.0);
            *slot = value;
        }
        matrix.push_trajectory(&row);
    }

    Ok(matrix)
}

/// Estimate the outcome distribution of a financial goal.
///
/// The horizon comes from `time_horizon_years`, then the goal itself,
/// clamped to at least one year. A goal with a zero target is already
/// succeeded and returns probability 1.0 without sampling.
pub fn run_simulation(
    goal: &GoalSpec,
    assumptions: &ReturnAssumptions,
    inflation_rate: f64,
    simulation_count: usize,
    time_horizon_years: Option<u32>,
) -> Result<SimulationResult, SimulationError> {
    run_simulation_seeded(
        goal,
        assumptions,
        inflation_rate,
        simulation_count,
        time_horizon_years,
        DEFAULT_BASE_SEED,
    )
}

/// [`run_simulation`] with an explicit base seed
pub fn run_simulation_seeded(
    goal: &GoalSpec,
    assumptions: &ReturnAssumptions,
    inflation_rate: f64,
    simulation_count: usize,
    time_horizon_years: Option<u32>,
    seed: u64,
) -> Result<SimulationResult, SimulationError> {
    let today = jiff::Zoned::now().date();
    let params = adjust::prepare(goal, inflation_rate, time_horizon_years, today);

    if params.effective_target <= 0.0 {
        let result = SimulationResult::immediate_success(simulation_count, goal.current_amount);
        return Ok(adjust::attach_derived_metrics(goal, &params, result));
    }

    let plan = TrajectoryPlan {
        initial_amount: goal.current_amount,
        annual_contributions: params.annual_contributions.clone(),
        blended: params.allocation.blend(assumptions),
        model: assumptions.model(),
    };

    let matrix = simulate_chunk(&plan, simulation_count, seed)?;
    let reduced = analysis::analyze(&matrix, goal.current_amount, params.effective_target);

    let result = SimulationResult {
        success_probability: reduced.success_probability,
        percentiles: reduced.percentiles,
        timeline: reduced.timeline,
        effective_simulations: simulation_count,
        requested_simulations: simulation_count,
        derived: Default::default(),
    };

    Ok(adjust::attach_derived_metrics(goal, &params, result))
}
