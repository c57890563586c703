use clap::{Parser, Subcommand, ValueEnum};

use goalsim::{CacheConfig, SimulationRequest, SimulationService, init_logging};
use goalsim_core::model::{Allocation, ContributionPattern, GoalKind, GoalSpec, ReturnAssumptions};
use goalsim_core::simulation::DEFAULT_BASE_SEED;

#[derive(Parser, Debug)]
#[command(name = "goalsim")]
#[command(about = "Monte Carlo outcome estimation for financial goals")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GoalType {
    Retirement,
    Education,
    EmergencyFund,
    HomePurchase,
    DebtRepayment,
    Wedding,
    CharitableGiving,
    LegacyPlanning,
    Travel,
    Vehicle,
    Discretionary,
    Custom,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AllocationPreset {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run (or fetch from cache) a goal simulation and print the result
    /// as JSON
    Run {
        /// Goal target amount
        #[arg(long)]
        target: f64,

        /// Current saved amount
        #[arg(long, default_value_t = 0.0)]
        current: f64,

        /// Monthly contribution
        #[arg(long, default_value_t = 0.0)]
        monthly: f64,

        /// Time horizon in years
        #[arg(long)]
        years: u32,

        /// Number of trajectories
        #[arg(long, default_value_t = 1_000)]
        simulations: usize,

        #[arg(long, value_enum, default_value_t = GoalType::Custom)]
        goal_type: GoalType,

        #[arg(long, value_enum, default_value_t = AllocationPreset::Moderate)]
        allocation: AllocationPreset,

        /// Annual inflation assumption
        #[arg(long, default_value_t = 0.05)]
        inflation: f64,

        /// Base seed for reproducible runs
        #[arg(long, default_value_t = DEFAULT_BASE_SEED)]
        seed: u64,

        /// Worker count for the parallel executor (default: CPU cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Skip the cache read and recompute
        #[arg(long)]
        refresh: bool,

        /// Current annual income (retirement goals)
        #[arg(long, default_value_t = 0.0)]
        annual_income: f64,

        /// Monthly expenses (emergency fund goals)
        #[arg(long, default_value_t = 0.0)]
        monthly_expenses: f64,
    },
    /// Print cache statistics as JSON
    CacheStats,
    /// Remove cached results, optionally only keys containing PATTERN
    Invalidate {
        pattern: Option<String>,
    },
}

fn goal_kind(
    goal_type: GoalType,
    annual_income: f64,
    monthly_expenses: f64,
) -> GoalKind {
    match goal_type {
        GoalType::Retirement => GoalKind::Retirement {
            current_annual_income: annual_income,
        },
        GoalType::Education => GoalKind::Education {
            inflation_premium: 0.03,
        },
        GoalType::EmergencyFund => GoalKind::EmergencyFund { monthly_expenses },
        GoalType::HomePurchase => GoalKind::HomePurchase {
            appreciation_rate: 0.09,
        },
        GoalType::DebtRepayment => GoalKind::DebtRepayment {
            interest_rate: 0.10,
        },
        GoalType::Wedding => GoalKind::Wedding,
        GoalType::CharitableGiving => GoalKind::CharitableGiving,
        GoalType::LegacyPlanning => GoalKind::LegacyPlanning,
        GoalType::Travel => GoalKind::Travel,
        GoalType::Vehicle => GoalKind::Vehicle,
        GoalType::Discretionary => GoalKind::Discretionary,
        GoalType::Custom => GoalKind::Custom,
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let service = SimulationService::init(CacheConfig::from_env());

    match args.command {
        Command::Run {
            target,
            current,
            monthly,
            years,
            simulations,
            goal_type,
            allocation,
            inflation,
            seed,
            workers,
            refresh,
            annual_income,
            monthly_expenses,
        } => {
            let goal = GoalSpec {
                target_amount: target,
                current_amount: current,
                contributions: ContributionPattern::Monthly { amount: monthly },
                horizon_years: Some(years),
                target_date: None,
                allocation: match allocation {
                    AllocationPreset::Conservative => Allocation::conservative(),
                    AllocationPreset::Moderate => Allocation::moderate(),
                    AllocationPreset::Aggressive => Allocation::aggressive(),
                },
                kind: goal_kind(goal_type, annual_income, monthly_expenses),
            };

            let request = SimulationRequest {
                goal,
                assumptions: ReturnAssumptions::baseline(),
                inflation_rate: inflation,
                simulation_count: simulations,
                time_horizon_years: None,
                seed,
            };

            let result = service.simulate(&request, refresh, workers)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::CacheStats => {
            println!("{}", serde_json::to_string_pretty(&service.stats())?);
        }
        Command::Invalidate { pattern } => {
            let removed = service.invalidate(pattern.as_deref());
            println!("removed {removed} entries");
        }
    }

    service.shutdown();
    Ok(())
}
