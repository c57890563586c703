mod goal;
mod market;
mod results;

pub use goal::{ContributionPattern, GoalKind, GoalSpec};
pub use market::{
    Allocation, AssetAssumption, AssetClass, BlendedReturn, ReturnAssumptions, ReturnModel,
};
pub use results::{AchievementTimeline, PercentileBand, SimulationResult, TrajectoryMatrix};
