//! Goal descriptions and contribution rules

use serde::{Deserialize, Serialize};

use super::market::Allocation;

/// Goal-type tag with the type-specific inputs each specialization needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GoalKind {
    /// Allocation glides conservative near the horizon; reports an income
    /// replacement ratio against the saver's current income
    Retirement { current_annual_income: f64 },
    /// Education costs outpace general inflation by `inflation_premium`
    Education { inflation_premium: f64 },
    /// Forced conservative allocation; reports months of expenses covered
    EmergencyFund { monthly_expenses: f64 },
    /// Target appreciates with the property market; reports implied
    /// loan-to-value at the horizon
    HomePurchase { appreciation_rate: f64 },
    /// Interest accrues on the outstanding balance and is netted against
    /// contributions
    DebtRepayment { interest_rate: f64 },
    Wedding,
    CharitableGiving,
    LegacyPlanning,
    Travel,
    Vehicle,
    Discretionary,
    Custom,
}

impl GoalKind {
    /// Short tag used in cache keys and log fields
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GoalKind::Retirement { .. } => "retirement",
            GoalKind::Education { .. } => "education",
            GoalKind::EmergencyFund { .. } => "emergency_fund",
            GoalKind::HomePurchase { .. } => "home_purchase",
            GoalKind::DebtRepayment { .. } => "debt_repayment",
            GoalKind::Wedding => "wedding",
            GoalKind::CharitableGiving => "charitable_giving",
            GoalKind::LegacyPlanning => "legacy_planning",
            GoalKind::Travel => "travel",
            GoalKind::Vehicle => "vehicle",
            GoalKind::Discretionary => "discretionary",
            GoalKind::Custom => "custom",
        }
    }
}

/// Contribution rule evaluated once per simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContributionPattern {
    None,
    Monthly { amount: f64 },
    Annual { amount: f64 },
    /// Monthly contribution that grows by `annual_growth` each year
    /// (salary-indexed saving)
    Growing { monthly: f64, annual_growth: f64 },
    /// Explicit per-year amounts; years past the end contribute nothing
    Schedule { amounts: Vec<f64> },
}

impl ContributionPattern {
    /// Total amount contributed during year `year_index` (0-based)
    #[must_use]
    pub fn annual_amount(&self, year_index: usize) -> f64 {
        match self {
            ContributionPattern::None => 0.0,
            ContributionPattern::Monthly { amount } => amount * 12.0,
            ContributionPattern::Annual { amount } => *amount,
            ContributionPattern::Growing {
                monthly,
                annual_growth,
            } => monthly * 12.0 * (1.0 + annual_growth).powi(year_index as i32),
            ContributionPattern::Schedule { amounts } => {
                amounts.get(year_index).copied().unwrap_or(0.0)
            }
        }
    }
}

/// Immutable description of a financial goal.
///
/// The time horizon comes from `horizon_years` when present, otherwise from
/// the years remaining until `target_date`. Either way the simulation core
/// clamps the resolved horizon to at least one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub target_amount: f64,
    pub current_amount: f64,
    pub contributions: ContributionPattern,
    pub horizon_years: Option<u32>,
    pub target_date: Option<jiff::civil::Date>,
    pub allocation: Allocation,
    pub kind: GoalKind,
}

impl GoalSpec {
    /// Whole years from `today` until the target date, if one is set.
    ///
    /// Dates in the past yield zero rather than a negative span.
    #[must_use]
    pub fn years_until_target(&self, today: jiff::civil::Date) -> Option<u32> {
        let target = self.target_date?;
        let years = i32::from(target.year()) - i32::from(today.year());
        Some(years.max(0) as u32)
    }

    /// Resolve the simulation horizon: explicit override, then the goal's
    /// own horizon, then the target date, defaulting to one year.
    #[must_use]
    pub fn resolve_horizon(&self, override_years: Option<u32>, today: jiff::civil::Date) -> u32 {
        override_years
            .or(self.horizon_years)
            .or_else(|| self.years_until_target(today))
            .unwrap_or(0)
            .max(1)
    }
}
