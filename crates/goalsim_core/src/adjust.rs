//! Goal-type specialization layer.
//!
//! Each [`GoalKind`] is a thin parameterization of the same core loop: it
//! may reshape the allocation, the effective target, or the contribution
//! stream before simulation, and attach derived metrics afterwards. No
//! goal type gets its own trajectory algorithm.

use crate::model::{Allocation, AssetClass, GoalKind, GoalSpec, SimulationResult};

/// Years before the horizon over which a retirement allocation glides
/// toward debt
const GLIDE_WINDOW_YEARS: u32 = 10;
/// Largest fraction of the equity weight the glide path will move
const MAX_GLIDE_SHIFT: f64 = 0.5;
/// Initial-withdrawal-rate convention for sustainable retirement income
const WITHDRAWAL_RATE: f64 = 0.04;

/// Fully resolved inputs for the generic trajectory loop
#[derive(Debug, Clone, PartialEq)]
pub struct GoalParameters {
    pub horizon_years: u32,
    /// Target grown to the horizon (inflation, education premium, or
    /// property appreciation depending on the goal type)
    pub effective_target: f64,
    pub allocation: Allocation,
    /// Contribution per simulated year, already net of any interest drag
    pub annual_contributions: Vec<f64>,
    /// Total contribution reduction from debt interest over the horizon
    pub interest_drag_total: f64,
}

/// Resolve a goal into plain trajectory-loop parameters.
///
/// `today` anchors target-date horizons; pass a fixed date in tests.
#[must_use]
pub fn prepare(
    goal: &GoalSpec,
    inflation_rate: f64,
    horizon_override: Option<u32>,
    today: jiff::civil::Date,
) -> GoalParameters {
    let horizon_years = goal.resolve_horizon(horizon_override, today);
    let years = horizon_years as usize;

    let effective_target = match &goal.kind {
        GoalKind::Education { inflation_premium } => {
            goal.target_amount * (1.0 + inflation_rate + inflation_premium).powi(horizon_years as i32)
        }
        GoalKind::HomePurchase { appreciation_rate } => {
            goal.target_amount * (1.0 + appreciation_rate).powi(horizon_years as i32)
        }
        // A debt balance is nominal; it does not inflate
        GoalKind::DebtRepayment { .. } => goal.target_amount,
        _ => goal.target_amount * (1.0 + inflation_rate).powi(horizon_years as i32),
    };

    let allocation = match &goal.kind {
        GoalKind::EmergencyFund { .. } => Allocation::conservative(),
        GoalKind::Retirement { .. } => glide_to_conservative(&goal.allocation, horizon_years),
        _ => goal.allocation.clone(),
    };

    let mut interest_drag_total = 0.0;
    let annual_contributions: Vec<f64> = (0..years)
        .map(|year| {
            let base = goal.contributions.annual_amount(year);
            match &goal.kind {
                GoalKind::DebtRepayment { interest_rate } => {
                    // Interest accrues on the straight-line remaining
                    // principal and eats into the year's contribution
                    let remaining =
                        goal.target_amount * (1.0 - year as f64 / years as f64);
                    let drag = (interest_rate * remaining).max(0.0);
                    interest_drag_total += drag.min(base);
                    (base - drag).max(0.0)
                }
                _ => base,
            }
        })
        .collect();

    GoalParameters {
        horizon_years,
        effective_target,
        allocation,
        annual_contributions,
        interest_drag_total,
    }
}

/// Shift equity toward debt as the horizon shrinks inside the glide window
fn glide_to_conservative(allocation: &Allocation, horizon_years: u32) -> Allocation {
    if horizon_years >= GLIDE_WINDOW_YEARS {
        return allocation.clone();
    }
    let proximity =
        (GLIDE_WINDOW_YEARS - horizon_years) as f64 / GLIDE_WINDOW_YEARS as f64;
    allocation.shifted(
        AssetClass::Equity,
        AssetClass::Debt,
        proximity * MAX_GLIDE_SHIFT,
    )
}

/// Attach goal-type derived metrics to a finished result
#[must_use]
pub fn attach_derived_metrics(
    goal: &GoalSpec,
    params: &GoalParameters,
    result: SimulationResult,
) -> SimulationResult {
    let median = result.percentiles.p50;
    match &goal.kind {
        GoalKind::Retirement {
            current_annual_income,
        } if *current_annual_income > 0.0 => result.with_metric(
            "income_replacement_ratio",
            median * WITHDRAWAL_RATE / current_annual_income,
        ),
        GoalKind::EmergencyFund { monthly_expenses } if *monthly_expenses > 0.0 => {
            result.with_metric("months_of_expenses_covered", median / monthly_expenses)
        }
        GoalKind::HomePurchase { .. } if params.effective_target > 0.0 => result.with_metric(
            "implied_loan_to_value",
            (1.0 - median / params.effective_target).clamp(0.0, 1.0),
        ),
        GoalKind::DebtRepayment { .. } => {
            result.with_metric("interest_drag_total", params.interest_drag_total)
        }
        _ => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContributionPattern;

    fn base_goal(kind: GoalKind) -> GoalSpec {
        GoalSpec {
            target_amount: 1_000_000.0,
            current_amount: 0.0,
            contributions: ContributionPattern::Monthly { amount: 10_000.0 },
            horizon_years: Some(5),
            target_date: None,
            allocation: Allocation::moderate(),
            kind,
        }
    }

    const TODAY: jiff::civil::Date = jiff::civil::Date::constant(2026, 1, 1);

    #[test]
    fn test_generic_target_inflates() {
        let params = prepare(&base_goal(GoalKind::Custom), 0.05, None, TODAY);
        let expected = 1_000_000.0 * 1.05f64.powi(5);
        assert!((params.effective_target - expected).abs() < 1e-6);
        assert_eq!(params.annual_contributions.len(), 5);
        assert_eq!(params.annual_contributions[0], 120_000.0);
    }

    #[test]
    fn test_education_adds_premium() {
        let goal = base_goal(GoalKind::Education {
            inflation_premium: 0.03,
        });
        let params = prepare(&goal, 0.05, None, TODAY);
        let expected = 1_000_000.0 * 1.08f64.powi(5);
        assert!((params.effective_target - expected).abs() < 1e-6);
    }

    #[test]
    fn test_home_purchase_tracks_property_market() {
        let goal = base_goal(GoalKind::HomePurchase {
            appreciation_rate: 0.09,
        });
        let params = prepare(&goal, 0.05, None, TODAY);
        let expected = 1_000_000.0 * 1.09f64.powi(5);
        assert!((params.effective_target - expected).abs() < 1e-6);
    }

    #[test]
    fn test_emergency_fund_forces_conservative_allocation() {
        let goal = base_goal(GoalKind::EmergencyFund {
            monthly_expenses: 50_000.0,
        });
        let params = prepare(&goal, 0.05, None, TODAY);
        assert_eq!(params.allocation, Allocation::conservative());
    }

    #[test]
    fn test_retirement_glide_near_horizon() {
        let goal = base_goal(GoalKind::Retirement {
            current_annual_income: 1_200_000.0,
        });

        // 5 years out: half the glide window elapsed, a quarter of equity
        // moved to debt
        let near = prepare(&goal, 0.05, None, TODAY);
        let expected = Allocation::moderate().shifted(
            AssetClass::Equity,
            AssetClass::Debt,
            0.5 * MAX_GLIDE_SHIFT,
        );
        assert_eq!(near.allocation, expected);

        // Far from the horizon the allocation is untouched
        let far = prepare(&goal, 0.05, Some(25), TODAY);
        assert_eq!(far.allocation, Allocation::moderate());
    }

    #[test]
    fn test_debt_repayment_nets_interest() {
        let goal = GoalSpec {
            target_amount: 500_000.0,
            contributions: ContributionPattern::Annual { amount: 120_000.0 },
            ..base_goal(GoalKind::DebtRepayment {
                interest_rate: 0.10,
            })
        };
        let params = prepare(&goal, 0.05, None, TODAY);

        // Debt target stays nominal
        assert_eq!(params.effective_target, 500_000.0);
        // Year 0: full principal outstanding, 50k interest drag
        assert!((params.annual_contributions[0] - 70_000.0).abs() < 1e-9);
        // Drag shrinks as the principal amortizes
        assert!(params.annual_contributions[4] > params.annual_contributions[0]);
        assert!(params.interest_drag_total > 0.0);
    }
}
