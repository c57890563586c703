//! Market assumptions: asset classes, allocations, and return models

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Asset classes a goal allocation can hold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Debt,
    Gold,
    Cash,
    RealEstate,
}

/// Expected annual return and volatility for one asset class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetAssumption {
    pub expected_return: f64,
    pub volatility: f64,
}

/// Per-asset-class return assumptions supplied with each simulation call.
///
/// Never mutated by the simulation core. The annual-return distribution
/// shape is part of the assumptions, so callers that want fatter tails opt
/// in here without touching the goal or the core loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnAssumptions {
    classes: BTreeMap<AssetClass, AssetAssumption>,
    #[serde(default)]
    model: ReturnModel,
}

impl ReturnAssumptions {
    #[must_use]
    pub fn new(classes: BTreeMap<AssetClass, AssetAssumption>) -> Self {
        Self {
            classes,
            model: ReturnModel::default(),
        }
    }

    /// Same assumptions drawn from a different annual-return distribution
    #[must_use]
    pub fn with_model(mut self, model: ReturnModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn model(&self) -> ReturnModel {
        self.model
    }

    /// Long-run nominal assumptions used when a caller supplies none
    #[must_use]
    pub fn baseline() -> Self {
        let classes = BTreeMap::from([
            (
                AssetClass::Equity,
                AssetAssumption {
                    expected_return: 0.12,
                    volatility: 0.18,
                },
            ),
            (
                AssetClass::Debt,
                AssetAssumption {
                    expected_return: 0.07,
                    volatility: 0.05,
                },
            ),
            (
                AssetClass::Gold,
                AssetAssumption {
                    expected_return: 0.08,
                    volatility: 0.15,
                },
            ),
            (
                AssetClass::Cash,
                AssetAssumption {
                    expected_return: 0.04,
                    volatility: 0.01,
                },
            ),
            (
                AssetClass::RealEstate,
                AssetAssumption {
                    expected_return: 0.09,
                    volatility: 0.12,
                },
            ),
        ]);
        Self::new(classes)
    }

    #[must_use]
    pub fn get(&self, class: AssetClass) -> Option<AssetAssumption> {
        self.classes.get(&class).copied()
    }
}

impl Default for ReturnAssumptions {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Blended distribution parameters for a whole allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedReturn {
    pub mean: f64,
    pub volatility: f64,
}

/// Minimum usable sum of allocation weights. Anything below this falls back
/// to [`Allocation::moderate`].
const MIN_USABLE_WEIGHT: f64 = 1e-6;

/// Asset-class weights for a goal.
///
/// Weights are normalized at blend time, so `60/30/10` and `0.6/0.3/0.1`
/// describe the same allocation. A weight sum too small to normalize is
/// replaced by the moderate default rather than reported as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    weights: BTreeMap<AssetClass, f64>,
}

impl Allocation {
    #[must_use]
    pub fn new(weights: BTreeMap<AssetClass, f64>) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn from_pairs(pairs: &[(AssetClass, f64)]) -> Self {
        Self {
            weights: pairs.iter().copied().collect(),
        }
    }

    /// Default fallback: balanced growth with a debt cushion
    #[must_use]
    pub fn moderate() -> Self {
        Self::from_pairs(&[
            (AssetClass::Equity, 0.50),
            (AssetClass::Debt, 0.30),
            (AssetClass::Gold, 0.10),
            (AssetClass::Cash, 0.10),
        ])
    }

    /// Capital-preservation mix used for emergency funds
    #[must_use]
    pub fn conservative() -> Self {
        Self::from_pairs(&[
            (AssetClass::Debt, 0.60),
            (AssetClass::Cash, 0.30),
            (AssetClass::Gold, 0.10),
        ])
    }

    #[must_use]
    pub fn aggressive() -> Self {
        Self::from_pairs(&[
            (AssetClass::Equity, 0.75),
            (AssetClass::Debt, 0.15),
            (AssetClass::Gold, 0.10),
        ])
    }

    #[must_use]
    pub fn weight(&self, class: AssetClass) -> f64 {
        self.weights.get(&class).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Whether the weights sum to something normalizable
    #[must_use]
    pub fn is_usable(&self) -> bool {
        let total = self.total_weight();
        total.is_finite() && total > MIN_USABLE_WEIGHT && self.weights.values().all(|w| *w >= 0.0)
    }

    /// Move `fraction` of the `from` weight onto `to`. Used by the
    /// retirement glide path.
    #[must_use]
    pub fn shifted(&self, from: AssetClass, to: AssetClass, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let moved = self.weight(from) * fraction;
        let mut weights = self.weights.clone();
        if moved > 0.0 {
            weights.insert(from, self.weight(from) - moved);
            weights.insert(to, self.weight(to) + moved);
        }
        Self { weights }
    }

    /// Blend this allocation against return assumptions into a single
    /// (mean, volatility) pair.
    ///
    /// Falls back to [`Allocation::moderate`] when the weights are not
    /// usable. Volatility combines as the root of the weighted squares
    /// (asset returns treated as uncorrelated).
    #[must_use]
    pub fn blend(&self, assumptions: &ReturnAssumptions) -> BlendedReturn {
        let fallback;
        let alloc = if self.is_usable() {
            self
        } else {
            fallback = Allocation::moderate();
            &fallback
        };
        let total = alloc.total_weight();

        let mut mean = 0.0;
        let mut variance = 0.0;
        for (class, raw_weight) in &alloc.weights {
            let Some(assumption) = assumptions.get(*class) else {
                continue;
            };
            let w = raw_weight / total;
            mean += w * assumption.expected_return;
            variance += (w * assumption.volatility).powi(2);
        }

        BlendedReturn {
            mean,
            volatility: variance.sqrt(),
        }
    }
}

/// Annual return distribution drawn once per simulated year.
///
/// Normal is the default; StudentT gives fatter tails for stress-style
/// assumptions. Both are parameterized by the blended allocation mean and
/// volatility at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReturnModel {
    Normal,
    StudentT { df: f64 },
}

impl Default for ReturnModel {
    fn default() -> Self {
        ReturnModel::Normal
    }
}

impl ReturnModel {
    /// Sample one annual return
    pub fn sample<R: Rng + ?Sized>(
        &self,
        blended: BlendedReturn,
        rng: &mut R,
    ) -> Result<f64, SimulationError> {
        match self {
            ReturnModel::Normal => rand_distr::Normal::new(blended.mean, blended.volatility)
                .map(|d| d.sample(rng))
                .map_err(|_| SimulationError::InvalidDistributionParameters {
                    model: "Normal return",
                    mean: blended.mean,
                    std_dev: blended.volatility,
                    reason: "std_dev must be non-negative and finite",
                }),
            ReturnModel::StudentT { df } => rand_distr::StudentT::new(*df)
                .map(|d| blended.mean + blended.volatility * d.sample(rng))
                .map_err(|_| SimulationError::InvalidDistributionParameters {
                    model: "StudentT return",
                    mean: blended.mean,
                    std_dev: blended.volatility,
                    reason: "degrees of freedom must be positive and finite",
                }),
        }
    }
}
