use std::fmt;

/// Errors from the array-safety helpers in [`crate::numeric`]
#[derive(Debug, Clone, PartialEq)]
pub enum NumericError {
    /// A multi-element array reached a context that expects a single truth
    /// value. Callers must pick an explicit `any`/`all` reduction instead.
    AmbiguousTruthValue { len: usize },
    /// An operation that needs at least one element received none
    EmptyInput,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::AmbiguousTruthValue { len } => {
                write!(
                    f,
                    "truth value of a {len}-element array is ambiguous; use an any/all reduction"
                )
            }
            NumericError::EmptyInput => write!(f, "operation requires a non-empty input"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Errors from the simulation core and the parallel executor
#[derive(Debug, Clone)]
pub enum SimulationError {
    /// A return distribution could not be constructed from the blended
    /// allocation parameters
    InvalidDistributionParameters {
        model: &'static str,
        mean: f64,
        std_dev: f64,
        reason: &'static str,
    },
    /// Every worker chunk of a parallel batch failed; carries the
    /// originating request parameters
    AllWorkersFailed { requested: usize, seed: u64 },
    Numeric(NumericError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidDistributionParameters {
                model,
                mean,
                std_dev,
                reason,
            } => {
                write!(
                    f,
                    "invalid {model} parameters (mean={mean}, std_dev={std_dev}): {reason}"
                )
            }
            SimulationError::AllWorkersFailed { requested, seed } => {
                write!(
                    f,
                    "all worker chunks failed (requested={requested}, seed={seed})"
                )
            }
            SimulationError::Numeric(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Numeric(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NumericError> for SimulationError {
    fn from(e: NumericError) -> Self {
        SimulationError::Numeric(e)
    }
}
