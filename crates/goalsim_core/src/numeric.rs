//! Scalar/array safety helpers.
//!
//! Numeric code in this crate never relies on the implicit truth value of a
//! multi-element container. Comparisons between an array and a scalar go
//! through [`compare`] with an explicit [`Reduce`] policy, and values that
//! must collapse to a single number go through [`to_scalar`].

use crate::error::NumericError;

/// Comparison operator between an element and a scalar threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Cmp {
    #[inline]
    fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Cmp::Gt => value > threshold,
            Cmp::Ge => value >= threshold,
            Cmp::Lt => value < threshold,
            Cmp::Le => value <= threshold,
            Cmp::Eq => value == threshold,
            Cmp::Ne => value != threshold,
        }
    }
}

/// Reduction policy collapsing per-element comparisons to one boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Any,
    All,
}

/// Collapse an array-or-scalar value to a single number.
///
/// A single element is returned as-is, multiple elements reduce to their
/// mean, and an empty slice yields `None`.
#[must_use]
pub fn to_scalar(values: &[f64]) -> Option<f64> {
    match values {
        [] => None,
        [v] => Some(*v),
        _ => Some(values.iter().sum::<f64>() / values.len() as f64),
    }
}

/// Compare every element against a scalar threshold and reduce to one
/// boolean.
///
/// Empty input follows the usual vacuous conventions: `Any` is false and
/// `All` is true.
#[must_use]
pub fn compare(values: &[f64], cmp: Cmp, threshold: f64, reduce: Reduce) -> bool {
    match reduce {
        Reduce::Any => values.iter().any(|v| cmp.apply(*v, threshold)),
        Reduce::All => values.iter().all(|v| cmp.apply(*v, threshold)),
    }
}

/// Median that tolerates empty and single-element input.
///
/// Even-length input averages the two middle elements.
#[must_use]
pub fn safe_median(values: &[f64]) -> Option<f64> {
    match values {
        [] => None,
        [v] => Some(*v),
        _ => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                Some((sorted[mid - 1] + sorted[mid]) / 2.0)
            } else {
                Some(sorted[mid])
            }
        }
    }
}

/// Retry boundary for helpers that reject multi-element input.
///
/// Calls `f` with the values as given; if it fails with
/// [`NumericError::AmbiguousTruthValue`], the input is reduced to a scalar
/// via [`to_scalar`] and the call retried once before the error propagates.
pub fn with_scalar_retry<F>(values: &[f64], f: F) -> Result<f64, NumericError>
where
    F: Fn(&[f64]) -> Result<f64, NumericError>,
{
    match f(values) {
        Err(NumericError::AmbiguousTruthValue { .. }) => {
            let scalar = to_scalar(values).ok_or(NumericError::EmptyInput)?;
            f(&[scalar])
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_scalar() {
        assert_eq!(to_scalar(&[]), None);
        assert_eq!(to_scalar(&[3.5]), Some(3.5));
        assert_eq!(to_scalar(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_compare_any_all() {
        let values = [1.0, 5.0, 10.0];

        assert!(compare(&values, Cmp::Gt, 4.0, Reduce::Any));
        assert!(!compare(&values, Cmp::Gt, 4.0, Reduce::All));
        assert!(compare(&values, Cmp::Ge, 1.0, Reduce::All));
        assert!(!compare(&values, Cmp::Lt, 1.0, Reduce::Any));
    }

    #[test]
    fn test_compare_empty_is_vacuous() {
        assert!(!compare(&[], Cmp::Gt, 0.0, Reduce::Any));
        assert!(compare(&[], Cmp::Gt, 0.0, Reduce::All));
    }

    #[test]
    fn test_safe_median() {
        assert_eq!(safe_median(&[]), None);
        assert_eq!(safe_median(&[7.0]), Some(7.0));
        assert_eq!(safe_median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(safe_median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_with_scalar_retry_reduces_once() {
        // Rejects multi-element input, accepts scalars
        let strict = |values: &[f64]| -> Result<f64, NumericError> {
            match values {
                [] => Err(NumericError::EmptyInput),
                [v] => Ok(*v * 2.0),
                _ => Err(NumericError::AmbiguousTruthValue { len: values.len() }),
            }
        };

        assert_eq!(with_scalar_retry(&[3.0], strict), Ok(6.0));
        // Mean of [2, 4] is 3, doubled is 6
        assert_eq!(with_scalar_retry(&[2.0, 4.0], strict), Ok(6.0));
        assert_eq!(
            with_scalar_retry(&[], strict),
            Err(NumericError::EmptyInput)
        );
    }
}
