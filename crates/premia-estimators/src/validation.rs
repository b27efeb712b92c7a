//! Input checks run before any matrix solve

use crate::EstimationError;
use ndarray::{Array1, Array2};

/// Check that a returns panel (T x N) and factors panel (T x K) are usable.
///
/// Requires matching row counts, non-empty panels, finite values, and
/// strictly more periods than assets and than factors.
pub fn validate_panels(returns: &Array2<f64>, factors: &Array2<f64>) -> Result<(), EstimationError> {
    let (n_periods, n_assets) = returns.dim();
    let n_factors = factors.ncols();

    if factors.nrows() != n_periods {
        return Err(EstimationError::DimensionMismatch {
            what: "panel rows",
            expected: n_periods,
            actual: factors.nrows(),
        });
    }
    if n_periods == 0 {
        return Err(EstimationError::EmptyPanel("no periods"));
    }
    if n_assets == 0 {
        return Err(EstimationError::EmptyPanel("no assets"));
    }
    if n_factors == 0 {
        return Err(EstimationError::EmptyPanel("no factors"));
    }

    let required = n_assets.max(n_factors);
    if n_periods <= required {
        return Err(EstimationError::InsufficientObservations {
            observations: n_periods,
            required,
        });
    }

    if returns.iter().any(|x| !x.is_finite()) {
        return Err(EstimationError::NonFinite("returns"));
    }
    if factors.iter().any(|x| !x.is_finite()) {
        return Err(EstimationError::NonFinite("factors"));
    }

    Ok(())
}

/// Check that a matrix has the given shape
pub fn expect_shape(
    matrix: &Array2<f64>,
    rows: usize,
    cols: usize,
    what: &'static str,
) -> Result<(), EstimationError> {
    if matrix.nrows() != rows {
        return Err(EstimationError::DimensionMismatch {
            what,
            expected: rows,
            actual: matrix.nrows(),
        });
    }
    if matrix.ncols() != cols {
        return Err(EstimationError::DimensionMismatch {
            what,
            expected: cols,
            actual: matrix.ncols(),
        });
    }
    Ok(())
}

/// Check that a vector has the given length
pub fn expect_len(
    vector: &Array1<f64>,
    len: usize,
    what: &'static str,
) -> Result<(), EstimationError> {
    if vector.len() != len {
        return Err(EstimationError::DimensionMismatch {
            what,
            expected: len,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case((10, 3), (10, 2), None)]
    #[case((10, 3), (9, 2), Some("rows"))]
    #[case((3, 3), (3, 2), Some("observations"))]
    #[case((4, 2), (4, 4), Some("observations"))]
    #[case((10, 0), (10, 2), Some("empty"))]
    #[case((10, 3), (10, 0), Some("empty"))]
    fn test_validate_panels(
        #[case] returns_dim: (usize, usize),
        #[case] factors_dim: (usize, usize),
        #[case] failure: Option<&str>,
    ) {
        let returns = Array2::<f64>::zeros(returns_dim);
        let factors = Array2::<f64>::zeros(factors_dim);
        let result = validate_panels(&returns, &factors);
        match failure {
            None => assert!(result.is_ok()),
            Some("rows") => assert!(matches!(
                result,
                Err(EstimationError::DimensionMismatch { what: "panel rows", .. })
            )),
            Some("observations") => assert!(matches!(
                result,
                Err(EstimationError::InsufficientObservations { .. })
            )),
            Some(_) => assert!(matches!(result, Err(EstimationError::EmptyPanel(_)))),
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut returns = Array2::<f64>::zeros((10, 2));
        returns[[3, 1]] = f64::NAN;
        let factors = Array2::<f64>::zeros((10, 1));
        assert_eq!(
            validate_panels(&returns, &factors),
            Err(EstimationError::NonFinite("returns"))
        );
    }

    #[test]
    fn test_expect_shape() {
        let m = Array2::<f64>::zeros((3, 2));
        assert!(expect_shape(&m, 3, 2, "m").is_ok());
        assert_eq!(
            expect_shape(&m, 3, 3, "m"),
            Err(EstimationError::DimensionMismatch {
                what: "m",
                expected: 3,
                actual: 2
            })
        );
    }
}
