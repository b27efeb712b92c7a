//! Symmetric positive-definite solves
//!
//! Every Gram and covariance matrix in the estimators is symmetric
//! positive definite, so all solves go through a Cholesky factorisation
//! `A = L L^T`. A failed factorisation is reported as
//! [`EstimationError::SingularMatrix`] instead of producing NaNs.
//!
//! Only the lower triangle of `A` is read.

use crate::EstimationError;
use ndarray::{Array1, Array2};

/// Pivots below this fraction of the largest diagonal entry are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix
///
/// # Arguments
/// * `a` - Symmetric matrix (n x n)
/// * `name` - Name reported if the factorisation fails
pub fn cholesky(a: &Array2<f64>, name: &'static str) -> Result<Array2<f64>, EstimationError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(EstimationError::DimensionMismatch {
            what: name,
            expected: n,
            actual: a.ncols(),
        });
    }
    if n == 0 {
        return Err(EstimationError::EmptyPanel(name));
    }

    let scale = (0..n).map(|i| a[[i, i]].abs()).fold(0.0_f64, f64::max);
    let tolerance = PIVOT_TOLERANCE * scale;

    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut pivot = a[[j, j]];
        for k in 0..j {
            pivot -= l[[j, k]] * l[[j, k]];
        }
        if !pivot.is_finite() || pivot <= tolerance {
            return Err(EstimationError::SingularMatrix(name));
        }
        let diag = pivot.sqrt();
        l[[j, j]] = diag;

        for i in (j + 1)..n {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / diag;
        }
    }

    Ok(l)
}

/// Solve `A X = B` for symmetric positive-definite `A` (n x n), `B` (n x m)
pub fn solve_spd(
    a: &Array2<f64>,
    b: &Array2<f64>,
    name: &'static str,
) -> Result<Array2<f64>, EstimationError> {
    if b.nrows() != a.nrows() {
        return Err(EstimationError::DimensionMismatch {
            what: name,
            expected: a.nrows(),
            actual: b.nrows(),
        });
    }

    let l = cholesky(a, name)?;
    let mut x = b.to_owned();
    for mut column in x.columns_mut() {
        let solved = substitute(&l, &column.to_owned());
        column.assign(&solved);
    }
    Ok(x)
}

/// Solve `A x = b` for symmetric positive-definite `A` and a vector `b`
pub fn solve_spd_vec(
    a: &Array2<f64>,
    b: &Array1<f64>,
    name: &'static str,
) -> Result<Array1<f64>, EstimationError> {
    if b.len() != a.nrows() {
        return Err(EstimationError::DimensionMismatch {
            what: name,
            expected: a.nrows(),
            actual: b.len(),
        });
    }

    let l = cholesky(a, name)?;
    Ok(substitute(&l, b))
}

/// Inverse of a symmetric positive-definite matrix
pub fn inverse_spd(a: &Array2<f64>, name: &'static str) -> Result<Array2<f64>, EstimationError> {
    solve_spd(a, &Array2::eye(a.nrows()), name)
}

/// Forward then backward substitution with the Cholesky factor
fn substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }

    // L^T x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    x
}
