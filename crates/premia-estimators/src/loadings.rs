//! Factor loadings
//!
//! Time-series regression coefficients of each asset on the factors,
//! written in terms of population moments:
//!
//! ```text
//! β = (Σ_f^{-1} Σ_fr)^T      (N x K)
//! ```

use crate::linalg::solve_spd;
use crate::moments::Moments;
use crate::EstimationError;
use ndarray::Array2;

/// Compute the `N x K` loadings matrix from panel moments
pub fn loadings(moments: &Moments) -> Result<Array2<f64>, EstimationError> {
    let beta_t = solve_spd(
        &moments.covariance_factors,
        &moments.covariance_factors_returns,
        "factor covariance",
    )?;
    Ok(beta_t.reversed_axes())
}
