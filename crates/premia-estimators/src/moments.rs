//! Sample moments of the return and factor panels
//!
//! All covariances use the unbiased `1/(T-1)` normalisation:
//!
//! ```text
//! Σ_f  = F_c^T F_c / (T-1)      (K x K)
//! Σ_r  = R_c^T R_c / (T-1)      (N x N)
//! Σ_fr = F_c^T R_c / (T-1)      (K x N)
//! ```
//!
//! where `R_c` and `F_c` are the panels with their column means removed.

use crate::validation::validate_panels;
use crate::EstimationError;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Means and covariances of a returns/factors panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Mean return per asset (N)
    pub mean_returns: Array1<f64>,
    /// Mean per factor (K)
    pub mean_factors: Array1<f64>,
    /// Factor covariance (K x K)
    pub covariance_factors: Array2<f64>,
    /// Return covariance (N x N)
    pub covariance_returns: Array2<f64>,
    /// Factor-return cross-covariance (K x N)
    pub covariance_factors_returns: Array2<f64>,
}

impl Moments {
    /// Compute moments from a `T x N` returns panel and a `T x K` factors panel
    pub fn from_panels(
        returns: &Array2<f64>,
        factors: &Array2<f64>,
    ) -> Result<Self, EstimationError> {
        validate_panels(returns, factors)?;

        let mean_returns = column_means(returns);
        let mean_factors = column_means(factors);
        let returns_centred = returns - &mean_returns;
        let factors_centred = factors - &mean_factors;
        let dof = (returns.nrows() - 1) as f64;

        debug!(
            n_periods = returns.nrows(),
            n_assets = returns.ncols(),
            n_factors = factors.ncols(),
            "computing panel moments"
        );

        Ok(Self {
            covariance_factors: factors_centred.t().dot(&factors_centred) / dof,
            covariance_returns: returns_centred.t().dot(&returns_centred) / dof,
            covariance_factors_returns: factors_centred.t().dot(&returns_centred) / dof,
            mean_returns,
            mean_factors,
        })
    }

    /// Number of assets N
    pub fn n_assets(&self) -> usize {
        self.mean_returns.len()
    }

    /// Number of factors K
    pub fn n_factors(&self) -> usize {
        self.mean_factors.len()
    }

    /// Moments of the factor subset `indices`, in the given order.
    ///
    /// Factor means, the factor covariance (rows and columns) and the
    /// cross-covariance (rows) are projected; return moments are copied.
    pub fn select_factors(&self, indices: &[usize]) -> Result<Self, EstimationError> {
        let n_factors = self.n_factors();
        if let Some(&index) = indices.iter().find(|&&index| index >= n_factors) {
            return Err(EstimationError::FactorIndex { index, n_factors });
        }

        Ok(Self {
            mean_returns: self.mean_returns.clone(),
            mean_factors: self.mean_factors.select(Axis(0), indices),
            covariance_factors: self
                .covariance_factors
                .select(Axis(0), indices)
                .select(Axis(1), indices),
            covariance_returns: self.covariance_returns.clone(),
            covariance_factors_returns: self.covariance_factors_returns.select(Axis(0), indices),
        })
    }
}

/// Column means of a `T x M` panel
pub(crate) fn column_means(panel: &Array2<f64>) -> Array1<f64> {
    panel.sum_axis(Axis(0)) / panel.nrows() as f64
}
