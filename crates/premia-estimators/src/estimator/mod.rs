//! Risk premium estimators and their standard errors
//!
//! Two cross-sectional estimators share one interface:
//!
//! - [`Estimator::Fm`]: Fama-MacBeth style OLS of mean returns on loadings,
//!   `λ = (β^T β)^{-1} β^T μ`. Assumes a correctly specified model.
//! - [`Estimator::Krs`]: misspecification-robust GLS with weighting matrix `W`,
//!   `λ = (β^T W^{-1} β)^{-1} β^T W^{-1} μ`.
//!
//! Standard errors are built from a `T x K` matrix of per-period
//! influence-function terms, handed to a [`HacEstimator`].

pub mod fm;
pub mod krs;

pub use fm::{fm_influence, fm_risk_premia, fm_standard_errors};
pub use krs::{krs_influence, krs_risk_premia, krs_standard_errors};

use crate::moments::Moments;
use crate::validation::{expect_len, expect_shape};
use crate::EstimationError;
use ndarray::{Array1, Array2};
use premia_hac::{HacEstimator, check_standard_errors};
use serde::{Deserialize, Serialize};

/// Cross-sectional estimator variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Estimator {
    /// Fama-MacBeth style ordinary least squares
    #[default]
    Fm,
    /// Misspecification-robust generalized least squares
    Krs,
}

impl Estimator {
    /// Map a "misspecification robust" flag to an estimator
    pub const fn from_robust(misspecification_robust: bool) -> Self {
        if misspecification_robust { Self::Krs } else { Self::Fm }
    }

    /// Whether this is the misspecification-robust variant
    pub const fn is_robust(&self) -> bool {
        matches!(self, Self::Krs)
    }

    /// Short display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fm => "FM",
            Self::Krs => "KRS",
        }
    }

    /// Estimate risk premia from loadings and mean returns.
    ///
    /// `weighting_matrix` is required by [`Estimator::Krs`] and ignored by
    /// [`Estimator::Fm`].
    pub fn risk_premia(
        &self,
        beta: &Array2<f64>,
        mean_returns: &Array1<f64>,
        weighting_matrix: Option<&Array2<f64>>,
    ) -> Result<Array1<f64>, EstimationError> {
        match self {
            Self::Fm => fm_risk_premia(beta, mean_returns),
            Self::Krs => {
                let weighting_matrix =
                    weighting_matrix.ok_or(EstimationError::MissingInput("weighting matrix"))?;
                krs_risk_premia(beta, mean_returns, weighting_matrix)
            }
        }
    }

    /// Per-period influence-function terms (T x K)
    pub fn influence(&self, inputs: &StandardErrorInputs<'_>) -> Result<Array2<f64>, EstimationError> {
        inputs.validate()?;
        match self {
            Self::Fm => fm_influence(inputs),
            Self::Krs => krs_influence(inputs),
        }
    }

    /// HAC standard errors of the risk premia.
    ///
    /// The primitive's output must hold one non-negative value per factor;
    /// anything else is reported as [`EstimationError::Hac`].
    pub fn standard_errors<H>(
        &self,
        inputs: &StandardErrorInputs<'_>,
        hac: &H,
    ) -> Result<Array1<f64>, EstimationError>
    where
        H: HacEstimator + ?Sized,
    {
        let terms = self.influence(inputs)?;
        let standard_errors = hac.standard_errors(&terms)?;
        check_standard_errors(&standard_errors, terms.ncols())?;
        Ok(standard_errors)
    }
}

/// Everything the standard error formulas read
#[derive(Debug, Clone, Copy)]
pub struct StandardErrorInputs<'a> {
    /// Estimated risk premia (K)
    pub risk_premia: &'a Array1<f64>,
    /// Returns panel (T x N)
    pub returns: &'a Array2<f64>,
    /// Factors panel (T x K)
    pub factors: &'a Array2<f64>,
    /// Loadings (N x K)
    pub beta: &'a Array2<f64>,
    /// Moments of the same panels
    pub moments: &'a Moments,
}

impl StandardErrorInputs<'_> {
    fn validate(&self) -> Result<(), EstimationError> {
        let (n_periods, n_assets) = self.returns.dim();
        let n_factors = self.risk_premia.len();

        expect_shape(self.factors, n_periods, n_factors, "factors panel")?;
        expect_shape(self.beta, n_assets, n_factors, "loadings")?;
        expect_len(&self.moments.mean_returns, n_assets, "mean returns")?;
        expect_len(&self.moments.mean_factors, n_factors, "mean factors")?;
        expect_shape(&self.moments.covariance_factors, n_factors, n_factors, "factor covariance")?;
        expect_shape(&self.moments.covariance_returns, n_assets, n_assets, "return covariance")?;
        expect_shape(
            &self.moments.covariance_factors_returns,
            n_factors,
            n_assets,
            "factor-return covariance",
        )
    }

    /// Returns minus the mean return, row by row (T x N)
    pub(crate) fn returns_centred(&self) -> Array2<f64> {
        self.returns - &self.moments.mean_returns
    }

    /// Factors minus the mean factor, row by row (T x K)
    pub(crate) fn factors_centred(&self) -> Array2<f64> {
        self.factors - &self.moments.mean_factors
    }
}

/// Multiply each column of `matrix` elementwise by `weights` (length T)
pub(crate) fn scale_rows(matrix: &Array2<f64>, weights: &Array1<f64>) -> Array2<f64> {
    matrix * &weights.view().insert_axis(ndarray::Axis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_robust() {
        assert_eq!(Estimator::from_robust(true), Estimator::Krs);
        assert_eq!(Estimator::from_robust(false), Estimator::Fm);
        assert!(Estimator::Krs.is_robust());
        assert_eq!(Estimator::default(), Estimator::Fm);
    }

    #[test]
    fn test_krs_requires_weighting_matrix() {
        let beta = array![[1.0], [2.0]];
        let mean_returns = array![0.1, 0.2];
        assert_eq!(
            Estimator::Krs.risk_premia(&beta, &mean_returns, None),
            Err(EstimationError::MissingInput("weighting matrix"))
        );
        assert!(Estimator::Fm.risk_premia(&beta, &mean_returns, None).is_ok());
    }

    #[test]
    fn test_scale_rows() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let w = array![10.0, -1.0];
        assert_eq!(scale_rows(&m, &w), array![[10.0, 20.0], [-3.0, -4.0]]);
    }
}
