//! Iterative elimination of unpriced factors
//!
//! Backward selection driven by the KRS estimator. Each step estimates the
//! KRS premia and standard errors of the retained factors, finds the factor
//! with the smallest `|t|`, and either stops (the weakest factor is
//! significant) or drops it and repeats.
//!
//! The critical value is Bonferroni-adjusted for the *original* number of
//! factors `M` and stays fixed while factors are removed:
//!
//! ```text
//! c = Φ^{-1}(1 - α / (2M))
//! ```
//!
//! Each step works on copies of the factor panel, loadings and moments
//! projected onto the retained index set; the inputs are never modified.
//! When the search stops on a significant set only the surviving indices
//! are returned. Final premia for that set come from a fresh call to
//! [`FactorRiskPremia::estimate`](crate::FactorRiskPremia::estimate).

use crate::estimator::{Estimator, StandardErrorInputs};
use crate::loadings::loadings;
use crate::moments::Moments;
use crate::validation::{expect_len, expect_shape, validate_panels};
use crate::EstimationError;
use ndarray::{Array1, Array2, Axis};
use premia_hac::HacEstimator;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Elimination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationConfig {
    /// Family-wise significance level in (0, 1] (default: 0.05)
    pub alpha: f64,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

/// Two-sided Bonferroni critical value `Φ^{-1}(1 - α / (2m))`
pub fn bonferroni_critical_value(alpha: f64, m: usize) -> Result<f64, EstimationError> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(EstimationError::InvalidSignificance(alpha));
    }
    if m == 0 {
        return Err(EstimationError::EmptyPanel("no factors"));
    }
    Ok(Normal::standard().inverse_cdf(1.0 - alpha / (2.0 * m as f64)))
}

/// Precomputed inputs of an elimination run
#[derive(Debug, Clone)]
pub struct EliminationInputs {
    /// Returns panel (T x N)
    pub returns: Array2<f64>,
    /// Factors panel (T x K)
    pub factors: Array2<f64>,
    /// Loadings (N x K)
    pub beta: Array2<f64>,
    /// Moments of the panels
    pub moments: Moments,
    /// GLS weighting matrix (N x N)
    pub weighting_matrix: Array2<f64>,
}

impl EliminationInputs {
    /// Build inputs from raw panels, weighting by the return covariance
    pub fn from_panels(
        returns: &Array2<f64>,
        factors: &Array2<f64>,
    ) -> Result<Self, EstimationError> {
        let moments = Moments::from_panels(returns, factors)?;
        let beta = loadings(&moments)?;
        Ok(Self {
            returns: returns.clone(),
            factors: factors.clone(),
            beta,
            weighting_matrix: moments.covariance_returns.clone(),
            moments,
        })
    }

    /// Number of candidate factors
    pub fn n_factors(&self) -> usize {
        self.factors.ncols()
    }

    fn validate(&self) -> Result<(), EstimationError> {
        validate_panels(&self.returns, &self.factors)?;
        let n_assets = self.returns.ncols();
        let n_factors = self.factors.ncols();

        expect_shape(&self.beta, n_assets, n_factors, "loadings")?;
        expect_len(&self.moments.mean_returns, n_assets, "mean returns")?;
        expect_len(&self.moments.mean_factors, n_factors, "mean factors")?;
        expect_shape(&self.moments.covariance_factors, n_factors, n_factors, "factor covariance")?;
        expect_shape(&self.moments.covariance_returns, n_assets, n_assets, "return covariance")?;
        expect_shape(
            &self.moments.covariance_factors_returns,
            n_factors,
            n_assets,
            "factor-return covariance",
        )?;
        expect_shape(&self.weighting_matrix, n_assets, n_assets, "weighting matrix")
    }
}

/// Terminal state of an elimination run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliminationStatus {
    /// Every retained factor is individually significant
    Significant,
    /// Every factor was removed
    Empty,
}

/// One removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationStep {
    /// Original indices retained before this step
    pub retained_before: Vec<usize>,
    /// Original index of the removed factor
    pub removed: usize,
    /// Its t-statistic
    pub t_statistic: f64,
}

/// Result of an elimination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationOutcome {
    /// How the search ended
    pub status: EliminationStatus,
    /// Surviving original factor indices in their original order; empty for
    /// [`EliminationStatus::Empty`]
    pub retained: Vec<usize>,
    /// t-statistics of the retained factors at the final step; empty for
    /// [`EliminationStatus::Empty`]
    pub t_statistics: Array1<f64>,
    /// Removals in order
    pub steps: Vec<EliminationStep>,
    /// Fixed critical value used at every step
    pub critical_value: f64,
    /// Bonferroni multiplicity, the original factor count
    pub bonferroni_constant: usize,
}

impl EliminationOutcome {
    /// Whether no factor survived
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Original indices removed, in removal order
    pub fn removed(&self) -> Vec<usize> {
        self.steps.iter().map(|step| step.removed).collect()
    }
}

/// Backward elimination with the KRS estimator
#[derive(Debug, Clone, Default)]
pub struct IterativeElimination<H> {
    config: EliminationConfig,
    hac: H,
}

impl<H: HacEstimator> IterativeElimination<H> {
    /// Create an elimination run with the given configuration and HAC primitive
    pub const fn new(config: EliminationConfig, hac: H) -> Self {
        Self { config, hac }
    }

    /// The active configuration
    pub const fn config(&self) -> &EliminationConfig {
        &self.config
    }

    /// Run the search to completion
    pub fn run(&self, inputs: &EliminationInputs) -> Result<EliminationOutcome, EstimationError> {
        inputs.validate()?;

        let bonferroni_constant = inputs.n_factors();
        let critical_value = bonferroni_critical_value(self.config.alpha, bonferroni_constant)?;
        debug!(
            alpha = self.config.alpha,
            bonferroni_constant, critical_value, "starting factor elimination"
        );

        let mut retained: Vec<usize> = (0..bonferroni_constant).collect();
        let mut steps = Vec::new();

        while !retained.is_empty() {
            let t_statistics = self.t_statistics(inputs, &retained)?;

            let Some((position, weakest)) = weakest_factor(&t_statistics) else {
                break;
            };

            if weakest > critical_value {
                debug!(retained = ?retained, "all remaining factors significant");
                return Ok(EliminationOutcome {
                    status: EliminationStatus::Significant,
                    retained,
                    t_statistics,
                    steps,
                    critical_value,
                    bonferroni_constant,
                });
            }

            let removed = retained[position];
            debug!(removed, t_abs = weakest, critical_value, "removing factor");
            steps.push(EliminationStep {
                retained_before: retained.clone(),
                removed,
                t_statistic: t_statistics[position],
            });
            retained.remove(position);
        }

        debug!("no factor survived elimination");
        Ok(EliminationOutcome {
            status: EliminationStatus::Empty,
            retained,
            t_statistics: Array1::zeros(0),
            steps,
            critical_value,
            bonferroni_constant,
        })
    }

    /// KRS t-statistics of the factor subset `retained`
    fn t_statistics(
        &self,
        inputs: &EliminationInputs,
        retained: &[usize],
    ) -> Result<Array1<f64>, EstimationError> {
        let factors = inputs.factors.select(Axis(1), retained);
        let beta = inputs.beta.select(Axis(1), retained);
        let moments = inputs.moments.select_factors(retained)?;

        let risk_premia = Estimator::Krs.risk_premia(
            &beta,
            &moments.mean_returns,
            Some(&inputs.weighting_matrix),
        )?;
        let standard_errors = Estimator::Krs.standard_errors(
            &StandardErrorInputs {
                risk_premia: &risk_premia,
                returns: &inputs.returns,
                factors: &factors,
                beta: &beta,
                moments: &moments,
            },
            &self.hac,
        )?;

        Ok(risk_premia / standard_errors)
    }
}

/// Position and `|t|` of the smallest absolute t-statistic.
///
/// Ties go to the lowest position; NaN ranks above every number.
fn weakest_factor(t_statistics: &Array1<f64>) -> Option<(usize, f64)> {
    t_statistics
        .iter()
        .map(|t| t.abs())
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
