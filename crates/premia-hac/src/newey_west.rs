//! Newey-West HAC (Heteroskedasticity and Autocorrelation Consistent) Standard Errors
//!
//! For each column `x` of a `T x K` matrix of per-period terms, the
//! estimator computes the long-run variance of the column mean:
//!
//! ```text
//! Ω = Γ_0 + Σ_{l=1}^{L} w_l * 2 * Γ_l
//! where:
//! - Γ_l = (1/T) Σ_{t=l}^{T-1} (x_t - x̄)(x_{t-l} - x̄)
//! - w_l = kernel(l / (L+1))   (Bartlett: 1 - l/(L+1))
//! - L   = bandwidth, truncated to T - 1
//! ```
//!
//! The quadratic spectral kernel never reaches zero, so for it the sum runs
//! over every lag `1..=T-1` with the same `l / (L+1)` argument. A bandwidth
//! of zero still means no lags.
//!
//! and reports `sqrt(Ω / T)`.
//!
//! # References
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use crate::kernel::{BandwidthRule, KernelType};
use crate::{HacError, HacEstimator};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// HAC estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HacConfig {
    /// Kernel used to weight lagged autocovariances (default: Bartlett)
    pub kernel: KernelType,

    /// Number of lags (None = automatic selection via `bandwidth_rule`)
    pub lags: Option<usize>,

    /// Rule used when `lags` is None (default: Newey-West rule of thumb)
    pub bandwidth_rule: BandwidthRule,

    /// Minimum number of observations required (default: 2)
    pub min_observations: usize,
}

impl Default for HacConfig {
    fn default() -> Self {
        Self {
            kernel: KernelType::Bartlett,
            lags: None,
            bandwidth_rule: BandwidthRule::NeweyWest,
            min_observations: 2,
        }
    }
}

/// Newey-West HAC standard error estimator
#[derive(Debug, Clone, Default)]
pub struct NeweyWestEstimator {
    config: HacConfig,
}

impl NeweyWestEstimator {
    /// Create a new estimator with the given configuration
    pub const fn new(config: HacConfig) -> Self {
        Self { config }
    }

    /// Estimator with a fixed number of lags and the Bartlett kernel
    pub fn with_lags(lags: usize) -> Self {
        Self::new(HacConfig {
            lags: Some(lags),
            ..Default::default()
        })
    }

    /// The active configuration
    pub const fn config(&self) -> &HacConfig {
        &self.config
    }

    /// Bandwidth used for a `T x K` term matrix, truncated to `T - 1`
    pub fn bandwidth(&self, centered: &Array2<f64>) -> usize {
        let n_periods = centered.nrows();
        let lags = if self.config.kernel == KernelType::Iid {
            0
        } else {
            self.config
                .lags
                .unwrap_or_else(|| self.config.bandwidth_rule.select(self.config.kernel, centered))
        };
        lags.min(n_periods.saturating_sub(1))
    }

    /// Highest lag entering the sum. Kernels with bounded support stop at the
    /// bandwidth; the quadratic spectral kernel uses every lag up to `T - 1`.
    const fn summed_lags(&self, bandwidth: usize, n_periods: usize) -> usize {
        if bandwidth > 0 && !self.config.kernel.has_bounded_support() {
            n_periods - 1
        } else {
            bandwidth
        }
    }

    /// Long-run variance of each column mean, before scaling by `1/T`
    pub fn long_run_variances(&self, terms: &Array2<f64>) -> Result<Array1<f64>, HacError> {
        let (n_periods, n_columns) = terms.dim();

        let required = self.config.min_observations.max(2);
        if n_periods < required {
            return Err(HacError::InsufficientData {
                required,
                actual: n_periods,
            });
        }
        if n_columns == 0 {
            return Err(HacError::EmptyInput);
        }
        if terms.iter().any(|x| !x.is_finite()) {
            return Err(HacError::NonFinite);
        }

        let centered = center_columns(terms);
        let bandwidth = self.bandwidth(&centered);
        let max_lag = self.summed_lags(bandwidth, n_periods);
        trace!(n_periods, n_columns, bandwidth, max_lag, kernel = ?self.config.kernel, "HAC bandwidth");

        let weights: Vec<f64> = (1..=max_lag)
            .map(|lag| self.config.kernel.weight(lag as f64 / (bandwidth as f64 + 1.0)))
            .collect();

        let variances = centered
            .columns()
            .into_iter()
            .map(|column| {
                let mut omega = autocovariance(column, 0);
                for (lag, weight) in (1..=max_lag).zip(weights.iter()) {
                    omega += 2.0 * weight * autocovariance(column, lag);
                }
                omega
            })
            .collect();

        Ok(variances)
    }
}

impl HacEstimator for NeweyWestEstimator {
    fn standard_errors(&self, terms: &Array2<f64>) -> Result<Array1<f64>, HacError> {
        let n_periods = terms.nrows() as f64;
        let variances = self.long_run_variances(terms)?;
        // QS weights and rounding can leave Ω marginally negative
        Ok(variances.mapv(|omega| (omega.max(0.0) / n_periods).sqrt()))
    }
}

/// Subtract each column's sample mean
fn center_columns(terms: &Array2<f64>) -> Array2<f64> {
    let n_periods = terms.nrows() as f64;
    let means = terms.sum_axis(Axis(0)) / n_periods;
    terms - &means
}

/// Lag-`l` autocovariance normalised by `T` (not `T - l`)
fn autocovariance(column: ArrayView1<'_, f64>, lag: usize) -> f64 {
    let n_periods = column.len();
    let mut sum = 0.0;
    for t in lag..n_periods {
        sum += column[t] * column[t - lag];
    }
    sum / n_periods as f64
}
