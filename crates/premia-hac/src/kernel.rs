//! Kernel weights and bandwidth selection
//!
//! The long-run variance of a series is a weighted sum of its
//! autocovariances. The kernel fixes the shape of those weights and the
//! bandwidth `L` fixes how many lags receive a non-zero weight:
//!
//! ```text
//! Ω = Γ_0 + Σ_{l=1}^{L} w(l / (L + 1)) * (Γ_l + Γ_l^T)
//! ```
//!
//! # References
//! - Newey, W. K., & West, K. D. (1994). "Automatic Lag Selection in
//!   Covariance Matrix Estimation." Review of Economic Studies, 61(4), 631-653.
//! - Andrews, D. W. K. (1991). "Heteroskedasticity and Autocorrelation
//!   Consistent Covariance Matrix Estimation." Econometrica, 59(3), 817-858.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// AR(1) coefficients this close to a unit root abort the plug-in rule.
const UNIT_ROOT_MARGIN: f64 = 1e-6;

/// Smallest admissible denominator in the Andrews plug-in ratio.
const PLUG_IN_TOLERANCE: f64 = 1e-12;

/// Kernel used to taper lagged autocovariances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelType {
    /// No serial correlation: only lag 0 contributes
    Iid,
    /// Triangular (Newey-West) kernel
    #[default]
    Bartlett,
    /// Parzen kernel, smoother down-weighting of high lags
    Parzen,
    /// Quadratic spectral kernel
    QuadraticSpectral,
}

impl KernelType {
    /// Evaluate the kernel at taper argument `x`, typically `l / (L + 1)`
    pub fn weight(&self, x: f64) -> f64 {
        let abs_x = x.abs();
        match self {
            Self::Iid => {
                if x == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Bartlett => {
                if abs_x <= 1.0 {
                    1.0 - abs_x
                } else {
                    0.0
                }
            }
            Self::Parzen => {
                if abs_x <= 0.5 {
                    1.0 - 6.0 * abs_x.powi(2) + 6.0 * abs_x.powi(3)
                } else if abs_x <= 1.0 {
                    2.0 * (1.0 - abs_x).powi(3)
                } else {
                    0.0
                }
            }
            Self::QuadraticSpectral => {
                if x == 0.0 {
                    1.0
                } else {
                    let pi_x = std::f64::consts::PI * x;
                    let z = 6.0 * pi_x / 5.0;
                    25.0 / (12.0 * pi_x.powi(2)) * (z.sin() / z - z.cos())
                }
            }
        }
    }

    /// Whether the weight is zero for `|x| > 1`
    pub const fn has_bounded_support(&self) -> bool {
        !matches!(self, Self::QuadraticSpectral)
    }

    /// Characteristic exponent `q` used by the Andrews plug-in rule
    const fn characteristic_exponent(&self) -> Option<u32> {
        match self {
            Self::Iid => None,
            Self::Bartlett => Some(1),
            Self::Parzen | Self::QuadraticSpectral => Some(2),
        }
    }

    /// Scaling constant and growth exponent of the Andrews bandwidth
    const fn andrews_constants(&self) -> (f64, f64) {
        match self {
            Self::Iid => (0.0, 0.0),
            Self::Bartlett => (1.1447, 1.0 / 3.0),
            Self::Parzen => (2.6614, 1.0 / 5.0),
            Self::QuadraticSpectral => (1.3221, 1.0 / 5.0),
        }
    }
}

/// Automatic bandwidth selection rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandwidthRule {
    /// Rule of thumb `ceil(4 * (T/100)^(2/9))`
    #[default]
    NeweyWest,
    /// AR(1) plug-in rule of Andrews (1991)
    Andrews,
}

impl BandwidthRule {
    /// Select a bandwidth for the `T x K` series matrix.
    ///
    /// The result is not truncated; callers clamp it to `T - 1`.
    pub fn select(&self, kernel: KernelType, series: &Array2<f64>) -> usize {
        if kernel == KernelType::Iid {
            return 0;
        }

        let n_periods = series.nrows() as f64;
        match self {
            Self::NeweyWest => newey_west_lags(series.nrows()),
            Self::Andrews => {
                let fallback = n_periods.powf(0.25).round() as usize;
                let Some(q) = kernel.characteristic_exponent() else {
                    return 0;
                };
                match andrews_alpha(series, q) {
                    Some(alpha) => {
                        let (scale, exponent) = kernel.andrews_constants();
                        (scale * (n_periods * alpha).powf(exponent)).round() as usize
                    }
                    None => fallback,
                }
            }
        }
    }
}

/// Rule-of-thumb lag length `ceil(4 * (T/100)^(2/9))`
pub fn newey_west_lags(n_periods: usize) -> usize {
    let t = n_periods as f64;
    (4.0 * (t / 100.0).powf(2.0 / 9.0)).ceil() as usize
}

/// Andrews `α(q)` aggregated over columns with equal weights.
///
/// Returns `None` when any column is too close to a unit root or the
/// aggregate denominator vanishes; the caller falls back to `T^{1/4}`.
fn andrews_alpha(series: &Array2<f64>, q: u32) -> Option<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for column in series.columns() {
        let (phi, sigma2) = fit_ar1(column)?;
        if phi.abs() >= 1.0 - UNIT_ROOT_MARGIN {
            return None;
        }

        let sigma4 = sigma2 * sigma2;
        let phi2 = phi * phi;
        numerator += match q {
            1 => 4.0 * phi2 * sigma4 / ((1.0 - phi).powi(6) * (1.0 + phi).powi(2)),
            _ => 4.0 * phi2 * sigma4 / (1.0 - phi).powi(8),
        };
        denominator += sigma4 / (1.0 - phi).powi(4);
    }

    if denominator < PLUG_IN_TOLERANCE {
        return None;
    }
    Some(numerator / denominator)
}

/// Least-squares AR(1) fit with intercept, returning `(phi, sigma^2)`
fn fit_ar1(column: ArrayView1<'_, f64>) -> Option<(f64, f64)> {
    let n = column.len();
    if n < 3 {
        return None;
    }

    let current = column.slice(ndarray::s![1..]);
    let lagged = column.slice(ndarray::s![..n - 1]);
    let mean_current = current.mean()?;
    let mean_lagged = lagged.mean()?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (y, x) in current.iter().zip(lagged.iter()) {
        sxy += (x - mean_lagged) * (y - mean_current);
        sxx += (x - mean_lagged).powi(2);
    }
    if sxx < PLUG_IN_TOLERANCE {
        return None;
    }

    let phi = sxy / sxx;
    let intercept = mean_current - phi * mean_lagged;
    let ssr: f64 = current
        .iter()
        .zip(lagged.iter())
        .map(|(y, x)| (y - intercept - phi * x).powi(2))
        .sum();

    Some((phi, ssr / (n - 2) as f64))
}
