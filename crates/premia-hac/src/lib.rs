#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/premia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod kernel;
pub mod newey_west;

pub use kernel::{BandwidthRule, KernelType, newey_west_lags};
pub use newey_west::{HacConfig, NeweyWestEstimator};

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors that can occur during HAC estimation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HacError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// The term matrix has no columns
    #[error("Term matrix has no columns")]
    EmptyInput,

    /// The term matrix contains NaN or infinite values
    #[error("Term matrix contains non-finite values")]
    NonFinite,

    /// Estimator output does not have one entry per column
    #[error("Dimension mismatch: expected {expected} standard errors, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A standard error is negative or NaN
    #[error("Invalid standard error {value} in column {column}")]
    InvalidStandardError {
        /// Column of the offending entry
        column: usize,
        /// The value returned
        value: f64,
    },
}

/// Check that `standard_errors` holds one non-negative value per column of
/// a term matrix with `n_columns` columns.
pub fn check_standard_errors(
    standard_errors: &Array1<f64>,
    n_columns: usize,
) -> Result<(), HacError> {
    if standard_errors.len() != n_columns {
        return Err(HacError::DimensionMismatch {
            expected: n_columns,
            actual: standard_errors.len(),
        });
    }
    match standard_errors.iter().position(|&se| se.is_nan() || se < 0.0) {
        Some(column) => Err(HacError::InvalidStandardError {
            column,
            value: standard_errors[column],
        }),
        None => Ok(()),
    }
}

/// Capability that turns per-period terms into standard errors.
///
/// The input is a `T x K` matrix whose row `t` holds the period-`t`
/// contribution of each of `K` estimating equations. The output holds one
/// non-negative standard error per column.
pub trait HacEstimator {
    /// Compute one standard error per column of `terms`
    fn standard_errors(&self, terms: &Array2<f64>) -> Result<Array1<f64>, HacError>;
}

impl<F> HacEstimator for F
where
    F: Fn(&Array2<f64>) -> Array1<f64>,
{
    fn standard_errors(&self, terms: &Array2<f64>) -> Result<Array1<f64>, HacError> {
        let standard_errors = self(terms);
        check_standard_errors(&standard_errors, terms.ncols())?;
        Ok(standard_errors)
    }
}
