//! Estimation errors

use premia_hac::HacError;
use thiserror::Error;

/// Errors that can occur while estimating risk premia
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    /// Two inputs disagree on a shared extent
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which extent was checked
        what: &'static str,
        /// Expected extent
        expected: usize,
        /// Actual extent
        actual: usize,
    },

    /// Too few periods for the number of assets or factors
    #[error("Insufficient observations: need more than {required} periods, got {observations}")]
    InsufficientObservations {
        /// Number of periods supplied
        observations: usize,
        /// Largest of the asset and factor counts
        required: usize,
    },

    /// A panel has no rows or no columns
    #[error("Empty input: {0}")]
    EmptyPanel(&'static str),

    /// A factor index is out of range
    #[error("Factor index {index} out of range for {n_factors} factors")]
    FactorIndex {
        /// The offending index
        index: usize,
        /// Number of factors available
        n_factors: usize,
    },

    /// A required input was not supplied
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// A panel contains NaN or infinite values
    #[error("Non-finite values in {0}")]
    NonFinite(&'static str),

    /// A symmetric positive-definite solve failed
    #[error("Matrix is singular or not positive definite: {0}")]
    SingularMatrix(&'static str),

    /// Significance level outside (0, 1]
    #[error("Invalid significance level: {0} (must be in (0, 1])")]
    InvalidSignificance(f64),

    /// The HAC primitive failed
    #[error("HAC error: {0}")]
    Hac(#[from] HacError),
}
