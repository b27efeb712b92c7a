#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/premia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use premia_estimators as estimators;
pub use premia_hac as hac;
pub use premia_output as output;

// Re-export the estimation entry points
pub use premia_estimators::{
    EliminationConfig, EliminationInputs, EliminationOutcome, EstimationError, Estimator,
    EstimatorConfig, FactorRiskPremia, IterativeElimination, RiskPremiaResult,
};
pub use premia_hac::{HacConfig, HacEstimator, KernelType, NeweyWestEstimator};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports_are_wired() {
        let model = FactorRiskPremia::new(EstimatorConfig::default(), NeweyWestEstimator::default());
        let err = model
            .estimate(&Array2::zeros((3, 4)), &Array2::zeros((3, 1)))
            .unwrap_err();
        assert!(matches!(err, EstimationError::InsufficientObservations { .. }));
    }
}
