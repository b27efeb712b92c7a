#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/premia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod elimination;
pub mod error;
pub mod estimator;
pub mod linalg;
pub mod loadings;
pub mod model;
pub mod moments;
pub mod validation;

// Re-export main types
pub use elimination::{
    EliminationConfig, EliminationInputs, EliminationOutcome, EliminationStatus, EliminationStep,
    IterativeElimination, bonferroni_critical_value,
};
pub use error::EstimationError;
pub use estimator::{Estimator, StandardErrorInputs};
pub use loadings::loadings;
pub use model::{EstimatorConfig, FactorRiskPremia, RiskPremiaResult};
pub use moments::Moments;
