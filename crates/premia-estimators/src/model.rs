//! Single-shot risk premia estimation
//!
//! Runs the full pipeline on a returns/factors panel:
//!
//! ```text
//! moments -> loadings -> {FM | KRS} premia -> {FM | KRS} standard errors
//! ```
//!
//! The KRS estimator uses the sample return covariance as weighting matrix.

use crate::estimator::{Estimator, StandardErrorInputs};
use crate::loadings::loadings;
use crate::moments::Moments;
use crate::EstimationError;
use ndarray::{Array1, Array2};
use premia_hac::HacEstimator;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Cross-sectional estimator (default: FM)
    pub estimator: Estimator,

    /// Whether to compute HAC standard errors (default: true)
    pub include_standard_errors: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            estimator: Estimator::Fm,
            include_standard_errors: true,
        }
    }
}

impl EstimatorConfig {
    /// Configuration from the two boolean switches of the estimation entry point
    pub const fn from_flags(misspecification_robust: bool, include_standard_errors: bool) -> Self {
        Self {
            estimator: Estimator::from_robust(misspecification_robust),
            include_standard_errors,
        }
    }
}

/// Risk premia and, optionally, their standard errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPremiaResult {
    /// Estimator that produced the premia
    pub estimator: Estimator,
    /// One premium per factor (K)
    pub risk_premia: Array1<f64>,
    /// One standard error per factor (K), when requested
    pub standard_errors: Option<Array1<f64>>,
}

impl RiskPremiaResult {
    /// Number of factors
    pub fn n_factors(&self) -> usize {
        self.risk_premia.len()
    }

    /// Premium divided by standard error, when there is one standard error
    /// per premium
    pub fn t_statistics(&self) -> Option<Array1<f64>> {
        self.standard_errors
            .as_ref()
            .filter(|se| se.len() == self.risk_premia.len())
            .map(|se| &self.risk_premia / se)
    }
}

/// Factor risk premia estimator
#[derive(Debug, Clone, Default)]
pub struct FactorRiskPremia<H> {
    config: EstimatorConfig,
    hac: H,
}

impl<H: HacEstimator> FactorRiskPremia<H> {
    /// Create an estimator with the given configuration and HAC primitive
    pub const fn new(config: EstimatorConfig, hac: H) -> Self {
        Self { config, hac }
    }

    /// The active configuration
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// The HAC primitive used for standard errors
    pub const fn hac(&self) -> &H {
        &self.hac
    }

    /// Estimate risk premia from a `T x N` returns panel and `T x K` factors panel
    pub fn estimate(
        &self,
        returns: &Array2<f64>,
        factors: &Array2<f64>,
    ) -> Result<RiskPremiaResult, EstimationError> {
        let estimator = self.config.estimator;
        let moments = Moments::from_panels(returns, factors)?;
        let beta = loadings(&moments)?;

        debug!(
            estimator = estimator.name(),
            standard_errors = self.config.include_standard_errors,
            "estimating risk premia"
        );

        let risk_premia =
            estimator.risk_premia(&beta, &moments.mean_returns, Some(&moments.covariance_returns))?;

        let standard_errors = if self.config.include_standard_errors {
            let inputs = StandardErrorInputs {
                risk_premia: &risk_premia,
                returns,
                factors,
                beta: &beta,
                moments: &moments,
            };
            Some(estimator.standard_errors(&inputs, &self.hac)?)
        } else {
            None
        };

        Ok(RiskPremiaResult {
            estimator,
            risk_premia,
            standard_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};
    use premia_hac::{HacError, NeweyWestEstimator};
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rand_distr::StandardNormal;
    use rstest::rstest;

    fn simulated_panel(seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let factors = Array2::from_shape_fn((120, 2), |_| rng.sample::<f64, _>(StandardNormal));
        let beta = array![[1.0, 0.2], [0.4, 1.3], [1.2, -0.5], [0.7, 0.7], [0.2, 1.5]];
        let noise = Array2::from_shape_fn((120, 5), |_| 0.5 * rng.sample::<f64, _>(StandardNormal));
        (factors.dot(&beta.t()) + noise, factors)
    }

    #[test]
    fn test_config_from_flags() {
        let config = EstimatorConfig::from_flags(true, false);
        assert_eq!(config.estimator, Estimator::Krs);
        assert!(!config.include_standard_errors);

        let config = EstimatorConfig::default();
        assert_eq!(config.estimator, Estimator::Fm);
        assert!(config.include_standard_errors);
    }

    #[test]
    fn test_without_standard_errors() {
        let (returns, factors) = simulated_panel(1);
        let model = FactorRiskPremia::new(
            EstimatorConfig::from_flags(false, false),
            NeweyWestEstimator::default(),
        );

        let result = model.estimate(&returns, &factors).unwrap();
        assert_eq!(result.n_factors(), 2);
        assert!(result.standard_errors.is_none());
        assert!(result.t_statistics().is_none());
    }

    #[test]
    fn test_standard_errors_match_premia_length() {
        let (returns, factors) = simulated_panel(2);
        for robust in [false, true] {
            let model = FactorRiskPremia::new(
                EstimatorConfig::from_flags(robust, true),
                NeweyWestEstimator::default(),
            );
            let result = model.estimate(&returns, &factors).unwrap();
            let se = result.standard_errors.as_ref().unwrap();
            assert_eq!(se.len(), result.risk_premia.len());
            assert!(se.iter().all(|&s| s >= 0.0));

            let t = result.t_statistics().unwrap();
            assert_relative_eq!(t[0], result.risk_premia[0] / se[0]);
        }
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let (returns, factors) = simulated_panel(3);
        let model = FactorRiskPremia::new(
            EstimatorConfig::from_flags(true, true),
            NeweyWestEstimator::default(),
        );

        let first = model.estimate(&returns, &factors).unwrap();
        let second = model.estimate(&returns, &factors).unwrap();
        assert_eq!(first, second);
    }

    /// HAC primitive returning a fixed vector regardless of the input
    struct FixedOutput(Array1<f64>);

    impl HacEstimator for FixedOutput {
        fn standard_errors(&self, _terms: &Array2<f64>) -> Result<Array1<f64>, HacError> {
            Ok(self.0.clone())
        }
    }

    #[rstest]
    #[case(array![0.1], 1)]
    #[case(array![0.1, 0.1, 0.1], 3)]
    fn test_wrong_length_hac_output_rejected(#[case] output: Array1<f64>, #[case] actual: usize) {
        let (returns, factors) = simulated_panel(5);
        for robust in [false, true] {
            let model = FactorRiskPremia::new(
                EstimatorConfig::from_flags(robust, true),
                FixedOutput(output.clone()),
            );
            assert_eq!(
                model.estimate(&returns, &factors),
                Err(EstimationError::Hac(HacError::DimensionMismatch {
                    expected: 2,
                    actual
                }))
            );
        }
    }

    #[test]
    fn test_negative_hac_output_rejected() {
        let (returns, factors) = simulated_panel(6);
        let model =
            FactorRiskPremia::new(EstimatorConfig::default(), FixedOutput(array![0.1, -1.0]));
        assert_eq!(
            model.estimate(&returns, &factors),
            Err(EstimationError::Hac(HacError::InvalidStandardError {
                column: 1,
                value: -1.0
            }))
        );
    }

    #[test]
    fn test_t_statistics_need_matching_lengths() {
        let result = RiskPremiaResult {
            estimator: Estimator::Fm,
            risk_premia: array![0.2, 0.4],
            standard_errors: Some(array![0.1]),
        };
        assert!(result.t_statistics().is_none());
    }

    #[test]
    fn test_stub_hac_is_used() {
        let (returns, factors) = simulated_panel(4);
        let stub = |terms: &Array2<f64>| Array1::from_elem(terms.ncols(), 0.25);
        let model = FactorRiskPremia::new(EstimatorConfig::default(), stub);

        let result = model.estimate(&returns, &factors).unwrap();
        assert_eq!(result.standard_errors, Some(array![0.25, 0.25]));
    }
}
