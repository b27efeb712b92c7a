//! Fama-MacBeth style risk premia
//!
//! ```text
//! H = (β^T β)^{-1}        A = H β^T        λ = A μ
//! ```
//!
//! The period-`t` influence term combines three pieces:
//!
//! ```text
//! mean_t  = A r̃_t - A μ
//! beta_t  = (A r̃_t - A μ - f̃_t) * (f̃_t^T Σ_f^{-1} A μ)
//! error_t = H Σ_f^{-1} f̃_t * (r̃_t^T (μ - β λ))
//! ψ_t     = mean_t - beta_t + error_t
//! ```
//!
//! with `r̃_t = r_t - μ` and `f̃_t = f_t - μ_f`.

use super::{StandardErrorInputs, scale_rows};
use crate::linalg::{inverse_spd, solve_spd, solve_spd_vec};
use crate::validation::expect_len;
use crate::EstimationError;
use ndarray::{Array1, Array2};
use premia_hac::HacEstimator;

/// OLS cross-sectional regression of mean returns on loadings, no intercept
pub fn fm_risk_premia(
    beta: &Array2<f64>,
    mean_returns: &Array1<f64>,
) -> Result<Array1<f64>, EstimationError> {
    expect_len(mean_returns, beta.nrows(), "mean returns")?;
    let gram = beta.t().dot(beta);
    solve_spd_vec(&gram, &beta.t().dot(mean_returns), "loadings Gram matrix")
}

/// Per-period influence terms of the FM estimator (T x K)
pub fn fm_influence(inputs: &StandardErrorInputs<'_>) -> Result<Array2<f64>, EstimationError> {
    let beta = inputs.beta;
    let mean_returns = &inputs.moments.mean_returns;
    let mean_factors = &inputs.moments.mean_factors;
    let variance_factors = &inputs.moments.covariance_factors;

    let h_matrix = inverse_spd(&beta.t().dot(beta), "loadings Gram matrix")?;
    let a_matrix = h_matrix.dot(&beta.t());

    let returns_centred = inputs.returns_centred();
    let factors_centred = inputs.factors_centred();

    let gamma = returns_centred.dot(&a_matrix.t());
    let gamma_true = a_matrix.dot(mean_returns);

    // φ_t = γ_t - f_t, centred at γ - μ_f
    let phi_centred = &gamma - inputs.factors - &(&gamma_true - mean_factors);

    let fac_centred_var_fac_inv =
        solve_spd(variance_factors, &factors_centred.t().to_owned(), "factor covariance")?
            .reversed_axes();

    let pricing_errors = mean_returns - &beta.dot(inputs.risk_premia);
    let error_weights = returns_centred.dot(&pricing_errors);

    let mean_term = &gamma - &gamma_true;
    let beta_weights =
        factors_centred.dot(&solve_spd_vec(variance_factors, &gamma_true, "factor covariance")?);
    let beta_term = scale_rows(&phi_centred, &beta_weights);
    let error_term = scale_rows(&fac_centred_var_fac_inv, &error_weights).dot(&h_matrix);

    Ok(mean_term - beta_term + error_term)
}

/// HAC standard errors of the FM risk premia
pub fn fm_standard_errors<H>(
    inputs: &StandardErrorInputs<'_>,
    hac: &H,
) -> Result<Array1<f64>, EstimationError>
where
    H: HacEstimator + ?Sized,
{
    super::Estimator::Fm.standard_errors(inputs, hac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadings::loadings;
    use crate::moments::Moments;
    use approx::assert_relative_eq;
    use ndarray::array;
    use premia_hac::NeweyWestEstimator;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rand_distr::StandardNormal;

    #[test]
    fn test_recovers_exact_premia() {
        let beta = array![[1.0, 0.2], [0.5, 1.1], [1.4, -0.3], [0.9, 0.7], [0.1, 1.6]];
        let lambda_true = array![0.006, -0.002];
        let mean_returns = beta.dot(&lambda_true);

        let lambda = fm_risk_premia(&beta, &mean_returns).unwrap();
        assert_relative_eq!(lambda[0], lambda_true[0], epsilon = 1e-14);
        assert_relative_eq!(lambda[1], lambda_true[1], epsilon = 1e-14);
    }

    #[test]
    fn test_rank_deficient_loadings() {
        let beta = array![[1.0, 2.0], [0.5, 1.0], [2.0, 4.0]];
        let mean_returns = array![0.1, 0.05, 0.2];
        assert_eq!(
            fm_risk_premia(&beta, &mean_returns),
            Err(EstimationError::SingularMatrix("loadings Gram matrix"))
        );
    }

    #[test]
    fn test_influence_shape_and_standard_errors() {
        let mut rng = StdRng::seed_from_u64(21);
        let factors = Array2::from_shape_fn((150, 2), |_| rng.sample::<f64, _>(StandardNormal));
        let true_beta = array![[1.0, 0.3], [0.6, 1.2], [1.5, -0.4], [0.2, 0.9]];
        let noise = Array2::from_shape_fn((150, 4), |_| 0.3 * rng.sample::<f64, _>(StandardNormal));
        let returns = factors.dot(&true_beta.t()) + noise;

        let moments = Moments::from_panels(&returns, &factors).unwrap();
        let beta = loadings(&moments).unwrap();
        let lambda = fm_risk_premia(&beta, &moments.mean_returns).unwrap();
        let inputs = StandardErrorInputs {
            risk_premia: &lambda,
            returns: &returns,
            factors: &factors,
            beta: &beta,
            moments: &moments,
        };

        let terms = fm_influence(&inputs).unwrap();
        assert_eq!(terms.dim(), (150, 2));

        let se = fm_standard_errors(&inputs, &NeweyWestEstimator::default()).unwrap();
        assert_eq!(se.len(), 2);
        assert!(se.iter().all(|&s| s > 0.0 && s.is_finite()));
    }

    #[test]
    fn test_influence_composition() {
        // With a single asset-independent factor the three terms are easy to
        // rebuild by hand.
        let factors = array![[0.5], [-0.2], [0.9], [0.1], [-0.6], [0.3]];
        let returns = array![
            [0.40, 0.20],
            [-0.10, -0.05],
            [0.80, 0.50],
            [0.15, 0.00],
            [-0.50, -0.30],
            [0.20, 0.25],
        ];
        let moments = Moments::from_panels(&returns, &factors).unwrap();
        let beta = loadings(&moments).unwrap();
        let lambda = fm_risk_premia(&beta, &moments.mean_returns).unwrap();
        let inputs = StandardErrorInputs {
            risk_premia: &lambda,
            returns: &returns,
            factors: &factors,
            beta: &beta,
            moments: &moments,
        };
        let terms = fm_influence(&inputs).unwrap();

        let b = beta.column(0);
        let h = 1.0 / b.dot(&b);
        let a = &b * h;
        let mu = &moments.mean_returns;
        let mu_f = moments.mean_factors[0];
        let var_f = moments.covariance_factors[[0, 0]];
        let gamma_true = a.dot(mu);
        let err = mu - &(&b * lambda[0]);

        for t in 0..6 {
            let r_c = &returns.row(t) - mu;
            let f_c = factors[[t, 0]] - mu_f;
            let gamma = a.dot(&r_c);
            let mean_term = gamma - gamma_true;
            let beta_term = (gamma - gamma_true - f_c) * (f_c * gamma_true / var_f);
            let error_term = f_c / var_f * r_c.dot(&err) * h;
            assert_relative_eq!(
                terms[[t, 0]],
                mean_term - beta_term + error_term,
                epsilon = 1e-12
            );
        }
    }
}
