//! Misspecification-robust (KRS) risk premia
//!
//! GLS cross-sectional regression with an explicit weighting matrix `W`:
//!
//! ```text
//! λ = (β^T W^{-1} β)^{-1} β^T W^{-1} μ
//! ```
//!
//! The standard errors use the return covariance `V` as weighting matrix.
//! With `H = (β^T V^{-1} β)^{-1}`, `A = H β^T V^{-1}` and
//! `e = V^{-1} (μ - β λ)`, the period-`t` influence term is
//!
//! ```text
//! term1_t = A r̃_t
//! term2_t = H Σ_f^{-1} f̃_t * (r̃_t^T e)
//! term3_t = A r̃_t * (r̃_t^T e)
//! term4_t = (A r̃_t - f̃_t) * (f̃_t^T Σ_f^{-1} A μ)
//! ψ_t     = term1_t + term2_t - term3_t - term4_t
//! ```
//!
//! # References
//! - Kan, R., Robotti, C., & Shanken, J. (2013). "Pricing Model Performance
//!   and the Two-Pass Cross-Sectional Regression Methodology."
//!   Journal of Finance, 68(6), 2617-2649.

use super::{StandardErrorInputs, scale_rows};
use crate::linalg::{inverse_spd, solve_spd, solve_spd_vec};
use crate::validation::{expect_len, expect_shape};
use crate::EstimationError;
use ndarray::{Array1, Array2};
use premia_hac::HacEstimator;

/// GLS cross-sectional regression of mean returns on loadings
pub fn krs_risk_premia(
    beta: &Array2<f64>,
    mean_returns: &Array1<f64>,
    weighting_matrix: &Array2<f64>,
) -> Result<Array1<f64>, EstimationError> {
    let n_assets = beta.nrows();
    expect_len(mean_returns, n_assets, "mean returns")?;
    expect_shape(weighting_matrix, n_assets, n_assets, "weighting matrix")?;

    // W^{-1} β, transposed to β^T W^{-1}
    let beta_t_wei_mat_inv = solve_spd(weighting_matrix, beta, "weighting matrix")?.reversed_axes();

    solve_spd_vec(
        &beta_t_wei_mat_inv.dot(beta),
        &beta_t_wei_mat_inv.dot(mean_returns),
        "weighted loadings Gram matrix",
    )
}

/// Per-period influence terms of the KRS estimator (T x K)
pub fn krs_influence(inputs: &StandardErrorInputs<'_>) -> Result<Array2<f64>, EstimationError> {
    let beta = inputs.beta;
    let mean_returns = &inputs.moments.mean_returns;
    let variance_returns = &inputs.moments.covariance_returns;

    let var_ret_inv_beta = solve_spd(variance_returns, beta, "return covariance")?;
    let weighted_gram = beta.t().dot(&var_ret_inv_beta);
    let a_matrix = solve_spd(
        &weighted_gram,
        &var_ret_inv_beta.t().to_owned(),
        "weighted loadings Gram matrix",
    )?;

    let returns_centred = inputs.returns_centred();
    let factors_centred = inputs.factors_centred();

    let term1 = returns_centred.dot(&a_matrix.t());

    let var_ret_inv_mean_ret = solve_spd_vec(variance_returns, mean_returns, "return covariance")?;
    let var_fac_inv = inverse_spd(&inputs.moments.covariance_factors, "factor covariance")?;
    let hkrs_var_fac_inv = solve_spd(&weighted_gram, &var_fac_inv, "weighted loadings Gram matrix")?;

    let var_ret_inv_err = var_ret_inv_mean_ret - var_ret_inv_beta.dot(inputs.risk_premia);
    let error_weights = returns_centred.dot(&var_ret_inv_err);

    let term2 = scale_rows(&factors_centred.dot(&hkrs_var_fac_inv.t()), &error_weights);
    let term3 = scale_rows(&term1, &error_weights);

    let premia_weights = factors_centred.dot(&var_fac_inv.dot(&a_matrix.dot(mean_returns)));
    let term4 = scale_rows(&(&term1 - &factors_centred), &premia_weights);

    Ok(term1 + term2 - term3 - term4)
}

/// HAC standard errors of the KRS risk premia
pub fn krs_standard_errors<H>(
    inputs: &StandardErrorInputs<'_>,
    hac: &H,
) -> Result<Array1<f64>, EstimationError>
where
    H: HacEstimator + ?Sized,
{
    super::Estimator::Krs.standard_errors(inputs, hac)
}
