//! Simulated panels shared by the integration tests.

#![allow(dead_code, unreachable_pub)]

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

/// A panel generated as `r_t = β (f_t + λ) + ε_t` with i.i.d. standard
/// normal factors, so that expected returns equal `β λ` exactly.
pub struct SimulatedPanel {
    pub returns: Array2<f64>,
    pub factors: Array2<f64>,
    pub beta: Array2<f64>,
    pub lambda: Array1<f64>,
    pub noise_sd: f64,
}

pub fn simulate(
    seed: u64,
    n_periods: usize,
    beta: Array2<f64>,
    lambda: Array1<f64>,
    noise_sd: f64,
) -> SimulatedPanel {
    let mut rng = StdRng::seed_from_u64(seed);
    let (n_assets, n_factors) = beta.dim();

    let factors =
        Array2::from_shape_fn((n_periods, n_factors), |_| rng.sample::<f64, _>(StandardNormal));
    let noise = Array2::from_shape_fn((n_periods, n_assets), |_| {
        noise_sd * rng.sample::<f64, _>(StandardNormal)
    });
    let returns = (&factors + &lambda).dot(&beta.t()) + noise;

    SimulatedPanel {
        returns,
        factors,
        beta,
        lambda,
        noise_sd,
    }
}

/// Random loadings with entries in `[-1.5, 1.5]`
pub fn random_beta(seed: u64, n_assets: usize, n_factors: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n_assets, n_factors), |_| rng.gen_range(-1.5..1.5))
}
