//! HAC standard errors of a sample mean under serial correlation
//!
//! Simulates an AR(1) series and compares the i.i.d. standard error of its
//! mean with the kernel-weighted long-run estimates.

use ndarray::{Array2, Axis};
use premia_hac::{
    BandwidthRule, HacConfig, HacEstimator, KernelType, NeweyWestEstimator, newey_west_lags,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

fn main() {
    println!("==========================================================");
    println!("              HAC Standard Errors - Demo");
    println!("==========================================================\n");

    let n_periods = 500;
    let rho = 0.6;
    let mut rng = StdRng::seed_from_u64(7);

    let mut series = Array2::<f64>::zeros((n_periods, 1));
    for t in 1..n_periods {
        let shock: f64 = rng.sample(StandardNormal);
        series[[t, 0]] = rho * series[[t - 1, 0]] + shock;
    }

    println!("AR(1) series: T = {n_periods}, rho = {rho}");
    println!("Newey-West rule of thumb: {} lags\n", newey_west_lags(n_periods));

    println!("{:<20} {:<12} {:>8} {:>12}", "Kernel", "Rule", "Lags", "Std. error");
    println!("{}", "-".repeat(56));

    let kernels = [
        KernelType::Iid,
        KernelType::Bartlett,
        KernelType::Parzen,
        KernelType::QuadraticSpectral,
    ];
    for kernel in kernels {
        for rule in [BandwidthRule::NeweyWest, BandwidthRule::Andrews] {
            let estimator = NeweyWestEstimator::new(HacConfig {
                kernel,
                bandwidth_rule: rule,
                ..Default::default()
            });
            let mean = series.mean_axis(Axis(0)).unwrap();
            let centered = &series - &mean;
            let lags = estimator.bandwidth(&centered);
            let se = estimator.standard_errors(&series).unwrap();
            println!(
                "{:<20} {:<12} {:>8} {:>12.5}",
                format!("{kernel:?}"),
                format!("{rule:?}"),
                lags,
                se[0]
            );
        }
    }

    // Long-run standard deviation of an AR(1) mean: σ / (1 - ρ) / sqrt(T)
    let innovation_sd = 1.0;
    let theoretical = innovation_sd / (1.0 - rho) / (n_periods as f64).sqrt();
    println!("\nTheoretical long-run standard error: {theoretical:.5}");
}
