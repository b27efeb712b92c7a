//! Risk premia estimation and factor elimination on a simulated panel
//!
//! Three factors drive ten portfolios. Two carry a premium, the third is
//! priced at zero. The demo estimates premia with both estimators and then
//! runs the iterative elimination to recover the priced subset.

use ndarray::{Array1, Array2, Axis};
use premia_estimators::{
    EliminationConfig, EliminationInputs, EstimatorConfig, FactorRiskPremia,
    IterativeElimination,
};
use premia_hac::NeweyWestEstimator;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

fn simulate_panel(n_periods: usize, lambda: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(2013);
    let n_assets = 10;
    let n_factors = lambda.len();

    let beta = Array2::from_shape_fn((n_assets, n_factors), |_| rng.gen_range(-0.5..1.5));
    let factors =
        Array2::from_shape_fn((n_periods, n_factors), |_| rng.sample::<f64, _>(StandardNormal));
    let noise = Array2::from_shape_fn((n_periods, n_assets), |_| {
        0.8 * rng.sample::<f64, _>(StandardNormal)
    });

    ((&factors + lambda).dot(&beta.t()) + noise, factors)
}

fn main() {
    println!("==========================================================");
    println!("          Factor Risk Premia - Estimation Demo");
    println!("==========================================================\n");

    let lambda = ndarray::array![0.30, -0.20, 0.0];
    let (returns, factors) = simulate_panel(360, &lambda);
    println!(
        "Panel: {} periods, {} assets, {} factors",
        returns.nrows(),
        returns.ncols(),
        factors.ncols()
    );
    println!("True premia: {lambda}\n");

    for robust in [false, true] {
        let model = FactorRiskPremia::new(
            EstimatorConfig::from_flags(robust, true),
            NeweyWestEstimator::default(),
        );
        let result = model.estimate(&returns, &factors).unwrap();
        let se = result.standard_errors.clone().unwrap();
        let t = result.t_statistics().unwrap();

        println!("{} estimator", result.estimator.name());
        println!("{:<8} {:>10} {:>10} {:>8}", "Factor", "Premium", "Std. err", "t");
        for k in 0..result.n_factors() {
            println!(
                "{:<8} {:>10.4} {:>10.4} {:>8.2}",
                k, result.risk_premia[k], se[k], t[k]
            );
        }
        println!();
    }

    let inputs = EliminationInputs::from_panels(&returns, &factors).unwrap();
    let elimination =
        IterativeElimination::new(EliminationConfig::default(), NeweyWestEstimator::default());
    let outcome = elimination.run(&inputs).unwrap();

    println!(
        "Elimination (alpha = {}, critical value {:.3})",
        elimination.config().alpha,
        outcome.critical_value
    );
    for step in &outcome.steps {
        println!(
            "  removed factor {} from {:?} (t = {:.2})",
            step.removed, step.retained_before, step.t_statistic
        );
    }
    println!("  status: {:?}, retained: {:?}", outcome.status, outcome.retained);

    if !outcome.is_empty() {
        let model = FactorRiskPremia::new(
            EstimatorConfig::from_flags(true, true),
            NeweyWestEstimator::default(),
        );
        let retained = factors.select(Axis(1), &outcome.retained);
        let result = model.estimate(&returns, &retained).unwrap();
        println!("  final KRS premia: {}", result.risk_premia);
    }
}
