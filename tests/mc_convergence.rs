// Monte Carlo against the closed form for S0=100, K=105, T=1, r=5%, σ=20%.
// The log-space Euler step is exact for constant coefficients, so the only error left
// is sampling error.

use bsmvol::core::OptionContract;
use bsmvol::mc::{McConfig, convergence_study, simulate, simulate_with};
use bsmvol::pricing::european::price;

const CLOSED_FORM: f64 = 8.021_352_235_143;

fn scenario() -> OptionContract {
    OptionContract::new(100.0, 105.0, 1.0, 0.05)
}

#[test]
fn reference_scenario_lands_within_five_cents() {
    let config = McConfig::new(50, 250_000, 42).with_control_variate(true);
    let est = simulate_with(&scenario(), 0.2, &config).unwrap();
    assert_eq!(est.paths, 250_000);
    assert!(est.stderr < 0.02, "stderr={}", est.stderr);
    assert!(
        (est.price - CLOSED_FORM).abs() < 0.05,
        "price={} stderr={}",
        est.price,
        est.stderr
    );
}

#[test]
fn plain_estimator_stays_within_its_confidence_band() {
    let est = simulate_with(&scenario(), 0.2, &McConfig::new(50, 250_000, 42)).unwrap();
    assert!(est.stderr < 0.03, "stderr={}", est.stderr);
    assert!(
        (est.price - CLOSED_FORM).abs() < 4.0 * est.stderr,
        "price={} stderr={}",
        est.price,
        est.stderr
    );
}

#[test]
fn standard_error_scales_with_inverse_root_paths() {
    let base = McConfig::new(1, 1, 7);
    let points = convergence_study(&scenario(), 0.2, &base, &[10_000, 1_000_000]).unwrap();
    let ratio = points[0].stderr / points[1].stderr;
    assert!(ratio > 8.0 && ratio < 12.5, "ratio={ratio}");

    let last = points[1];
    assert!(last.abs_error <= 4.0 * last.stderr, "{last:?}");
    assert!(last.rel_error < 0.01);
}

#[test]
fn fixed_seed_reproduces_scalar_entry_point() {
    let a = simulate(100.0, 105.0, 1.0, 0.05, 0.2, 25, 20_000, 2024).unwrap();
    let b = simulate(100.0, 105.0, 1.0, 0.05, 0.2, 25, 20_000, 2024).unwrap();
    let c = simulate(100.0, 105.0, 1.0, 0.05, 0.2, 25, 20_000, 2025).unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
    assert_ne!(a, c);
}

#[test]
fn variance_reduction_keeps_estimates_unbiased() {
    let reference = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
    let base = McConfig::new(20, 50_000, 11);
    for config in [
        base.with_antithetic(true),
        base.with_moment_matching(true),
        base.with_antithetic(true).with_control_variate(true),
    ] {
        let est = simulate_with(&scenario(), 0.2, &config).unwrap();
        assert!(
            (est.price - reference).abs() < 4.0 * est.stderr + 1e-3,
            "config={config:?} est={est:?}"
        );
    }
}
