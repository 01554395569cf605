//! Command-line entry point for the BSM valuation report.
//!
//! Usage: `bsm_report [config.json]`. Without an argument the reference scenario
//! (S0=100, K=105, T=1, r=5%, σ=20%) is used. Log verbosity follows `RUST_LOG`.

use std::error::Error;

use bsmvol::config::ReportConfig;
use bsmvol::mc::{convergence_study, simulate_with};
use bsmvol::pricing::european::price_with_vega;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading report config");
            ReportConfig::from_path(&path)?
        }
        None => ReportConfig::default(),
    };
    let contract = config.contract;

    let closed_form = price_with_vega(&contract, config.sigma)?;
    let report = config.solver.solve(&contract, closed_form.value)?;
    let estimate = simulate_with(&contract, config.sigma, &config.monte_carlo)?;

    println!("BSM European call");
    println!(
        "  S0={:.4}  K={:.4}  T={:.4}  r={:.4}  sigma={:.4}",
        contract.spot, contract.strike, contract.maturity, contract.rate, config.sigma
    );
    println!("  closed form   {:>12.6}", closed_form.value);
    println!("  vega          {:>12.6}", closed_form.vega.unwrap_or(f64::NAN));
    println!(
        "  implied vol   {:>12.6}  ({} iterations, residual {:.2e}{})",
        report.sigma,
        report.iterations,
        report.residual,
        if report.converged { "" } else { ", NOT CONVERGED" }
    );
    println!(
        "  monte carlo   {:>12.6}  (stderr {:.6}, {} paths x {} steps, seed {})",
        estimate.price, estimate.stderr, estimate.paths, estimate.steps, config.monte_carlo.seed
    );

    if !config.convergence_paths.is_empty() {
        let points = convergence_study(
            &contract,
            config.sigma,
            &config.monte_carlo,
            &config.convergence_paths,
        )?;
        println!();
        println!(
            "  {:>10}  {:>12}  {:>10}  {:>10}",
            "paths", "estimate", "stderr", "abs err"
        );
        for p in points {
            println!(
                "  {:>10}  {:>12.6}  {:>10.6}  {:>10.6}",
                p.paths, p.estimate, p.stderr, p.abs_error
            );
        }
    }

    Ok(())
}
