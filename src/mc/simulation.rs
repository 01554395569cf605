//! Path generation for the Monte Carlo estimator.
//!
//! Draws are produced one time step at a time for every path at once (a vector per
//! step), which keeps the loop count at `steps` and lets batch pricing and path
//! export consume the exact same normal sequence.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Geometric Brownian motion stepped exactly in log space.
///
/// `S_{t+Δt} = S_t exp((r - σ²/2)Δt + σ√Δt z)`.
#[derive(Debug, Clone, Copy)]
pub struct LogEulerGbm {
    log_drift: f64,
    log_diffusion: f64,
}

impl LogEulerGbm {
    pub fn new(rate: f64, sigma: f64, dt: f64) -> Self {
        Self {
            log_drift: (rate - 0.5 * sigma * sigma) * dt,
            log_diffusion: sigma * dt.sqrt(),
        }
    }

    #[inline]
    pub fn step(&self, s: f64, z: f64) -> f64 {
        s * (self.log_drift + self.log_diffusion * z).exp()
    }
}

/// Ordered index levels of one simulated path, `levels[0] = S0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    pub levels: Vec<f64>,
}

impl SimulationPath {
    /// Level at maturity.
    pub fn terminal(&self) -> f64 {
        self.levels.last().copied().unwrap_or(f64::NAN)
    }

    /// Number of time steps (levels minus one).
    pub fn steps(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

/// Seeded source of per-step standard normal vectors.
///
/// With antithetic sampling the vector holds `n/2` fresh draws followed by their
/// negatives, so path `j` and path `j + n/2` form a mirrored pair. Moment matching
/// rescales each step's vector to sample mean 0 and population standard deviation 1.
pub(crate) struct StepNormals {
    rng: StdRng,
    antithetic: bool,
    moment_matching: bool,
    buf: Vec<f64>,
}

impl StepNormals {
    /// `paths` must already be even when `antithetic` is set.
    pub(crate) fn new(seed: u64, paths: usize, antithetic: bool, moment_matching: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            antithetic,
            moment_matching,
            buf: vec![0.0; paths],
        }
    }

    pub(crate) fn next_step(&mut self) -> &[f64] {
        let n = self.buf.len();
        if self.antithetic {
            let half = n / 2;
            for i in 0..half {
                let z: f64 = StandardNormal.sample(&mut self.rng);
                self.buf[i] = z;
                self.buf[i + half] = -z;
            }
        } else {
            for z in self.buf.iter_mut() {
                *z = StandardNormal.sample(&mut self.rng);
            }
        }

        if self.moment_matching && n >= 2 {
            let mean = self.buf.iter().sum::<f64>() / n as f64;
            let var = self.buf.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
            let sd = var.sqrt();
            if sd > 0.0 {
                for z in self.buf.iter_mut() {
                    *z = (*z - mean) / sd;
                }
            }
        }

        &self.buf
    }
}
