//! Temporally correlated 2-D noise for opponent locomotion.
//!
//! [`NoiseProcess`] produces samples whose power spectrum falls off as
//! 1/f². For that exponent the spectral process is exactly Brownian
//! noise, so each channel buffer is generated as the cumulative sum of
//! Gaussian white increments (Box–Muller, avoiding a `rand_distr`
//! dependency), standardized to zero mean and unit variance, then
//! scaled by a fixed gain.
//!
//! Buffers are fixed-length and refill transparently when exhausted;
//! callers never observe starvation. Output is deterministic for a
//! given RNG stream.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Samples generated per channel before a refill.
pub const CHUNK_LEN: usize = 2000;

/// Gain applied to the standardized noise.
pub const GAIN: f64 = 10.0;

/// A restartable correlated-noise generator with two channels
/// (linear and angular velocity perturbations).
#[derive(Debug)]
pub struct NoiseProcess {
    rng: ChaCha8Rng,
    channels: [Vec<f64>; 2],
    cursor: usize,
    chunk_len: usize,
    gain: f64,
}

impl NoiseProcess {
    /// Create a process with the default buffer length and gain,
    /// consuming the given RNG as its private stream.
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self::with_params(rng, CHUNK_LEN, GAIN)
    }

    /// Create a process with explicit buffer length and gain.
    /// `chunk_len` must be at least 2 (standardization needs variance).
    pub fn with_params(rng: ChaCha8Rng, chunk_len: usize, gain: f64) -> Self {
        let mut process = Self {
            rng,
            channels: [Vec::new(), Vec::new()],
            cursor: 0,
            chunk_len: chunk_len.max(2),
            gain,
        };
        process.refill();
        process
    }

    /// Next 2-D sample: `(δ_linear, δ_angular)`.
    pub fn sample(&mut self) -> [f64; 2] {
        if self.cursor >= self.chunk_len {
            self.refill();
        }
        let out = [self.channels[0][self.cursor], self.channels[1][self.cursor]];
        self.cursor += 1;
        out
    }

    fn refill(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
            let mut level = 0.0;
            for _ in 0..self.chunk_len {
                level += standard_normal(&mut self.rng);
                channel.push(level);
            }
            standardize(channel);
            for v in channel.iter_mut() {
                *v *= self.gain;
            }
        }
        self.cursor = 0;
    }
}

/// One standard-normal sample via the Box–Muller transform.
/// Avoids a `rand_distr` dependency.
pub fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-300); // avoid ln(0)
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Shift to zero mean and rescale to unit variance in place.
fn standardize(buf: &mut [f64]) {
    let n = buf.len() as f64;
    let mean = buf.iter().sum::<f64>() / n;
    let var = buf.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        for v in buf.iter_mut() {
            *v = (*v - mean) / std;
        }
    }
}
