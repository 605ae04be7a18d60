//! Terrain kinds and per-patch elevation synthesis.
//!
//! Every patch is a square `size × size` block of f32 elevation
//! samples, generated independently per regeneration call. The fill
//! normalizations divide by `(max − min)`; a constant-valued random
//! draw (probability ≈ 0) would divide by zero and is deliberately not
//! guarded.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::{FRAC_PI_2, PI};

/// Elevation span of a rough patch after normalization.
const ROUGH_SPAN: f32 = 0.08;
/// Downward offset of a rough patch: values land in `[-0.02, 0.06]`.
const ROUGH_OFFSET: f32 = 0.02;
/// Ripple frequency multiplier of a hilly patch.
const HILLY_FREQUENCY: f64 = 10.0;
/// Bounds of the per-call uniform amplitude of a hilly patch.
const HILLY_SCALAR_LO: f64 = 0.03;
const HILLY_SCALAR_HI: f64 = 0.23;

/// Procedural terrain kind of a single heightfield patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainKind {
    /// All-zero elevation.
    Flat,
    /// Uniform per-cell noise in `[-0.02, 0.06]`.
    Rough,
    /// A spatially correlated sinusoidal ripple with random amplitude
    /// and a 50% chance of a 90° rotation.
    Hilly,
}

impl TerrainKind {
    /// The kinds `regenerate` may select from.
    pub const SELECTABLE: [TerrainKind; 3] =
        [TerrainKind::Flat, TerrainKind::Rough, TerrainKind::Hilly];

    /// Draw a kind uniformly at random.
    pub fn sample(rng: &mut ChaCha8Rng) -> Self {
        let idx = ((rng.gen::<f64>() * Self::SELECTABLE.len() as f64) as usize)
            .min(Self::SELECTABLE.len() - 1);
        Self::SELECTABLE[idx]
    }

    /// Fill a `size × size` patch of this kind, row-major.
    pub fn fill(self, size: usize, rng: &mut ChaCha8Rng) -> Vec<f32> {
        match self {
            TerrainKind::Flat => vec![0.0; size * size],
            TerrainKind::Rough => rough_patch(size, rng),
            TerrainKind::Hilly => hilly_patch(size, rng),
        }
    }
}

/// Uniform noise in `[-0.5, 0.5]`, min-max normalized to `[0, 1]`,
/// then affine-mapped onto `[-0.02, 0.06]`.
fn rough_patch(size: usize, rng: &mut ChaCha8Rng) -> Vec<f32> {
    let raw: Vec<f64> = (0..size * size).map(|_| rng.gen::<f64>() - 0.5).collect();
    normalized(&raw)
        .into_iter()
        .map(|v| v * ROUGH_SPAN - ROUGH_OFFSET)
        .collect()
}

/// A sinusoidal ripple across the flattened patch, normalized to
/// `[0, 1]`, scaled by a uniform random amplitude, flipped on both
/// axes, and rotated 90° half the time for directional variety.
fn hilly_patch(size: usize, rng: &mut ChaCha8Rng) -> Vec<f32> {
    let n = size * size;
    let scalar = HILLY_SCALAR_LO + (HILLY_SCALAR_HI - HILLY_SCALAR_LO) * rng.gen::<f64>();
    let step = if n > 1 {
        HILLY_FREQUENCY * PI / (n - 1) as f64
    } else {
        0.0
    };
    let raw: Vec<f64> = (0..n)
        .map(|i| (i as f64 * step + FRAC_PI_2).sin() - 1.0)
        .collect();
    let scaled: Vec<f32> = normalized(&raw)
        .into_iter()
        .map(|v| v * scalar as f32)
        .collect();
    let flipped = flip_both(&scaled, size);
    if rng.gen::<f64>() < 0.5 {
        rot90(&flipped, size)
    } else {
        flipped
    }
}

/// Min-max normalize onto `[0, 1]`.
fn normalized(raw: &[f64]) -> Vec<f32> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    raw.iter().map(|v| ((v - min) / span) as f32).collect()
}

/// Reverse both axes of a row-major square block.
fn flip_both(data: &[f32], size: usize) -> Vec<f32> {
    let mut out = vec![0.0; size * size];
    for r in 0..size {
        for c in 0..size {
            out[r * size + c] = data[(size - 1 - r) * size + (size - 1 - c)];
        }
    }
    out
}

/// Rotate a row-major square block 90° counterclockwise.
fn rot90(data: &[f32], size: usize) -> Vec<f32> {
    let mut out = vec![0.0; size * size];
    for r in 0..size {
        for c in 0..size {
            out[r * size + c] = data[c * size + (size - 1 - r)];
        }
    }
    out
}
