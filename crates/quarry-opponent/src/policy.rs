//! Opponent motion policies and their episode-level sampling weights.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Discrete opponent motion policy, drawn once per episode.
///
/// Dispatch is an exhaustive match everywhere, so adding a variant is a
/// compile-time event rather than a stringly-typed runtime surprise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpponentPolicy {
    /// Never moves and spawns at the fixed pose `(0, -5, 0)`,
    /// overriding the usual random placement.
    StaticStationary,
    /// Never moves, but spawns at a random pose like the others.
    Stationary,
    /// Wanders under correlated random velocity commands.
    Random,
}

/// Per-episode sampling weights for the three policies.
///
/// Must be finite, non-negative, and sum to 1 (within 1e-6). Requiring
/// an exact simplex closes the silent dead zone a sub-unit sum would
/// leave in the sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyProbabilities {
    /// Weight of [`OpponentPolicy::StaticStationary`].
    pub static_stationary: f64,
    /// Weight of [`OpponentPolicy::Stationary`].
    pub stationary: f64,
    /// Weight of [`OpponentPolicy::Random`].
    pub random: f64,
}

impl Default for PolicyProbabilities {
    fn default() -> Self {
        Self {
            static_stationary: 0.1,
            stationary: 0.45,
            random: 0.45,
        }
    }
}

impl PolicyProbabilities {
    /// Check the simplex invariant.
    ///
    /// # Errors
    ///
    /// Returns a description of the violation if any weight is
    /// non-finite or negative, or the weights do not sum to 1.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.static_stationary, self.stationary, self.random];
        for (name, w) in ["static_stationary", "stationary", "random"]
            .iter()
            .zip(weights)
        {
            if !w.is_finite() || w < 0.0 {
                return Err(format!(
                    "policy probability '{name}' must be finite and >= 0, got {w}"
                ));
            }
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("policy probabilities must sum to 1, got {sum}"));
        }
        Ok(())
    }

    /// Draw a policy according to the weights. Assumes [`validate`]
    /// passed, so the cumulative intervals cover the unit line.
    ///
    /// [`validate`]: PolicyProbabilities::validate
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> OpponentPolicy {
        let r: f64 = rng.gen();
        if r < self.static_stationary {
            OpponentPolicy::StaticStationary
        } else if r < self.static_stationary + self.stationary {
            OpponentPolicy::Stationary
        } else {
            OpponentPolicy::Random
        }
    }
}
