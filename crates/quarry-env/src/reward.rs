//! Reward terms, weights, and the per-step record.
//!
//! The environment computes every term unweighted each step and keeps
//! the weighted sum separate, so callers can inspect or re-weight the
//! components without re-simulating.

/// Weight applied to each unweighted reward term.
///
/// The defaults penalize distance and a lost episode; the activation
/// and sparse terms are reported but weightless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardWeights {
    /// Weight of the mean actuator activation magnitude.
    pub act_reg: f64,
    /// Weight of the planar agent-to-opponent distance.
    pub distance: f64,
    /// Weight of the lose flag.
    pub lose: f64,
    /// Weight of the time-discounted win score.
    pub sparse: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            act_reg: 0.0,
            distance: -0.1,
            lose: -1000.0,
            sparse: 0.0,
        }
    }
}

/// Unweighted reward terms and termination flags for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardRecord {
    /// Mean actuator activation magnitude, `‖act‖₂ / n`.
    pub act_reg: f64,
    /// Planar distance between the agent root and the opponent.
    pub distance: f64,
    /// `1 − round(t, 2) / max_time` on a winning step, else 0.
    pub sparse: f64,
    /// The agent fell, ran out the clock, or left the arena.
    pub lose: bool,
    /// The win-distance condition held this step.
    pub solved: bool,
    /// Episode termination, `lose ∨ solved`.
    pub done: bool,
}

impl RewardRecord {
    /// The weighted scalar reward.
    pub fn dense(&self, weights: &RewardWeights) -> f64 {
        weights.act_reg * self.act_reg
            + weights.distance * self.distance
            + weights.sparse * self.sparse
            + weights.lose * if self.lose { 1.0 } else { 0.0 }
    }
}

/// Round to two decimals, the reporting granularity of episode time.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_penalize_distance_and_loss() {
        let record = RewardRecord {
            distance: 3.0,
            ..RewardRecord::default()
        };
        assert!((record.dense(&RewardWeights::default()) + 0.3).abs() < 1e-12);

        let lost = RewardRecord {
            distance: 3.0,
            lose: true,
            done: true,
            ..RewardRecord::default()
        };
        assert!((lost.dense(&RewardWeights::default()) + 1000.3).abs() < 1e-12);
    }

    #[test]
    fn unweighted_terms_do_not_leak_into_dense() {
        let record = RewardRecord {
            act_reg: 0.7,
            sparse: 0.99,
            solved: true,
            done: true,
            ..RewardRecord::default()
        };
        assert_eq!(record.dense(&RewardWeights::default()), 0.0);
    }

    #[test]
    fn custom_weights_apply_per_term() {
        let record = RewardRecord {
            act_reg: 0.5,
            distance: 2.0,
            sparse: 1.0,
            solved: true,
            done: true,
            ..RewardRecord::default()
        };
        let weights = RewardWeights {
            act_reg: -2.0,
            distance: 0.0,
            lose: 0.0,
            sparse: 10.0,
        };
        assert!((record.dense(&weights) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn round2_rounds_to_centiseconds() {
        assert_eq!(round2(0.014999), 0.01);
        assert_eq!(round2(0.015001), 0.02);
        assert_eq!(round2(19.999), 20.0);
    }
}
