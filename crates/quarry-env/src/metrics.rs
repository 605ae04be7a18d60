//! Aggregate evaluation metrics over recorded episode trajectories.

use crate::reward::round2;

/// Per-episode log consumed by metric aggregation. The caller records
/// one entry per step from the [`StepOutcome`](crate::StepOutcome)
/// reward record.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryRecord {
    /// Sparse (time-discounted win) term per step.
    pub sparse: Vec<f64>,
    /// Win flag per step.
    pub solved: Vec<bool>,
    /// Simulated time when the episode ended, seconds.
    pub final_time: f64,
}

/// Mean evaluation metrics over a batch of episodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeMetrics {
    /// Mean summed sparse score per episode.
    pub score: f64,
    /// Mean number of winning steps per episode.
    pub points: f64,
    /// Mean episode duration, rounded to centiseconds.
    pub times: f64,
}

impl EpisodeMetrics {
    /// Aggregate a batch of trajectories. An empty batch yields zeros.
    pub fn aggregate(paths: &[TrajectoryRecord]) -> Self {
        if paths.is_empty() {
            return Self::default();
        }
        let n = paths.len() as f64;
        Self {
            score: paths.iter().map(|p| p.sparse.iter().sum::<f64>()).sum::<f64>() / n,
            points: paths
                .iter()
                .map(|p| p.solved.iter().filter(|&&s| s).count() as f64)
                .sum::<f64>()
                / n,
            times: paths.iter().map(|p| round2(p.final_time)).sum::<f64>() / n,
        }
    }
}
