//! Environment configuration and validation.
//!
//! [`EnvConfig`] is a plain data struct; [`EnvConfig::validate`] runs
//! once at environment construction and rejects misconfigurations with
//! a [`ConfigError`] before any episode can start.

use std::error::Error;
use std::fmt;

use quarry_core::TerrainError;
use quarry_opponent::PolicyProbabilities;
use quarry_terrain::{DEFAULT_PATCHES_PER_SIDE, DEFAULT_REAL_LENGTH, DEFAULT_VIEW_DISTANCE};

use crate::obs::ObsKey;
use crate::reward::RewardWeights;

/// The agent's role for one episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Close the distance to the opponent.
    Chase,
    /// Keep away from the opponent.
    Flee,
}

/// How the episode task is chosen on reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskChoice {
    /// The same task every episode.
    Fixed(Task),
    /// Uniform coin flip per episode.
    Random,
}

/// How the agent's generalized state is initialized on reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetStrategy {
    /// The model's default key pose (keyframe 0), no noise.
    None,
    /// One of the two crouched key poses (keyframes 2 and 3, p = 0.5
    /// each) with Gaussian joint perturbation. Root height and root
    /// orientation are left exact.
    Random,
    /// The first crouched key pose (keyframe 2), no noise.
    Init,
}

/// Terrain handling across episodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainMode {
    /// The heightfield is never touched; no exteroception.
    Flat,
    /// Fresh procedural terrain every reset, with the egocentric
    /// heightfield window available as an observation.
    Random,
    /// Fresh procedural terrain every reset, but without the
    /// heightfield window observation.
    Fixed,
}

/// Full configuration surface of [`PursuitEnv`](crate::PursuitEnv).
///
/// Defaults reproduce the canonical pursuit setup: flat terrain, chase
/// task, keyframe-0 reset, the standard opponent policy mixture, and
/// the standard proprioceptive observation keys.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// Observation keys flattened, in order, into the step observation.
    pub obs_keys: Vec<ObsKey>,
    /// Weights applied to the unweighted reward terms.
    pub reward_weights: RewardWeights,
    /// Episode sampling weights for the opponent policies.
    pub opponent_probabilities: PolicyProbabilities,
    /// Reset state strategy.
    pub reset_strategy: ResetStrategy,
    /// Task selection mode.
    pub task_choice: TaskChoice,
    /// Terrain mode.
    pub terrain: TerrainMode,
    /// Planar agent-to-opponent distance at or under which the episode
    /// is won, meters.
    pub win_distance: f64,
    /// Minimum opponent spawn distance from the agent root, meters.
    pub min_spawn_distance: f64,
    /// Episode time limit, seconds.
    pub max_time: f64,
    /// Patches per heightfield side.
    pub patches_per_side: usize,
    /// Real-world side length of the terrain quad, meters.
    pub real_length: f64,
    /// Side length of the egocentric heightfield window, cells.
    pub view_distance: usize,
    /// Seed of the episode RNG.
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            obs_keys: ObsKey::DEFAULTS.to_vec(),
            reward_weights: RewardWeights::default(),
            opponent_probabilities: PolicyProbabilities::default(),
            reset_strategy: ResetStrategy::None,
            task_choice: TaskChoice::Fixed(Task::Chase),
            terrain: TerrainMode::Flat,
            win_distance: 0.5,
            min_spawn_distance: 2.0,
            max_time: 20.0,
            patches_per_side: DEFAULT_PATCHES_PER_SIDE,
            real_length: DEFAULT_REAL_LENGTH,
            view_distance: DEFAULT_VIEW_DISTANCE,
            seed: 0,
        }
    }
}

impl EnvConfig {
    /// Check every field that cannot be made unrepresentable.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found, in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.opponent_probabilities
            .validate()
            .map_err(|reason| ConfigError::InvalidProbabilities { reason })?;
        if !self.win_distance.is_finite() || self.win_distance <= 0.0 {
            return Err(ConfigError::InvalidDistance {
                field: "win_distance",
                value: self.win_distance,
            });
        }
        if !self.min_spawn_distance.is_finite() || self.min_spawn_distance < 0.0 {
            return Err(ConfigError::InvalidDistance {
                field: "min_spawn_distance",
                value: self.min_spawn_distance,
            });
        }
        if !self.max_time.is_finite() || self.max_time <= 0.0 {
            return Err(ConfigError::InvalidMaxTime {
                value: self.max_time,
            });
        }
        if !self.real_length.is_finite() || self.real_length <= 0.0 {
            return Err(ConfigError::InvalidDistance {
                field: "real_length",
                value: self.real_length,
            });
        }
        Ok(())
    }
}

/// Construction-time configuration failures.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The opponent policy weights are not a probability triple.
    InvalidProbabilities {
        /// What the triple violated.
        reason: String,
    },
    /// A distance field is non-finite or out of range.
    InvalidDistance {
        /// Which field failed.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The episode time limit is non-finite or non-positive.
    InvalidMaxTime {
        /// The rejected value.
        value: f64,
    },
    /// The terrain layout does not fit the simulation's heightfield.
    Terrain(TerrainError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProbabilities { reason } => {
                write!(f, "opponent policy probabilities invalid: {reason}")
            }
            Self::InvalidDistance { field, value } => {
                write!(f, "{field} {value} is not a usable distance")
            }
            Self::InvalidMaxTime { value } => {
                write!(f, "max_time {value} must be finite and positive")
            }
            Self::Terrain(e) => write!(f, "terrain: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Terrain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TerrainError> for ConfigError {
    fn from(e: TerrainError) -> Self {
        Self::Terrain(e)
    }
}
