//! Episode control for the Quarry pursuit environment.
//!
//! [`PursuitEnv`] owns the primary simulation, a secondary
//! observation-only simulation, the episode RNG, the opponent
//! controller, and the terrain generator, and drives the step/reset
//! lifecycle: opponent tick, physics advance, observation assembly,
//! reward evaluation, termination.
//!
//! All configuration flows through [`EnvConfig`], validated at
//! construction. All randomness flows from one `ChaCha8Rng` seeded
//! from the config, so full episodes replay exactly per seed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod metrics;
pub mod obs;
pub mod reward;

pub use config::{ConfigError, EnvConfig, ResetStrategy, Task, TaskChoice, TerrainMode};
pub use env::{PursuitEnv, StepOutcome};
pub use metrics::{EpisodeMetrics, TrajectoryRecord};
pub use obs::{flatten, ObsDict, ObsKey};
pub use reward::{RewardRecord, RewardWeights};
