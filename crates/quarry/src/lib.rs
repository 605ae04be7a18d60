//! Quarry: a two-agent pursuit environment core over a pluggable
//! physics simulation.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Quarry sub-crates. For most users, adding `quarry` as a
//! single dependency is sufficient.
//!
//! A musculoskeletal agent chases (or flees) a semi-autonomous opponent
//! over procedurally generated terrain. The physics engine itself is an
//! external collaborator consumed through the [`types::SimState`]
//! trait; everything else — the opponent policy state machine, the
//! heightfield generator, observation assembly, reward, and episode
//! termination — lives here.
//!
//! # Quick start
//!
//! ```rust
//! use quarry::prelude::*;
//! use quarry_test_utils::MockSim;
//!
//! // Two sims: the primary and the observation-only copy.
//! let mut env = PursuitEnv::new(
//!     MockSim::pursuit(),
//!     MockSim::pursuit(),
//!     EnvConfig::default(),
//! )
//! .unwrap();
//!
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.len(), 73);
//!
//! let outcome = env.step(&vec![0.0; 35]).unwrap();
//! assert!(!outcome.done, "nothing terminates 10 ms into an episode");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `quarry-core` | Pose/velocity types, errors, the `SimState` trait |
//! | [`opponent`] | `quarry-opponent` | Policies, correlated noise, the opponent controller |
//! | [`terrain`] | `quarry-terrain` | Heightfield generation and egocentric windowing |
//! | [`env`] | `quarry-env` | Configuration, observations, reward, the episode controller |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors, and the simulation boundary (`quarry-core`).
///
/// Contains [`types::Pose2d`], [`types::Velocity2d`], the per-subsystem
/// error enums, and the [`types::SimState`] trait every physics
/// collaborator implements.
pub use quarry_core as types;

/// Opponent control (`quarry-opponent`).
///
/// The [`opponent::OpponentController`] drives a kinematic puppet from
/// a per-episode [`opponent::OpponentPolicy`], fed by the 1/f²
/// [`opponent::NoiseProcess`].
pub use quarry_opponent as opponent;

/// Procedural terrain (`quarry-terrain`).
///
/// [`terrain::HeightField`] assembles patch-based procedural terrain
/// ([`terrain::TerrainKind`]) and crops egocentric observation windows.
pub use quarry_terrain as terrain;

/// Episode control (`quarry-env`).
///
/// [`env::PursuitEnv`] owns the step/reset lifecycle; configure it
/// through [`env::EnvConfig`].
pub use quarry_env as env;

/// Common imports for typical Quarry usage.
///
/// ```rust
/// use quarry::prelude::*;
/// ```
pub mod prelude {
    // Simulation boundary and value types
    pub use quarry_core::{Pose2d, SimState, Velocity2d};

    // Errors
    pub use quarry_core::{OpponentError, StepError, TerrainError};

    // Opponent
    pub use quarry_opponent::{OpponentController, OpponentPolicy, PolicyProbabilities};

    // Terrain
    pub use quarry_terrain::{HeightField, TerrainKind};

    // Environment
    pub use quarry_env::{
        ConfigError, EnvConfig, EpisodeMetrics, ObsKey, PursuitEnv, ResetStrategy, RewardRecord,
        RewardWeights, StepOutcome, Task, TaskChoice, TerrainMode, TrajectoryRecord,
    };
}
