//! Core types and traits for the Quarry pursuit environment.
//!
//! Defines the planar pose/velocity value types, the per-subsystem
//! error enums, and the [`SimState`] trait that forms the narrow
//! boundary to the external physics simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pose;
pub mod sim;

pub use error::{OpponentError, StepError, TerrainError};
pub use pose::{quat_from_yaw, yaw_from_quat, Pose2d, Velocity2d};
pub use sim::SimState;
