//! Opponent control for the Quarry pursuit environment.
//!
//! The opponent is a kinematic puppet: it is never dynamically
//! simulated. A discrete policy state machine produces a velocity
//! command each tick, and the integrator force-sets the resulting pose
//! into the shared simulation state through the opponent proxy body.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod controller;
pub mod noise;
pub mod policy;

pub use controller::OpponentController;
pub use noise::NoiseProcess;
pub use policy::{OpponentPolicy, PolicyProbabilities};
