//! Procedural terrain for the Quarry pursuit environment.
//!
//! A square heightfield is partitioned into a grid of patches, each
//! independently filled with one of several procedural terrain kinds.
//! The assembled map is written into the simulation's heightfield
//! buffer and mirrored into a zero-padded double-size map from which
//! fixed-size egocentric observation windows are cropped.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod heightfield;
pub mod patch;

pub use heightfield::{
    HeightField, DEFAULT_PATCHES_PER_SIDE, DEFAULT_REAL_LENGTH, DEFAULT_VIEW_DISTANCE,
};
pub use patch::TerrainKind;
