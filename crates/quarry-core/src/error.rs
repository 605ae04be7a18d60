//! Error types for the pursuit environment, organized by subsystem:
//! opponent controller, terrain generator, and episode step loop.
//!
//! All errors here are fatal misconfigurations or missing simulation
//! bindings; nothing is silently swallowed or retried.

use std::error::Error;
use std::fmt;

/// Errors from the opponent controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpponentError {
    /// `tick()` was called before the first `reset()` selected a
    /// policy. The policy enum itself is exhaustive, so an unknown
    /// variant cannot occur; an unset one still can.
    PolicyUnset,
}

impl fmt::Display for OpponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyUnset => write!(f, "opponent policy not set; call reset() first"),
        }
    }
}

impl Error for OpponentError {}

/// Errors from the terrain generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerrainError {
    /// The heightfield buffer is empty (zero rows or columns).
    EmptyHeightfield,
    /// The heightfield is not square. Patch layout derives one patch
    /// size from the row count and writes square patches, so a
    /// rectangular grid would wrap patch columns into the next row.
    NonSquareHeightfield {
        /// Heightfield rows.
        nrow: usize,
        /// Heightfield columns.
        ncol: usize,
    },
    /// `patches_per_side` is zero, or larger than the heightfield.
    InvalidPatchCount {
        /// The configured patch count per side.
        configured: usize,
    },
    /// The egocentric window side length must be even so the crop is
    /// symmetric around the agent's map cell.
    OddViewDistance {
        /// The configured window side length.
        configured: usize,
    },
    /// The simulation does not expose the terrain geometry whose
    /// render/collision flags regeneration must reset.
    MissingTerrainGeom,
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHeightfield => write!(f, "heightfield has zero rows or columns"),
            Self::NonSquareHeightfield { nrow, ncol } => {
                write!(f, "heightfield must be square, got {nrow}x{ncol}")
            }
            Self::InvalidPatchCount { configured } => {
                write!(f, "patches_per_side {configured} does not fit the heightfield")
            }
            Self::OddViewDistance { configured } => {
                write!(f, "view_distance {configured} must be even")
            }
            Self::MissingTerrainGeom => {
                write!(f, "simulation does not expose the terrain geometry")
            }
        }
    }
}

impl Error for TerrainError {}

/// Errors from the episode controller during `step()` or `reset()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// `step()` was called before the first `reset()` completed.
    SetupIncomplete,
    /// A named body, sensor, site, or keyframe the environment relies
    /// on is not exposed by the simulation.
    MissingBinding {
        /// The name that failed to resolve.
        name: String,
    },
    /// The opponent controller failed.
    Opponent(OpponentError),
    /// Terrain regeneration failed.
    Terrain(TerrainError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetupIncomplete => write!(f, "step() called before the first reset() completed"),
            Self::MissingBinding { name } => {
                write!(f, "simulation does not expose binding '{name}'")
            }
            Self::Opponent(e) => write!(f, "opponent: {e}"),
            Self::Terrain(e) => write!(f, "terrain: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Opponent(e) => Some(e),
            Self::Terrain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OpponentError> for StepError {
    fn from(e: OpponentError) -> Self {
        Self::Opponent(e)
    }
}

impl From<TerrainError> for StepError {
    fn from(e: TerrainError) -> Self {
        Self::Terrain(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            OpponentError::PolicyUnset.to_string(),
            "opponent policy not set; call reset() first"
        );
        assert!(StepError::SetupIncomplete.to_string().contains("reset()"));
        let e = StepError::MissingBinding {
            name: "pelvis".into(),
        };
        assert!(e.to_string().contains("pelvis"));
    }

    #[test]
    fn opponent_error_converts_and_sources() {
        let e: StepError = OpponentError::PolicyUnset.into();
        assert_eq!(e, StepError::Opponent(OpponentError::PolicyUnset));
        assert!(std::error::Error::source(&e).is_some());
        assert!(std::error::Error::source(&StepError::SetupIncomplete).is_none());
    }
}
