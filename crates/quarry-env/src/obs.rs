//! Observation dictionary keys and flattening.
//!
//! The environment assembles a full observation dictionary every step;
//! the flattened vector handed to the learner concatenates only the
//! configured keys, in configuration order. The dictionary is an
//! ordered map so reporting and flattening see one stable order.

use std::fmt;

use indexmap::IndexMap;
use quarry_core::StepError;

/// A named entry of the observation dictionary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObsKey {
    /// Elapsed simulated time, 1 value.
    Time,
    /// Internal joint positions, `qpos[7..35]`.
    InternalQpos,
    /// Internal joint velocities, `qvel[6..34]`, scaled by the control
    /// timestep.
    InternalQvel,
    /// Ground-reaction forces from the four foot/toe sensors.
    Grf,
    /// Pelvis orientation quaternion, 4 values.
    TorsoAngle,
    /// Opponent planar pose `(x, y, heading)`.
    OpponentPose,
    /// Opponent commanded velocity `(linear, angular)`.
    OpponentVel,
    /// Agent root planar position, `qpos[..2]`.
    ModelRootPos,
    /// Agent root planar velocity, `qvel[..2]`.
    ModelRootVel,
    /// Muscle tendon lengths, one per muscle actuator.
    MuscleLength,
    /// Muscle contraction velocities, one per muscle actuator.
    MuscleVelocity,
    /// Muscle forces, one per muscle actuator.
    MuscleForce,
    /// Actuator activations. Present only when the model has actuators.
    Act,
    /// Egocentric heightfield window. Present only under
    /// [`TerrainMode::Random`](crate::TerrainMode::Random).
    HField,
}

impl ObsKey {
    /// Keys flattened into the observation vector by default:
    /// proprioception (joint and muscle state) plus the opponent
    /// state, no time, no exteroception.
    pub const DEFAULTS: [ObsKey; 11] = [
        ObsKey::InternalQpos,
        ObsKey::InternalQvel,
        ObsKey::Grf,
        ObsKey::TorsoAngle,
        ObsKey::OpponentPose,
        ObsKey::OpponentVel,
        ObsKey::ModelRootPos,
        ObsKey::ModelRootVel,
        ObsKey::MuscleLength,
        ObsKey::MuscleVelocity,
        ObsKey::MuscleForce,
    ];

    /// Stable wire name of the key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::InternalQpos => "internal_qpos",
            Self::InternalQvel => "internal_qvel",
            Self::Grf => "grf",
            Self::TorsoAngle => "torso_angle",
            Self::OpponentPose => "opponent_pose",
            Self::OpponentVel => "opponent_vel",
            Self::ModelRootPos => "model_root_pos",
            Self::ModelRootVel => "model_root_vel",
            Self::MuscleLength => "muscle_length",
            Self::MuscleVelocity => "muscle_velocity",
            Self::MuscleForce => "muscle_force",
            Self::Act => "act",
            Self::HField => "hfield",
        }
    }
}

impl fmt::Display for ObsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The per-step observation dictionary, in assembly order.
pub type ObsDict = IndexMap<ObsKey, Vec<f64>>;

/// Concatenate the selected dictionary entries in the order given.
///
/// # Errors
///
/// [`StepError::MissingBinding`] if a selected key was not assembled,
/// e.g. `hfield` requested on flat terrain or `act` on an
/// actuator-free model.
pub fn flatten(dict: &ObsDict, keys: &[ObsKey]) -> Result<Vec<f64>, StepError> {
    let mut out = Vec::new();
    for key in keys {
        let values = dict.get(key).ok_or_else(|| StepError::MissingBinding {
            name: key.name().to_string(),
        })?;
        out.extend_from_slice(values);
    }
    Ok(out)
}

/// Clamp a half-open index range to the data actually present, so a
/// model smaller than the canonical one degrades to shorter entries
/// instead of panicking.
pub(crate) fn bounded(data: &[f64], start: usize, end: usize) -> &[f64] {
    let end = end.min(data.len());
    &data[start.min(end)..end]
}
