//! The opponent controller: policy state machine, spawn placement, and
//! the kinematic integrator.
//!
//! The opponent participates in perception and the win/lose geometry
//! but is deliberately not dynamically simulated; simulating a second
//! agent under the same control stack would be unstable for no benefit.
//! Instead its pose is force-set into the shared simulation every tick
//! through the proxy body accessors on [`SimState`].

use quarry_core::{quat_from_yaw, yaw_from_quat, Pose2d, SimState, Velocity2d};
use quarry_core::{OpponentError, StepError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::noise::NoiseProcess;
use crate::policy::{OpponentPolicy, PolicyProbabilities};

/// Fixed integration timestep for opponent motion, seconds.
pub const DT: f64 = 0.01;

/// Hard bound on the opponent's planar position after integration.
pub const POSITION_BOUND: f64 = 5.5;

/// Half-width of the uniform spawn-sampling square.
pub const SPAWN_BOUND: f64 = 5.0;

/// Upper bound on spawn rejection-sampling attempts. On exhaustion the
/// farthest candidate seen is used, so placement always terminates even
/// under an adversarial minimum spawn distance.
pub const MAX_SPAWN_ATTEMPTS: usize = 1000;

/// Forced spawn pose for [`OpponentPolicy::StaticStationary`].
const STATIC_SPAWN: Pose2d = Pose2d {
    x: 0.0,
    y: -5.0,
    heading: 0.0,
};

/// Body whose planar position anchors the spawn-distance invariant.
const AGENT_ROOT: &str = "root";

/// Owns the opponent's policy, noise process, and commanded velocity,
/// and integrates its pose in the shared simulation state.
#[derive(Debug)]
pub struct OpponentController {
    probabilities: PolicyProbabilities,
    min_spawn_distance: f64,
    policy: Option<OpponentPolicy>,
    noise: NoiseProcess,
    vel: Velocity2d,
}

impl OpponentController {
    /// Create a controller. The noise process takes a private RNG
    /// stream split off `rng`; the policy stays unset until the first
    /// [`reset`](OpponentController::reset).
    pub fn new(
        probabilities: PolicyProbabilities,
        min_spawn_distance: f64,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        Self {
            probabilities,
            min_spawn_distance,
            policy: None,
            noise: NoiseProcess::new(ChaCha8Rng::seed_from_u64(rng.gen::<u64>())),
            vel: Velocity2d::zero(),
        }
    }

    /// The policy sampled for the current episode, if any.
    pub fn policy(&self) -> Option<OpponentPolicy> {
        self.policy
    }

    /// The most recent normalized velocity command.
    pub fn velocity(&self) -> Velocity2d {
        self.vel
    }

    /// Read the opponent pose from the simulation's proxy body.
    pub fn pose<S: SimState>(&self, sim: &S) -> Pose2d {
        let pos = sim.puppet_pos();
        Pose2d::new(pos[0], pos[1], yaw_from_quat(sim.puppet_quat()))
    }

    /// Teleport the opponent: write the pose to the proxy body,
    /// preserving its height.
    pub fn set_pose<S: SimState>(&self, sim: &mut S, pose: Pose2d) {
        let z = sim.puppet_pos()[2];
        sim.set_puppet_pos([pose.x, pose.y, z]);
        sim.set_puppet_quat(quat_from_yaw(pose.heading));
    }

    /// Re-initialize for a new episode: reseed the noise process,
    /// sample a policy, and place the opponent.
    ///
    /// Placement draws uniform poses in `[-SPAWN_BOUND, SPAWN_BOUND]²
    /// × [-2π, 2π]` until the distance to the agent root satisfies the
    /// spawn invariant (bounded, see [`MAX_SPAWN_ATTEMPTS`]).
    /// `StaticStationary` overrides the result with its fixed pose.
    ///
    /// # Errors
    ///
    /// [`StepError::MissingBinding`] if the simulation does not expose
    /// the agent root body.
    pub fn reset<S: SimState>(&mut self, sim: &mut S, rng: &mut ChaCha8Rng) -> Result<(), StepError> {
        self.noise = NoiseProcess::new(ChaCha8Rng::seed_from_u64(rng.gen::<u64>()));
        self.vel = Velocity2d::zero();
        let policy = self.probabilities.sample(rng);
        self.policy = Some(policy);

        let root = sim.body_pos(AGENT_ROOT).ok_or_else(|| StepError::MissingBinding {
            name: AGENT_ROOT.to_string(),
        })?;
        let root_xy = [root[0], root[1]];

        let mut best = Pose2d::new(0.0, 0.0, 0.0);
        let mut best_dist = f64::NEG_INFINITY;
        let mut chosen = None;
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let candidate = Pose2d::new(
                uniform(rng, -SPAWN_BOUND, SPAWN_BOUND),
                uniform(rng, -SPAWN_BOUND, SPAWN_BOUND),
                uniform(rng, -2.0 * PI, 2.0 * PI),
            );
            let dist = candidate.planar_distance(root_xy);
            if dist > best_dist {
                best = candidate;
                best_dist = dist;
            }
            if dist >= self.min_spawn_distance {
                chosen = Some(candidate);
                break;
            }
        }
        let mut pose = chosen.unwrap_or(best);

        if policy == OpponentPolicy::StaticStationary {
            pose = STATIC_SPAWN;
        }
        self.set_pose(sim, pose);
        Ok(())
    }

    /// Advance the opponent one tick: produce a velocity command from
    /// the current policy and integrate it into the pose. Runs before
    /// the physics collaborator advances.
    ///
    /// # Errors
    ///
    /// [`OpponentError::PolicyUnset`] if called before the first reset.
    pub fn tick<S: SimState>(&mut self, sim: &mut S) -> Result<(), OpponentError> {
        let command = match self.policy {
            None => return Err(OpponentError::PolicyUnset),
            Some(OpponentPolicy::StaticStationary) | Some(OpponentPolicy::Stationary) => {
                Velocity2d::zero()
            }
            Some(OpponentPolicy::Random) => {
                let [lin, ang] = self.noise.sample();
                Velocity2d {
                    linear: lin,
                    angular: ang,
                }
            }
        };
        self.apply_velocity(sim, command);
        Ok(())
    }

    /// Integrate a velocity command into the opponent pose.
    ///
    /// The proxy model's zero heading faces +y, so the forward vector
    /// is `(cos(h + π/2), sin(h + π/2))` and translation runs opposite
    /// to it; the opponent still faces its direction of travel. This
    /// sign convention is intentional and must be preserved.
    pub fn apply_velocity<S: SimState>(&mut self, sim: &mut S, command: Velocity2d) {
        let v = command.normalized();
        self.vel = v;
        let mut pose = self.pose(sim);
        let forward = pose.heading + FRAC_PI_2;
        pose.x -= DT * v.linear * forward.cos();
        pose.y -= DT * v.linear * forward.sin();
        pose.heading += DT * v.angular;
        pose.clamp_position(POSITION_BOUND);
        self.set_pose(sim, pose);
    }
}

fn uniform(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.gen::<f64>()
}
