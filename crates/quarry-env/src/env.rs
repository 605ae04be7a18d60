//! The episode controller: step/reset lifecycle, observation assembly,
//! termination, and reward evaluation.
//!
//! One `step()` or `reset()` is in flight at a time; the simulation
//! handle is lent by `&mut` to the opponent controller and the terrain
//! generator, never shared. The secondary observation-only simulation
//! is synchronized by explicit state copy during reset.

use indexmap::IndexMap;
use quarry_core::{Pose2d, SimState, StepError};
use quarry_opponent::noise::standard_normal;
use quarry_opponent::OpponentController;
use quarry_terrain::HeightField;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, EnvConfig, ResetStrategy, Task, TaskChoice, TerrainMode};
use crate::obs::{self, flatten, ObsDict, ObsKey};
use crate::reward::{round2, RewardRecord};

/// Body anchoring the termination geometry (torso height, arena
/// bounds) and the torso-angle observation.
const PELVIS: &str = "pelvis";

/// Ground-reaction-force sensors, concatenated in this order.
const GRF_SENSORS: [&str; 4] = ["r_foot", "r_toes", "l_foot", "l_toes"];

/// Diagnostic site recolored on win/lose. Optional in the model.
const INDICATOR_SITE: &str = "opponent_indicator";

const INDICATOR_WIN: [f32; 4] = [0.0, 2.0, 0.0, 0.1];
const INDICATOR_LOSE: [f32; 4] = [2.0, 0.0, 0.0, 0.0];

/// Arena half-width beyond which the agent has escaped the game.
const ARENA_BOUND: f64 = 6.5;

/// Torso height under which the agent counts as fallen, meters.
const FALL_HEIGHT: f64 = 0.5;

/// Standard deviation of the randomized-reset joint perturbation.
const RESET_NOISE_STD: f64 = 0.02;

/// Result of one environment step.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// Flattened observation over the configured keys.
    pub obs: Vec<f64>,
    /// Weighted scalar reward.
    pub reward: f64,
    /// Episode termination flag.
    pub done: bool,
    /// Simulated time after this step, seconds.
    pub time: f64,
    /// Unweighted reward terms and the win/lose flags.
    pub rewards: RewardRecord,
}

/// The pursuit episode controller.
///
/// Owns the primary simulation, the secondary observation-only
/// simulation, the episode RNG, the opponent controller, the terrain
/// generator, and the validated configuration. [`reset`] must complete
/// once before the first [`step`]; no termination is ever reported
/// before that.
///
/// [`reset`]: PursuitEnv::reset
/// [`step`]: PursuitEnv::step
pub struct PursuitEnv<S: SimState> {
    sim: S,
    sim_obsd: S,
    rng: ChaCha8Rng,
    config: EnvConfig,
    opponent: OpponentController,
    heightfield: HeightField,
    task: Task,
    setup_complete: bool,
}

impl<S: SimState> PursuitEnv<S> {
    /// Build an environment over a primary and an observation sim.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the configuration fails validation or the
    /// terrain layout does not fit the simulation's heightfield.
    pub fn new(sim: S, sim_obsd: S, config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (nrow, ncol) = sim.hfield_dims();
        let heightfield = HeightField::new(
            nrow,
            ncol,
            config.patches_per_side,
            config.real_length,
            config.view_distance,
        )?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let opponent = OpponentController::new(
            config.opponent_probabilities,
            config.min_spawn_distance,
            &mut rng,
        );
        let task = match config.task_choice {
            TaskChoice::Fixed(task) => task,
            TaskChoice::Random => Task::Chase,
        };
        Ok(Self {
            sim,
            sim_obsd,
            rng,
            config,
            opponent,
            heightfield,
            task,
            setup_complete: false,
        })
    }

    /// Start a new episode and return its first observation.
    ///
    /// Regenerates terrain per the terrain mode, samples the task,
    /// applies the reset state to both sims, then respawns the
    /// opponent.
    ///
    /// # Errors
    ///
    /// [`StepError`] if the simulation lacks a keyframe, body, or
    /// sensor the reset or the configured observation keys need.
    pub fn reset(&mut self) -> Result<Vec<f64>, StepError> {
        // Any non-flat mode resamples the whole terrain; regeneration
        // is authoritative, never cached across episodes.
        if self.config.terrain != TerrainMode::Flat {
            self.heightfield.regenerate(&mut self.sim, &mut self.rng)?;
        }

        self.task = match self.config.task_choice {
            TaskChoice::Fixed(task) => task,
            TaskChoice::Random => {
                if self.rng.gen::<f64>() < 0.5 {
                    Task::Chase
                } else {
                    Task::Flee
                }
            }
        };

        let (qpos, qvel) = self.reset_state()?;
        self.sim_obsd.set_state(&qpos, &qvel);
        self.sim.set_state(&qpos, &qvel);
        self.opponent.reset(&mut self.sim, &mut self.rng)?;
        self.setup_complete = true;

        let dict = self.observe()?;
        flatten(&dict, &self.config.obs_keys)
    }

    /// Advance one control step: opponent tick, physics advance,
    /// observation, reward, termination.
    ///
    /// # Errors
    ///
    /// [`StepError::SetupIncomplete`] before the first completed
    /// [`reset`](PursuitEnv::reset); [`StepError::MissingBinding`] if a
    /// required named binding is absent.
    pub fn step(&mut self, action: &[f64]) -> Result<StepOutcome, StepError> {
        if !self.setup_complete {
            return Err(StepError::SetupIncomplete);
        }
        self.opponent.tick(&mut self.sim)?;
        self.sim.advance(action);

        let dict = self.observe()?;
        let rewards = self.evaluate()?;

        // Cosmetic; a model without the indicator site is fine.
        let color = if rewards.solved { INDICATOR_WIN } else { INDICATOR_LOSE };
        let _ = self.sim.set_site_rgba(INDICATOR_SITE, color);

        Ok(StepOutcome {
            obs: flatten(&dict, &self.config.obs_keys)?,
            reward: rewards.dense(&self.config.reward_weights),
            done: rewards.done,
            time: self.sim.time(),
            rewards,
        })
    }

    /// The task in effect for the current episode.
    pub fn task(&self) -> Task {
        self.task
    }

    /// The validated configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The terrain generator.
    pub fn heightfield(&self) -> &HeightField {
        &self.heightfield
    }

    /// The opponent controller.
    pub fn opponent(&self) -> &OpponentController {
        &self.opponent
    }

    /// The primary simulation.
    pub fn sim(&self) -> &S {
        &self.sim
    }

    /// Mutable access to the primary simulation, for callers that
    /// drive sim state directly (evaluation harnesses, tests).
    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    /// The secondary observation-only simulation.
    pub fn observation_sim(&self) -> &S {
        &self.sim_obsd
    }

    /// Teleport the opponent in the primary simulation.
    pub fn set_opponent_pose(&mut self, pose: Pose2d) {
        self.opponent.set_pose(&mut self.sim, pose);
    }

    /// Compute the reset generalized state per the configured strategy.
    fn reset_state(&mut self) -> Result<(Vec<f64>, Vec<f64>), StepError> {
        match self.config.reset_strategy {
            ResetStrategy::None => self.keyframe(0),
            ResetStrategy::Init => self.keyframe(2),
            ResetStrategy::Random => {
                let index = if self.rng.gen::<f64>() < 0.5 { 2 } else { 3 };
                let (mut qpos, qvel) = self.keyframe(index)?;
                let height = qpos.get(2).copied();
                let root_quat = qpos.get(3..7).map(<[f64]>::to_vec);
                for v in qpos.iter_mut() {
                    *v += RESET_NOISE_STD * standard_normal(&mut self.rng);
                }
                // Root height and orientation stay exact so the agent
                // never spawns tilted or through the ground.
                if let Some(h) = height {
                    qpos[2] = h;
                }
                if let Some(quat) = root_quat {
                    qpos[3..7].copy_from_slice(&quat);
                }
                Ok((qpos, qvel))
            }
        }
    }

    fn keyframe(&self, index: usize) -> Result<(Vec<f64>, Vec<f64>), StepError> {
        self.sim
            .keyframe(index)
            .ok_or_else(|| StepError::MissingBinding {
                name: format!("keyframe {index}"),
            })
    }

    /// Assemble the full observation dictionary.
    fn observe(&self) -> Result<ObsDict, StepError> {
        let sim = &self.sim;
        let dt = sim.timestep();
        let mut dict = IndexMap::new();

        dict.insert(ObsKey::Time, vec![sim.time()]);
        dict.insert(ObsKey::InternalQpos, obs::bounded(sim.qpos(), 7, 35).to_vec());
        dict.insert(
            ObsKey::InternalQvel,
            obs::bounded(sim.qvel(), 6, 34).iter().map(|v| v * dt).collect(),
        );

        let mut grf = Vec::with_capacity(GRF_SENSORS.len());
        for name in GRF_SENSORS {
            grf.push(sim.sensor(name).ok_or_else(|| StepError::MissingBinding {
                name: name.to_string(),
            })?);
        }
        dict.insert(ObsKey::Grf, grf);

        let torso = sim
            .body_quat(PELVIS)
            .ok_or_else(|| StepError::MissingBinding {
                name: PELVIS.to_string(),
            })?;
        dict.insert(ObsKey::TorsoAngle, torso.to_vec());

        let pose = self.opponent.pose(sim);
        dict.insert(ObsKey::OpponentPose, vec![pose.x, pose.y, pose.heading]);
        let vel = self.opponent.velocity();
        dict.insert(ObsKey::OpponentVel, vec![vel.linear, vel.angular]);

        dict.insert(ObsKey::ModelRootPos, obs::bounded(sim.qpos(), 0, 2).to_vec());
        dict.insert(ObsKey::ModelRootVel, obs::bounded(sim.qvel(), 0, 2).to_vec());

        // Muscle vectors are empty, not absent, on muscle-free models,
        // so the default key set always flattens.
        dict.insert(ObsKey::MuscleLength, sim.muscle_length().to_vec());
        dict.insert(ObsKey::MuscleVelocity, sim.muscle_velocity().to_vec());
        dict.insert(ObsKey::MuscleForce, sim.muscle_force().to_vec());

        if sim.actuator_count() > 0 {
            dict.insert(ObsKey::Act, sim.act().to_vec());
        }
        if self.config.terrain == TerrainMode::Random {
            let window = self.heightfield.window(self.root_xy());
            dict.insert(ObsKey::HField, window.iter().map(|&v| f64::from(v)).collect());
        }
        Ok(dict)
    }

    /// Evaluate the unweighted reward terms and termination flags.
    fn evaluate(&self) -> Result<RewardRecord, StepError> {
        let sim = &self.sim;
        let pelvis = sim
            .body_pos(PELVIS)
            .ok_or_else(|| StepError::MissingBinding {
                name: PELVIS.to_string(),
            })?;
        let time = sim.time();
        let pose = self.opponent.pose(sim);

        let count = sim.actuator_count();
        let act_reg = if count > 0 {
            sim.act().iter().map(|a| a * a).sum::<f64>().sqrt() / count as f64
        } else {
            0.0
        };

        let lose = pelvis[2] < FALL_HEIGHT
            || time >= self.config.max_time
            || pelvis[0].abs() > ARENA_BOUND
            || pelvis[1].abs() > ARENA_BOUND;
        let solved =
            pose.planar_distance([pelvis[0], pelvis[1]]) <= self.config.win_distance;
        let sparse = if solved {
            1.0 - round2(time) / self.config.max_time
        } else {
            0.0
        };

        Ok(RewardRecord {
            act_reg,
            distance: pose.planar_distance(self.root_xy()),
            sparse,
            lose,
            solved,
            done: lose || solved,
        })
    }

    fn root_xy(&self) -> [f64; 2] {
        let qpos = self.sim.qpos();
        [
            qpos.first().copied().unwrap_or(0.0),
            qpos.get(1).copied().unwrap_or(0.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quarry_test_utils::MockSim;

    fn env() -> PursuitEnv<MockSim> {
        env_with(EnvConfig::default())
    }

    fn env_with(config: EnvConfig) -> PursuitEnv<MockSim> {
        PursuitEnv::new(MockSim::pursuit(), MockSim::pursuit(), config).unwrap()
    }

    // ---------------------------------------------------------------
    // Lifecycle gating
    // ---------------------------------------------------------------

    #[test]
    fn step_before_reset_is_rejected() {
        let mut env = env();
        assert_eq!(env.step(&[]).unwrap_err(), StepError::SetupIncomplete);
    }

    #[test]
    fn reset_enables_stepping() {
        let mut env = env();
        env.reset().unwrap();
        env.step(&[]).unwrap();
    }

    // ---------------------------------------------------------------
    // Observations
    // ---------------------------------------------------------------

    #[test]
    fn default_observation_has_expected_width() {
        // qpos[7..35] + qvel[6..34]·dt + 4 grf + 4 quat + 3 pose
        // + 2 vel + 2 root pos + 2 root vel; the fixture is
        // muscle-free, so the muscle keys flatten to nothing.
        let mut env = env();
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 28 + 28 + 4 + 4 + 3 + 2 + 2 + 2);
    }

    #[test]
    fn muscle_entries_follow_the_model() {
        let mut env = env();
        env.sim_mut().set_muscles(vec![0.1; 5], vec![0.2; 5], vec![0.3; 5]);
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 73 + 15, "three muscle vectors widen the default layout");
        assert_eq!(&obs[73..78], &[0.1; 5], "lengths come first");
        assert_eq!(&obs[78..83], &[0.2; 5]);
        assert_eq!(&obs[83..88], &[0.3; 5]);
    }

    #[test]
    fn hfield_entry_exists_only_on_random_terrain() {
        let mut config = EnvConfig::default();
        config.terrain = TerrainMode::Random;
        config.obs_keys = vec![ObsKey::HField];
        let mut env = env_with(config);
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 400, "20×20 window");

        let mut config = EnvConfig::default();
        config.obs_keys = vec![ObsKey::HField];
        let mut env = env_with(config);
        assert_eq!(
            env.reset().unwrap_err(),
            StepError::MissingBinding {
                name: "hfield".into()
            },
            "flat terrain must not fabricate exteroception"
        );
    }

    #[test]
    fn act_entry_tracks_actuator_presence() {
        let mut config = EnvConfig::default();
        config.obs_keys = vec![ObsKey::Act];
        let mut env = env_with(config);
        env.sim_mut().set_act(vec![0.25; 6]);
        let obs = env.reset().unwrap();
        assert_eq!(obs, vec![0.25; 6]);
    }

    #[test]
    fn qvel_observation_is_timestep_scaled() {
        let mut config = EnvConfig::default();
        config.obs_keys = vec![ObsKey::InternalQvel];
        let mut env = env_with(config);
        env.reset().unwrap();
        let mut qvel = vec![0.0; 34];
        qvel[6] = 2.0;
        let qpos = env.sim().qpos().to_vec();
        env.sim_mut().set_state(&qpos, &qvel);
        let out = env.step(&[]).unwrap();
        assert!((out.obs[0] - 2.0 * 0.01).abs() < 1e-12);
    }

    // ---------------------------------------------------------------
    // Termination and reward
    // ---------------------------------------------------------------

    #[test]
    fn falling_terminates_with_loss() {
        let mut env = env();
        env.reset().unwrap();
        env.sim_mut().set_body_pos("pelvis", [0.0, 0.0, 0.3]);
        let out = env.step(&[]).unwrap();
        assert!(out.done);
        assert!(out.rewards.lose);
        assert!(!out.rewards.solved);
        assert!(out.reward < -999.0, "loss penalty must dominate: {}", out.reward);
    }

    #[test]
    fn leaving_the_arena_terminates_with_loss() {
        let mut env = env();
        env.reset().unwrap();
        env.sim_mut().set_body_pos("pelvis", [7.0, 0.0, 0.9]);
        let out = env.step(&[]).unwrap();
        assert!(out.rewards.lose);
        assert!(out.done);
    }

    #[test]
    fn running_out_the_clock_terminates_with_loss() {
        let mut env = env();
        env.reset().unwrap();
        env.sim_mut().set_time(20.0);
        let out = env.step(&[]).unwrap();
        assert!(out.rewards.lose);
    }

    #[test]
    fn catching_the_opponent_wins() {
        let mut env = env();
        env.reset().unwrap();
        env.set_opponent_pose(Pose2d::new(0.2, 0.0, 0.0));
        let out = env.step(&[]).unwrap();
        assert!(out.done);
        assert!(out.rewards.solved);
        assert!(!out.rewards.lose);
        // One step in: t = 0.01, sparse = 1 − 0.01/20.
        assert!((out.rewards.sparse - (1.0 - 0.01 / 20.0)).abs() < 1e-9);
    }

    #[test]
    fn indicator_site_recolors_with_the_verdict() {
        let mut env = env();
        env.reset().unwrap();
        let out = env.step(&[]).unwrap();
        assert!(!out.rewards.solved, "opponent spawns at least 2 m away");
        assert_eq!(
            env.sim().site("opponent_indicator"),
            Some([2.0, 0.0, 0.0, 0.0])
        );

        env.set_opponent_pose(Pose2d::new(0.1, 0.0, 0.0));
        env.step(&[]).unwrap();
        assert_eq!(
            env.sim().site("opponent_indicator"),
            Some([0.0, 2.0, 0.0, 0.1])
        );
    }

    #[test]
    fn activation_magnitude_is_averaged_over_actuators() {
        let mut env = env();
        env.sim_mut().set_act(vec![0.6; 4]);
        env.reset().unwrap();
        let out = env.step(&[]).unwrap();
        // ‖(0.6, 0.6, 0.6, 0.6)‖ / 4 = 1.2 / 4.
        assert!((out.rewards.act_reg - 0.3).abs() < 1e-12);
    }

    #[test]
    fn distance_term_tracks_the_opponent() {
        let mut env = env();
        env.reset().unwrap();
        env.set_opponent_pose(Pose2d::new(3.0, 4.0, 0.0));
        let out = env.step(&[]).unwrap();
        // Root sits at the origin; the opponent may drift one tick.
        assert!((out.rewards.distance - 5.0).abs() < 0.02);
    }

    // ---------------------------------------------------------------
    // Reset strategies
    // ---------------------------------------------------------------

    #[test]
    fn default_reset_uses_the_standing_keyframe() {
        let mut env = env();
        env.reset().unwrap();
        assert_eq!(env.sim().qpos()[2], 0.9);
    }

    #[test]
    fn init_reset_uses_the_first_crouched_keyframe() {
        let mut config = EnvConfig::default();
        config.reset_strategy = ResetStrategy::Init;
        let mut env = env_with(config);
        env.reset().unwrap();
        assert_eq!(env.sim().qpos()[2], 0.7);
    }

    #[test]
    fn randomized_reset_keeps_height_and_root_orientation_exact() {
        let mut config = EnvConfig::default();
        config.reset_strategy = ResetStrategy::Random;
        config.seed = 13;
        let mut env = env_with(config);
        env.reset().unwrap();
        let qpos = env.sim().qpos();
        assert_eq!(qpos[2], 0.7, "height must not be perturbed");
        assert_eq!(&qpos[3..7], &[1.0, 0.0, 0.0, 0.0], "root quat must not be perturbed");
        assert!(qpos[0] != 0.0, "free joints must be perturbed");
    }

    #[test]
    fn secondary_sim_receives_the_reset_state() {
        let mut env = env();
        env.reset().unwrap();
        assert_eq!(env.sim().qpos(), env.observation_sim().qpos());
        assert_eq!(env.sim().qvel(), env.observation_sim().qvel());
    }

    #[test]
    fn random_task_choice_samples_both_tasks() {
        let mut seen = (false, false);
        for seed in 0..20 {
            let mut config = EnvConfig::default();
            config.task_choice = TaskChoice::Random;
            config.seed = seed;
            let mut env = env_with(config);
            env.reset().unwrap();
            match env.task() {
                Task::Chase => seen.0 = true,
                Task::Flee => seen.1 = true,
            }
        }
        assert_eq!(seen, (true, true));
    }

    // ---------------------------------------------------------------
    // Terrain modes
    // ---------------------------------------------------------------

    #[test]
    fn flat_terrain_is_never_regenerated() {
        let mut env = env();
        env.reset().unwrap();
        env.reset().unwrap();
        assert_eq!(env.sim().refresh_count(), 0);
    }

    #[test]
    fn random_terrain_regenerates_every_reset() {
        let mut config = EnvConfig::default();
        config.terrain = TerrainMode::Random;
        let mut env = env_with(config);
        env.reset().unwrap();
        env.reset().unwrap();
        assert_eq!(env.sim().refresh_count(), 2);
        let geom = env.sim().geom("terrain").unwrap();
        assert!(geom.collision);
    }

    #[test]
    fn fixed_terrain_regenerates_every_reset_without_exteroception() {
        let mut config = EnvConfig::default();
        config.terrain = TerrainMode::Fixed;
        let mut env = env_with(config);
        env.reset().unwrap();
        env.reset().unwrap();
        assert_eq!(
            env.sim().refresh_count(),
            2,
            "non-flat terrain is resampled per episode, never cached"
        );

        let mut config = EnvConfig::default();
        config.terrain = TerrainMode::Fixed;
        config.obs_keys = vec![ObsKey::HField];
        let mut env = env_with(config);
        assert_eq!(
            env.reset().unwrap_err(),
            StepError::MissingBinding {
                name: "hfield".into()
            },
            "only the random mode exposes the heightfield window"
        );
    }

    proptest! {
        #[test]
        fn steps_stay_finite_and_shaped(
            seed in 0u64..128,
            steps in 1usize..30,
        ) {
            let mut config = EnvConfig::default();
            config.terrain = TerrainMode::Random;
            config.reset_strategy = ResetStrategy::Random;
            config.seed = seed;
            let mut env = env_with(config);
            env.reset().unwrap();
            for _ in 0..steps {
                let out = env.step(&[]).unwrap();
                prop_assert!(out.reward.is_finite());
                prop_assert!((0.0..=1.0).contains(&out.rewards.sparse));
                prop_assert_eq!(out.obs.len(), 73, "observation width must be stable");
            }
        }
    }
}
