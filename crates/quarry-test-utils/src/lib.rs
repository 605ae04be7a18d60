//! Test utilities for Quarry development.
//!
//! Provides [`MockSim`], an in-memory implementation of
//! [`SimState`] with preloadable named bodies, sensors, geometry, and
//! keyframes, plus counters for asserting on side effects (physics
//! advances, renderer refreshes).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;

use quarry_core::SimState;

/// Recorded properties of a named mock geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MockGeom {
    pub rgba: [f32; 4],
    pub pos: [f64; 3],
    pub collision: bool,
}

impl Default for MockGeom {
    fn default() -> Self {
        Self {
            rgba: [0.5, 0.5, 0.5, 0.0],
            pos: [0.0, 0.0, 0.0],
            collision: false,
        }
    }
}

/// In-memory [`SimState`] backend.
///
/// `advance` only accumulates time and records the control vector; the
/// test drives all other state explicitly through the preload helpers.
pub struct MockSim {
    time: f64,
    timestep: f64,
    qpos: Vec<f64>,
    qvel: Vec<f64>,
    act: Vec<f64>,
    muscle_length: Vec<f64>,
    muscle_velocity: Vec<f64>,
    muscle_force: Vec<f64>,
    bodies: HashMap<String, ([f64; 3], [f64; 4])>,
    sensors: HashMap<String, f64>,
    keyframes: Vec<(Vec<f64>, Vec<f64>)>,
    puppet_pos: [f64; 3],
    puppet_quat: [f64; 4],
    nrow: usize,
    ncol: usize,
    hfield: Vec<f32>,
    geoms: HashMap<String, MockGeom>,
    sites: HashMap<String, [f32; 4]>,
    refreshes: usize,
    advances: usize,
    last_ctrl: Vec<f64>,
}

impl MockSim {
    /// An empty sim with the given state and heightfield dimensions.
    /// No bodies, sensors, geoms, sites, or keyframes are registered.
    pub fn new(nq: usize, nv: usize, nrow: usize, ncol: usize) -> Self {
        Self {
            time: 0.0,
            timestep: 0.01,
            qpos: vec![0.0; nq],
            qvel: vec![0.0; nv],
            act: Vec::new(),
            muscle_length: Vec::new(),
            muscle_velocity: Vec::new(),
            muscle_force: Vec::new(),
            bodies: HashMap::new(),
            sensors: HashMap::new(),
            keyframes: Vec::new(),
            puppet_pos: [0.0, 0.0, 0.1],
            puppet_quat: [1.0, 0.0, 0.0, 0.0],
            nrow,
            ncol,
            hfield: vec![0.0; nrow * ncol],
            geoms: HashMap::new(),
            sites: HashMap::new(),
            refreshes: 0,
            advances: 0,
            last_ctrl: Vec::new(),
        }
    }

    /// The standard pursuit fixture: a 35/34-dof model with root and
    /// pelvis bodies standing at 0.9 m, four ground-reaction sensors,
    /// a terrain geometry, the success-indicator site, a 100×100
    /// heightfield, and four keyframes (0: standing; 2 and 3: the two
    /// crouched key poses).
    pub fn pursuit() -> Self {
        let mut sim = Self::new(35, 34, 100, 100);
        sim.set_body("root", [0.0, 0.0, 0.9], [1.0, 0.0, 0.0, 0.0]);
        sim.set_body("pelvis", [0.0, 0.0, 0.9], [1.0, 0.0, 0.0, 0.0]);
        for sensor in ["r_foot", "r_toes", "l_foot", "l_toes"] {
            sim.set_sensor(sensor, 0.0);
        }
        sim.add_geom("terrain");
        sim.add_site("opponent_indicator");

        let standing = {
            let mut qpos = vec![0.0; 35];
            qpos[2] = 0.9;
            qpos[3] = 1.0; // identity root quaternion
            qpos
        };
        let crouch = |bent_joint: usize| {
            let mut qpos = vec![0.0; 35];
            qpos[2] = 0.7;
            qpos[3] = 1.0;
            qpos[bent_joint] = 0.6;
            qpos
        };
        sim.keyframes = vec![
            (standing.clone(), vec![0.0; 34]),
            (standing, vec![0.0; 34]),
            (crouch(9), vec![0.0; 34]),
            (crouch(16), vec![0.0; 34]),
        ];
        sim
    }

    // ── Preload helpers ────────────────────────────────────────────

    pub fn set_body(&mut self, name: &str, pos: [f64; 3], quat: [f64; 4]) {
        self.bodies.insert(name.to_string(), (pos, quat));
    }

    pub fn set_body_pos(&mut self, name: &str, pos: [f64; 3]) {
        let quat = self
            .bodies
            .get(name)
            .map(|(_, q)| *q)
            .unwrap_or([1.0, 0.0, 0.0, 0.0]);
        self.bodies.insert(name.to_string(), (pos, quat));
    }

    pub fn set_sensor(&mut self, name: &str, value: f64) {
        self.sensors.insert(name.to_string(), value);
    }

    pub fn add_geom(&mut self, name: &str) {
        self.geoms.insert(name.to_string(), MockGeom::default());
    }

    pub fn add_site(&mut self, name: &str) {
        self.sites.insert(name.to_string(), [0.0; 4]);
    }

    pub fn set_act(&mut self, act: Vec<f64>) {
        self.act = act;
    }

    pub fn set_muscles(&mut self, length: Vec<f64>, velocity: Vec<f64>, force: Vec<f64>) {
        self.muscle_length = length;
        self.muscle_velocity = velocity;
        self.muscle_force = force;
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn set_hfield(&mut self, data: Vec<f32>) {
        assert_eq!(data.len(), self.nrow * self.ncol);
        self.hfield = data;
    }

    // ── Inspection helpers ─────────────────────────────────────────

    pub fn geom(&self, name: &str) -> Option<&MockGeom> {
        self.geoms.get(name)
    }

    pub fn site(&self, name: &str) -> Option<[f32; 4]> {
        self.sites.get(name).copied()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    pub fn advance_count(&self) -> usize {
        self.advances
    }

    pub fn last_ctrl(&self) -> &[f64] {
        &self.last_ctrl
    }
}

impl SimState for MockSim {
    fn time(&self) -> f64 {
        self.time
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn qpos(&self) -> &[f64] {
        &self.qpos
    }

    fn qvel(&self) -> &[f64] {
        &self.qvel
    }

    fn set_state(&mut self, qpos: &[f64], qvel: &[f64]) {
        self.qpos = qpos.to_vec();
        self.qvel = qvel.to_vec();
        self.time = 0.0;
    }

    fn keyframe(&self, index: usize) -> Option<(Vec<f64>, Vec<f64>)> {
        self.keyframes.get(index).cloned()
    }

    fn advance(&mut self, ctrl: &[f64]) {
        self.advances += 1;
        self.time += self.timestep;
        self.last_ctrl = ctrl.to_vec();
    }

    fn body_pos(&self, name: &str) -> Option<[f64; 3]> {
        self.bodies.get(name).map(|(p, _)| *p)
    }

    fn body_quat(&self, name: &str) -> Option<[f64; 4]> {
        self.bodies.get(name).map(|(_, q)| *q)
    }

    fn sensor(&self, name: &str) -> Option<f64> {
        self.sensors.get(name).copied()
    }

    fn actuator_count(&self) -> usize {
        self.act.len()
    }

    fn act(&self) -> &[f64] {
        &self.act
    }

    fn muscle_length(&self) -> &[f64] {
        &self.muscle_length
    }

    fn muscle_velocity(&self) -> &[f64] {
        &self.muscle_velocity
    }

    fn muscle_force(&self) -> &[f64] {
        &self.muscle_force
    }

    fn puppet_pos(&self) -> [f64; 3] {
        self.puppet_pos
    }

    fn set_puppet_pos(&mut self, pos: [f64; 3]) {
        self.puppet_pos = pos;
    }

    fn puppet_quat(&self) -> [f64; 4] {
        self.puppet_quat
    }

    fn set_puppet_quat(&mut self, quat: [f64; 4]) {
        self.puppet_quat = quat;
    }

    fn hfield_dims(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    fn hfield(&self) -> &[f32] {
        &self.hfield
    }

    fn hfield_mut(&mut self) -> &mut [f32] {
        &mut self.hfield
    }

    fn set_geom_rgba(&mut self, name: &str, rgba: [f32; 4]) -> bool {
        match self.geoms.get_mut(name) {
            Some(g) => {
                g.rgba = rgba;
                true
            }
            None => false,
        }
    }

    fn set_geom_pos(&mut self, name: &str, pos: [f64; 3]) -> bool {
        match self.geoms.get_mut(name) {
            Some(g) => {
                g.pos = pos;
                true
            }
            None => false,
        }
    }

    fn set_geom_collision(&mut self, name: &str, enabled: bool) -> bool {
        match self.geoms.get_mut(name) {
            Some(g) => {
                g.collision = enabled;
                true
            }
            None => false,
        }
    }

    fn set_site_rgba(&mut self, name: &str, rgba: [f32; 4]) -> bool {
        match self.sites.get_mut(name) {
            Some(s) => {
                *s = rgba;
                true
            }
            None => false,
        }
    }

    fn refresh_heightfield(&mut self) {
        self.refreshes += 1;
    }
}
