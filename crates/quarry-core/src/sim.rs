//! The [`SimState`] trait: the narrow boundary to the external
//! rigid-body/muscle physics simulation.
//!
//! The environment treats simulation state as an opaque mutable store
//! offering get/set operations for named bodies, sensors, and geometry,
//! plus a heightfield buffer. The trait is lent by reference from the
//! episode controller to the opponent controller and the terrain
//! generator, keeping the shared-state coupling explicit. Named reads
//! return `Option`; callers decide whether a missing binding is fatal.

/// Read/write access to the physics collaborator's state.
///
/// One instance is the primary simulation; a second, observation-only
/// instance is kept in sync by explicit state copy during reset.
pub trait SimState {
    /// Elapsed simulated time, seconds.
    fn time(&self) -> f64;

    /// Duration of one control step, seconds.
    fn timestep(&self) -> f64;

    /// Generalized positions of the controlled agent's model.
    fn qpos(&self) -> &[f64];

    /// Generalized velocities of the controlled agent's model.
    fn qvel(&self) -> &[f64];

    /// Overwrite the generalized state. Used by reset and by the
    /// secondary-sim synchronization copy.
    fn set_state(&mut self, qpos: &[f64], qvel: &[f64]);

    /// Canonical keyframe `(qpos, qvel)` stored with the model, or
    /// `None` if the index is out of range.
    fn keyframe(&self, index: usize) -> Option<(Vec<f64>, Vec<f64>)>;

    /// Advance the physics by one control step. The integration scheme,
    /// contacts, and muscle dynamics are entirely the collaborator's
    /// concern.
    fn advance(&mut self, ctrl: &[f64]);

    /// World position of a named body.
    fn body_pos(&self, name: &str) -> Option<[f64; 3]>;

    /// World orientation quaternion `(w, x, y, z)` of a named body.
    fn body_quat(&self, name: &str) -> Option<[f64; 4]>;

    /// Scalar reading of a named sensor.
    fn sensor(&self, name: &str) -> Option<f64>;

    /// Number of actuators in the model. Zero for actuator-free models.
    fn actuator_count(&self) -> usize;

    /// Current actuator activations. Empty when [`actuator_count`]
    /// is zero.
    ///
    /// [`actuator_count`]: SimState::actuator_count
    fn act(&self) -> &[f64];

    /// Muscle tendon lengths, one per muscle actuator. Empty for
    /// muscle-free models.
    fn muscle_length(&self) -> &[f64];

    /// Muscle contraction velocities, one per muscle actuator. Empty
    /// for muscle-free models.
    fn muscle_velocity(&self) -> &[f64];

    /// Muscle forces, one per muscle actuator. Empty for muscle-free
    /// models.
    fn muscle_force(&self) -> &[f64];

    // ── Opponent proxy body (kinematic puppet) ─────────────────────

    /// World position of the opponent proxy body. The proxy is not
    /// dynamically simulated; its pose is force-set every tick.
    fn puppet_pos(&self) -> [f64; 3];

    /// Overwrite the opponent proxy body position.
    fn set_puppet_pos(&mut self, pos: [f64; 3]);

    /// Orientation quaternion `(w, x, y, z)` of the opponent proxy body.
    fn puppet_quat(&self) -> [f64; 4];

    /// Overwrite the opponent proxy body orientation.
    fn set_puppet_quat(&mut self, quat: [f64; 4]);

    // ── Heightfield ────────────────────────────────────────────────

    /// Heightfield dimensions `(nrow, ncol)`.
    fn hfield_dims(&self) -> (usize, usize);

    /// Heightfield elevation samples, row-major, length `nrow * ncol`.
    fn hfield(&self) -> &[f32];

    /// Mutable heightfield buffer for terrain regeneration.
    fn hfield_mut(&mut self) -> &mut [f32];

    // ── Named geometry / site properties ───────────────────────────

    /// Set the color of a named geometry. Returns `false` if the name
    /// is unknown.
    fn set_geom_rgba(&mut self, name: &str, rgba: [f32; 4]) -> bool;

    /// Set the position of a named geometry. Returns `false` if the
    /// name is unknown.
    fn set_geom_pos(&mut self, name: &str, pos: [f64; 3]) -> bool;

    /// Enable or disable collision for a named geometry. Returns
    /// `false` if the name is unknown.
    fn set_geom_collision(&mut self, name: &str, enabled: bool) -> bool;

    /// Set the color of a named site (diagnostic indicators). Returns
    /// `false` if the name is unknown.
    fn set_site_rgba(&mut self, name: &str, rgba: [f32; 4]) -> bool;

    /// Notify an attached renderer that the heightfield changed so it
    /// can refresh its cached texture. Default: no renderer, no-op.
    fn refresh_heightfield(&mut self) {}
}
