//! Planar pose and velocity value types, plus yaw-only quaternion
//! conversion for the opponent proxy body.
//!
//! The opponent lives on the ground plane: its full state is an `(x, y)`
//! position and a heading angle. Heading is never wrapped or clamped;
//! it is interpreted mod 2π only at the quaternion boundary.

use std::fmt;

/// World-frame planar pose of the opponent: position and heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose2d {
    /// World x position, meters.
    pub x: f64,
    /// World y position, meters.
    pub y: f64,
    /// Heading angle, radians. Unbounded; wrapped only when converted
    /// to a quaternion.
    pub heading: f64,
}

impl Pose2d {
    /// Construct a pose from components.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Planar Euclidean distance from this pose to a world `(x, y)` point.
    pub fn planar_distance(&self, point: [f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp the position (not the heading) into `[-bound, bound]²`.
    pub fn clamp_position(&mut self, bound: f64) {
        self.x = self.x.clamp(-bound, bound);
        self.y = self.y.clamp(-bound, bound);
    }
}

impl fmt::Display for Pose2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3} rad)", self.x, self.y, self.heading)
    }
}

/// Commanded opponent velocity for one tick: linear and angular
/// components in `[-1, 1]` before normalization.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity2d {
    /// Linear speed command. Normalized to `[0, 1]`: the opponent
    /// cannot move backward.
    pub linear: f64,
    /// Angular (turn-rate) command, normalized to `[-1, 1]`.
    pub angular: f64,
}

impl Velocity2d {
    /// A zero command.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Normalize a raw command: linear speed is made non-negative, then
    /// both components are clamped to the unit interval.
    pub fn normalized(self) -> Self {
        Self {
            linear: self.linear.abs().clamp(0.0, 1.0),
            angular: self.angular.clamp(-1.0, 1.0),
        }
    }
}

/// Build a yaw-only quaternion `(w, x, y, z)` from a heading angle.
///
/// Equivalent to an intrinsic z-rotation; the opponent proxy body never
/// pitches or rolls.
pub fn quat_from_yaw(yaw: f64) -> [f64; 4] {
    let half = 0.5 * yaw;
    [half.cos(), 0.0, 0.0, half.sin()]
}

/// Recover the yaw angle from a `(w, x, y, z)` quaternion.
///
/// Uses the general ZYX yaw extraction, so quaternions that were not
/// produced by [`quat_from_yaw`] still yield their z-axis rotation.
pub fn yaw_from_quat(q: [f64; 4]) -> f64 {
    let [w, x, y, z] = q;
    (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z))
}
