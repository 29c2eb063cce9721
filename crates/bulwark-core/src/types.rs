//! Fundamental geometric and kinematic types.
//!
//! Coordinates follow the host convention: x = right/East, y = Up
//! (altitude), z = forward/North. All units are meters and seconds.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::GEOMETRY_EPSILON;

/// A point sample of an agent's motion: position, velocity, acceleration.
///
/// Samples are supplied by the physics host each tick; the algorithms in
/// this workspace never integrate them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Position in meters.
    pub position: Vec3,
    /// Velocity in m/s.
    pub velocity: Vec3,
    /// Absolute acceleration in m/s².
    pub acceleration: Vec3,
}

impl Kinematics {
    pub fn new(position: Vec3, velocity: Vec3, acceleration: Vec3) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// A stationary sample at the given position.
    pub fn at_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Range to another sample's position in meters.
    pub fn range_to(&self, other: &Kinematics) -> f32 {
        self.position.distance(other.position)
    }
}

/// Static performance parameters for a guided agent, supplied by config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationEnvelope {
    /// Maximum forward (thrust-axis) acceleration in m/s².
    pub max_forward: f32,
    /// Maximum normal (turning) acceleration per lateral axis in m/s².
    pub max_normal: f32,
    /// Reference airspeed the envelope is quoted at (m/s).
    pub reference_speed: f32,
}

impl Default for AccelerationEnvelope {
    fn default() -> Self {
        Self {
            max_forward: 50.0,
            max_normal: 300.0,
            reference_speed: 500.0,
        }
    }
}

/// An observer's kinematics plus body-frame orientation basis.
///
/// The basis vectors are expected to be unit length and mutually
/// orthogonal; the host supplies them from its rigid-body transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub kinematics: Kinematics,
    /// Body forward axis.
    pub forward: Vec3,
    /// Body up axis.
    pub up: Vec3,
    /// Body right axis.
    pub right: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            kinematics: Kinematics::default(),
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
        }
    }
}

impl Frame {
    /// Frame with the default (world-aligned) orientation.
    pub fn from_kinematics(kinematics: Kinematics) -> Self {
        Self {
            kinematics,
            ..Default::default()
        }
    }

    /// Derive an orientation from the velocity vector: forward along the
    /// velocity, up as close to world-up as orthogonality allows.
    /// Falls back to the world-aligned frame when velocity is ~zero.
    pub fn from_velocity(kinematics: Kinematics) -> Self {
        let speed = kinematics.velocity.length();
        if speed < GEOMETRY_EPSILON {
            return Self::from_kinematics(kinematics);
        }
        let forward = kinematics.velocity / speed;
        // With y up and z forward: right = up × forward, up = forward × right.
        let mut right = Vec3::Y.cross(forward);
        if right.length_squared() < GEOMETRY_EPSILON {
            // Flying straight up or down; any horizontal right axis works.
            right = Vec3::X;
        } else {
            right = right.normalize();
        }
        let up = forward.cross(right).normalize();
        Self {
            kinematics,
            forward,
            up,
            right,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.kinematics.velocity
    }
}
