//! Relative geometry between an observer and a target.
//!
//! Produces the observer-frame snapshot consumed by guidance and sensing:
//! relative position and velocity decomposed into range/azimuth/elevation
//! terms, with line-of-sight angular rates in rad/s.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::GEOMETRY_EPSILON;
use crate::types::{Frame, Kinematics};

/// A vector plus its spherical decomposition about the observer.
///
/// For position: `range` is meters, angles are radians. For velocity:
/// `range` is the range rate in m/s (positive = separating) and the angles
/// are line-of-sight angular rates in rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub cartesian: Vec3,
    pub range: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

/// Relative state of a target with respect to an observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub position: Spherical,
    pub velocity: Spherical,
    /// The target's own absolute acceleration. Acceleration is a free
    /// input here, not part of the relative kinematics.
    pub acceleration: Vec3,
}

impl Transformation {
    /// Closing speed in m/s: negative range rate, positive when closing.
    pub fn closing_speed(&self) -> f32 {
        -self.velocity.range
    }
}

/// Unit directions orthogonal to the line of sight, along which azimuth
/// and elevation rotation are measured. When the relative position is
/// colinear with an observer axis, the degenerate direction is re-derived
/// from the other one.
///
/// Returns `None` when the relative position itself is ~zero.
pub fn los_basis(relative_position: Vec3, up: Vec3, right: Vec3) -> Option<(Vec3, Vec3)> {
    if relative_position.length_squared() < GEOMETRY_EPSILON {
        return None;
    }
    let mut azimuth_dir = up.cross(relative_position);
    let mut elevation_dir = relative_position.cross(right);
    if azimuth_dir.length_squared() < GEOMETRY_EPSILON {
        azimuth_dir = elevation_dir.cross(relative_position);
    }
    if elevation_dir.length_squared() < GEOMETRY_EPSILON {
        elevation_dir = azimuth_dir.cross(relative_position);
    }
    if azimuth_dir.length_squared() < GEOMETRY_EPSILON
        || elevation_dir.length_squared() < GEOMETRY_EPSILON
    {
        return None;
    }
    Some((azimuth_dir.normalize(), elevation_dir.normalize()))
}

/// Relative geometric/kinematic state of `target` as seen from `observer`.
pub fn relative_transformation(observer: &Frame, target: &Kinematics) -> Transformation {
    let relative_position = target.position - observer.position();
    let relative_velocity = target.velocity - observer.velocity();
    transformation_of(observer, relative_position, relative_velocity, target.acceleration)
}

/// Waypoint variant: a bare position with no motion of its own, so the
/// apparent relative velocity is just the negated observer velocity.
pub fn waypoint_transformation(observer: &Frame, waypoint: Vec3) -> Transformation {
    let relative_position = waypoint - observer.position();
    transformation_of(observer, relative_position, -observer.velocity(), Vec3::ZERO)
}

fn transformation_of(
    observer: &Frame,
    relative_position: Vec3,
    relative_velocity: Vec3,
    target_acceleration: Vec3,
) -> Transformation {
    let range = relative_position.length();

    // Degenerate geometry: target coincident with observer.
    if range < GEOMETRY_EPSILON {
        return Transformation {
            position: Spherical::default(),
            velocity: Spherical {
                cartesian: relative_velocity,
                ..Default::default()
            },
            acceleration: target_acceleration,
        };
    }

    // Split relative position into vertical (along observer up) and flat
    // (projection onto the plane orthogonal to up).
    let vertical = observer.up * relative_position.dot(observer.up);
    let flat = relative_position - vertical;
    let flat_len = flat.length();

    let elevation = if flat_len < GEOMETRY_EPSILON {
        0.0
    } else {
        (vertical.length() / flat_len).atan()
    };
    let azimuth = if flat_len < GEOMETRY_EPSILON {
        0.0
    } else {
        // Signed angle from forward to the flat component, about up.
        observer
            .forward
            .cross(flat)
            .dot(observer.up)
            .atan2(observer.forward.dot(flat))
    };

    let los = relative_position / range;
    let range_rate = relative_velocity.dot(los);
    let tangential = relative_velocity - los * range_rate;

    let (azimuth_rate, elevation_rate) =
        match los_basis(relative_position, observer.up, observer.right) {
            Some((azimuth_dir, elevation_dir)) => (
                tangential.dot(azimuth_dir) / range,
                tangential.dot(elevation_dir) / range,
            ),
            None => (0.0, 0.0),
        };

    Transformation {
        position: Spherical {
            cartesian: relative_position,
            range,
            azimuth,
            elevation,
        },
        velocity: Spherical {
            cartesian: relative_velocity,
            range: range_rate,
            azimuth: azimuth_rate,
            elevation: elevation_rate,
        },
        acceleration: target_acceleration,
    }
}
