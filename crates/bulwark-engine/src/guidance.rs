//! Guidance laws for interceptors.
//!
//! Proportional navigation commands lateral acceleration proportional to
//! closing speed and line-of-sight rotation rate; the augmented variant
//! adds a feed-forward term for maneuvering targets. Both return a world
//! frame acceleration vector for the actuation host to apply.

use glam::Vec3;

use bulwark_core::constants::{
    APN_AUGMENTATION_FACTOR, GEOMETRY_EPSILON, PN_SOFT_CLAMP_FRACTION, PN_TURN_FACTOR,
};
use bulwark_core::transformation::{los_basis, relative_transformation};
use bulwark_core::types::{AccelerationEnvelope, Frame, Kinematics};

/// Computes a commanded acceleration from the observer's view of a target.
pub trait GuidanceLaw {
    fn commanded_acceleration(
        &self,
        observer: &Frame,
        envelope: &AccelerationEnvelope,
        target: &Kinematics,
    ) -> Vec3;
}

/// Classic proportional navigation with gain `G`:
/// `a = G * closing_speed * los_rate` per lateral axis.
///
/// Returns zero when the geometry is degenerate or the target is not
/// closing. Each axis is soft-clamped against the normal-acceleration
/// envelope, then the whole vector is scaled by the fixed turn factor
/// (see `bulwark_core::constants` for the tuning caveats).
#[derive(Debug, Clone, Copy)]
pub struct ProNav {
    pub gain: f32,
}

impl GuidanceLaw for ProNav {
    fn commanded_acceleration(
        &self,
        observer: &Frame,
        envelope: &AccelerationEnvelope,
        target: &Kinematics,
    ) -> Vec3 {
        pn_acceleration(self.gain, observer, envelope, target, 0.0)
    }
}

/// Augmented proportional navigation: PN plus a feed-forward term of half
/// the target's lateral (LOS-orthogonal) acceleration, added before
/// clamping.
#[derive(Debug, Clone, Copy)]
pub struct AugmentedProNav {
    pub gain: f32,
}

impl GuidanceLaw for AugmentedProNav {
    fn commanded_acceleration(
        &self,
        observer: &Frame,
        envelope: &AccelerationEnvelope,
        target: &Kinematics,
    ) -> Vec3 {
        pn_acceleration(self.gain, observer, envelope, target, APN_AUGMENTATION_FACTOR)
    }
}

fn pn_acceleration(
    gain: f32,
    observer: &Frame,
    envelope: &AccelerationEnvelope,
    target: &Kinematics,
    augmentation: f32,
) -> Vec3 {
    let t = relative_transformation(observer, target);

    let closing_speed = t.closing_speed();
    if closing_speed <= 0.0 {
        // Not closing; commanding a turn would only widen the miss.
        return Vec3::ZERO;
    }

    let Some((azimuth_dir, elevation_dir)) =
        los_basis(t.position.cartesian, observer.up, observer.right)
    else {
        return Vec3::ZERO;
    };

    let mut azimuth_cmd = gain * closing_speed * t.velocity.azimuth;
    let mut elevation_cmd = gain * closing_speed * t.velocity.elevation;

    if augmentation != 0.0 {
        // Target acceleration orthogonal to the line of sight.
        let los = t.position.cartesian / t.position.range.max(GEOMETRY_EPSILON);
        let lateral = t.acceleration - los * t.acceleration.dot(los);
        azimuth_cmd += augmentation * lateral.dot(azimuth_dir);
        elevation_cmd += augmentation * lateral.dot(elevation_dir);
    }

    let azimuth_cmd = soft_clamp(azimuth_cmd, envelope.max_normal);
    let elevation_cmd = soft_clamp(elevation_cmd, envelope.max_normal);

    (azimuth_dir * azimuth_cmd + elevation_dir * elevation_cmd) * PN_TURN_FACTOR
}

/// A component within the cap passes through; one beyond it collapses to
/// ±20% of the cap rather than saturating at the cap.
fn soft_clamp(value: f32, cap: f32) -> f32 {
    if value.abs() > cap {
        value.signum() * cap * PN_SOFT_CLAMP_FRACTION
    } else {
        value
    }
}
