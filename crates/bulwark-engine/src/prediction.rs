//! Kinematic state prediction.

use bulwark_core::types::Kinematics;

/// Predicts an entity's kinematic state at a time offset from now.
pub trait Predictor {
    fn predict(&self, time: f32) -> Kinematics;
}

/// Pure linear extrapolation: constant velocity, acceleration carried
/// through unchanged. Valid for negative offsets (the past) as well.
#[derive(Debug, Clone, Copy)]
pub struct LinearExtrapolator {
    state: Kinematics,
}

impl LinearExtrapolator {
    pub fn new(state: Kinematics) -> Self {
        Self { state }
    }
}

impl Predictor for LinearExtrapolator {
    fn predict(&self, time: f32) -> Kinematics {
        Kinematics {
            position: self.state.position + self.state.velocity * time,
            velocity: self.state.velocity,
            acceleration: self.state.acceleration,
        }
    }
}
