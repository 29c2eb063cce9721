//! Events emitted by the battle manager for telemetry and UI collaborators.
//!
//! Interested collaborators drain the buffer once per tick; nothing in the
//! engine dispatches callbacks directly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::TrackId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// A new threat track entered the table.
    ThreatDetected { track: TrackId },
    /// A clustering run completed.
    ClustersFormed { count: usize },
    /// An interceptor was paired with a threat.
    InterceptorAssigned {
        interceptor: TrackId,
        threat: TrackId,
    },
    /// A launch plan was produced for a threat.
    LaunchPlanned {
        threat: TrackId,
        launch_angle_deg: f32,
        intercept_position: Vec3,
    },
    /// Launch planning declined to fire.
    LaunchRejected { threat: TrackId, reason: String },
    /// All members of a tracked cluster were destroyed; its interceptors
    /// have been unassigned.
    ClusterDropped {
        cluster_id: u64,
        released: Vec<TrackId>,
    },
}
