//! The track model and its registry.
//!
//! A `Track` is the engine's view of one agent: a kinematic sample plus
//! static envelope parameters and non-owning target links. The `TrackTable`
//! is the explicit registry that resolves those links — passed into the
//! engine's entry points instead of living behind a singleton manager.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{AccelerationEnvelope, Kinematics};

/// Copyable handle to a track in a `TrackTable`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TrackId(pub u32);

/// Which side of the engagement a track belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Threat,
    Interceptor,
}

/// One agent as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub kind: TrackKind,
    pub kinematics: Kinematics,
    pub envelope: AccelerationEnvelope,
    /// Set once the agent is destroyed or has left the engagement.
    pub terminated: bool,
    /// The track this one is pursuing (or being pursued by). Non-owning;
    /// resolved through the `TrackTable` and may dangle after removal.
    pub target: Option<TrackId>,
    /// A predicted/dummy stand-in for `target`, when the host maintains one.
    pub target_model: Option<TrackId>,
}

impl Track {
    pub fn new(id: TrackId, kind: TrackKind, kinematics: Kinematics) -> Self {
        Self {
            id,
            kind,
            kinematics,
            envelope: AccelerationEnvelope::default(),
            terminated: false,
            target: None,
            target_model: None,
        }
    }

    pub fn position(&self) -> glam::Vec3 {
        self.kinematics.position
    }

    pub fn velocity(&self) -> glam::Vec3 {
        self.kinematics.velocity
    }
}

/// Registry of live tracks. Ordered by id so iteration is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackTable {
    tracks: BTreeMap<TrackId, Track>,
    next_id: u32,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a track and return its handle.
    pub fn spawn(&mut self, kind: TrackKind, kinematics: Kinematics) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.insert(id, Track::new(id, kind, kinematics));
        id
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        self.tracks.remove(&id)
    }

    /// Mark a track terminated without removing it; composite aggregates
    /// stop averaging it in.
    pub fn terminate(&mut self, id: TrackId) {
        if let Some(track) = self.tracks.get_mut(&id) {
            track.terminated = true;
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks, terminated included, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Non-terminated tracks in id order.
    pub fn live(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(|t| !t.terminated)
    }

    /// Snapshot of non-terminated tracks of one kind, for handing to the
    /// clustering/assignment algorithms.
    pub fn live_of_kind(&self, kind: TrackKind) -> Vec<Track> {
        self.live().filter(|t| t.kind == kind).cloned().collect()
    }
}
