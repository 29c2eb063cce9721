//! Cluster aggregates produced by the clustering algorithms.
//!
//! A cluster is the one composite entity in this engine: its kinematics
//! are the unweighted mean of its active members. Clusters are created
//! fresh per clustering run and discarded after consumption; only the
//! battle manager's cluster-to-interceptor map persists across runs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{TrackId, TrackTable};
use crate::types::Kinematics;

/// One member of a cluster: the track handle plus its kinematics as
/// sampled at clustering time, and (for fuzzy variants) the degree of
/// belonging in [0, 1]. Crisp algorithms leave `membership` at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub id: TrackId,
    pub kinematics: Kinematics,
    pub membership: f32,
}

impl ClusterMember {
    pub fn new(id: TrackId, kinematics: Kinematics) -> Self {
        Self {
            id,
            kinematics,
            membership: 1.0,
        }
    }

    pub fn with_membership(id: TrackId, kinematics: Kinematics, membership: f32) -> Self {
        Self {
            id,
            kinematics,
            membership,
        }
    }
}

/// A group of tracks with a representative centroid.
///
/// The centroid is NOT recomputed on merge; callers call [`Cluster::recenter`]
/// explicitly when they want centroid = mean member position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cluster {
    pub centroid: Vec3,
    members: Vec<ClusterMember>,
}

impl Cluster {
    pub fn new(centroid: Vec3) -> Self {
        Self {
            centroid,
            members: Vec::new(),
        }
    }

    /// A singleton cluster centered on its sole member.
    pub fn singleton(member: ClusterMember) -> Self {
        Self {
            centroid: member.kinematics.position,
            members: vec![member],
        }
    }

    pub fn push(&mut self, member: ClusterMember) {
        self.members.push(member);
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[ClusterMember] {
        &self.members
    }

    pub fn member_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Union the other cluster's membership into this one. The centroid is
    /// left untouched.
    pub fn merge(&mut self, other: Cluster) {
        self.members.extend(other.members);
    }

    /// Set the centroid to the mean member position (zero when empty).
    pub fn recenter(&mut self) {
        self.centroid = mean(self.members.iter().map(|m| m.kinematics.position));
    }

    /// Max distance from the centroid to any member, 0 when empty.
    ///
    /// Members are snapshots taken at clustering time; terminated tracks
    /// are excluded from clustering input, so every snapshot member counts.
    pub fn radius(&self) -> f32 {
        self.members
            .iter()
            .map(|m| self.centroid.distance(m.kinematics.position))
            .fold(0.0, f32::max)
    }

    /// Mean kinematics over the member snapshots; zero when empty.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: mean(self.members.iter().map(|m| m.kinematics.position)),
            velocity: mean(self.members.iter().map(|m| m.kinematics.velocity)),
            acceleration: mean(self.members.iter().map(|m| m.kinematics.acceleration)),
        }
    }

    /// Mean kinematics over members still alive in the registry; zero when
    /// none survive. This is the live composite-entity view.
    pub fn live_kinematics(&self, tracks: &TrackTable) -> Kinematics {
        let live: Vec<Kinematics> = self
            .members
            .iter()
            .filter_map(|m| tracks.get(m.id))
            .filter(|t| !t.terminated)
            .map(|t| t.kinematics)
            .collect();
        Kinematics {
            position: mean(live.iter().map(|k| k.position)),
            velocity: mean(live.iter().map(|k| k.velocity)),
            acceleration: mean(live.iter().map(|k| k.acceleration)),
        }
    }

    /// Whether any member is still alive in the registry.
    pub fn has_live_members(&self, tracks: &TrackTable) -> bool {
        self.members
            .iter()
            .any(|m| tracks.get(m.id).is_some_and(|t| !t.terminated))
    }
}

fn mean(points: impl Iterator<Item = Vec3>) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0u32;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    }
}
