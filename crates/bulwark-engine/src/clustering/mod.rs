//! Threat clustering algorithms.
//!
//! All algorithms share one capability: group a snapshot of tracks into
//! `Cluster` aggregates. Empty input yields empty output; randomized
//! seeding draws from a caller-supplied RNG so runs are reproducible.

mod agglomerative;
mod constrained;
mod fuzzy;
mod kmeans;

pub use agglomerative::Agglomerative;
pub use constrained::ConstrainedKMeans;
pub use fuzzy::FuzzyCMeans;
pub use kmeans::KMeans;

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::cluster::Cluster;
use bulwark_core::config::{ClusterConstraints, ClusteringSelection};
use bulwark_core::entity::Track;
use bulwark_core::Result;

/// Groups tracks into clusters.
pub trait Clusterer {
    fn cluster(&self, tracks: &[Track], rng: &mut ChaCha8Rng) -> Result<Vec<Cluster>>;
}

/// Instantiate the configured algorithm.
pub fn clusterer_for(
    selection: ClusteringSelection,
    constraints: ClusterConstraints,
) -> Box<dyn Clusterer + Send + Sync> {
    match selection {
        ClusteringSelection::KMeans { k } => Box::new(KMeans::new(k)),
        ClusteringSelection::ConstrainedKMeans => Box::new(ConstrainedKMeans {
            max_size: constraints.max_size,
            max_radius: constraints.max_radius,
        }),
        ClusteringSelection::Agglomerative => Box::new(Agglomerative {
            max_size: constraints.max_size,
            max_radius: constraints.max_radius,
        }),
        ClusteringSelection::FuzzyCMeans(config) => Box::new(FuzzyCMeans::from_config(config)),
    }
}

/// Sample `k` distinct track positions via a partial Fisher-Yates shuffle.
pub(crate) fn sample_positions(tracks: &[Track], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec3> {
    let mut indices: Vec<usize> = (0..tracks.len()).collect();
    for i in 0..k {
        let j = rng.gen_range(i..indices.len());
        indices.swap(i, j);
    }
    indices[..k].iter().map(|&i| tracks[i].position()).collect()
}

/// Index of the centroid nearest to `position` (ties to the lowest index).
pub(crate) fn nearest_centroid(position: Vec3, centroids: &[Vec3]) -> usize {
    let mut best = 0;
    let mut best_d = f32::MAX;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = position.distance_squared(*centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

#[cfg(test)]
pub(crate) mod test_util {
    use bulwark_core::entity::{Track, TrackId, TrackKind};
    use bulwark_core::types::Kinematics;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    pub fn track_at(id: u32, position: Vec3) -> Track {
        Track::new(
            TrackId(id),
            TrackKind::Threat,
            Kinematics::at_position(position),
        )
    }

    /// Two tight groups of three tracks each, 1 km apart.
    pub fn two_groups() -> Vec<Track> {
        vec![
            track_at(0, Vec3::new(0.0, 0.0, 0.0)),
            track_at(1, Vec3::new(10.0, 0.0, 0.0)),
            track_at(2, Vec3::new(0.0, 0.0, 10.0)),
            track_at(3, Vec3::new(1000.0, 0.0, 0.0)),
            track_at(4, Vec3::new(1010.0, 0.0, 0.0)),
            track_at(5, Vec3::new(1000.0, 0.0, 10.0)),
        ]
    }

    /// A spread line of `n` tracks, 100 m apart.
    pub fn line(n: u32) -> Vec<Track> {
        (0..n)
            .map(|i| track_at(i, Vec3::new(i as f32 * 100.0, 0.0, 0.0)))
            .collect()
    }
}
