//! Lloyd's k-means over track positions.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use bulwark_core::cluster::{Cluster, ClusterMember};
use bulwark_core::constants::{KMEANS_MAX_ITERATIONS, KMEANS_SHIFT_EPSILON};
use bulwark_core::entity::Track;
use bulwark_core::{BulwarkError, Result};

use super::{nearest_centroid, sample_positions, Clusterer};

/// K-means with a fixed cluster count.
///
/// Centroids are seeded by sampling input positions without replacement.
/// Converges when the largest centroid shift drops to [`KMEANS_SHIFT_EPSILON`]
/// or the iteration cap is hit; a final pass assigns every track to its
/// converged centroid.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: KMEANS_MAX_ITERATIONS,
        }
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, tracks: &[Track], rng: &mut ChaCha8Rng) -> Result<Vec<Cluster>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        if self.k == 0 {
            return Err(BulwarkError::InvalidArgument(
                "cluster count must be positive".into(),
            ));
        }
        if self.k > tracks.len() {
            return Err(BulwarkError::InvalidArgument(format!(
                "requested {} clusters for {} tracks",
                self.k,
                tracks.len()
            )));
        }

        let mut centroids = sample_positions(tracks, self.k, rng);

        for iteration in 0..self.max_iterations {
            let mut sums = vec![Vec3::ZERO; self.k];
            let mut counts = vec![0u32; self.k];
            for track in tracks {
                let c = nearest_centroid(track.position(), &centroids);
                sums[c] += track.position();
                counts[c] += 1;
            }

            let mut shift: f32 = 0.0;
            for c in 0..self.k {
                let updated = if counts[c] == 0 {
                    // Re-seed an empty cluster with a random input position.
                    tracks[rng.gen_range(0..tracks.len())].position()
                } else {
                    sums[c] / counts[c] as f32
                };
                shift = shift.max(centroids[c].distance(updated));
                centroids[c] = updated;
            }

            if shift <= KMEANS_SHIFT_EPSILON {
                debug!(iteration, k = self.k, "k-means converged");
                break;
            }
        }

        let mut clusters: Vec<Cluster> = centroids.iter().map(|&c| Cluster::new(c)).collect();
        for track in tracks {
            let c = nearest_centroid(track.position(), &centroids);
            clusters[c].push(ClusterMember::new(track.id, track.kinematics));
        }
        Ok(clusters)
    }
}
