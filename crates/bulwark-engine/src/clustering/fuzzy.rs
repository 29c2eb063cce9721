//! Fuzzy c-means clustering with soft memberships.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use bulwark_core::cluster::{Cluster, ClusterMember};
use bulwark_core::config::FuzzyConfig;
use bulwark_core::constants::FUZZY_COINCIDENT_EPSILON;
use bulwark_core::entity::Track;
use bulwark_core::{BulwarkError, Result};

use super::{sample_positions, Clusterer};

/// Fuzzy c-means: every point carries a membership weight in [0, 1] for
/// every cluster; cluster construction thresholds those weights.
#[derive(Debug, Clone)]
pub struct FuzzyCMeans {
    pub k: usize,
    /// Fuzziness exponent, must be > 1.
    pub fuzziness: f32,
    /// Convergence threshold on the largest centroid shift.
    pub epsilon: f32,
    pub max_iterations: usize,
    /// Minimum membership for a point to join a cluster.
    pub membership_threshold: f32,
    /// Cap on clusters a single point may join, at least 1; the
    /// highest-membership clusters win when the threshold admits more.
    pub max_clusters_per_entity: usize,
}

impl FuzzyCMeans {
    pub fn from_config(config: FuzzyConfig) -> Self {
        Self {
            k: config.k,
            fuzziness: config.fuzziness,
            epsilon: config.epsilon,
            max_iterations: config.max_iterations,
            membership_threshold: config.membership_threshold,
            max_clusters_per_entity: config.max_clusters_per_entity,
        }
    }

    fn validate(&self, input_len: usize) -> Result<()> {
        if self.k == 0 {
            return Err(BulwarkError::InvalidArgument(
                "cluster count must be positive".into(),
            ));
        }
        if self.fuzziness <= 1.0 {
            return Err(BulwarkError::InvalidArgument(
                "fuzziness exponent must be greater than 1".into(),
            ));
        }
        if self.epsilon <= 0.0 {
            return Err(BulwarkError::InvalidArgument(
                "convergence epsilon must be positive".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(BulwarkError::InvalidArgument(
                "iteration cap must be positive".into(),
            ));
        }
        if self.max_clusters_per_entity == 0 {
            return Err(BulwarkError::InvalidArgument(
                "clusters-per-entity cap must be positive".into(),
            ));
        }
        if self.k > input_len {
            return Err(BulwarkError::InvalidArgument(format!(
                "requested {} clusters for {input_len} tracks",
                self.k
            )));
        }
        Ok(())
    }

    /// Membership row for one point against the current centroids.
    fn memberships_of(&self, position: Vec3, centroids: &[Vec3]) -> Vec<f32> {
        let distances: Vec<f32> = centroids.iter().map(|c| position.distance(*c)).collect();

        // Coincident special case: split equally among touching centroids.
        let coincident: Vec<usize> = distances
            .iter()
            .enumerate()
            .filter(|(_, d)| **d < FUZZY_COINCIDENT_EPSILON)
            .map(|(c, _)| c)
            .collect();
        if !coincident.is_empty() {
            let share = 1.0 / coincident.len() as f32;
            let mut row = vec![0.0; centroids.len()];
            for c in coincident {
                row[c] = share;
            }
            return row;
        }

        let exponent = 2.0 / (self.fuzziness - 1.0);
        distances
            .iter()
            .map(|&d| {
                let sum: f32 = distances.iter().map(|&d2| (d / d2).powf(exponent)).sum();
                1.0 / sum
            })
            .collect()
    }
}

impl Clusterer for FuzzyCMeans {
    fn cluster(&self, tracks: &[Track], rng: &mut ChaCha8Rng) -> Result<Vec<Cluster>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        self.validate(tracks.len())?;

        let n = tracks.len();
        let mut centroids = sample_positions(tracks, self.k, rng);

        for iteration in 0..self.max_iterations {
            let memberships: Vec<Vec<f32>> = tracks
                .iter()
                .map(|t| self.memberships_of(t.position(), &centroids))
                .collect();

            let mut shift: f32 = 0.0;
            for c in 0..self.k {
                let mut weighted = Vec3::ZERO;
                let mut total = 0.0f32;
                for (i, track) in tracks.iter().enumerate() {
                    let w = memberships[i][c].powf(self.fuzziness);
                    weighted += track.position() * w;
                    total += w;
                }
                let updated = if total < f32::EPSILON {
                    // Degenerate cluster: reseed at a random input point.
                    tracks[rng.gen_range(0..n)].position()
                } else {
                    weighted / total
                };
                shift = shift.max(centroids[c].distance(updated));
                centroids[c] = updated;
            }

            if shift <= self.epsilon {
                debug!(iteration, k = self.k, "fuzzy c-means converged");
                break;
            }
        }

        // Final memberships against the converged centroids.
        let memberships: Vec<Vec<f32>> = tracks
            .iter()
            .map(|t| self.memberships_of(t.position(), &centroids))
            .collect();

        let mut clusters: Vec<Cluster> = centroids.iter().map(|&c| Cluster::new(c)).collect();
        for (i, track) in tracks.iter().enumerate() {
            let mut candidates: Vec<(usize, f32)> = memberships[i]
                .iter()
                .enumerate()
                .filter(|(_, u)| **u >= self.membership_threshold)
                .map(|(c, u)| (c, *u))
                .collect();
            candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            candidates.truncate(self.max_clusters_per_entity);

            if candidates.is_empty() {
                // No cluster met the threshold: fall back to the best one.
                let (best, u) = memberships[i]
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .expect("k > 0");
                candidates.push((best, *u));
            }

            for (c, u) in candidates {
                clusters[c].push(ClusterMember::with_membership(track.id, track.kinematics, u));
            }
        }

        // No cluster may come back empty while points exist: force-populate
        // with the highest-membership point.
        for (c, cluster) in clusters.iter_mut().enumerate() {
            if !cluster.is_empty() {
                continue;
            }
            let (i, u) = memberships
                .iter()
                .enumerate()
                .map(|(i, row)| (i, row[c]))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .expect("non-empty input");
            cluster.push(ClusterMember::with_membership(
                tracks[i].id,
                tracks[i].kinematics,
                u,
            ));
        }

        Ok(clusters)
    }
}
