//! Bottom-up agglomerative clustering under size and radius constraints.

use rand_chacha::ChaCha8Rng;
use tracing::debug;

use bulwark_core::cluster::{Cluster, ClusterMember};
use bulwark_core::entity::Track;
use bulwark_core::{BulwarkError, Result};

use super::Clusterer;

/// Agglomerative merge of singleton clusters.
///
/// Maintains a lower-triangular centroid-distance matrix and repeatedly
/// merges the globally closest pair into the lower index. Pairs whose
/// merge would exceed `max_size` get their distance poisoned to infinity
/// and are skipped. Stops when the minimum remaining distance exceeds
/// `max_radius` or no valid pair remains.
///
/// The centroid-distance stopping test is conservative with respect to
/// the radius bound: a merged cluster's radius never exceeds the sum of
/// the originals' radii.
#[derive(Debug, Clone)]
pub struct Agglomerative {
    pub max_size: usize,
    pub max_radius: f32,
}

impl Clusterer for Agglomerative {
    fn cluster(&self, tracks: &[Track], _rng: &mut ChaCha8Rng) -> Result<Vec<Cluster>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        if self.max_size == 0 {
            return Err(BulwarkError::InvalidArgument(
                "max cluster size must be positive".into(),
            ));
        }

        let n = tracks.len();
        let mut clusters: Vec<Option<Cluster>> = tracks
            .iter()
            .map(|t| Some(Cluster::singleton(ClusterMember::new(t.id, t.kinematics))))
            .collect();

        // dist[i][j] for j < i.
        let mut dist: Vec<Vec<f32>> = (0..n)
            .map(|i| {
                (0..i)
                    .map(|j| tracks[i].position().distance(tracks[j].position()))
                    .collect()
            })
            .collect();

        let mut merges = 0usize;
        loop {
            let mut best: Option<(f32, usize, usize)> = None;
            for i in 1..n {
                if clusters[i].is_none() {
                    continue;
                }
                for j in 0..i {
                    if clusters[j].is_none() {
                        continue;
                    }
                    let d = dist[i][j];
                    if d.is_finite() && best.map_or(true, |(b, _, _)| d < b) {
                        best = Some((d, i, j));
                    }
                }
            }

            let Some((d, i, j)) = best else { break };
            if d > self.max_radius {
                break;
            }

            let hi_size = clusters[i].as_ref().map_or(0, Cluster::size);
            let lo_size = clusters[j].as_ref().map_or(0, Cluster::size);
            if hi_size + lo_size > self.max_size {
                // Skip, don't merge; a later merge elsewhere may re-open
                // this pair via the distance refresh below.
                dist[i][j] = f32::INFINITY;
                continue;
            }

            // Merge the higher index into the lower, then recenter and
            // refresh the lower index's distances.
            let merged = clusters[i].take().expect("checked above");
            let target = clusters[j].as_mut().expect("checked above");
            target.merge(merged);
            target.recenter();
            let centroid = target.centroid;
            merges += 1;

            for x in 0..n {
                if x == j || clusters[x].is_none() {
                    continue;
                }
                let other = clusters[x].as_ref().expect("checked above").centroid;
                let (row, col) = if x > j { (x, j) } else { (j, x) };
                dist[row][col] = centroid.distance(other);
            }
        }

        debug!(input = n, merges, "agglomerative clustering finished");
        Ok(clusters.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::test_util::{line, rng, track_at, two_groups};
    use glam::Vec3;

    fn run(max_size: usize, max_radius: f32, tracks: &[Track]) -> Vec<Cluster> {
        Agglomerative {
            max_size,
            max_radius,
        }
        .cluster(tracks, &mut rng())
        .unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(run(4, 100.0, &[]).is_empty());
    }

    #[test]
    fn test_zero_max_radius_yields_singletons() {
        let tracks = line(5);
        let clusters = run(usize::MAX, 0.0, &tracks);
        assert_eq!(clusters.len(), 5);
        for c in &clusters {
            assert_eq!(c.size(), 1);
        }
    }

    #[test]
    fn test_max_size_one_yields_singletons() {
        let tracks = line(5);
        let clusters = run(1, f32::INFINITY, &tracks);
        assert_eq!(clusters.len(), 5);
    }

    #[test]
    fn test_unconstrained_merges_to_single_mean_cluster() {
        let tracks = two_groups();
        let clusters = run(usize::MAX, f32::INFINITY, &tracks);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].size(), tracks.len());

        let mean = tracks
            .iter()
            .fold(Vec3::ZERO, |acc, t| acc + t.position())
            / tracks.len() as f32;
        assert!(clusters[0].centroid.distance(mean) < 1e-3);
    }

    #[test]
    fn test_groups_beyond_radius_stay_apart() {
        let tracks = two_groups();
        // Groups are ~1 km apart; within-group spacing is ~10 m.
        let clusters = run(usize::MAX, 100.0, &tracks);
        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            assert_eq!(c.size(), 3);
        }
    }

    #[test]
    fn test_size_cap_blocks_oversized_merge() {
        // Four points close together; size cap 2 forces two pairs.
        let tracks = vec![
            track_at(0, Vec3::new(0.0, 0.0, 0.0)),
            track_at(1, Vec3::new(1.0, 0.0, 0.0)),
            track_at(2, Vec3::new(2.0, 0.0, 0.0)),
            track_at(3, Vec3::new(3.0, 0.0, 0.0)),
        ];
        let clusters = run(2, f32::INFINITY, &tracks);
        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            assert_eq!(c.size(), 2);
        }
    }

    #[test]
    fn test_merge_prefers_lowest_index_on_ties() {
        // Symmetric pair distances: merge must land in the lower index.
        let tracks = vec![
            track_at(0, Vec3::new(0.0, 0.0, 0.0)),
            track_at(1, Vec3::new(10.0, 0.0, 0.0)),
        ];
        let clusters = run(2, f32::INFINITY, &tracks);
        assert_eq!(clusters.len(), 1);
        let ids: Vec<u32> = clusters[0].member_ids().map(|id| id.0).collect();
        assert_eq!(ids, vec![0, 1], "lower index absorbs the higher");
    }
}
