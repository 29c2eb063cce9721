//! K-means under cluster size and radius constraints.

use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use bulwark_core::cluster::Cluster;
use bulwark_core::constants::CONSTRAINED_KMEANS_MAX_ROUNDS;
use bulwark_core::entity::Track;
use bulwark_core::{BulwarkError, Result};

use super::{Clusterer, KMeans};

/// Repeated k-means that grows the cluster count until every cluster
/// satisfies both the size and radius constraints.
///
/// Starts at `ceil(n / max_size)` clusters. Each round counts size and
/// radius violators separately and grows the cluster count by half the
/// larger count. The count never decreases and is capped at the input
/// size, so the loop terminates; [`CONSTRAINED_KMEANS_MAX_ROUNDS`] is a
/// defensive backstop.
#[derive(Debug, Clone)]
pub struct ConstrainedKMeans {
    pub max_size: usize,
    pub max_radius: f32,
}

impl Clusterer for ConstrainedKMeans {
    fn cluster(&self, tracks: &[Track], rng: &mut ChaCha8Rng) -> Result<Vec<Cluster>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        if self.max_size == 0 {
            return Err(BulwarkError::InvalidArgument(
                "max cluster size must be positive".into(),
            ));
        }
        if self.max_radius < 0.0 {
            return Err(BulwarkError::InvalidArgument(
                "max cluster radius must be non-negative".into(),
            ));
        }

        let n = tracks.len();
        let mut num_clusters = n.div_ceil(self.max_size).max(1);
        let mut last = Vec::new();

        for round in 0..CONSTRAINED_KMEANS_MAX_ROUNDS {
            num_clusters = num_clusters.min(n);
            let clusters = KMeans::new(num_clusters).cluster(tracks, rng)?;

            let size_violations = clusters.iter().filter(|c| c.size() > self.max_size).count();
            let radius_violations = clusters
                .iter()
                .filter(|c| c.radius() > self.max_radius)
                .count();
            let violations = size_violations.max(radius_violations);

            if violations == 0 {
                debug!(round, num_clusters, "constrained k-means satisfied");
                return Ok(clusters);
            }
            if num_clusters == n {
                // Cannot split further; only coincident points can still
                // violate here.
                last = clusters;
                break;
            }

            num_clusters += violations.div_ceil(2).max(1);
            last = clusters;
        }

        warn!(
            num_clusters,
            "constrained k-means hit its round cap with violations remaining"
        );
        Ok(last)
    }
}
