//! Engine configuration.
//!
//! Everything here is plain serde data loaded by the host's config
//! collaborator and handed to the battle manager at construction.

use serde::{Deserialize, Serialize};

use crate::constants::{KMEANS_MAX_ITERATIONS, PN_DEFAULT_GAIN};

/// Size/radius constraints for the constrained clustering algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClusterConstraints {
    /// Maximum members per cluster.
    pub max_size: usize,
    /// Maximum cluster radius in meters.
    pub max_radius: f32,
}

impl Default for ClusterConstraints {
    fn default() -> Self {
        Self {
            max_size: 8,
            max_radius: 2_000.0,
        }
    }
}

/// Tuning for fuzzy c-means.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FuzzyConfig {
    /// Number of clusters.
    pub k: usize,
    /// Fuzziness exponent, must be > 1.
    pub fuzziness: f32,
    /// Convergence threshold on the largest centroid shift.
    pub epsilon: f32,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Minimum membership for a point to join a cluster.
    pub membership_threshold: f32,
    /// Cap on clusters a single point may join, at least 1.
    pub max_clusters_per_entity: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            k: 4,
            fuzziness: 2.0,
            epsilon: 1e-3,
            max_iterations: KMEANS_MAX_ITERATIONS,
            membership_threshold: 0.5,
            max_clusters_per_entity: 1,
        }
    }
}

/// Which clustering algorithm the battle manager runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum ClusteringSelection {
    KMeans { k: usize },
    ConstrainedKMeans,
    Agglomerative,
    FuzzyCMeans(FuzzyConfig),
}

impl Default for ClusteringSelection {
    fn default() -> Self {
        Self::ConstrainedKMeans
    }
}

/// Interceptor-to-threat matching policy. A runtime choice, not a type
/// hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentPolicy {
    RoundRobin,
    MinDistance,
    MaxClosingSpeed,
    #[default]
    ThreatPriority,
}

/// Which guidance law drives the interceptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceLawKind {
    #[default]
    ProNav,
    AugmentedProNav,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuidanceConfig {
    pub law: GuidanceLawKind,
    pub gain: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            law: GuidanceLawKind::ProNav,
            gain: PN_DEFAULT_GAIN,
        }
    }
}

/// Top-level battle manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// RNG seed for determinism. Same seed = same clustering/assignment.
    pub seed: u64,
    #[serde(default)]
    pub constraints: ClusterConstraints,
    #[serde(default)]
    pub clustering: ClusteringSelection,
    #[serde(default)]
    pub assignment: AssignmentPolicy,
    #[serde(default)]
    pub guidance: GuidanceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            constraints: ClusterConstraints::default(),
            clustering: ClusteringSelection::default(),
            assignment: AssignmentPolicy::default(),
            guidance: GuidanceConfig::default(),
        }
    }
}
