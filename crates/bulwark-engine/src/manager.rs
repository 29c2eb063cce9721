//! The battle manager: the engine's top-level coordinator.
//!
//! Owns the track registry, the seeded RNG, and the configured algorithm
//! instances, and sequences the engagement pipeline: cluster threats,
//! assign interceptors, plan launches, steer what is in the air, drop
//! clusters whose members are all dead. Each operation is an explicit
//! entry point; the host decides when to call what. Events accumulate in
//! a buffer the host drains once per tick.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use bulwark_core::cluster::Cluster;
use bulwark_core::config::{EngineConfig, GuidanceLawKind};
use bulwark_core::entity::{TrackId, TrackKind, TrackTable};
use bulwark_core::events::EngineEvent;
use bulwark_core::types::{Frame, Kinematics};
use bulwark_core::{BulwarkError, Result};

use crate::assignment::{strategy_for, AssignmentStrategy};
use crate::clustering::{clusterer_for, Clusterer};
use crate::guidance::{AugmentedProNav, GuidanceLaw, ProNav};
use crate::launch::{
    IterativeLaunchPlanner, LaunchAngleInterpolator, LaunchPlan, LaunchRejection,
};
use crate::prediction::LinearExtrapolator;

/// A cluster the manager is tracking across runs, with the interceptors
/// currently committed against it.
#[derive(Debug, Clone)]
pub struct TrackedCluster {
    pub id: u64,
    pub cluster: Cluster,
    pub interceptors: Vec<TrackId>,
}

/// Instantiate the configured guidance law.
fn law_for(config: &EngineConfig) -> Box<dyn GuidanceLaw + Send + Sync> {
    let gain = config.guidance.gain;
    match config.guidance.law {
        GuidanceLawKind::ProNav => Box::new(ProNav { gain }),
        GuidanceLawKind::AugmentedProNav => Box::new(AugmentedProNav { gain }),
    }
}

pub struct BattleManager {
    config: EngineConfig,
    tracks: TrackTable,
    rng: ChaCha8Rng,
    clusterer: Box<dyn Clusterer + Send + Sync>,
    strategy: Box<dyn AssignmentStrategy + Send + Sync>,
    guidance: Box<dyn GuidanceLaw + Send + Sync>,
    launch_table: Option<LaunchAngleInterpolator>,
    clusters: Vec<TrackedCluster>,
    next_cluster_id: u64,
    events: Vec<EngineEvent>,
}

impl BattleManager {
    pub fn new(config: EngineConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let clusterer = clusterer_for(config.clustering, config.constraints);
        let strategy = strategy_for(config.assignment);
        let guidance = law_for(&config);
        info!(seed = config.seed, "battle manager initialized");
        Self {
            config,
            tracks: TrackTable::new(),
            rng,
            clusterer,
            strategy,
            guidance,
            launch_table: None,
            clusters: Vec::new(),
            next_cluster_id: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut TrackTable {
        &mut self.tracks
    }

    pub fn clusters(&self) -> &[TrackedCluster] {
        &self.clusters
    }

    /// Register a new threat track.
    pub fn ingest_threat(&mut self, kinematics: Kinematics) -> TrackId {
        let id = self.tracks.spawn(TrackKind::Threat, kinematics);
        debug!(?id, "threat detected");
        self.events.push(EngineEvent::ThreatDetected { track: id });
        id
    }

    /// Register a new interceptor track.
    pub fn ingest_interceptor(&mut self, kinematics: Kinematics) -> TrackId {
        self.tracks.spawn(TrackKind::Interceptor, kinematics)
    }

    /// Load the ballistic launch table from CSV text. Replaces any
    /// previously loaded table.
    pub fn load_launch_table(&mut self, csv: &str) -> Result<()> {
        self.launch_table = Some(LaunchAngleInterpolator::from_csv(csv)?);
        Ok(())
    }

    /// Re-cluster the live threats with the configured algorithm. Previous
    /// clusters are discarded wholesale; interceptor commitments recorded
    /// against them do not carry over.
    pub fn run_clustering(&mut self) -> Result<()> {
        let threats = self.tracks.live_of_kind(TrackKind::Threat);
        let clusters = self.clusterer.cluster(&threats, &mut self.rng)?;

        self.clusters = clusters
            .into_iter()
            .map(|cluster| {
                let id = self.next_cluster_id;
                self.next_cluster_id += 1;
                TrackedCluster {
                    id,
                    cluster,
                    interceptors: Vec::new(),
                }
            })
            .collect();

        debug!(count = self.clusters.len(), "clustering complete");
        self.events.push(EngineEvent::ClustersFormed {
            count: self.clusters.len(),
        });
        Ok(())
    }

    /// Pair every live interceptor with a threat under the configured
    /// policy, update target links, and record each commitment against the
    /// cluster containing the threat.
    pub fn run_assignment(&mut self) {
        let interceptors = self.tracks.live_of_kind(TrackKind::Interceptor);
        let threats = self.tracks.live_of_kind(TrackKind::Threat);
        let items = self.strategy.assign(&interceptors, &threats);

        for tracked in &mut self.clusters {
            tracked.interceptors.clear();
        }

        for item in items {
            if let Some(track) = self.tracks.get_mut(item.interceptor) {
                track.target = Some(item.threat);
            }
            if let Some(tracked) = self
                .clusters
                .iter_mut()
                .find(|c| c.cluster.contains(item.threat))
            {
                tracked.interceptors.push(item.interceptor);
            }
            self.events.push(EngineEvent::InterceptorAssigned {
                interceptor: item.interceptor,
                threat: item.threat,
            });
        }
    }

    /// Solve for a launch against one threat from a fixed launcher.
    ///
    /// Fails with `InvalidOperation` when no launch table is loaded and
    /// `InvalidArgument` when the threat is unknown; a solvable geometry
    /// that the planner declines is a no-launch plan, not an error.
    pub fn plan_launch(&mut self, threat: TrackId, launcher_position: Vec3) -> Result<LaunchPlan> {
        let Some(table) = &self.launch_table else {
            return Err(BulwarkError::InvalidOperation(
                "no launch table loaded".into(),
            ));
        };
        let Some(track) = self.tracks.get(threat) else {
            return Err(BulwarkError::InvalidArgument(format!(
                "unknown threat track {threat:?}"
            )));
        };

        let predictor = LinearExtrapolator::new(track.kinematics);
        let plan =
            IterativeLaunchPlanner::default().plan(table, &predictor, launcher_position);

        if plan.should_launch {
            info!(?threat, angle = plan.launch_angle_deg, "launch planned");
            self.events.push(EngineEvent::LaunchPlanned {
                threat,
                launch_angle_deg: plan.launch_angle_deg,
                intercept_position: plan.intercept_position,
            });
        } else {
            let reason = plan
                .rejection
                .map_or("no intercept solution", LaunchRejection::as_str);
            debug!(?threat, reason, "launch declined");
            self.events.push(EngineEvent::LaunchRejected {
                threat,
                reason: reason.into(),
            });
        }
        Ok(plan)
    }

    /// Point an interceptor's guidance at a host-maintained stand-in track
    /// (a predicted or dummy model), overriding its raw target link until
    /// cleared. Unknown interceptor ids are ignored.
    pub fn set_target_model(&mut self, interceptor: TrackId, model: Option<TrackId>) {
        if let Some(track) = self.tracks.get_mut(interceptor) {
            track.target_model = model;
        }
    }

    /// Compute one guidance command per live interceptor. Guidance steers
    /// at the target model when the host maintains one, falling back to
    /// the raw target link; interceptors with neither coast (zero command).
    pub fn guidance_tick(&self) -> Vec<(TrackId, Vec3)> {
        self.tracks
            .live_of_kind(TrackKind::Interceptor)
            .iter()
            .map(|interceptor| {
                let target = interceptor
                    .target_model
                    .or(interceptor.target)
                    .and_then(|id| self.tracks.get(id))
                    .filter(|t| !t.terminated);
                let command = match target {
                    Some(target) => {
                        let frame = Frame::from_velocity(interceptor.kinematics);
                        self.guidance.commanded_acceleration(
                            &frame,
                            &interceptor.envelope,
                            &target.kinematics,
                        )
                    }
                    None => Vec3::ZERO,
                };
                (interceptor.id, command)
            })
            .collect()
    }

    /// Drop clusters whose members are all terminated or removed, and
    /// release the interceptors committed against them.
    pub fn cleanup_clusters(&mut self) {
        let mut kept = Vec::with_capacity(self.clusters.len());
        for tracked in std::mem::take(&mut self.clusters) {
            if tracked.cluster.has_live_members(&self.tracks) {
                kept.push(tracked);
                continue;
            }
            warn!(cluster_id = tracked.id, "cluster destroyed, releasing interceptors");
            for &id in &tracked.interceptors {
                if let Some(track) = self.tracks.get_mut(id) {
                    track.target = None;
                }
            }
            self.events.push(EngineEvent::ClusterDropped {
                cluster_id: tracked.id,
                released: tracked.interceptors,
            });
        }
        self.clusters = kept;
    }

    /// Take the buffered events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
