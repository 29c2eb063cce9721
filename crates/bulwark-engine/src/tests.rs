//! Engine-level tests that drive the battle manager through whole
//! engagement sequences.

use glam::Vec3;

use bulwark_core::config::{AssignmentPolicy, ClusteringSelection, EngineConfig};
use bulwark_core::entity::TrackId;
use bulwark_core::events::EngineEvent;
use bulwark_core::types::Kinematics;
use bulwark_core::BulwarkError;

use crate::manager::BattleManager;

fn raid_config(seed: u64) -> EngineConfig {
    EngineConfig {
        seed,
        ..Default::default()
    }
}

/// Two tight threat groups 1 km apart, plus four interceptors near the
/// origin flying toward them.
fn spawn_raid(manager: &mut BattleManager) -> (Vec<TrackId>, Vec<TrackId>) {
    let mut threats = Vec::new();
    for group in 0..2 {
        for i in 0..3 {
            let x = group as f32 * 1000.0 + i as f32 * 10.0;
            threats.push(manager.ingest_threat(Kinematics::new(
                Vec3::new(x, 500.0, 8000.0),
                Vec3::new(0.0, 0.0, -250.0),
                Vec3::ZERO,
            )));
        }
    }
    let interceptors = (0..4)
        .map(|i| {
            manager.ingest_interceptor(Kinematics::new(
                Vec3::new(i as f32 * 50.0, 100.0, 0.0),
                Vec3::new(0.0, 0.0, 400.0),
                Vec3::ZERO,
            ))
        })
        .collect();
    (threats, interceptors)
}

#[test]
fn test_pipeline_emits_events_in_order() {
    let mut manager = BattleManager::new(raid_config(42));
    let (_, interceptors) = spawn_raid(&mut manager);

    manager.run_clustering().unwrap();
    manager.run_assignment();

    let events = manager.drain_events();
    let detections = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ThreatDetected { .. }))
        .count();
    assert_eq!(detections, 6);
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::ClustersFormed { count } if *count > 0)));
    let assignments = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::InterceptorAssigned { .. }))
        .count();
    assert_eq!(assignments, interceptors.len());

    // Every event must be serializable for the telemetry collaborator.
    for event in &events {
        serde_json::to_string(event).unwrap();
    }

    assert!(manager.drain_events().is_empty(), "drain empties the buffer");
}

#[test]
fn test_same_seed_same_clusters_and_assignments() {
    let run = |seed| {
        let mut manager = BattleManager::new(EngineConfig {
            clustering: ClusteringSelection::KMeans { k: 2 },
            assignment: AssignmentPolicy::ThreatPriority,
            ..raid_config(seed)
        });
        spawn_raid(&mut manager);
        manager.run_clustering().unwrap();
        manager.run_assignment();

        let mut clusters: Vec<Vec<TrackId>> = manager
            .clusters()
            .iter()
            .map(|c| {
                let mut ids: Vec<TrackId> = c.cluster.member_ids().collect();
                ids.sort();
                ids
            })
            .collect();
        clusters.sort();
        let targets: Vec<Option<TrackId>> = manager
            .tracks()
            .live_of_kind(bulwark_core::entity::TrackKind::Interceptor)
            .iter()
            .map(|t| t.target)
            .collect();
        (clusters, targets)
    };

    assert_eq!(run(7), run(7), "same seed must reproduce the engagement");
}

#[test]
fn test_assignment_links_interceptors_to_clusters() {
    let mut manager = BattleManager::new(raid_config(42));
    let (_, interceptors) = spawn_raid(&mut manager);

    manager.run_clustering().unwrap();
    manager.run_assignment();

    let committed: usize = manager.clusters().iter().map(|c| c.interceptors.len()).sum();
    assert_eq!(committed, interceptors.len());
    for id in interceptors {
        let target = manager.tracks().get(id).unwrap().target;
        assert!(target.is_some(), "interceptor {id:?} left unassigned");
    }
}

#[test]
fn test_cluster_cleanup_releases_interceptors() {
    let mut manager = BattleManager::new(raid_config(42));
    let (threats, _) = spawn_raid(&mut manager);

    manager.run_clustering().unwrap();
    manager.run_assignment();
    manager.drain_events();

    for id in threats {
        manager.tracks_mut().terminate(id);
    }
    manager.cleanup_clusters();

    assert!(manager.clusters().is_empty());
    let events = manager.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::ClusterDropped { .. })));
    for track in manager
        .tracks()
        .live_of_kind(bulwark_core::entity::TrackKind::Interceptor)
    {
        assert!(track.target.is_none(), "released interceptor keeps target");
    }
}

#[test]
fn test_plan_launch_requires_table() {
    let mut manager = BattleManager::new(raid_config(42));
    let threat = manager.ingest_threat(Kinematics::at_position(Vec3::new(0.0, 100.0, 1000.0)));
    assert!(matches!(
        manager.plan_launch(threat, Vec3::ZERO),
        Err(BulwarkError::InvalidOperation(_))
    ));
}

#[test]
fn test_plan_launch_rejects_unknown_threat() {
    let mut manager = BattleManager::new(raid_config(42));
    manager.load_launch_table("1,100,90,10\n").unwrap();
    assert!(matches!(
        manager.plan_launch(TrackId(99), Vec3::ZERO),
        Err(BulwarkError::InvalidArgument(_))
    ));
}

#[test]
fn test_plan_launch_emits_planned_event() {
    let mut manager = BattleManager::new(raid_config(42));
    manager.load_launch_table("1,100,90,10\n").unwrap();
    // Falling threat that reaches the tabulated point in exactly the
    // table's flight time.
    let threat = manager.ingest_threat(Kinematics::new(
        Vec3::new(1.0, 110.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::ZERO,
    ));
    manager.drain_events();

    let plan = manager.plan_launch(threat, Vec3::ZERO).unwrap();
    assert!(plan.should_launch);
    assert_eq!(plan.launch_angle_deg, 90.0);

    let events = manager.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::LaunchPlanned { threat: t, .. } if *t == threat
    )));
}

#[test]
fn test_plan_launch_emits_rejected_event_for_receding_threat() {
    let mut manager = BattleManager::new(raid_config(42));
    manager.load_launch_table("1,100,90,10\n").unwrap();
    let threat = manager.ingest_threat(Kinematics::new(
        Vec3::new(5000.0, 100.0, 0.0),
        Vec3::new(800.0, 0.0, 0.0),
        Vec3::ZERO,
    ));
    manager.drain_events();

    let plan = manager.plan_launch(threat, Vec3::ZERO).unwrap();
    assert!(!plan.should_launch);
    // Telemetry carries the planner's actual cause, not a catch-all.
    assert!(manager.drain_events().iter().any(|e| matches!(
        e,
        EngineEvent::LaunchRejected { reason, .. } if reason.as_str() == "geometry diverging"
    )));
}

#[test]
fn test_guidance_tick_commands_assigned_interceptors() {
    let mut manager = BattleManager::new(raid_config(42));
    let interceptor = manager.ingest_interceptor(Kinematics::new(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 400.0),
        Vec3::ZERO,
    ));
    // Closing threat with a drifting line of sight.
    let threat = manager.ingest_threat(Kinematics::new(
        Vec3::new(0.0, 0.0, 5000.0),
        Vec3::new(60.0, 0.0, -300.0),
        Vec3::ZERO,
    ));
    manager.tracks_mut().get_mut(interceptor).unwrap().target = Some(threat);

    let commands = manager.guidance_tick();
    assert_eq!(commands.len(), 1);
    let (id, command) = commands[0];
    assert_eq!(id, interceptor);
    assert!(command.length() > 0.0, "assigned interceptor must be steered");

    // Dead target: coast.
    manager.tracks_mut().terminate(threat);
    let commands = manager.guidance_tick();
    assert_eq!(commands[0].1, Vec3::ZERO);
}

#[test]
fn test_guidance_steers_at_target_model_when_set() {
    let mut manager = BattleManager::new(raid_config(42));
    let interceptor = manager.ingest_interceptor(Kinematics::new(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 400.0),
        Vec3::ZERO,
    ));
    let threat = manager.ingest_threat(Kinematics::new(
        Vec3::new(0.0, 0.0, 5000.0),
        Vec3::new(60.0, 0.0, -300.0),
        Vec3::ZERO,
    ));
    // No raw target link; the host supplies only a model.
    manager.set_target_model(interceptor, Some(threat));

    let commands = manager.guidance_tick();
    assert_eq!(commands.len(), 1);
    assert!(
        commands[0].1.length() > 0.0,
        "interceptor with a target model must be steered"
    );
}

#[test]
fn test_target_model_overrides_raw_target_link() {
    let mut manager = BattleManager::new(raid_config(42));
    let interceptor = manager.ingest_interceptor(Kinematics::new(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 400.0),
        Vec3::ZERO,
    ));
    // The raw target is receding (guidance against it commands nothing);
    // the model is a closing track.
    let receding = manager.ingest_threat(Kinematics::new(
        Vec3::new(0.0, 0.0, -5000.0),
        Vec3::new(0.0, 0.0, -300.0),
        Vec3::ZERO,
    ));
    let closing = manager.ingest_threat(Kinematics::new(
        Vec3::new(0.0, 0.0, 5000.0),
        Vec3::new(60.0, 0.0, -300.0),
        Vec3::ZERO,
    ));
    manager.tracks_mut().get_mut(interceptor).unwrap().target = Some(receding);
    manager.set_target_model(interceptor, Some(closing));

    let commands = manager.guidance_tick();
    assert!(commands[0].1.length() > 0.0, "model must win over the raw link");

    // Clearing the model falls back to the raw target.
    manager.set_target_model(interceptor, None);
    let commands = manager.guidance_tick();
    assert_eq!(commands[0].1, Vec3::ZERO);
}

#[test]
fn test_unassigned_interceptor_coasts() {
    let mut manager = BattleManager::new(raid_config(42));
    manager.ingest_interceptor(Kinematics::new(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 400.0),
        Vec3::ZERO,
    ));
    manager.ingest_threat(Kinematics::new(
        Vec3::new(0.0, 0.0, 5000.0),
        Vec3::new(0.0, 0.0, -300.0),
        Vec3::ZERO,
    ));

    let commands = manager.guidance_tick();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].1, Vec3::ZERO);
}
