use rate_sim_core::{
    AlgorithmConfig, AlgorithmKind, AlgorithmSnapshot, RejectReason, Simulation, SimulationStats,
};

fn with_test_logging() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

#[test]
fn test_events_and_stats_are_recorded() {
    let _guard = with_test_logging();
    let mut sim = Simulation::new(AlgorithmKind::TokenBucket, AlgorithmConfig::new(2).rate(1.0)).unwrap();

    sim.submit_at(0);
    sim.submit_at(0);
    sim.submit_at(0);
    sim.submit_at(1_000);

    assert_eq!(
        sim.stats(),
        SimulationStats { total: 4, accepted: 3, rejected: 1 }
    );

    let events = sim.events();
    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(!events[2].accepted);
    assert_eq!(events[2].reason, Some(RejectReason::NoTokensAvailable));
    assert_eq!(events[3].timestamp, 1_000);
    assert!(events[3].accepted);
}

#[test]
fn test_clock_never_runs_backwards() {
    let mut sim = Simulation::new(AlgorithmKind::SlidingLog, AlgorithmConfig::new(5).window(1_000)).unwrap();
    sim.advance(700);
    sim.submit_at(200);

    assert_eq!(sim.now(), 700);
    assert_eq!(sim.events()[0].timestamp, 700);
}

#[test]
fn test_run_spaces_requests_evenly() {
    let mut sim = Simulation::new(AlgorithmKind::LeakyBucket, AlgorithmConfig::new(2).rate(2.0)).unwrap();

    // One request every 600ms into a bucket draining 2/s never overflows
    let results = sim.run(600, 10);
    assert!(results.iter().all(|r| r.is_allowed()));
    assert_eq!(sim.now(), 6_000);
    assert_eq!(
        sim.events().iter().map(|e| e.timestamp).take(3).collect::<Vec<_>>(),
        vec![600, 1_200, 1_800]
    );
}

#[test]
fn test_state_is_taken_at_virtual_time() {
    let mut sim = Simulation::new(AlgorithmKind::FixedWindow, AlgorithmConfig::new(3).window(1_000)).unwrap();
    sim.submit();
    sim.advance(1_500);

    match sim.state() {
        AlgorithmSnapshot::FixedWindow(state) => {
            assert!(state.is_window_expired);
            assert_eq!(state.count, 1);
        }
        other => panic!("Expected FixedWindow snapshot, got {:?}", other),
    }
}

#[test]
fn test_release_only_applies_to_concurrency() {
    let mut sim = Simulation::new(AlgorithmKind::Concurrency, AlgorithmConfig::new(1)).unwrap();
    assert!(sim.submit().is_allowed());
    assert!(!sim.submit().is_allowed());
    assert!(sim.release());
    assert!(sim.submit().is_allowed());

    let mut sim = Simulation::new(AlgorithmKind::FixedWindow, AlgorithmConfig::new(1)).unwrap();
    assert!(!sim.release());
}

#[test]
fn test_reset_starts_over() {
    let mut sim = Simulation::new(
        AlgorithmKind::SlidingCounter,
        AlgorithmConfig::new(2).window(1_000).start(100),
    )
    .unwrap();
    sim.run(10, 5);
    assert_eq!(sim.stats().rejected, 3);

    sim.reset().unwrap();
    assert_eq!(sim.now(), 100);
    assert!(sim.events().is_empty());
    assert_eq!(sim.stats(), SimulationStats::default());
    assert_eq!(sim.state().current_usage(), 0.0);
    assert!(sim.submit().is_allowed());
}

#[test]
fn test_invalid_config_is_reported() {
    assert!(Simulation::new(AlgorithmKind::SlidingLog, AlgorithmConfig::new(0)).is_err());
}

#[test]
fn test_events_serialize_for_display() {
    let mut sim = Simulation::new(AlgorithmKind::FixedWindow, AlgorithmConfig::new(1)).unwrap();
    sim.submit();
    sim.submit();

    let json = serde_json::to_value(sim.events()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "id": 0, "timestamp": 0, "accepted": true },
            { "id": 1, "timestamp": 0, "accepted": false, "reason": "window limit exceeded" },
        ])
    );
}
