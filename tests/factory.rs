use rate_sim_core::{
    create_algorithm, Algorithm, AlgorithmConfig, AlgorithmKind, AlgorithmSnapshot, ConfigError,
    RateLimitAlgorithm, DEFAULT_WINDOW_MS,
};

#[test]
fn test_every_kind_round_trips_through_its_name() {
    for kind in AlgorithmKind::ALL {
        let algorithm = create_algorithm(kind.as_str(), &AlgorithmConfig::new(5)).unwrap();
        assert_eq!(algorithm.kind(), kind);
        assert_eq!(kind.as_str().parse::<AlgorithmKind>().unwrap(), kind);
    }
}

#[test]
fn test_unknown_kind_fails() {
    let err = create_algorithm("gcra", &AlgorithmConfig::new(5)).unwrap_err();
    assert_eq!(err, ConfigError::UnknownAlgorithm("gcra".to_owned()));
    assert_eq!(err.to_string(), "unknown algorithm kind: gcra");
}

#[test]
fn test_invalid_config_fails_fast() {
    let err = create_algorithm("fixed-window", &AlgorithmConfig::new(0)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidParameter { name: "limit", .. }));

    let err = create_algorithm("token-bucket", &AlgorithmConfig::new(5).rate(0.0)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidParameter { name: "rate_per_second", .. }));
}

#[test]
fn test_window_defaults_to_one_second() {
    let algorithm = create_algorithm("fixed-window", &AlgorithmConfig::new(3)).unwrap();
    match algorithm {
        Algorithm::FixedWindow(core) => assert_eq!(core.config().window_size_ms, DEFAULT_WINDOW_MS),
        other => panic!("Expected FixedWindow, got {:?}", other.kind()),
    }
}

#[test]
fn test_bucket_fields_fall_back_to_limit() {
    let algorithm = create_algorithm("token-bucket", &AlgorithmConfig::new(8)).unwrap();
    match algorithm {
        Algorithm::TokenBucket(core) => {
            assert_eq!(core.config().capacity, 8.0);
            assert_eq!(core.config().rate_per_second, 8.0);
        }
        other => panic!("Expected TokenBucket, got {:?}", other.kind()),
    }

    let algorithm = create_algorithm("leaky-bucket", &AlgorithmConfig::new(8).capacity(3.0)).unwrap();
    match algorithm {
        Algorithm::LeakyBucket(core) => {
            assert_eq!(core.config().capacity, 3.0);
            assert_eq!(core.config().rate_per_second, 8.0);
        }
        other => panic!("Expected LeakyBucket, got {:?}", other.kind()),
    }
}

#[test]
fn test_concurrency_falls_back_to_limit() {
    let mut algorithm = create_algorithm("concurrency", &AlgorithmConfig::new(2)).unwrap();
    assert!(algorithm.admit(0).is_allowed());
    assert!(algorithm.admit(0).is_allowed());
    assert!(!algorithm.admit(0).is_allowed());

    assert!(algorithm.release());
    assert!(algorithm.admit(0).is_allowed());

    let algorithm = create_algorithm("concurrency", &AlgorithmConfig::new(2).max_concurrency(7)).unwrap();
    assert_eq!(algorithm.state(0).ceiling(), 7.0);
}

#[test]
fn test_release_is_noop_for_time_based_kinds() {
    let mut algorithm = create_algorithm("sliding-log", &AlgorithmConfig::new(1)).unwrap();
    algorithm.admit(0);
    assert!(!algorithm.release());
    assert!(!algorithm.admit(0).is_allowed());
}

#[test]
fn test_start_offsets_time_based_cores() {
    let config = AlgorithmConfig::new(2).window(1_000).start(5_000);
    let algorithm = create_algorithm("sliding-counter", &config).unwrap();
    match algorithm.state(5_000) {
        AlgorithmSnapshot::SlidingCounter(state) => assert_eq!(state.window_start, 5_000),
        other => panic!("Expected SlidingCounter snapshot, got {:?}", other),
    }
}

#[test]
fn test_config_deserializes_short_field_names() {
    let config: AlgorithmConfig =
        serde_json::from_str(r#"{ "limit": 10, "window": 5000, "rate": 2.5 }"#).unwrap();
    assert_eq!(config, AlgorithmConfig::new(10).window(5_000).rate(2.5));

    let config: AlgorithmConfig = serde_json::from_str(
        r#"{ "limit": 4, "windowSizeMs": 250, "ratePerSecond": 1.0, "maxConcurrency": 3, "startMs": 10 }"#,
    )
    .unwrap();
    assert_eq!(config.window_size_ms, Some(250));
    assert_eq!(config.rate_per_second, Some(1.0));
    assert_eq!(config.max_concurrency, Some(3));
    assert_eq!(config.start_ms, Some(10));

    assert!(serde_json::from_str::<AlgorithmConfig>(r#"{ "window": 5000 }"#).is_err());
}

#[test]
fn test_snapshot_generic_accessors() {
    let mut algorithm = create_algorithm("fixed-window", &AlgorithmConfig::new(4).window(1_000)).unwrap();
    algorithm.admit(0);
    let snapshot = algorithm.state(0);
    assert_eq!(snapshot.current_usage(), 1.0);
    assert_eq!(snapshot.ceiling(), 4.0);
    assert_eq!(snapshot.fill_percentage(), 25.0);

    let mut algorithm = create_algorithm("leaky-bucket", &AlgorithmConfig::new(2)).unwrap();
    algorithm.admit(0);
    algorithm.admit(0);
    assert_eq!(algorithm.state(0).fill_percentage(), 100.0);
}

#[test]
fn test_snapshot_serializes_with_type_tag() {
    let mut algorithm = create_algorithm("concurrency", &AlgorithmConfig::new(3)).unwrap();
    algorithm.admit(0);

    let json = serde_json::to_value(algorithm.state(0)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "type": "concurrency", "activeCount": 1, "maxConcurrency": 3 })
    );
}

#[test]
fn test_snapshot_field_names_match_config_names() {
    let config = AlgorithmConfig::new(2).window(1_000).start(500);
    let mut algorithm = create_algorithm("fixed-window", &config).unwrap();
    algorithm.admit(0);

    let json = serde_json::to_value(algorithm.state(1_500)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "fixed-window",
            "count": 1,
            "limit": 2,
            "windowStart": 0,
            "windowEnd": 1_000,
            "isWindowExpired": true,
        })
    );

    let sent = serde_json::to_value(&config).unwrap();
    assert_eq!(sent["windowSizeMs"], 1_000);
    assert_eq!(sent["startMs"], 500);
    let echoed: AlgorithmConfig = serde_json::from_value(sent).unwrap();
    assert_eq!(echoed, config);

    let snake: AlgorithmConfig =
        serde_json::from_str(r#"{ "limit": 2, "window_size_ms": 1000, "start_ms": 500 }"#).unwrap();
    assert_eq!(snake, config);
}

#[test]
fn test_admission_result_serialization() {
    let mut algorithm = create_algorithm("token-bucket", &AlgorithmConfig::new(1).rate(1.0)).unwrap();

    let allowed = serde_json::to_value(algorithm.admit(0)).unwrap();
    assert_eq!(allowed, serde_json::json!({ "allowed": true }));

    let rejected = serde_json::to_value(algorithm.admit(0)).unwrap();
    assert_eq!(
        rejected,
        serde_json::json!({ "allowed": false, "reason": "no tokens available" })
    );
}
