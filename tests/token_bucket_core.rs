use rate_sim_core::cores::{TokenBucketCore, TokenBucketCoreConfig};
use rate_sim_core::{ConfigError, RateLimitAlgorithm, RejectReason};

#[test]
fn test_new_rejects_non_positive_parameters() {
    assert!(matches!(
        TokenBucketCore::new(0.0, 2.0),
        Err(ConfigError::InvalidParameter { name: "capacity", .. })
    ));
    assert!(matches!(
        TokenBucketCore::new(10.0, -1.0),
        Err(ConfigError::InvalidParameter { name: "rate_per_second", .. })
    ));
    assert!(matches!(
        TokenBucketCore::new(10.0, f64::NAN),
        Err(ConfigError::InvalidParameter { name: "rate_per_second", .. })
    ));
    assert!(matches!(
        TokenBucketCore::new(f64::INFINITY, 1.0),
        Err(ConfigError::InvalidParameter { name: "capacity", .. })
    ));
}

#[test]
fn test_initial_full_bucket() {
    let bucket = TokenBucketCore::new(10.0, 2.0).unwrap();
    let state = bucket.state(0);
    assert_eq!(state.tokens, 10.0);
    assert_eq!(state.fill_percentage, 100.0);
    assert_eq!(state.last_refill_ms, 0);
}

#[test]
fn test_drain_then_reject() {
    let mut bucket = TokenBucketCore::new(10.0, 2.0).unwrap();

    for _ in 0..10 {
        assert!(bucket.admit(0).is_allowed());
    }

    let result = bucket.admit(0);
    assert_eq!(result.reason(), Some(RejectReason::NoTokensAvailable));
    assert_eq!(result.reason().unwrap().to_string(), "no tokens available");
}

#[test]
fn test_refill_mechanism() {
    let mut bucket = TokenBucketCore::new(10.0, 2.0).unwrap();
    for _ in 0..10 {
        bucket.admit(0);
    }

    // 500ms at 2 tokens/s accrues exactly one token
    assert!(bucket.admit(500).is_allowed());
    assert!(!bucket.admit(500).is_allowed());
    assert_eq!(bucket.state(500).tokens, 0.0);
}

#[test]
fn test_fractional_tokens_accumulate() {
    let mut bucket = TokenBucketCore::new(1.0, 2.0).unwrap();
    assert!(bucket.admit(0).is_allowed());

    // 250ms yields half a token: not enough on its own
    assert!(!bucket.admit(250).is_allowed());
    let state = bucket.state(250);
    assert_eq!(state.tokens, 0.5);
    assert_eq!(state.whole_tokens(), 0);

    // Another 250ms tops it up to one
    assert!(bucket.admit(500).is_allowed());
}

#[test]
fn test_refill_capped_at_capacity() {
    let mut bucket = TokenBucketCore::new(5.0, 10.0).unwrap();
    bucket.admit(0);

    assert!(bucket.admit(60_000).is_allowed());
    assert_eq!(bucket.state(60_000).tokens, 4.0);
}

#[test]
fn test_regressed_timestamp_counts_as_zero_elapsed() {
    let mut bucket = TokenBucketCore::new(2.0, 1.0).unwrap();
    bucket.admit(1_000);
    bucket.admit(1_000);

    // Going back in time adds nothing and leaves the refill clock alone
    assert!(!bucket.admit(200).is_allowed());
    assert_eq!(bucket.state(200).last_refill_ms, 1_000);
    assert_eq!(bucket.state(200).tokens, 0.0);

    assert!(bucket.admit(2_000).is_allowed());
}

#[test]
fn test_with_start_offsets_refill_clock() {
    let mut bucket = TokenBucketCore::with_start(3.0, 1.0, 10_000).unwrap();
    for _ in 0..3 {
        assert!(bucket.admit(10_000).is_allowed());
    }
    assert!(!bucket.admit(10_500).is_allowed());
    assert!(bucket.admit(11_000).is_allowed());
}

#[test]
fn test_state_reflects_last_admission_only() {
    let mut bucket = TokenBucketCore::new(10.0, 2.0).unwrap();
    bucket.admit(0);

    // Reading at a later time does not refill
    assert_eq!(bucket.state(5_000).tokens, 9.0);
    assert_eq!(bucket.state(5_000), bucket.state(0));
}

#[test]
fn test_config_round_trip() {
    let bucket: TokenBucketCore = TokenBucketCoreConfig::new(4.0, 0.5).try_into().unwrap();
    assert_eq!(bucket.config(), TokenBucketCoreConfig { capacity: 4.0, rate_per_second: 0.5 });
}
