//! Headless simulation session.
//!
//! A [`Simulation`] drives one algorithm with a virtual clock and keeps a log
//! of every request it submitted, so a display layer can replay or chart the
//! session. Nothing here sleeps or reads the wall clock.

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ConfigResult;
use crate::factory::{Algorithm, AlgorithmConfig, AlgorithmKind, AlgorithmSnapshot};
use crate::rate_limit::RateLimitAlgorithm;
use crate::types::{AdmissionResult, Millis, RejectReason};

/// One submitted request and its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    /// Sequence number within the session, starting at 0.
    pub id: u64,
    pub timestamp: Millis,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl SimulationStats {
    fn record(&mut self, result: &AdmissionResult) {
        self.total += 1;
        if result.is_allowed() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

/// A single algorithm driven by a virtual clock.
///
/// # Example
///
/// ```rust
/// use rate_sim_core::{AlgorithmConfig, AlgorithmKind, Simulation};
///
/// let mut sim = Simulation::new(AlgorithmKind::FixedWindow, AlgorithmConfig::new(3).window(1_000)).unwrap();
///
/// // Four requests, 100ms apart: the fourth lands in the same window
/// sim.run(100, 4);
/// assert_eq!(sim.stats().accepted, 3);
/// assert_eq!(sim.stats().rejected, 1);
/// assert_eq!(sim.now(), 400);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    kind: AlgorithmKind,
    config: AlgorithmConfig,
    algorithm: Algorithm,
    now: Millis,
    events: Vec<RequestEvent>,
    stats: SimulationStats,
}

impl Simulation {
    /// Builds the algorithm through the factory and starts the clock at the
    /// configured start time (0 by default).
    pub fn new(kind: AlgorithmKind, config: AlgorithmConfig) -> ConfigResult<Self> {
        let algorithm = Algorithm::build(kind, &config)?;
        Ok(Self {
            kind,
            now: config.start_ms.unwrap_or(0),
            config,
            algorithm,
            events: Vec::new(),
            stats: SimulationStats::default(),
        })
    }

    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    pub fn config(&self) -> &AlgorithmConfig {
        &self.config
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn events(&self) -> &[RequestEvent] {
        &self.events
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// Moves the virtual clock forward without submitting a request.
    pub fn advance(&mut self, ms: Millis) {
        self.now = self.now.saturating_add(ms);
    }

    /// Submits a request at `timestamp`.
    ///
    /// The clock never runs backwards: a timestamp earlier than the current
    /// virtual time is submitted at the current time instead.
    pub fn submit_at(&mut self, timestamp: Millis) -> AdmissionResult {
        self.now = self.now.max(timestamp);
        let result = self.algorithm.admit(self.now);

        let event = RequestEvent {
            id: self.events.len() as u64,
            timestamp: self.now,
            accepted: result.is_allowed(),
            reason: result.reason(),
        };
        trace!(id = event.id, timestamp = event.timestamp, accepted = event.accepted, "request");
        self.events.push(event);
        self.stats.record(&result);
        result
    }

    /// Submits a request at the current virtual time.
    pub fn submit(&mut self) -> AdmissionResult {
        self.submit_at(self.now)
    }

    /// Submits `count` requests spaced `interval_ms` apart, the first one
    /// `interval_ms` after the current time.
    pub fn run(&mut self, interval_ms: Millis, count: usize) -> Vec<AdmissionResult> {
        (0..count)
            .map(|_| {
                self.advance(interval_ms);
                self.submit()
            })
            .collect()
    }

    /// Frees a slot on a concurrency limiter; `false` for every other kind.
    pub fn release(&mut self) -> bool {
        self.algorithm.release()
    }

    /// Snapshot of the algorithm at the current virtual time.
    pub fn state(&self) -> AlgorithmSnapshot {
        self.algorithm.state(self.now)
    }

    /// Discards all state and starts over with a fresh algorithm.
    pub fn reset(&mut self) -> ConfigResult<()> {
        self.algorithm = Algorithm::build(self.kind, &self.config)?;
        self.now = self.config.start_ms.unwrap_or(0);
        self.events.clear();
        self.stats = SimulationStats::default();
        debug!(kind = %self.kind, "simulation reset");
        Ok(())
    }
}
