/**
 * ============================================================================
 * SESSION STATE MODULE
 * ============================================================================
 *
 * PURPOSE: Explicit home for all session-scoped telemetry state
 *
 * Everything the pipeline mutates lives here behind one lock owned by the
 * pipeline facade: identity, the background flag, the server checksum, the
 * batch sequence, the navigation tracker, and the accumulation queues.
 * Nothing is ambient or process-global.
 *
 * ============================================================================
 */

use crate::nav::NavChainTracker;
use crate::telemetry::accumulator::BatchAccumulator;
use crate::telemetry::config::TelemetryConfig;
use uuid::Uuid;

pub struct SessionState {
    pub session_id: String,
    pub device_id: String,
    // 0 until an authenticated account is attached
    pub account_id: u64,
    pub background: bool,
    pub consent_state: Option<i64>,
    pub device_init: bool,
    // Last server-issued checksum, echoed in the next dispatch's metadata
    pub checksum: Option<String>,
    batch_sequence: u64,
    pub nav: NavChainTracker,
    pub accumulator: BatchAccumulator,
}

impl SessionState {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            device_id: config
                .device_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: 0,
            background: false,
            consent_state: None,
            device_init: false,
            checksum: None,
            batch_sequence: 1,
            nav: NavChainTracker::new(),
            accumulator: BatchAccumulator::new(config.flush_threshold),
        }
    }

    /**
     * Sequence number for the next envelope; advances on every call
     */
    pub fn next_batch_seq(&mut self) -> u64 {
        let seq = self.batch_sequence;
        self.batch_sequence += 1;
        seq
    }

    pub fn batch_sequence(&self) -> u64 {
        self.batch_sequence
    }
}
