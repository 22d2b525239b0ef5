/**
 * ============================================================================
 * TELEMETRY PIPELINE MODULE
 * ============================================================================
 *
 * PURPOSE: Facade tying the tracker, composer, accumulator, encoder, and
 *          dispatcher together behind one session lock
 *
 * LOCKING: all session state sits in a single mutex. A flush snapshots the
 * queues, builds the envelopes, and encodes while holding it, then releases
 * before awaiting the network so new events accumulate into fresh queues
 * during an in-flight dispatch.
 *
 * FAILURE POLICY: compose and argument errors surface to the caller;
 * everything downstream of a flush is fire-and-forget.
 *
 * ============================================================================
 */

use crate::clock;
use crate::error::TelemetryError;
use crate::nav::graph;
use crate::session::SessionState;
use crate::telemetry::accumulator::FlushSet;
use crate::telemetry::composer::{self, ComposeContext};
use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::dispatcher::{DispatchOutcome, Dispatcher};
use crate::telemetry::encoder::{self, WireMetadata};
use crate::telemetry::store::QueueStore;
use crate::telemetry::transport::{CollectorTransport, HttpTransport};
use crate::telemetry::types::{Batch, EncodedPayload, QueuePriority, TelemetryStats};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/**
 * One flush, encoded and counted, ready to leave the lock
 */
struct PreparedDispatch {
    payload: EncodedPayload,
    events: u64,
    batches: u64,
}

pub struct Telemetry {
    config: TelemetryConfig,
    state: Mutex<SessionState>,
    stats: Mutex<TelemetryStats>,
    dispatcher: Dispatcher,
    store: QueueStore,
}

impl Telemetry {
    /**
     * Build the pipeline with the production HTTP transport
     */
    pub fn new(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let transport = Arc::new(HttpTransport::new(config.send_timeout_seconds)?);
        Self::with_transport(config, transport)
    }

    /**
     * Build the pipeline over any transport
     * Restores the previous session's queue snapshot when one exists
     */
    pub fn with_transport(
        config: TelemetryConfig,
        transport: Arc<dyn CollectorTransport>,
    ) -> Result<Self, TelemetryError> {
        config.validate()?;

        let mut state = SessionState::new(&config);
        let store = QueueStore::new(config.storage_dir());
        if let Some(snapshot) = store.load_and_clear() {
            state.accumulator.restore(snapshot);
        }

        let dispatcher = Dispatcher::new(config.clone(), transport);
        Ok(Self {
            config,
            state: Mutex::new(state),
            stats: Mutex::new(TelemetryStats::default()),
            dispatcher,
            store,
        })
    }

    /**
     * Apply a navigation move; the returned chain is what request builders
     * embed in outgoing parameters
     */
    pub fn transition(
        &self,
        from: &str,
        to: &str,
        click_point: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, TelemetryError> {
        self.lock_state().nav.transition(from, to, click_point, options)
    }

    pub fn nav_depth(&self, from: &str, to: &str) -> Result<u32, TelemetryError> {
        graph::nav_depth(from, to)
    }

    /**
     * Compose an event and append it to a queue, flushing at the threshold
     * Network failures never surface here
     */
    pub async fn compose_and_queue(
        &self,
        name: &str,
        module: Option<&str>,
        payload: &[(String, Value)],
        queue: QueuePriority,
    ) -> Result<(), TelemetryError> {
        self.enqueue(name, module, payload, queue, false).await
    }

    /**
     * Chain-bearing variant: the current navigation chain rides in extra
     */
    pub async fn compose_and_queue_with_chain(
        &self,
        name: &str,
        module: Option<&str>,
        payload: &[(String, Value)],
        queue: QueuePriority,
    ) -> Result<(), TelemetryError> {
        self.enqueue(name, module, payload, queue, true).await
    }

    async fn enqueue(
        &self,
        name: &str,
        module: Option<&str>,
        payload: &[(String, Value)],
        queue: QueuePriority,
        with_chain: bool,
    ) -> Result<(), TelemetryError> {
        let prepared = {
            let mut state = self.lock_state();
            let chain = if with_chain { Some(state.nav.chain()) } else { None };
            let ctx = ComposeContext {
                background: state.background,
                account_id: state.account_id,
                release_channel: self.config.release_channel.as_str(),
                radio_type: self.config.radio_type.as_str(),
                nav_chain: chain.as_deref(),
            };
            let event = composer::compose(name, module, payload, &ctx)?;

            self.stats.lock().unwrap().events_queued += 1;
            match state.accumulator.append(event, queue) {
                Some(flush_set) => self.prepare_dispatch(&mut state, flush_set),
                None => None,
            }
        };

        if let Some(prepared) = prepared {
            self.dispatch(prepared).await;
        }
        Ok(())
    }

    /**
     * Flush every non-empty queue immediately
     */
    pub async fn force_flush(&self) {
        let prepared = {
            let mut state = self.lock_state();
            match state.accumulator.drain() {
                Some(flush_set) => self.prepare_dispatch(&mut state, flush_set),
                None => {
                    log::debug!("Force flush requested with all queues empty");
                    None
                }
            }
        };

        if let Some(prepared) = prepared {
            self.dispatch(prepared).await;
        }
    }

    /**
     * Snapshot the queues to disk for the next session; no network
     */
    pub fn save(&self) -> Result<(), TelemetryError> {
        let state = self.lock_state();
        self.store.save(state.accumulator.queues())
    }

    pub fn set_background(&self, background: bool) {
        self.lock_state().background = background;
    }

    pub fn set_account_id(&self, account_id: u64) {
        self.lock_state().account_id = account_id;
    }

    pub fn set_consent_state(&self, consent_state: Option<i64>) {
        self.lock_state().consent_state = consent_state;
    }

    pub fn set_device_init(&self, device_init: bool) {
        self.lock_state().device_init = device_init;
    }

    pub fn nav_chain(&self) -> String {
        self.lock_state().nav.chain()
    }

    pub fn nav_sequence(&self) -> u64 {
        self.lock_state().nav.sequence()
    }

    pub fn session_id(&self) -> String {
        self.lock_state().session_id.clone()
    }

    pub fn pending_events(&self) -> usize {
        self.lock_state().accumulator.total_pending()
    }

    pub fn stats(&self) -> TelemetryStats {
        self.stats.lock().unwrap().clone()
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap()
    }

    /**
     * Build and encode the envelopes for a flush while the lock is held
     * Encoding failures drop the flush; only the dispatcher sees the network
     */
    fn prepare_dispatch(
        &self,
        state: &mut SessionState,
        flush_set: FlushSet,
    ) -> Option<PreparedDispatch> {
        let mut batches = Vec::with_capacity(flush_set.len());
        let mut events = 0u64;
        for (_priority, queue_events) in flush_set {
            events += queue_events.len() as u64;
            batches.push(Batch {
                time: clock::high_precision_now(),
                app_id: self.config.app_id.clone(),
                app_ver: self.config.app_ver.clone(),
                build_num: self.config.build_num.clone(),
                consent_state: state.consent_state,
                device_init: if state.device_init { Some(true) } else { None },
                device_id: state.device_id.clone(),
                session_id: state.session_id.clone(),
                seq: state.next_batch_seq(),
                uid: state.account_id,
                data: queue_events,
            });
        }

        let meta = WireMetadata {
            tier: self.config.tier.clone(),
            carrier: self.config.carrier.clone(),
            conn_type: self.config.connection_type.clone(),
            checksum: state.checksum.clone().unwrap_or_default(),
            config_version: self.config.config_version.clone(),
            qpl_version: self.config.qpl_version.clone(),
            uid: state.account_id,
            app_ver: self.config.app_ver.clone(),
        };

        let batch_count = batches.len() as u64;
        match encoder::encode(&batches, self.config.encoding, &meta) {
            Ok(payload) => {
                let mut stats = self.stats.lock().unwrap();
                stats.flushes += 1;
                log::info!(
                    "Encoding {} events across {} batches for dispatch",
                    events,
                    batch_count
                );
                Some(PreparedDispatch {
                    payload,
                    events,
                    batches: batch_count,
                })
            }
            Err(e) => {
                log::error!(
                    "Failed to encode flush of {} events, dropping: {}",
                    events,
                    e
                );
                let mut stats = self.stats.lock().unwrap();
                stats.batches_dropped += batch_count;
                stats.last_error = Some(e.to_string());
                None
            }
        }
    }

    async fn dispatch(&self, prepared: PreparedDispatch) {
        match self.dispatcher.send(prepared.payload).await {
            DispatchOutcome::Sent { checksum } => {
                if let Some(checksum) = checksum {
                    self.lock_state().checksum = Some(checksum);
                }
                let mut stats = self.stats.lock().unwrap();
                stats.events_sent += prepared.events;
                stats.batches_sent += prepared.batches;
                stats.last_dispatch_at = Some(chrono::Utc::now().to_rfc3339());
            }
            DispatchOutcome::Dropped { reason } => {
                let mut stats = self.stats.lock().unwrap();
                stats.batches_dropped += prepared.batches;
                stats.last_error = Some(reason);
            }
        }
    }
}
