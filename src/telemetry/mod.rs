/**
 * ============================================================================
 * TELEMETRY SUBSYSTEM
 * ============================================================================
 *
 * PURPOSE: Event batching and dispatch pipeline for the collector endpoint
 *
 * ARCHITECTURE:
 * - config: Configuration management and persistence
 * - types: Event, batch, and payload data structures
 * - tags: Static event-name to tag-bitmask table
 * - composer: Event envelope assembly
 * - item: Payload builders over host-app content traits
 * - accumulator: Priority queues and flush threshold
 * - store: Pending-queue snapshot persistence
 * - encoder: Wire encodings (plain, deflate, compressed)
 * - transport: HTTP POST plumbing
 * - dispatcher: Fire-and-forget delivery with checksum capture
 * - pipeline: High-level orchestration facade
 *
 * ============================================================================
 */

pub mod accumulator;
pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod item;
pub mod pipeline;
pub mod store;
pub mod tags;
pub mod transport;
pub mod types;

pub use config::TelemetryConfig;
pub use encoder::EncodingMode;
pub use pipeline::Telemetry;
pub use types::{Event, QueuePriority, TelemetryStats};
