/**
 * ============================================================================
 * CLICKPATH
 * ============================================================================
 *
 * PURPOSE: Client-side telemetry library: navigation chain tracking plus the
 * event batching, encoding, and dispatch pipeline for the collector endpoint.
 *
 * Host apps construct one Telemetry per session, report navigation moves and
 * interaction events through it, and snapshot pending queues on shutdown.
 *
 * ============================================================================
 */

pub mod clock;
pub mod error;
pub mod nav;
pub mod session;
pub mod telemetry;

pub use error::TelemetryError;
pub use nav::NavChainTracker;
pub use telemetry::config::TelemetryConfig;
pub use telemetry::encoder::EncodingMode;
pub use telemetry::pipeline::Telemetry;
pub use telemetry::types::{Event, QueuePriority, TelemetryStats};
