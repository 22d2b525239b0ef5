/**
 * ============================================================================
 * NAVIGATION SUBSYSTEM
 * ============================================================================
 *
 * Static module catalogue, legal transition graph, and the per-session
 * chain tracker that turns moves into the serialized navigation chain.
 *
 * ============================================================================
 */

pub mod chain;
pub mod graph;
pub mod registry;

pub use chain::NavChainTracker;
