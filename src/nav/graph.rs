/**
 * ============================================================================
 * NAVIGATION TRANSITION GRAPH
 * ============================================================================
 *
 * PURPOSE: Legal screen-to-screen moves and their contextual requirements
 *
 * Edges are directed. Reverse edges are listed for every move a user can
 * pop back along, since "back" transitions validate like any other move.
 *
 * Some edges require contextual options (the identifiers the destination
 * screen cannot render without): a recipient for a direct thread, a search
 * session for moves out of typeahead, a hashtag or location id for their
 * feeds.
 *
 * DEPTH TABLE: a legacy (from, to) -> depth mapping consulted by nav_depth.
 * Unknown pairs are an error the caller can observe; known pairs resolve to
 * the flat override the shipping client reports for every move.
 *
 * ============================================================================
 */

use crate::error::TelemetryError;

/**
 * One directed edge with its required contextual option keys
 */
#[derive(Debug, Clone)]
pub struct EdgeSpec {
    pub from: &'static str,
    pub to: &'static str,
    pub required_options: &'static [&'static str],
}

/**
 * Depth reported for every resolvable move, regardless of the table value
 */
pub const NAV_DEPTH_OVERRIDE: u32 = 0;

static EDGES: &[EdgeSpec] = &[
    // Timeline hub
    edge("feed_timeline", "profile", &[]),
    edge("feed_timeline", "media_comments", &[]),
    edge("feed_timeline", "story_viewer", &[]),
    edge("feed_timeline", "explore_popular", &[]),
    edge("feed_timeline", "direct_inbox", &[]),
    edge("feed_timeline", "clips_viewer", &[]),
    edge("feed_timeline", "camera", &[]),
    edge("feed_timeline", "self_profile", &[]),
    edge("feed_timeline", "search_typeahead", &[]),
    // Explore
    edge("explore_popular", "feed_timeline", &[]),
    edge("explore_popular", "profile", &[]),
    edge("explore_popular", "media_comments", &[]),
    edge("explore_popular", "clips_viewer", &[]),
    edge("explore_popular", "search_typeahead", &[]),
    // Search: every move out carries the search session
    edge("search_typeahead", "profile", &["search_session_id"]),
    edge("search_typeahead", "hashtag_feed", &["search_session_id", "hashtag_id"]),
    edge("search_typeahead", "location_feed", &["search_session_id", "location_id"]),
    edge("search_typeahead", "explore_popular", &[]),
    edge("search_typeahead", "feed_timeline", &[]),
    // Direct
    edge("direct_inbox", "direct_thread", &["recipient_id"]),
    edge("direct_inbox", "camera", &[]),
    edge("direct_inbox", "feed_timeline", &[]),
    edge("direct_thread", "direct_inbox", &[]),
    edge("direct_thread", "profile", &[]),
    edge("direct_thread", "camera", &[]),
    // Profiles; the self edge is username taps from one profile to another
    edge("profile", "profile", &[]),
    edge("profile", "media_comments", &[]),
    edge("profile", "story_viewer", &[]),
    edge("profile", "feed_timeline", &[]),
    edge("profile", "direct_thread", &["recipient_id"]),
    edge("profile", "search_typeahead", &[]),
    edge("profile", "explore_popular", &[]),
    edge("profile", "clips_viewer", &[]),
    edge("profile", "hashtag_feed", &["hashtag_id"]),
    edge("self_profile", "settings", &[]),
    edge("self_profile", "feed_timeline", &[]),
    // Clips; self edge is the next-clip swipe
    edge("clips_viewer", "clips_viewer", &[]),
    edge("clips_viewer", "profile", &[]),
    edge("clips_viewer", "media_comments", &[]),
    edge("clips_viewer", "camera", &[]),
    edge("clips_viewer", "feed_timeline", &[]),
    edge("clips_viewer", "explore_popular", &[]),
    // Stories; self edge is the next-reel advance
    edge("story_viewer", "story_viewer", &[]),
    edge("story_viewer", "profile", &[]),
    edge("story_viewer", "direct_thread", &["recipient_id"]),
    edge("story_viewer", "feed_timeline", &[]),
    // Comments
    edge("media_comments", "profile", &[]),
    edge("media_comments", "feed_timeline", &[]),
    edge("media_comments", "explore_popular", &[]),
    edge("media_comments", "clips_viewer", &[]),
    // Camera
    edge("camera", "feed_timeline", &[]),
    edge("camera", "direct_inbox", &[]),
    edge("camera", "direct_thread", &["recipient_id"]),
    // Settings and auth
    edge("settings", "self_profile", &[]),
    edge("settings", "login", &[]),
    edge("login", "feed_timeline", &[]),
    // Tag and place feeds
    edge("hashtag_feed", "profile", &[]),
    edge("hashtag_feed", "media_comments", &[]),
    edge("hashtag_feed", "search_typeahead", &[]),
    edge("location_feed", "profile", &[]),
    edge("location_feed", "media_comments", &[]),
    edge("location_feed", "search_typeahead", &[]),
];

const fn edge(
    from: &'static str,
    to: &'static str,
    required_options: &'static [&'static str],
) -> EdgeSpec {
    EdgeSpec {
        from,
        to,
        required_options,
    }
}

static DEPTHS: &[(&str, &str, u32)] = &[
    ("feed_timeline", "profile", 2),
    ("feed_timeline", "media_comments", 3),
    ("feed_timeline", "story_viewer", 2),
    ("feed_timeline", "explore_popular", 1),
    ("feed_timeline", "direct_inbox", 1),
    ("feed_timeline", "clips_viewer", 1),
    ("explore_popular", "profile", 2),
    ("explore_popular", "media_comments", 3),
    ("search_typeahead", "profile", 2),
    ("search_typeahead", "hashtag_feed", 3),
    ("search_typeahead", "location_feed", 3),
    ("direct_inbox", "direct_thread", 1),
    ("direct_thread", "profile", 2),
    ("profile", "media_comments", 3),
    ("profile", "story_viewer", 2),
    ("clips_viewer", "profile", 2),
    ("story_viewer", "profile", 2),
    ("media_comments", "profile", 2),
];

/**
 * Look up the edge for a (from, to) pair
 */
pub fn find_edge(from: &str, to: &str) -> Option<&'static EdgeSpec> {
    EDGES.iter().find(|e| e.from == from && e.to == to)
}

fn recorded_depth(from: &str, to: &str) -> Option<u32> {
    DEPTHS
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, depth)| *depth)
}

/**
 * Depth for a move
 *
 * The table lookup runs first: pairs it never covered stay observable as
 * UnresolvedDepth. A recorded value is then discarded in favor of the flat
 * override, matching what the emulated client reports for every move.
 */
pub fn nav_depth(from: &str, to: &str) -> Result<u32, TelemetryError> {
    let _recorded = recorded_depth(from, to).ok_or_else(|| TelemetryError::UnresolvedDepth {
        from: from.to_string(),
        to: to.to_string(),
    })?;
    Ok(NAV_DEPTH_OVERRIDE)
}
