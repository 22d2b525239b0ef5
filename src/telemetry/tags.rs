/**
 * ============================================================================
 * EVENT TAG TABLE
 * ============================================================================
 *
 * PURPOSE: Bit-set tags attached to known (name, module) combinations
 *
 * Tags drive server-side routing for a handful of sampled events. The
 * table is keyed by event name and module; "*" matches any module,
 * including events composed without one. Unlisted combinations carry no
 * tags field at all.
 *
 * ============================================================================
 */

static TAGS: &[(&str, &str, u32)] = &[
    ("navigation", "*", 0x02),
    ("media_impression", "feed_timeline", 0x01),
    ("media_impression", "story_viewer", 0x01),
    ("media_impression", "clips_viewer", 0x05),
    ("comment_impression", "media_comments", 0x01),
    ("profile_action", "profile", 0x08),
    ("session_start", "*", 0x10),
];

/**
 * Tag bits for an event, 0 when the combination carries none
 */
pub fn lookup(name: &str, module: Option<&str>) -> u32 {
    if let Some(module) = module {
        if let Some((_, _, bits)) = TAGS
            .iter()
            .find(|(n, m, _)| *n == name && *m == module)
        {
            return *bits;
        }
    }
    TAGS.iter()
        .find(|(n, m, _)| *n == name && *m == "*")
        .map(|(_, _, bits)| *bits)
        .unwrap_or(0)
}
