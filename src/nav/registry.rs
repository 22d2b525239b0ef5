/**
 * ============================================================================
 * MODULE REGISTRY
 * ============================================================================
 *
 * PURPOSE: Static catalogue of app modules (logical screens)
 *
 * Each module carries:
 * - one or more candidate display classes (the native view class names the
 *   chain embeds); ambiguous modules are narrowed by a caller-supplied
 *   class selector
 * - an optional chain-reset step for feed-like root screens: entering one
 *   clears the navigation chain and restarts the step counter there
 *
 * The root tab click points bypass path validation entirely; they are the
 *   bottom-bar taps available from every screen.
 *
 * ============================================================================
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

/**
 * Registry entry for one module
 */
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub display_classes: &'static [&'static str],
    pub reset_step: Option<u32>,
}

/**
 * Bottom-bar tab click points, legal from any screen
 */
pub const ROOT_CLICK_POINTS: &[&str] = &[
    "main_home",
    "main_search",
    "main_inbox",
    "main_camera",
    "main_profile",
    "main_clips",
];

static MODULES: &[ModuleSpec] = &[
    ModuleSpec {
        name: "feed_timeline",
        display_classes: &["MainFeedFragment"],
        reset_step: Some(1),
    },
    ModuleSpec {
        name: "explore_popular",
        display_classes: &["ExploreFragment"],
        reset_step: Some(1),
    },
    ModuleSpec {
        name: "clips_viewer",
        display_classes: &["ClipsViewerFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "direct_inbox",
        display_classes: &["DirectInboxFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "direct_thread",
        display_classes: &["DirectThreadFragment"],
        reset_step: None,
    },
    ModuleSpec {
        // Two hosting classes: the full profile and the media grid tab
        name: "profile",
        display_classes: &["UserDetailFragment", "ProfileMediaTabFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "self_profile",
        display_classes: &["SelfProfileFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "search_typeahead",
        display_classes: &["SearchTypeaheadFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "hashtag_feed",
        display_classes: &["HashtagFeedFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "location_feed",
        display_classes: &["LocationFeedFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "media_comments",
        display_classes: &["CommentThreadFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "story_viewer",
        display_classes: &["ReelViewerFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "camera",
        display_classes: &["QuickCaptureFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "settings",
        display_classes: &["SettingsFragment"],
        reset_step: None,
    },
    ModuleSpec {
        name: "login",
        display_classes: &["LoginActivity"],
        reset_step: None,
    },
];

static MODULE_INDEX: Lazy<HashMap<&'static str, &'static ModuleSpec>> = Lazy::new(|| {
    MODULES.iter().map(|spec| (spec.name, spec)).collect()
});

/**
 * Look up a module by name
 */
pub fn find(module: &str) -> Option<&'static ModuleSpec> {
    MODULE_INDEX.get(module).copied()
}

/**
 * True when the module is in the registry
 */
pub fn is_known(module: &str) -> bool {
    MODULE_INDEX.contains_key(module)
}

/**
 * Resolve the display class for a module
 *
 * Single-candidate modules resolve directly. Multi-candidate modules resolve
 * to the selector when it names a candidate, or to the first candidate when
 * no selector is given. Unknown modules and selectors that name no candidate
 * resolve to None; the chain tracker treats that as a step-only move.
 */
pub fn resolve_display_class(module: &str, selector: Option<&str>) -> Option<&'static str> {
    let spec = find(module)?;
    match selector {
        None => spec.display_classes.first().copied(),
        Some(wanted) => spec
            .display_classes
            .iter()
            .find(|candidate| **candidate == wanted)
            .copied(),
    }
}

/**
 * Chain-reset step for feed-like root modules, None for everything else
 */
pub fn reset_step(module: &str) -> Option<u32> {
    find(module).and_then(|spec| spec.reset_step)
}

/**
 * True when the click point is a bottom-bar tab tap
 */
pub fn is_root_click_point(click_point: &str) -> bool {
    ROOT_CLICK_POINTS.contains(&click_point)
}
