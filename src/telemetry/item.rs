/**
 * ============================================================================
 * ITEM CAPABILITIES MODULE
 * ============================================================================
 *
 * PURPOSE: Narrow item traits and the payload builders feature code uses
 *
 * Payload builders take only the capabilities they read, so any caller
 * type works as an event subject by implementing the relevant trait:
 * a media item needs an id, an owner, and a media type; a profile action
 * only needs the target's id.
 *
 * ============================================================================
 */

use serde_json::{json, Value};

pub trait HasId {
    fn id(&self) -> &str;
}

pub trait HasOwner {
    fn owner_pk(&self) -> u64;
}

pub trait HasMediaType {
    // 1 photo, 2 video, 8 carousel
    fn media_type(&self) -> u32;
}

/**
 * Payload for a media impression
 */
pub fn media_impression_payload(
    item: &(impl HasId + HasOwner + HasMediaType),
    position: u32,
) -> Vec<(String, Value)> {
    vec![
        ("m_pk".to_string(), json!(item.id())),
        ("a_pk".to_string(), json!(item.owner_pk().to_string())),
        ("m_t".to_string(), json!(item.media_type())),
        ("position".to_string(), json!(position)),
    ]
}

/**
 * Payload for a tap on a media item
 */
pub fn media_tap_payload(item: &impl HasId, click_point: &str) -> Vec<(String, Value)> {
    vec![
        ("m_pk".to_string(), json!(item.id())),
        ("click_point".to_string(), json!(click_point)),
    ]
}

/**
 * Payload for an action against a profile
 */
pub fn profile_action_payload(target: &impl HasId, action: &str) -> Vec<(String, Value)> {
    vec![
        ("action".to_string(), json!(action)),
        ("target_id".to_string(), json!(target.id())),
    ]
}

/**
 * Payload for a navigation event
 */
pub fn navigation_payload(
    from_module: &str,
    dest_module: &str,
    click_point: &str,
    nav_depth: u32,
    sequence: u64,
) -> Vec<(String, Value)> {
    vec![
        ("click_point".to_string(), json!(click_point)),
        ("from_module".to_string(), json!(from_module)),
        ("dest_module".to_string(), json!(dest_module)),
        ("seq".to_string(), json!(sequence)),
        ("nav_depth".to_string(), json!(nav_depth)),
    ]
}
