/**
 * ============================================================================
 * EVENT COMPOSER MODULE
 * ============================================================================
 *
 * PURPOSE: Assemble analytics events in the collector's exact field order
 *
 * EVENT SHAPE:
 * log_type, bg, name, [module], [tags], time, sampling_rate, extra
 *
 * The module rides at index 3 when given; a non-zero tag lookup lands
 * immediately after it. "extra" opens with the common properties (viewer
 * pk, release channel, radio type, reserved latency) and then carries the
 * caller payload verbatim: keys keep their identity and order, including
 * numeric-string keys.
 *
 * ============================================================================
 */

use crate::clock;
use crate::error::TelemetryError;
use crate::nav::registry;
use crate::telemetry::tags;
use crate::telemetry::types::Event;
use serde_json::{json, Map, Value};

pub const LOG_TYPE: &str = "client_event";

// Wire constant; the emulated client reserves the slot without measuring
const RESERVED_LATENCY: i64 = 0;

/**
 * Session and config context stamped into every event
 */
#[derive(Debug, Clone)]
pub struct ComposeContext<'a> {
    pub background: bool,
    pub account_id: u64,
    pub release_channel: &'a str,
    pub radio_type: &'a str,
    // Present for chain-bearing composes only
    pub nav_chain: Option<&'a str>,
}

/**
 * Build one event
 *
 * The payload is an ordered pair list appended to "extra" as-is. A module,
 * when given, must exist in the registry.
 */
pub fn compose(
    name: &str,
    module: Option<&str>,
    payload: &[(String, Value)],
    ctx: &ComposeContext,
) -> Result<Event, TelemetryError> {
    if name.is_empty() {
        return Err(TelemetryError::InvalidArgument(
            "event name must not be empty".to_string(),
        ));
    }
    if let Some(module) = module {
        if !registry::is_known(module) {
            return Err(TelemetryError::InvalidArgument(format!(
                "unknown module '{}'",
                module
            )));
        }
    }

    let mut event = Event::new();
    event.push("log_type", json!(LOG_TYPE));
    event.push("bg", json!(if ctx.background { "true" } else { "false" }));
    event.push("name", json!(name));
    event.push("time", json!(clock::high_precision_now()));
    event.push("sampling_rate", json!(1));
    event.push("extra", Value::Object(build_extra(payload, ctx)));

    if let Some(module) = module {
        event.insert_at(3, "module", json!(module));
    }
    let tag_bits = tags::lookup(name, module);
    if tag_bits != 0 {
        let position = if module.is_some() { 4 } else { 3 };
        event.insert_at(position, "tags", json!(tag_bits));
    }

    Ok(event)
}

/**
 * Common properties, then the payload, then the chain when present
 */
fn build_extra(payload: &[(String, Value)], ctx: &ComposeContext) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("pk".to_string(), json!(ctx.account_id.to_string()));
    extra.insert("release_channel".to_string(), json!(ctx.release_channel));
    extra.insert("radio_type".to_string(), json!(ctx.radio_type));
    extra.insert("latency".to_string(), json!(RESERVED_LATENCY));
    for (key, value) in payload {
        extra.insert(key.clone(), value.clone());
    }
    if let Some(chain) = ctx.nav_chain {
        extra.insert("nav_chain".to_string(), json!(chain));
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ComposeContext<'static> {
        ComposeContext {
            background: false,
            account_id: 0,
            release_channel: "prod",
            radio_type: "wifi-none",
            nav_chain: None,
        }
    }

    fn extra_keys(event: &Event) -> Vec<String> {
        event
            .get("extra")
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_required_fields_without_module() {
        let event = compose("app_open", None, &[], &ctx()).unwrap();
        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(
            keys,
            ["log_type", "bg", "name", "time", "sampling_rate", "extra"]
        );
        assert_eq!(event.get("log_type").unwrap(), &json!("client_event"));
        assert_eq!(event.get("bg").unwrap(), &json!("false"));
        assert_eq!(event.get("sampling_rate").unwrap(), &json!(1));
        assert!(event.get("time").unwrap().as_str().unwrap().contains('E'));
    }

    #[test]
    fn test_module_rides_at_index_three() {
        let event = compose("media_tap", Some("feed_timeline"), &[], &ctx()).unwrap();
        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(&keys[..4], ["log_type", "bg", "name", "module"]);
        assert_eq!(event.get("module").unwrap(), &json!("feed_timeline"));
    }

    #[test]
    fn test_tags_only_position() {
        // session_start carries a wildcard tag and no module
        let event = compose("session_start", None, &[], &ctx()).unwrap();
        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(
            keys,
            ["log_type", "bg", "name", "tags", "time", "sampling_rate", "extra"]
        );
        assert_eq!(event.get("tags").unwrap(), &json!(0x10));
    }

    #[test]
    fn test_module_and_tags_positions() {
        let event = compose("media_impression", Some("feed_timeline"), &[], &ctx()).unwrap();
        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(
            keys,
            ["log_type", "bg", "name", "module", "tags", "time", "sampling_rate", "extra"]
        );
        assert_eq!(event.get("tags").unwrap(), &json!(0x01));
    }

    #[test]
    fn test_untagged_combination_has_no_tags_field() {
        let event = compose("media_tap", Some("feed_timeline"), &[], &ctx()).unwrap();
        assert!(event.get("tags").is_none());
    }

    #[test]
    fn test_background_flag_is_string() {
        let mut background_ctx = ctx();
        background_ctx.background = true;
        let event = compose("app_close", None, &[], &background_ctx).unwrap();
        assert_eq!(event.get("bg").unwrap(), &json!("true"));
    }

    #[test]
    fn test_extra_opens_with_common_properties() {
        let mut authed = ctx();
        authed.account_id = 8412993021;
        let payload = vec![
            ("m_pk".to_string(), json!("2989411200_8412993021")),
            ("position".to_string(), json!(4)),
        ];
        let event = compose("media_impression", Some("feed_timeline"), &payload, &authed).unwrap();

        let keys = extra_keys(&event);
        assert_eq!(
            keys,
            ["pk", "release_channel", "radio_type", "latency", "m_pk", "position"]
        );
        let extra = event.get("extra").unwrap();
        assert_eq!(extra["pk"], json!("8412993021"));
        assert_eq!(extra["release_channel"], json!("prod"));
        assert_eq!(extra["radio_type"], json!("wifi-none"));
        assert_eq!(extra["latency"], json!(0));
        assert_eq!(extra["position"], json!(4));
    }

    #[test]
    fn test_numeric_string_payload_keys_keep_order() {
        let payload = vec![
            ("5".to_string(), json!("e")),
            ("0".to_string(), json!("a")),
            ("2".to_string(), json!("c")),
        ];
        let event = compose("carousel_swipe", Some("feed_timeline"), &payload, &ctx()).unwrap();
        let keys = extra_keys(&event);
        assert_eq!(&keys[4..], ["5", "0", "2"]);
    }

    #[test]
    fn test_nav_chain_lands_after_payload() {
        let mut chain_ctx = ctx();
        chain_ctx.nav_chain = Some("MainFeedFragment:feed_timeline:1:cold start:1.7E9::");
        let payload = vec![("click_point".to_string(), json!("media_owner"))];
        let event = compose("navigation", Some("feed_timeline"), &payload, &chain_ctx).unwrap();

        let keys = extra_keys(&event);
        assert_eq!(keys.last().map(String::as_str), Some("nav_chain"));
        let extra = event.get("extra").unwrap();
        assert!(extra["nav_chain"].as_str().unwrap().contains("feed_timeline"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = compose("", None, &[], &ctx()).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_module_rejected() {
        let err = compose("media_tap", Some("not_a_module"), &[], &ctx()).unwrap_err();
        match err {
            TelemetryError::InvalidArgument(message) => {
                assert!(message.contains("not_a_module"));
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }
}
