/**
 * ============================================================================
 * TELEMETRY TYPES MODULE
 * ============================================================================
 *
 * PURPOSE: Shared data model for the event pipeline
 *
 * TYPES:
 * - Event: ordered (key, value) field list; field order is wire contract
 * - QueuePriority: the three accumulation queues
 * - Batch: per-queue envelope shipped to the collector
 * - EncodedPayload / Attachment: output of the batch encoder
 * - TelemetryStats: dispatch counters for host-app display
 *
 * ============================================================================
 */

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/**
 * One analytics event as an ordered list of (key, value) pairs
 *
 * The collector is order-sensitive, so fields live in an explicit list
 * rather than a map: push appends, insert_at splices at a position, and
 * serialization walks the list front to back.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    fields: Vec<(String, Value)>,
}

impl Event {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.fields.push((key.into(), value));
    }

    /**
     * Splice a field in at a position, shifting later fields right
     * Positions past the end append
     */
    pub fn insert_at(&mut self, index: usize, key: impl Into<String>, value: Value) {
        let index = index.min(self.fields.len());
        self.fields.insert(index, (key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventVisitor;

        impl<'de> Visitor<'de> for EventVisitor {
            type Value = Event;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object of event fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Event, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    fields.push((key, value));
                }
                Ok(Event { fields })
            }
        }

        deserializer.deserialize_map(EventVisitor)
    }
}

/**
 * The three accumulation queues
 * Wire indices: 0 default, 1 high-priority/immediate, 2 low-priority
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePriority {
    Default,
    High,
    Low,
}

impl QueuePriority {
    pub const ALL: [QueuePriority; 3] = [
        QueuePriority::Default,
        QueuePriority::High,
        QueuePriority::Low,
    ];

    pub fn from_index(index: usize) -> Result<Self, crate::error::TelemetryError> {
        match index {
            0 => Ok(QueuePriority::Default),
            1 => Ok(QueuePriority::High),
            2 => Ok(QueuePriority::Low),
            other => Err(crate::error::TelemetryError::InvalidArgument(format!(
                "unsupported queue index {}",
                other
            ))),
        }
    }

    pub fn index(self) -> usize {
        match self {
            QueuePriority::Default => 0,
            QueuePriority::High => 1,
            QueuePriority::Low => 2,
        }
    }
}

/**
 * Per-queue envelope shipped to the collector
 * Field order below is the wire order; the consent and device-init flags
 * only appear when the session carries them
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub time: String,
    pub app_id: String,
    pub app_ver: String,
    pub build_num: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_state: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_init: Option<bool>,
    pub device_id: String,
    pub session_id: String,
    pub seq: u64,
    pub uid: u64,
    pub data: Vec<Event>,
}

/**
 * File attachment riding on a multipart dispatch
 */
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field_name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/**
 * Encoder output: the form fields for the collector POST, an optional
 * attachment, and whether the message body went out compressed
 */
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    pub fields: Vec<(String, String)>,
    pub attachment: Option<Attachment>,
    pub compressed: bool,
}

impl EncodedPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/**
 * Dispatch counters for host-app display
 */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub events_queued: u64,
    pub events_sent: u64,
    pub batches_sent: u64,
    pub batches_dropped: u64,
    pub flushes: u64,
    pub last_dispatch_at: Option<String>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_in_insertion_order() {
        let mut event = Event::new();
        event.push("log_type", json!("client_event"));
        event.push("bg", json!("false"));
        event.push("name", json!("media_impression"));
        event.push("time", json!("1.700000000000E9"));

        let rendered = serde_json::to_string(&event).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["log_type", "bg", "name", "time"]);
    }

    #[test]
    fn test_event_insert_at_splices() {
        let mut event = Event::new();
        event.push("log_type", json!("client_event"));
        event.push("bg", json!("false"));
        event.push("name", json!("x"));
        event.push("time", json!("1.7E9"));
        event.insert_at(3, "module", json!("feed_timeline"));
        event.insert_at(4, "tags", json!(2));

        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(keys, ["log_type", "bg", "name", "module", "tags", "time"]);
    }

    #[test]
    fn test_event_insert_past_end_appends() {
        let mut event = Event::new();
        event.push("a", json!(1));
        event.insert_at(99, "b", json!(2));
        let keys: Vec<&str> = event.keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_event_numeric_string_keys_survive_round_trip() {
        let mut event = Event::new();
        event.push("3", json!("third"));
        event.push("1", json!("first"));
        event.push("2", json!("second"));

        let rendered = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&rendered).unwrap();
        let keys: Vec<&str> = back.keys().collect();
        // Keys keep identity and position, never renumbered or sorted
        assert_eq!(keys, ["3", "1", "2"]);
        assert_eq!(back.get("3"), Some(&json!("third")));
    }

    #[test]
    fn test_queue_priority_indices() {
        assert_eq!(QueuePriority::from_index(0).unwrap(), QueuePriority::Default);
        assert_eq!(QueuePriority::from_index(1).unwrap(), QueuePriority::High);
        assert_eq!(QueuePriority::from_index(2).unwrap(), QueuePriority::Low);
        assert!(QueuePriority::from_index(3).is_err());
        assert_eq!(QueuePriority::High.index(), 1);
    }

    #[test]
    fn test_batch_field_order_and_conditional_flags() {
        let batch = Batch {
            time: "1.700000000000E9".to_string(),
            app_id: "1217981644879628".to_string(),
            app_ver: "12.4.0".to_string(),
            build_num: "208442671".to_string(),
            consent_state: None,
            device_init: None,
            device_id: "dev".to_string(),
            session_id: "sess".to_string(),
            seq: 1,
            uid: 0,
            data: vec![],
        };

        let rendered = serde_json::to_string(&batch).unwrap();
        assert!(!rendered.contains("consent_state"));
        assert!(!rendered.contains("device_init"));

        let value: Value = serde_json::from_str(&rendered).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            ["time", "app_id", "app_ver", "build_num", "device_id", "session_id", "seq", "uid", "data"]
        );
    }

    #[test]
    fn test_batch_flags_appear_when_set() {
        let batch = Batch {
            time: "1.7E9".to_string(),
            app_id: "a".to_string(),
            app_ver: "v".to_string(),
            build_num: "b".to_string(),
            consent_state: Some(2),
            device_init: Some(true),
            device_id: "d".to_string(),
            session_id: "s".to_string(),
            seq: 1,
            uid: 7,
            data: vec![],
        };

        let value = serde_json::to_value(&batch).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        let consent_pos = keys.iter().position(|k| *k == "consent_state").unwrap();
        let build_pos = keys.iter().position(|k| *k == "build_num").unwrap();
        let device_pos = keys.iter().position(|k| *k == "device_id").unwrap();
        assert!(build_pos < consent_pos && consent_pos < device_pos);
    }
}
