/**
 * ============================================================================
 * BATCH ENCODER MODULE
 * ============================================================================
 *
 * PURPOSE: Serialize flushed batches into the collector's wire encodings
 *
 * ENCODINGS:
 * - deflate-single: raw-deflates the JSON envelope array into a cmsg file
 *   attachment with cmethod=deflate, then also emits the plain multi-batch
 *   fields. The emulated client's mode switch falls through here and the
 *   collector accepts the combined form, so the cascade is reproduced
 *   exactly.
 * - multi-batch-plain: message wrapper (request metadata, config metadata,
 *   batches) sent uncompressed with compressed=0.
 * - multi-batch-compressed: the wrapper deflated and base64'd with
 *   compressed=1 and multi_batch=1. With exactly one batch the metadata
 *   fields flatten into the envelope itself (data stays last) and the
 *   multi_batch field is omitted.
 *
 * ============================================================================
 */

use crate::error::TelemetryError;
use crate::telemetry::types::{Attachment, Batch, EncodedPayload};
use base64::engine::general_purpose;
use base64::Engine as _;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::Write;

/**
 * Wire encoding applied at flush time
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingMode {
    DeflateSingle,
    MultiBatchPlain,
    MultiBatchCompressed,
}

/**
 * Request and config metadata carried by the message wrapper
 */
#[derive(Debug, Clone)]
pub struct WireMetadata {
    pub tier: String,
    pub carrier: String,
    pub conn_type: String,
    // Last server-issued checksum, empty until one arrives
    pub checksum: String,
    pub config_version: String,
    pub qpl_version: String,
    pub uid: u64,
    pub app_ver: String,
}

/**
 * Encode a flush's batches for dispatch
 */
pub fn encode(
    batches: &[Batch],
    mode: EncodingMode,
    meta: &WireMetadata,
) -> Result<EncodedPayload, TelemetryError> {
    if batches.is_empty() {
        return Err(TelemetryError::InvalidArgument(
            "no batches to encode".to_string(),
        ));
    }

    match mode {
        EncodingMode::DeflateSingle => {
            let envelopes = serde_json::to_string(batches)?;
            let attachment = Attachment {
                field_name: "cmsg".to_string(),
                file_name: "cmsg.bin".to_string(),
                bytes: deflate(envelopes.as_bytes())?,
            };
            // Mode switch fall-through: the plain fields ride along
            let message = serde_json::to_string(&message_wrapper(batches, meta)?)?;
            Ok(EncodedPayload {
                fields: vec![
                    ("message".to_string(), message),
                    ("compressed".to_string(), "0".to_string()),
                    ("cmethod".to_string(), "deflate".to_string()),
                ],
                attachment: Some(attachment),
                compressed: false,
            })
        }
        EncodingMode::MultiBatchPlain => {
            let message = serde_json::to_string(&message_wrapper(batches, meta)?)?;
            Ok(EncodedPayload {
                fields: vec![
                    ("message".to_string(), message),
                    ("compressed".to_string(), "0".to_string()),
                ],
                attachment: None,
                compressed: false,
            })
        }
        EncodingMode::MultiBatchCompressed => {
            let multi = batches.len() > 1;
            let body = if multi {
                message_wrapper(batches, meta)?
            } else {
                flattened_single(&batches[0], meta)?
            };
            let deflated = deflate(serde_json::to_string(&body)?.as_bytes())?;
            let mut fields = vec![
                ("message".to_string(), general_purpose::STANDARD.encode(&deflated)),
                ("compressed".to_string(), "1".to_string()),
            ];
            if multi {
                fields.push(("multi_batch".to_string(), "1".to_string()));
            }
            Ok(EncodedPayload {
                fields,
                attachment: None,
                compressed: true,
            })
        }
    }
}

/**
 * Raw DEFLATE, no zlib or gzip framing
 */
fn deflate(bytes: &[u8]) -> Result<Vec<u8>, TelemetryError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| TelemetryError::Serialization(format!("deflate failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| TelemetryError::Serialization(format!("deflate failed: {}", e)))
}

/**
 * The multi-batch message wrapper: request metadata, config metadata,
 * then the envelope array
 */
fn message_wrapper(batches: &[Batch], meta: &WireMetadata) -> Result<Value, TelemetryError> {
    Ok(json!({
        "tier": meta.tier,
        "carrier": meta.carrier,
        "conn_type": meta.conn_type,
        "checksum": meta.checksum,
        "config_version": meta.config_version,
        "qpl_version": meta.qpl_version,
        "uid": meta.uid,
        "app_ver": meta.app_ver,
        "batches": serde_json::to_value(batches)?,
    }))
}

/**
 * Single-batch compressed form: metadata merges into the envelope itself,
 * with the event list staying last
 */
fn flattened_single(batch: &Batch, meta: &WireMetadata) -> Result<Value, TelemetryError> {
    let envelope = serde_json::to_value(batch)?;
    let Some(envelope) = envelope.as_object() else {
        return Err(TelemetryError::Serialization(
            "batch envelope must serialize to an object".to_string(),
        ));
    };

    let mut flat = Map::new();
    for (key, value) in envelope {
        if key != "data" {
            flat.insert(key.clone(), value.clone());
        }
    }
    flat.insert("tier".to_string(), json!(meta.tier));
    flat.insert("carrier".to_string(), json!(meta.carrier));
    flat.insert("conn_type".to_string(), json!(meta.conn_type));
    flat.insert("checksum".to_string(), json!(meta.checksum));
    flat.insert("config_version".to_string(), json!(meta.config_version));
    flat.insert("qpl_version".to_string(), json!(meta.qpl_version));
    flat.insert("uid".to_string(), json!(meta.uid));
    flat.insert("app_ver".to_string(), json!(meta.app_ver));
    flat.insert(
        "data".to_string(),
        envelope.get("data").cloned().unwrap_or_else(|| json!([])),
    );
    Ok(Value::Object(flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::types::Event;
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    fn event(name: &str) -> Event {
        let mut event = Event::new();
        event.push("log_type", json!("client_event"));
        event.push("name", json!(name));
        event
    }

    fn batch(seq: u64, events: usize) -> Batch {
        Batch {
            time: "1.700000000000E9".to_string(),
            app_id: "1217981644879628".to_string(),
            app_ver: "12.4.0".to_string(),
            build_num: "208442671".to_string(),
            consent_state: None,
            device_init: None,
            device_id: "device-1".to_string(),
            session_id: "session-1".to_string(),
            seq,
            uid: 0,
            data: (0..events).map(|i| event(&format!("e{}", i))).collect(),
        }
    }

    fn meta() -> WireMetadata {
        WireMetadata {
            tier: "default".to_string(),
            carrier: "unknown".to_string(),
            conn_type: "WIFI".to_string(),
            checksum: "abc123".to_string(),
            config_version: "v2".to_string(),
            qpl_version: "1".to_string(),
            uid: 0,
            app_ver: "12.4.0".to_string(),
        }
    }

    fn inflate(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_plain_wrapper_shape() {
        let payload = encode(&[batch(1, 2)], EncodingMode::MultiBatchPlain, &meta()).unwrap();
        assert!(payload.attachment.is_none());
        assert!(!payload.compressed);
        assert_eq!(payload.field("compressed"), Some("0"));

        let message: Value = serde_json::from_str(payload.field("message").unwrap()).unwrap();
        let keys: Vec<&String> = message.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            ["tier", "carrier", "conn_type", "checksum", "config_version", "qpl_version", "uid", "app_ver", "batches"]
        );
        assert_eq!(message["checksum"], json!("abc123"));
        assert_eq!(message["batches"].as_array().unwrap().len(), 1);
        assert_eq!(message["batches"][0]["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_compressed_multi_batch() {
        let batches = [batch(1, 1), batch(2, 3)];
        let payload = encode(&batches, EncodingMode::MultiBatchCompressed, &meta()).unwrap();
        assert!(payload.compressed);
        assert!(payload.attachment.is_none());
        assert_eq!(payload.field("compressed"), Some("1"));
        assert_eq!(payload.field("multi_batch"), Some("1"));

        let deflated = general_purpose::STANDARD
            .decode(payload.field("message").unwrap())
            .unwrap();
        let decoded: Value = serde_json::from_slice(&inflate(&deflated)).unwrap();
        assert_eq!(decoded["batches"].as_array().unwrap().len(), 2);
        assert_eq!(decoded["batches"][1]["seq"], json!(2));
        // Identical to what the plain wrapper would have carried
        assert_eq!(decoded, message_wrapper(&batches, &meta()).unwrap());
    }

    #[test]
    fn test_compressed_single_batch_flattens_metadata() {
        let payload = encode(&[batch(7, 2)], EncodingMode::MultiBatchCompressed, &meta()).unwrap();
        assert!(payload.compressed);
        assert_eq!(payload.field("compressed"), Some("1"));
        assert_eq!(payload.field("multi_batch"), None);

        let deflated = general_purpose::STANDARD
            .decode(payload.field("message").unwrap())
            .unwrap();
        let decoded: Value = serde_json::from_slice(&inflate(&deflated)).unwrap();
        let keys: Vec<&String> = decoded.as_object().unwrap().keys().collect();
        // uid and app_ver already live in the envelope, so the metadata
        // merge keeps their positions instead of appending duplicates
        assert_eq!(
            keys,
            [
                "time", "app_id", "app_ver", "build_num", "device_id", "session_id", "seq", "uid",
                "tier", "carrier", "conn_type", "checksum", "config_version", "qpl_version", "data"
            ]
        );
        assert_eq!(decoded["seq"], json!(7));
        assert_eq!(decoded["tier"], json!("default"));
        assert_eq!(decoded["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_deflate_single_cascades_into_plain_fields() {
        let payload = encode(&[batch(1, 1)], EncodingMode::DeflateSingle, &meta()).unwrap();
        assert!(!payload.compressed);
        assert_eq!(payload.field("cmethod"), Some("deflate"));
        assert_eq!(payload.field("compressed"), Some("0"));
        assert!(payload.field("message").is_some());

        let attachment = payload.attachment.as_ref().expect("cmsg attachment");
        assert_eq!(attachment.field_name, "cmsg");
        let decoded: Value = serde_json::from_slice(&inflate(&attachment.bytes)).unwrap();
        let envelopes = decoded.as_array().unwrap();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0]["seq"], json!(1));
    }

    #[test]
    fn test_encode_rejects_empty_flush() {
        let err = encode(&[], EncodingMode::MultiBatchPlain, &meta()).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidArgument(_)));
    }

    #[test]
    fn test_deflate_round_trip() {
        let body = br#"{"tier":"default","batches":[]}"#;
        let compressed = deflate(body).unwrap();
        assert_ne!(compressed, body.to_vec());
        assert_eq!(inflate(&compressed), body.to_vec());
    }
}
