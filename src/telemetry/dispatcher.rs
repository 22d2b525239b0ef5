/**
 * ============================================================================
 * DISPATCHER MODULE
 * ============================================================================
 *
 * PURPOSE: POST encoded batches to the collector, fire and forget
 *
 * REQUEST SHAPE:
 * - Unauthenticated: access_token is "<app_id>|<client_key>", ffdb_token
 *   rides along empty, format=json, sent_time jittered behind the clock
 * - Explicit client headers replace transport defaults
 * - Multipart when the encoder produced an attachment, url-encoded form
 *   otherwise
 *
 * FAILURE POLICY: any network-level failure or non-2xx status drops the
 * batch. Nothing is retried and nothing propagates to the caller that
 * triggered the flush; the stored checksum only moves on success.
 *
 * ============================================================================
 */

use crate::clock;
use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::transport::CollectorTransport;
use crate::telemetry::types::EncodedPayload;
use serde_json::Value;
use std::sync::Arc;

/**
 * What happened to one dispatch
 */
#[derive(Debug)]
pub enum DispatchOutcome {
    Sent { checksum: Option<String> },
    Dropped { reason: String },
}

pub struct Dispatcher {
    config: TelemetryConfig,
    transport: Arc<dyn CollectorTransport>,
}

impl Dispatcher {
    pub fn new(config: TelemetryConfig, transport: Arc<dyn CollectorTransport>) -> Self {
        Self { config, transport }
    }

    /**
     * Send one encoded payload to the collector
     * Never returns an error; failures are logged and the batch dropped
     */
    pub async fn send(&self, payload: EncodedPayload) -> DispatchOutcome {
        let EncodedPayload {
            fields: encoded_fields,
            attachment,
            compressed,
        } = payload;

        let mut fields: Vec<(String, String)> = vec![
            (
                "access_token".to_string(),
                format!("{}|{}", self.config.app_id, self.config.client_key),
            ),
            ("ffdb_token".to_string(), String::new()),
            ("format".to_string(), "json".to_string()),
            ("sent_time".to_string(), clock::jittered_sent_time()),
        ];
        fields.extend(encoded_fields);

        let headers: Vec<(String, String)> = vec![
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            (
                "X-Client-Connection-Type".to_string(),
                self.config.connection_type.clone(),
            ),
            (
                "X-Client-Capabilities".to_string(),
                self.config.capabilities.clone(),
            ),
            ("X-Client-App-Id".to_string(), self.config.app_id.clone()),
        ];

        let result = self
            .transport
            .post(
                &self.config.collector_url,
                &headers,
                &fields,
                attachment.as_ref(),
            )
            .await;

        match result {
            Err(e) => {
                log::warn!("Batch dispatch failed, dropping batch: {}", e);
                DispatchOutcome::Dropped {
                    reason: e.to_string(),
                }
            }
            Ok(response) if response.status >= 400 => {
                log::warn!(
                    "Collector rejected batch: HTTP {} ({} bytes)",
                    response.status,
                    response.body.len()
                );
                DispatchOutcome::Dropped {
                    reason: format!("HTTP {}", response.status),
                }
            }
            Ok(response) => {
                log::debug!(
                    "Batch dispatched: HTTP {}, compressed={}",
                    response.status,
                    compressed
                );
                DispatchOutcome::Sent {
                    checksum: extract_checksum(&response.body),
                }
            }
        }
    }
}

/**
 * Checksum from a decoded collector response, when one is present
 */
fn extract_checksum(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("checksum")
        .and_then(Value::as_str)
        .map(str::to_string)
}
