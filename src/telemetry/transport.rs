/**
 * ============================================================================
 * COLLECTOR TRANSPORT
 * ============================================================================
 *
 * PURPOSE: HTTP seam between the dispatcher and the network
 *
 * The dispatcher talks to a CollectorTransport trait object, so tests swap
 * in an in-process fake and production uses the reqwest client below.
 * Requests with an attachment go out as multipart form-data; everything
 * else is a url-encoded form POST.
 *
 * ============================================================================
 */

use crate::error::TelemetryError;
use crate::telemetry::types::Attachment;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait CollectorTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        fields: &[(String, String)],
        attachment: Option<&Attachment>,
    ) -> Result<TransportResponse, TelemetryError>;
}

/**
 * Production transport over reqwest with a bounded request timeout
 */
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| TelemetryError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CollectorTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        fields: &[(String, String)],
        attachment: Option<&Attachment>,
    ) -> Result<TransportResponse, TelemetryError> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let request = match attachment {
            Some(attachment) => {
                let mut form = reqwest::multipart::Form::new();
                for (key, value) in fields {
                    form = form.text(key.clone(), value.clone());
                }
                form = form.part(
                    attachment.field_name.clone(),
                    reqwest::multipart::Part::bytes(attachment.bytes.clone())
                        .file_name(attachment.file_name.clone()),
                );
                request.multipart(form)
            }
            None => request.form(fields),
        };

        let response = request
            .send()
            .await
            .map_err(|e| TelemetryError::Network(format!("collector request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TelemetryError::Network(format!("failed to read collector response: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}
