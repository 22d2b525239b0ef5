/**
 * ============================================================================
 * TELEMETRY CONFIGURATION MODULE
 * ============================================================================
 *
 * PURPOSE: Configuration schema, persistence, and validation
 *
 * STORAGE: JSON in the app data directory
 * FILE PATH: {storage_dir}/telemetry_config.json
 *
 * FUNCTIONALITY:
 * - Define configuration schema with production defaults
 * - Validate configuration values
 * - Load configuration from disk
 * - Save configuration atomically
 *
 * ============================================================================
 */

use crate::error::TelemetryError;
use crate::telemetry::encoder::EncodingMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/**
 * Complete pipeline configuration
 * Identity, wire, and dispatch behavior are all controlled here
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    // Collector endpoint receiving batch POSTs
    pub collector_url: String,

    // Application identity, also the left half of the access token
    pub app_id: String,

    // Client key, the right half of the access token
    pub client_key: String,

    // Application version string embedded in envelopes and metadata
    pub app_ver: String,

    // Build number embedded in envelopes
    pub build_num: String,

    // Config metadata version advertised to the collector
    pub config_version: String,

    // Performance-logging schema version advertised to the collector
    pub qpl_version: String,

    // Request metadata tier
    pub tier: String,

    // Carrier name reported in request metadata
    pub carrier: String,

    // Connection type for request metadata and the connection-type header
    pub connection_type: String,

    // Capabilities token sent with every request
    pub capabilities: String,

    // Emulated client user agent, replaces the transport default
    pub user_agent: String,

    // Release channel stamped into every event's common properties
    pub release_channel: String,

    // Radio type stamped into every event's common properties
    pub radio_type: String,

    // Events per queue before an automatic flush
    pub flush_threshold: usize,

    // Upper bound on one dispatch attempt
    pub send_timeout_seconds: u64,

    // Wire encoding applied at flush time
    pub encoding: EncodingMode,

    // Data directory for config and queue snapshots; None uses the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    // Persistent device fingerprint; None generates a fresh one per session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Default for TelemetryConfig {
    /**
     * Production defaults mirroring the emulated client build
     */
    fn default() -> Self {
        Self {
            collector_url: "https://collector.example.com/client_events".to_string(),
            app_id: "1217981644879628".to_string(),
            client_key: "8f54cf16eb58a6f2a9a1d5ac2a4a0684".to_string(),
            app_ver: "12.4.0".to_string(),
            build_num: "208442671".to_string(),
            config_version: "v2".to_string(),
            qpl_version: "1".to_string(),
            tier: "default".to_string(),
            carrier: "unknown".to_string(),
            connection_type: "WIFI".to_string(),
            capabilities: "2hFtW9Q=".to_string(),
            user_agent: "Clickpath 12.4.0 Android (33/13; 420dpi; 1080x2219; mobile; en_US)"
                .to_string(),
            release_channel: "prod".to_string(),
            radio_type: "wifi-none".to_string(),
            flush_threshold: 50,
            send_timeout_seconds: 10,
            encoding: EncodingMode::MultiBatchCompressed,
            storage_dir: None,
            device_id: None,
        }
    }
}

impl TelemetryConfig {
    /**
     * Validate configuration values
     */
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.app_id.is_empty() {
            return Err(TelemetryError::InvalidArgument(
                "app_id must not be empty".to_string(),
            ));
        }
        if self.client_key.is_empty() {
            return Err(TelemetryError::InvalidArgument(
                "client_key must not be empty".to_string(),
            ));
        }
        if self.app_ver.is_empty() {
            return Err(TelemetryError::InvalidArgument(
                "app_ver must not be empty".to_string(),
            ));
        }
        if self.user_agent.is_empty() {
            return Err(TelemetryError::InvalidArgument(
                "user_agent must not be empty".to_string(),
            ));
        }
        if !self.collector_url.starts_with("http://") && !self.collector_url.starts_with("https://")
        {
            return Err(TelemetryError::InvalidArgument(
                "collector_url must start with http:// or https://".to_string(),
            ));
        }
        if self.flush_threshold < 1 || self.flush_threshold > 1000 {
            return Err(TelemetryError::InvalidArgument(
                "flush_threshold must be between 1 and 1000".to_string(),
            ));
        }
        if self.send_timeout_seconds < 1 || self.send_timeout_seconds > 120 {
            return Err(TelemetryError::InvalidArgument(
                "send_timeout_seconds must be between 1 and 120".to_string(),
            ));
        }
        Ok(())
    }

    /**
     * Effective data directory, falling back to the platform default
     */
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(default_storage_dir)
    }
}

/**
 * Platform data directory for this crate
 */
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("clickpath")
}

fn config_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("telemetry_config.json")
}

/**
 * Load configuration from disk
 * Returns defaults when the file does not exist
 */
pub fn load_config(storage_dir: &Path) -> Result<TelemetryConfig, TelemetryError> {
    let path = config_path(storage_dir);

    if !path.exists() {
        log::info!("Telemetry config not found, using defaults");
        return Ok(TelemetryConfig::default());
    }

    let json_str = fs::read_to_string(&path)
        .map_err(|e| TelemetryError::Storage(format!("failed to read config file: {}", e)))?;

    let config: TelemetryConfig = serde_json::from_str(&json_str)?;
    config.validate()?;

    log::info!("Loaded telemetry config from {}", path.display());
    Ok(config)
}

/**
 * Save configuration to disk atomically
 * Uses temporary file + rename to prevent corruption
 */
pub fn save_config(storage_dir: &Path, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    config.validate()?;

    let path = config_path(storage_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| TelemetryError::Storage(format!("failed to create config directory: {}", e)))?;
    }

    let json_str = serde_json::to_string_pretty(config)?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json_str)
        .map_err(|e| TelemetryError::Storage(format!("failed to write temporary config file: {}", e)))?;

    fs::rename(&temp_path, &path)
        .map_err(|e| TelemetryError::Storage(format!("failed to save config file: {}", e)))?;

    log::info!("Saved telemetry config to {}", path.display());
    Ok(())
}
