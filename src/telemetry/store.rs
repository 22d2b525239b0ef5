/**
 * ============================================================================
 * QUEUE SNAPSHOT STORE
 * ============================================================================
 *
 * PURPOSE: Persist unsent events across sessions
 *
 * STORAGE STRUCTURE:
 * {storage_dir}/pending_events.json: one snapshot of all three queues
 *
 * BEHAVIOR:
 * - Atomic writes (temp file + rename)
 * - A snapshot is consumed on load: the file is deleted so events replay
 *   at most once
 * - Corrupt snapshots are logged and discarded, never propagated
 *
 * ============================================================================
 */

use crate::error::TelemetryError;
use crate::telemetry::types::Event;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct QueueSnapshot {
    saved_at: String,
    queues: [Vec<Event>; 3],
}

pub struct QueueStore {
    storage_dir: PathBuf,
}

impl QueueStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.storage_dir.join("pending_events.json")
    }

    /**
     * Write the current queues to disk atomically
     */
    pub fn save(&self, queues: &[Vec<Event>; 3]) -> Result<(), TelemetryError> {
        fs::create_dir_all(&self.storage_dir).map_err(|e| {
            TelemetryError::Storage(format!("failed to create storage directory: {}", e))
        })?;

        let snapshot = QueueSnapshot {
            saved_at: chrono::Utc::now().to_rfc3339(),
            queues: queues.clone(),
        };
        let json_str = serde_json::to_string(&snapshot)?;

        let path = self.snapshot_path();
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json_str).map_err(|e| {
            TelemetryError::Storage(format!("failed to write temporary snapshot: {}", e))
        })?;
        fs::rename(&temp_path, &path)
            .map_err(|e| TelemetryError::Storage(format!("failed to save snapshot: {}", e)))?;

        let pending: usize = queues.iter().map(|queue| queue.len()).sum();
        log::info!("Saved queue snapshot with {} pending events", pending);
        Ok(())
    }

    /**
     * Load and delete the snapshot
     * Returns None when there is nothing usable on disk
     */
    pub fn load_and_clear(&self) -> Option<[Vec<Event>; 3]> {
        let path = self.snapshot_path();
        if !path.exists() {
            return None;
        }

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json_str| {
                serde_json::from_str::<QueueSnapshot>(&json_str).map_err(|e| e.to_string())
            });

        // Consumed either way; a corrupt snapshot would fail forever
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("Failed to remove queue snapshot: {}", e);
        }

        match parsed {
            Ok(snapshot) => {
                let pending: usize = snapshot.queues.iter().map(|queue| queue.len()).sum();
                log::info!(
                    "Restored {} pending events from snapshot saved at {}",
                    pending,
                    snapshot.saved_at
                );
                Some(snapshot.queues)
            }
            Err(e) => {
                log::warn!("Discarding corrupt queue snapshot: {}", e);
                None
            }
        }
    }
}
