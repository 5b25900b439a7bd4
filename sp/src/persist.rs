//! Durable persistence adapters
//!
//! Two implementations of the autosave seams: [`FilePlanSink`] writes the
//! serialized plan to `plan.json` in the data directory, and
//! [`FilePendingStore`] keeps the offline/failure queue in the planfile
//! key-value store so unsaved edits survive a restart.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Context, Result};
use planfile::KvStore;
use tracing::debug;

use crate::autosave::{PendingStore, SaveSink, SinkError, PENDING_KEY};
use crate::domain::Plan;

/// File name of the persisted plan inside the data directory
pub const PLAN_FILE: &str = "plan.json";

/// Saves plan payloads as a JSON file via an atomic temp-file rename
pub struct FilePlanSink {
    path: PathBuf,
}

impl FilePlanSink {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PLAN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SaveSink for FilePlanSink {
    async fn save(&self, payload: &str) -> Result<(), SinkError> {
        debug!(path = %self.path.display(), bytes = payload.len(), "FilePlanSink::save: called");
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| SinkError::Failed(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SinkError::Failed(format!("rename to {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

/// Pending-change queue backed by the planfile store
pub struct FilePendingStore {
    kv: KvStore,
}

impl FilePendingStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            kv: KvStore::open(data_dir)?,
        })
    }
}

impl PendingStore for FilePendingStore {
    fn load(&self) -> Result<Option<String>> {
        self.kv.get(PENDING_KEY)
    }

    fn store(&self, payload: &str) -> Result<()> {
        debug!(bytes = payload.len(), "FilePendingStore::store: queueing pending payload");
        self.kv.put(PENDING_KEY, payload)
    }

    fn clear(&self) -> Result<()> {
        self.kv.remove(PENDING_KEY)
    }
}

/// Load the persisted plan, if one exists
pub fn load_plan(data_dir: &Path) -> Result<Option<Plan>> {
    let path = data_dir.join(PLAN_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "load_plan: no plan file");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
    let plan: Plan = serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))?;
    debug!(plan_id = %plan.id, semesters = plan.semesters.len(), "load_plan: loaded");
    Ok(Some(plan))
}
