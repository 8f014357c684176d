use repoharvest_core::error::{ScanError, StoreError};
use repoharvest_core::types::SyncSummary;
use repoharvest_store::ObjectStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Visitor invoked once per scanned file. Registered per branch; the
/// dispatcher guarantees every scanner sees every file for its branch
/// before any `finish()` runs, and that scanners must tolerate seeing the
/// same file content again after a crashed run (at-least-once dispatch).
pub trait Scanner {
    fn name(&self) -> &str;

    /// `content` is `None` when the file is gone from the working tree
    /// (deletion visibility) or failed to parse.
    fn scan_file(&mut self, path: &str, content: Option<&Value>) -> Result<(), ScanError>;

    /// Called once per branch after the last `scan_file`.
    fn finish(&mut self) -> Result<(), ScanError>;
}

/// Shared log the [`FileListScanner`] appends to: `(path, had_content)`.
pub type FileLog = Arc<Mutex<Vec<(String, bool)>>>;

/// Records every dispatched file into a shared log. The minimal scanner:
/// used to verify dispatch behavior and as a template for real visitors.
pub struct FileListScanner {
    log: FileLog,
}

impl FileListScanner {
    pub fn new(log: FileLog) -> Self {
        Self { log }
    }
}

impl Scanner for FileListScanner {
    fn name(&self) -> &str {
        "file-list"
    }

    fn scan_file(&mut self, path: &str, content: Option<&Value>) -> Result<(), ScanError> {
        if let Ok(mut log) = self.log.lock() {
            log.push((path.to_string(), content.is_some()));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Slot the [`StoreSyncScanner`] leaves its final summary in.
pub type SyncOutcome = Arc<Mutex<Option<SyncSummary>>>;

/// Diff-driven store maintenance: each scanned file still present in the
/// working tree is uploaded under `prefix/<path>` (add or update, probed
/// against the store), and each file gone from the tree has its object
/// deleted. Because only changed paths are dispatched, this keeps the
/// store current without walking either tree.
///
/// Re-dispatching the same range is a no-op: matching content is never
/// re-uploaded and absent objects are never re-deleted.
pub struct StoreSyncScanner<'s> {
    store: &'s dyn ObjectStore,
    local_root: PathBuf,
    prefix: String,
    summary: SyncSummary,
    outcome: SyncOutcome,
}

impl<'s> StoreSyncScanner<'s> {
    pub fn new(
        store: &'s dyn ObjectStore,
        local_root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        outcome: SyncOutcome,
    ) -> Self {
        Self {
            store,
            local_root: local_root.into(),
            prefix: prefix.into(),
            summary: SyncSummary::default(),
            outcome,
        }
    }

    fn key_for(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{path}", self.prefix)
        }
    }
}

impl Scanner for StoreSyncScanner<'_> {
    fn name(&self) -> &str {
        "store-sync"
    }

    fn scan_file(&mut self, path: &str, _content: Option<&Value>) -> Result<(), ScanError> {
        let key = self.key_for(path);
        let local = self.local_root.join(path);

        if local.is_file() {
            let current = std::fs::read(&local)?;
            match self.store.get(&key) {
                Ok(stored) if stored == current => {
                    debug!(key = %key, "object already matches; skipped");
                }
                Ok(_) => {
                    self.store.put_file(&key, &local)?;
                    self.summary.updated.push(key);
                }
                Err(StoreError::ObjectNotFound { .. }) => {
                    self.store.put_file(&key, &local)?;
                    self.summary.added.push(key);
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            match self.store.get(&key) {
                Ok(_) => {
                    self.store.delete(&key)?;
                    self.summary.deleted.push(key);
                }
                Err(StoreError::ObjectNotFound { .. }) => {
                    debug!(key = %key, "object already absent; skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ScanError> {
        let mut summary = std::mem::take(&mut self.summary);
        summary.sort();
        if let Ok(mut slot) = self.outcome.lock() {
            *slot = Some(summary);
        }
        Ok(())
    }
}
