// JSON file state store with atomic replace

use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{StateStore, StoreError};
use crate::ledger::LedgerState;

/// Stores the ledger as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "state".to_string());
        self.path.with_file_name(format!("{}{}", name, suffix))
    }

    fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<LedgerState, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::Corrupt(e.to_string()))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Write to `<file>.tmp`, fsync, then rename over the target
    fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        self.ensure_parent()?;

        let data = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let tmp_path = self.sibling(".tmp");
        if let Err(e) = write_synced(&tmp_path, &data).and_then(|_| fs::rename(&tmp_path, &self.path)) {
            // The previous state file is still intact; drop the partial copy
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("⚠️  Could not remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(StoreError::Io(e));
        }

        debug!("💾 Saved ledger state to {}", self.path.display());
        Ok(())
    }

    fn quarantine(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let suffix = format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f"));
        let target = self.sibling(&suffix);
        fs::rename(&self.path, &target)?;
        warn!("⚠️  Moved unreadable state to {}", target.display());
        Ok(())
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
