// In-memory collaborators (for testing and embedding)

use std::sync::{Arc, Mutex};

use super::{AuditRecord, AuditSink, StateStore, StoreError};
use crate::ledger::LedgerState;

#[derive(Debug, Default)]
struct Slot {
    state: Option<LedgerState>,
    corrupt: Option<String>,
    fail_saves: bool,
    saves: usize,
    quarantined: usize,
}

/// State store backed by shared memory; clones observe the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.slot.lock() {
            slot.state = Some(state);
        }
        store
    }

    /// A store whose content cannot be decoded
    pub fn corrupted(reason: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.slot.lock() {
            slot.corrupt = Some(reason.to_string());
        }
        store
    }

    /// Make subsequent saves fail with an IO error
    pub fn fail_saves(&self, fail: bool) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.fail_saves = fail;
        }
    }

    pub fn saved(&self) -> Option<LedgerState> {
        self.slot.lock().ok().and_then(|slot| slot.state.clone())
    }

    pub fn save_count(&self) -> usize {
        self.slot.lock().map(|slot| slot.saves).unwrap_or(0)
    }

    pub fn quarantine_count(&self) -> usize {
        self.slot.lock().map(|slot| slot.quarantined).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Slot>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<LedgerState, StoreError> {
        let slot = self.lock()?;
        if let Some(reason) = &slot.corrupt {
            return Err(StoreError::Corrupt(reason.clone()));
        }
        slot.state.clone().ok_or(StoreError::NotFound)
    }

    fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        let mut slot = self.lock()?;
        if slot.fail_saves {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        slot.state = Some(state.clone());
        slot.corrupt = None;
        slot.saves += 1;
        Ok(())
    }

    fn quarantine(&self) -> Result<(), StoreError> {
        let mut slot = self.lock()?;
        slot.quarantined += 1;
        slot.corrupt = None;
        slot.state = None;
        Ok(())
    }
}

/// Audit sink that keeps records in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Make subsequent appends fail
    pub fn fail_appends(&self, fail: bool) {
        if let Ok(mut flag) = self.fail.lock() {
            *flag = fail;
        }
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let failing = self.fail.lock().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(StoreError::Unavailable("simulated audit failure".to_string()));
        }
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("audit lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}
