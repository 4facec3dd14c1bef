//! Persistence collaborators for the ledger
//!
//! `StateStore` holds the single current `LedgerState`; `AuditSink` receives
//! one record per history entry and is never read back by the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::ledger::{HistoryEntry, LedgerState};

pub mod audit;
pub mod file;
pub mod memory;

pub use audit::JsonlAuditLog;
pub use file::FileStateStore;
pub use memory::{MemoryAuditLog, MemoryStateStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No persisted state found")]
    NotFound,

    #[error("Persisted state is corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of the current ledger state.
///
/// `save` must be crash-consistent: after a crash either the previous or
/// the new full state is observable, never a partial write.
pub trait StateStore: Send {
    fn load(&self) -> Result<LedgerState, StoreError>;

    fn save(&self, state: &LedgerState) -> Result<(), StoreError>;

    /// Move an unreadable state aside so a fresh one can take its place
    fn quarantine(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Append-only sink for audit records
pub trait AuditSink: Send {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;
}

/// History entry plus the ledger position right after it was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub entry: HistoryEntry,
    pub rate: Decimal,
    pub balance_domestic: Decimal,
    pub balance_foreign: Decimal,
}

impl AuditRecord {
    pub fn new(entry: &HistoryEntry, state: &LedgerState) -> Self {
        Self {
            entry: entry.clone(),
            rate: state.rate,
            balance_domestic: state.balance_domestic,
            balance_foreign: state.balance_foreign,
        }
    }
}
