// Serialized access to one ledger from many threads

use std::sync::{Arc, Mutex, MutexGuard};

use super::engine::LedgerEngine;
use super::state::LedgerState;
use crate::command::{Command, CommandOutcome};
use crate::error::{LedgerError, LedgerResult};

/// Cloneable handle that runs each command as one critical section.
///
/// Every ledger operation is read-modify-persist, so commands must never
/// interleave; the mutex makes each one a single logical transaction.
#[derive(Clone)]
pub struct SharedLedger {
    engine: Arc<Mutex<LedgerEngine>>,
}

impl SharedLedger {
    pub fn new(engine: LedgerEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn execute(&self, command: Command) -> LedgerResult<CommandOutcome> {
        self.lock()?.execute(command)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> LedgerResult<LedgerState> {
        Ok(self.lock()?.state().clone())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, LedgerEngine>> {
        self.engine
            .lock()
            .map_err(|_| LedgerError::Internal("ledger lock poisoned".to_string()))
    }
}
