// Currency Trader Library
//
// A two-currency exchange ledger simulator: a randomly drifting rate, two
// balances traded against it, and durable state with an audit trail

pub mod command;
pub mod config;
pub mod error;   // Unified error handling
pub mod ledger;
pub mod store;   // State file and audit log

// Re-export ledger types
pub use ledger::{
    Balances, Currency, EventKind, HistoryEntry, LedgerEngine, LedgerEvent, LedgerState,
    RateModel, Recovery, SharedLedger, TradeReceipt,
};

// Re-export command types
pub use command::{Command, CommandOutcome, TradeSize};

// Re-export error types
pub use error::{LedgerError, LedgerResult};

// Re-export configuration
pub use config::{BalanceConfig, Config, ConfigError, CurrencyConfig, MarketConfig, StorageConfig};

// Re-export persistence types
pub use store::{
    AuditRecord, AuditSink, FileStateStore, JsonlAuditLog, MemoryAuditLog, MemoryStateStore,
    StateStore, StoreError,
};
