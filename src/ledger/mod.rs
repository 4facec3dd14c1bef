// Ledger core: state, rate evolution and trade execution

pub mod engine;
pub mod money;
pub mod rate;
pub mod shared;
pub mod state;

pub use engine::{LedgerEngine, Recovery, TradeReceipt};
pub use rate::RateModel;
pub use shared::SharedLedger;
pub use state::{Balances, Currency, EventKind, HistoryEntry, LedgerEvent, LedgerState, STATE_VERSION};
