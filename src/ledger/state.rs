//! Ledger state and history types
//!
//! `LedgerState` is the unit of persistence: the current rate, both balances
//! and the append-only history of events that produced them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::money::{has_money_precision, to_cents, MIN_RATE};
use crate::config::Config;

/// Current persisted schema version
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Domestic,
    Foreign,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Domestic => write!(f, "domestic"),
            Currency::Foreign => write!(f, "foreign"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub domestic: Decimal,
    pub foreign: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RateChanged,
    Bought,
    Sold,
    Reset,
}

/// State-changing event with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    RateChanged { previous: Decimal, rate: Decimal },
    Bought { amount: Decimal, cost: Decimal, rate: Decimal },
    Sold { amount: Decimal, proceeds: Decimal, rate: Decimal },
    Reset,
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::RateChanged { .. } => EventKind::RateChanged,
            LedgerEvent::Bought { .. } => EventKind::Bought,
            LedgerEvent::Sold { .. } => EventKind::Sold,
            LedgerEvent::Reset => EventKind::Reset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: LedgerEvent,
}

impl HistoryEntry {
    pub fn new(event: LedgerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub version: u32,
    pub rate: Decimal,
    pub balance_domestic: Decimal,
    pub balance_foreign: Decimal,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl LedgerState {
    /// Materialize the starting state described by `config`, with empty history
    pub fn fresh(config: &Config) -> Self {
        Self {
            version: STATE_VERSION,
            rate: to_cents(config.market.rate),
            balance_domestic: to_cents(config.balances.domestic),
            balance_foreign: to_cents(config.balances.foreign),
            history: Vec::new(),
        }
    }

    pub fn balances(&self) -> Balances {
        Balances {
            domestic: self.balance_domestic,
            foreign: self.balance_foreign,
        }
    }

    /// Check a loaded state against the ledger invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.version != STATE_VERSION {
            return Err(format!(
                "unsupported state version {} (expected {})",
                self.version, STATE_VERSION
            ));
        }
        if self.rate < MIN_RATE {
            return Err(format!("rate {} is below the {} floor", self.rate, MIN_RATE));
        }
        if self.balance_domestic.is_sign_negative() && !self.balance_domestic.is_zero() {
            return Err(format!("negative domestic balance {}", self.balance_domestic));
        }
        if self.balance_foreign.is_sign_negative() && !self.balance_foreign.is_zero() {
            return Err(format!("negative foreign balance {}", self.balance_foreign));
        }
        for (field, value) in [
            ("rate", self.rate),
            ("domestic balance", self.balance_domestic),
            ("foreign balance", self.balance_foreign),
        ] {
            if !has_money_precision(value) {
                return Err(format!("{} {} has more than 2 decimal places", field, value));
            }
        }
        Ok(())
    }
}
