//! Unified error handling for the currency trader
//!
//! Every fallible ledger operation returns `LedgerResult`. Errors carry
//! enough context to render an actionable message for the CLI user.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::ledger::Currency;
use crate::store::StoreError;

/// Main error type for the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Insufficient {currency} funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds {
        currency: Currency,
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing amount for {0}")]
    MissingAmount(&'static str),

    #[error("State storage failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub(crate) fn invalid_amount(input: impl ToString, reason: impl Into<String>) -> Self {
        LedgerError::InvalidAmount {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Mistakes the caller can fix by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InsufficientFunds { .. }
                | LedgerError::InvalidAmount { .. }
                | LedgerError::UnknownCommand(_)
                | LedgerError::MissingAmount(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            LedgerError::Config(_) => "config",
            LedgerError::InsufficientFunds { .. } => "funds",
            LedgerError::InvalidAmount { .. }
            | LedgerError::UnknownCommand(_)
            | LedgerError::MissingAmount(_) => "input",
            LedgerError::Persistence(_) => "persistence",
            LedgerError::Internal(_) => "internal",
        }
    }

    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::Config(ConfigError::FileNotFound(path)) => {
                format!(
                    "Configuration file not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: trader init\n\
                    2. Edit the rate, delta and balances\n\
                    3. Try again",
                    path
                )
            }
            LedgerError::InsufficientFunds { currency, required, available } => {
                format!(
                    "Insufficient {} funds\n\
                    Required: {:.2}\n\
                    Available: {:.2}\n\n\
                    💡 Reduce the amount or check balances with: trader available",
                    currency, required, available
                )
            }
            LedgerError::UnknownCommand(cmd) => {
                format!(
                    "Unknown command: {}\n\n\
                    💡 Valid commands: RATE, AVAILABLE, BUY <amount|ALL>, SELL <amount|ALL>, NEXT, RESTART",
                    cmd
                )
            }
            LedgerError::Persistence(err) => {
                format!(
                    "{}\n\n\
                    💡 No change was applied. Check that the state file location is readable and writable.",
                    err
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias using LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;
