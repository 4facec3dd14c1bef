//! Typed ledger commands and their parser
//!
//! Front ends turn user input into a `Command` here; the engine only ever
//! sees the typed variant and answers with a `CommandOutcome`.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::money::has_money_precision;
use crate::ledger::{Balances, TradeReceipt};

/// Requested trade size: an explicit foreign amount or the whole balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSize {
    Amount(Decimal),
    All,
}

impl FromStr for TradeSize {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.eq_ignore_ascii_case("all") {
            return Ok(TradeSize::All);
        }

        let amount = Decimal::from_str(input)
            .map_err(|_| LedgerError::invalid_amount(input, "not a decimal number"))?;
        validate_amount(amount)?;
        Ok(TradeSize::Amount(amount))
    }
}

/// Reject amounts the ledger cannot hold: non-positive or finer than a cent
pub fn validate_amount(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, "must be greater than zero"));
    }
    if !has_money_precision(amount) {
        return Err(LedgerError::invalid_amount(amount, "at most 2 decimal places allowed"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Rate,
    Available,
    Buy(Decimal),
    Sell(Decimal),
    BuyAll,
    SellAll,
    Next,
    Restart,
}

impl Command {
    pub fn buy(size: TradeSize) -> Self {
        match size {
            TradeSize::Amount(amount) => Command::Buy(amount),
            TradeSize::All => Command::BuyAll,
        }
    }

    pub fn sell(size: TradeSize) -> Self {
        match size {
            TradeSize::Amount(amount) => Command::Sell(amount),
            TradeSize::All => Command::SellAll,
        }
    }

    /// Build a command from an action name and optional amount argument
    pub fn parse(action: &str, amount: Option<&str>) -> LedgerResult<Self> {
        let action = action.trim().to_ascii_uppercase();
        let command = match action.as_str() {
            "BUY" => {
                let size = amount.ok_or(LedgerError::MissingAmount("BUY"))?;
                return Ok(Command::buy(size.parse()?));
            }
            "SELL" => {
                let size = amount.ok_or(LedgerError::MissingAmount("SELL"))?;
                return Ok(Command::sell(size.parse()?));
            }
            "RATE" => Command::Rate,
            "AVAILABLE" => Command::Available,
            "NEXT" => Command::Next,
            "RESTART" => Command::Restart,
            _ => return Err(LedgerError::UnknownCommand(action)),
        };

        match amount {
            Some(extra) => Err(LedgerError::UnknownCommand(format!("{} {}", action, extra))),
            None => Ok(command),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Rate => "RATE",
            Command::Available => "AVAILABLE",
            Command::Buy(_) | Command::BuyAll => "BUY",
            Command::Sell(_) | Command::SellAll => "SELL",
            Command::Next => "NEXT",
            Command::Restart => "RESTART",
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Rate | Command::Available)
    }
}

impl FromStr for Command {
    type Err = LedgerError;

    /// Parse a single line such as `BUY 10` or `sell all`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let action = parts
            .next()
            .ok_or_else(|| LedgerError::UnknownCommand(String::new()))?;
        let amount = parts.next();
        if let Some(extra) = parts.next() {
            return Err(LedgerError::UnknownCommand(format!("{} (unexpected '{}')", s.trim(), extra)));
        }
        Command::parse(action, amount)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Buy(amount) | Command::Sell(amount) => write!(f, "{} {}", self.name(), amount),
            Command::BuyAll | Command::SellAll => write!(f, "{} ALL", self.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Result of executing a command against the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Rate(Decimal),
    Balances(Balances),
    Bought(TradeReceipt),
    Sold(TradeReceipt),
    RateAdvanced { previous: Decimal, rate: Decimal },
    Restarted { rate: Decimal, balances: Balances },
}
