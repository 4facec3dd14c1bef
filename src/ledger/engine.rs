// Ledger engine: owns the state and enforces every trading invariant

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::money::{floor_amount, round_cost, round_proceeds, MIN_UNIT};
use super::rate::RateModel;
use super::state::{Balances, Currency, EventKind, HistoryEntry, LedgerEvent, LedgerState};
use crate::command::{validate_amount, Command, CommandOutcome};
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{AuditRecord, AuditSink, FileStateStore, JsonlAuditLog, StateStore, StoreError};

/// How the engine obtained its state when the persisted one was unusable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing was persisted yet
    FreshStart,
    /// Persisted state could not be used; it was moved aside
    Corrupt(String),
}

/// Summary of an executed buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeReceipt {
    pub kind: EventKind,
    /// Foreign amount traded
    pub amount: Decimal,
    /// Domestic amount paid (buy) or received (sell)
    pub value: Decimal,
    pub rate: Decimal,
    pub balances: Balances,
}

pub struct LedgerEngine {
    config: Config,
    state: LedgerState,
    rate_model: RateModel,
    store: Box<dyn StateStore>,
    audit: Box<dyn AuditSink>,
    rng: ChaCha8Rng,
    recovery: Option<Recovery>,
}

impl LedgerEngine {
    /// Load persisted state, falling back to a fresh state from `config`.
    ///
    /// An absent or unusable state is replaced by a fresh materialization that
    /// is persisted before this returns. Unusable content is quarantined by the
    /// store, never overwritten in place.
    pub fn initialize(
        config: Config,
        store: Box<dyn StateStore>,
        audit: Box<dyn AuditSink>,
    ) -> LedgerResult<Self> {
        config.validate()?;

        let loaded = match store.load() {
            Ok(state) => match state.validate() {
                Ok(()) => Ok(state),
                Err(reason) => Err(StoreError::Corrupt(reason)),
            },
            Err(e) => Err(e),
        };

        let (state, recovery) = match loaded {
            Ok(state) => {
                debug!("Loaded ledger state with {} history entries", state.history.len());
                (state, None)
            }
            Err(StoreError::NotFound) => {
                info!("📁 No saved state, starting from configuration");
                (LedgerState::fresh(&config), Some(Recovery::FreshStart))
            }
            Err(StoreError::Corrupt(reason)) => {
                warn!("⚠️  Saved state is unusable ({}), starting from configuration", reason);
                store.quarantine()?;
                (LedgerState::fresh(&config), Some(Recovery::Corrupt(reason)))
            }
            Err(e) => return Err(e.into()),
        };

        if recovery.is_some() {
            store.save(&state)?;
        }

        let rng = match config.market.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            rate_model: RateModel::new(config.market.delta),
            config,
            state,
            store,
            audit,
            rng,
            recovery,
        })
    }

    /// Open the ledger backed by the files named in `config.storage`
    pub fn open(config: Config) -> LedgerResult<Self> {
        let store = FileStateStore::new(&config.storage.state_file);
        let audit = JsonlAuditLog::new(&config.storage.audit_log);
        Self::initialize(config, Box::new(store), Box::new(audit))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    pub fn current_rate(&self) -> Decimal {
        self.state.rate
    }

    pub fn balances(&self) -> Balances {
        self.state.balances()
    }

    /// Run a typed command and report its outcome
    pub fn execute(&mut self, command: Command) -> LedgerResult<CommandOutcome> {
        debug!("Executing {}", command);
        match command {
            Command::Rate => Ok(CommandOutcome::Rate(self.current_rate())),
            Command::Available => Ok(CommandOutcome::Balances(self.balances())),
            Command::Buy(amount) => self.buy(amount).map(CommandOutcome::Bought),
            Command::Sell(amount) => self.sell(amount).map(CommandOutcome::Sold),
            Command::BuyAll => self.buy_all().map(CommandOutcome::Bought),
            Command::SellAll => self.sell_all().map(CommandOutcome::Sold),
            Command::Next => {
                let previous = self.current_rate();
                let rate = self.advance_rate()?;
                Ok(CommandOutcome::RateAdvanced { previous, rate })
            }
            Command::Restart => {
                let state = self.reset()?;
                Ok(CommandOutcome::Restarted {
                    rate: state.rate,
                    balances: state.balances(),
                })
            }
        }
    }

    /// Move the rate by a random step of at most `delta`
    pub fn advance_rate(&mut self) -> LedgerResult<Decimal> {
        let previous = self.state.rate;
        let rate = self.rate_model.next_rate(previous, &mut self.rng);

        let mut next = self.state.clone();
        next.rate = rate;
        next.history.push(HistoryEntry::new(LedgerEvent::RateChanged { previous, rate }));
        self.commit(next)?;

        info!("📈 Rate moved {} -> {}", previous, rate);
        Ok(rate)
    }

    /// Acquire `amount` foreign units, paying `amount × rate` rounded up
    pub fn buy(&mut self, amount: Decimal) -> LedgerResult<TradeReceipt> {
        validate_amount(amount)?;
        let rate = self.state.rate;
        let cost = amount
            .checked_mul(rate)
            .map(round_cost)
            .ok_or_else(|| LedgerError::invalid_amount(amount, "cost overflows"))?;

        let available = self.state.balance_domestic;
        if available < cost {
            return Err(LedgerError::InsufficientFunds {
                currency: Currency::Domestic,
                required: cost,
                available,
            });
        }

        let mut next = self.state.clone();
        next.balance_domestic = available - cost;
        next.balance_foreign = next
            .balance_foreign
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount(amount, "balance overflows"))?;
        next.history.push(HistoryEntry::new(LedgerEvent::Bought { amount, cost, rate }));
        self.commit(next)?;

        info!("🟢 Bought {} foreign for {} domestic at {}", amount, cost, rate);
        Ok(self.receipt(EventKind::Bought, amount, cost, rate))
    }

    /// Dispose of `amount` foreign units, receiving `amount × rate` rounded down
    pub fn sell(&mut self, amount: Decimal) -> LedgerResult<TradeReceipt> {
        validate_amount(amount)?;
        let available = self.state.balance_foreign;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                currency: Currency::Foreign,
                required: amount,
                available,
            });
        }

        let rate = self.state.rate;
        let proceeds = amount
            .checked_mul(rate)
            .map(round_proceeds)
            .ok_or_else(|| LedgerError::invalid_amount(amount, "proceeds overflow"))?;

        let mut next = self.state.clone();
        next.balance_foreign = available - amount;
        next.balance_domestic = next
            .balance_domestic
            .checked_add(proceeds)
            .ok_or_else(|| LedgerError::invalid_amount(amount, "balance overflows"))?;
        next.history.push(HistoryEntry::new(LedgerEvent::Sold { amount, proceeds, rate }));
        self.commit(next)?;

        info!("🔴 Sold {} foreign for {} domestic at {}", amount, proceeds, rate);
        Ok(self.receipt(EventKind::Sold, amount, proceeds, rate))
    }

    /// Spend the whole domestic balance on the largest whole-cent foreign amount
    pub fn buy_all(&mut self) -> LedgerResult<TradeReceipt> {
        let rate = self.state.rate;
        let available = self.state.balance_domestic;
        let amount = available
            .checked_div(rate)
            .map(floor_amount)
            .unwrap_or(Decimal::ZERO);

        if amount < MIN_UNIT {
            return Err(LedgerError::InsufficientFunds {
                currency: Currency::Domestic,
                required: round_cost(MIN_UNIT * rate),
                available,
            });
        }
        self.buy(amount)
    }

    /// Sell the whole foreign balance
    pub fn sell_all(&mut self) -> LedgerResult<TradeReceipt> {
        let available = self.state.balance_foreign;
        if available < MIN_UNIT {
            return Err(LedgerError::InsufficientFunds {
                currency: Currency::Foreign,
                required: MIN_UNIT,
                available,
            });
        }
        self.sell(available)
    }

    /// Replace the state with a fresh one from configuration
    pub fn reset(&mut self) -> LedgerResult<&LedgerState> {
        let mut next = LedgerState::fresh(&self.config);
        next.history.push(HistoryEntry::new(LedgerEvent::Reset));
        self.commit(next)?;

        info!("🔄 Ledger reset to configured starting position");
        Ok(&self.state)
    }

    /// Persist `next`, then adopt it and append its newest entry to the audit log.
    ///
    /// If the save fails the current state stays untouched.
    fn commit(&mut self, next: LedgerState) -> LedgerResult<()> {
        self.store.save(&next)?;
        self.state = next;

        if let Some(entry) = self.state.history.last() {
            let record = AuditRecord::new(entry, &self.state);
            if let Err(e) = self.audit.append(&record) {
                warn!("⚠️  Audit append failed for {:?}: {}", entry.kind(), e);
            }
        }
        Ok(())
    }

    fn receipt(&self, kind: EventKind, amount: Decimal, value: Decimal, rate: Decimal) -> TradeReceipt {
        TradeReceipt {
            kind,
            amount,
            value,
            rate,
            balances: self.balances(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryAuditLog, MemoryStateStore};

    fn engine_with(domestic: i64, foreign: i64) -> (LedgerEngine, MemoryStateStore, MemoryAuditLog) {
        let mut config = Config::example();
        config.market.seed = Some(1);
        config.balances.domestic = Decimal::new(domestic, 0);
        config.balances.foreign = Decimal::new(foreign, 0);
        let store = MemoryStateStore::new();
        let audit = MemoryAuditLog::new();
        let engine =
            LedgerEngine::initialize(config, Box::new(store.clone()), Box::new(audit.clone())).unwrap();
        (engine, store, audit)
    }

    #[test]
    fn test_fresh_start_is_persisted() {
        let (engine, store, _) = engine_with(1000, 0);
        assert_eq!(engine.recovery(), Some(&Recovery::FreshStart));
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.saved().unwrap(), *engine.state());
    }

    #[test]
    fn test_buy_then_sell_scenario() {
        let (mut engine, _, _) = engine_with(1000, 0);

        let receipt = engine.buy(Decimal::new(10, 0)).unwrap();
        assert_eq!(receipt.value, Decimal::new(27000, 2));
        assert_eq!(engine.balances().domestic, Decimal::new(73000, 2));
        assert_eq!(engine.balances().foreign, Decimal::new(1000, 2));

        engine.sell(Decimal::new(5, 0)).unwrap();
        assert_eq!(engine.balances().domestic, Decimal::new(86500, 2));
        assert_eq!(engine.balances().foreign, Decimal::new(500, 2));
    }

    #[test]
    fn test_sell_without_foreign_fails_cleanly() {
        let (mut engine, store, _) = engine_with(1000, 0);
        let before = engine.state().clone();

        let err = engine.sell(Decimal::ONE).unwrap_err();
        match err {
            LedgerError::InsufficientFunds { currency, required, available } => {
                assert_eq!(currency, Currency::Foreign);
                assert_eq!(format!("{:.2}", required), "1.00");
                assert_eq!(format!("{:.2}", available), "0.00");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(engine.state(), &before);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let (mut engine, store, audit) = engine_with(1000, 0);
        let before = engine.state().clone();
        store.fail_saves(true);

        let err = engine.buy(Decimal::new(1, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert_eq!(engine.state(), &before);
        assert!(audit.records().is_empty());
    }

    #[test]
    fn test_audit_failure_does_not_fail_operation() {
        let (mut engine, store, audit) = engine_with(1000, 0);
        audit.fail_appends(true);

        engine.buy(Decimal::new(1, 0)).unwrap();
        assert_eq!(store.saved().unwrap().balance_foreign, Decimal::new(1, 0));
    }

    #[test]
    fn test_buy_all_with_dust_balance() {
        let (mut engine, _, _) = engine_with(0, 0);
        let err = engine.buy_all().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { currency: Currency::Domestic, .. }
        ));
    }

    #[test]
    fn test_execute_next_reports_both_rates() {
        let (mut engine, _, audit) = engine_with(1000, 0);
        let outcome = engine.execute(Command::Next).unwrap();
        match outcome {
            CommandOutcome::RateAdvanced { previous, rate } => {
                assert_eq!(previous, Decimal::new(2700, 2));
                assert_eq!(rate, engine.current_rate());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(audit.records().len(), 1);
        assert_eq!(audit.records()[0].entry.kind(), EventKind::RateChanged);
    }

    #[test]
    fn test_corrupt_state_is_quarantined() {
        let store = MemoryStateStore::corrupted("bad json");
        let engine = LedgerEngine::initialize(
            Config::example(),
            Box::new(store.clone()),
            Box::new(MemoryAuditLog::new()),
        )
        .unwrap();

        assert_eq!(engine.recovery(), Some(&Recovery::Corrupt("bad json".to_string())));
        assert_eq!(store.quarantine_count(), 1);
        assert_eq!(store.saved().unwrap(), LedgerState::fresh(&Config::example()));
    }
}
