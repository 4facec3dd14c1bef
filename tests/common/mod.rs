// Common test utilities and helpers

#![allow(dead_code)]

use currency_trader::{
    BalanceConfig, Config, CurrencyConfig, LedgerEngine, MarketConfig, MemoryAuditLog,
    MemoryStateStore, StorageConfig,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Configuration from the reference scenario: rate 27.00, delta 0.50, 1000.00 / 0.00
pub fn create_test_config() -> Config {
    Config {
        market: MarketConfig {
            rate: Decimal::new(2700, 2),
            delta: Decimal::new(50, 2),
            seed: Some(42),
        },
        balances: BalanceConfig {
            domestic: Decimal::new(100000, 2),
            foreign: Decimal::ZERO,
        },
        currencies: CurrencyConfig::default(),
        storage: StorageConfig::default(),
    }
}

/// Test configuration whose storage lives inside a fresh temporary directory
pub fn create_temp_workspace() -> (TempDir, Config) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut config = create_test_config();
    config.storage.state_file = temp_dir.path().join("state.json");
    config.storage.audit_log = temp_dir.path().join("state_log.jsonl");
    (temp_dir, config)
}

/// Engine over in-memory collaborators, returning handles to inspect them
pub fn memory_engine(config: Config) -> (LedgerEngine, MemoryStateStore, MemoryAuditLog) {
    let store = MemoryStateStore::new();
    let audit = MemoryAuditLog::new();
    let engine = LedgerEngine::initialize(config, Box::new(store.clone()), Box::new(audit.clone()))
        .expect("Failed to initialize ledger");
    (engine, store, audit)
}

/// Decimal from a string literal
pub fn d(value: &str) -> Decimal {
    value.parse().expect("Invalid decimal literal")
}
