// Ledger command implementations for the trader CLI
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use currency_trader::{
    Command, CommandOutcome, Config, CurrencyConfig, LedgerEngine, LedgerError, LedgerEvent,
    LedgerResult, Recovery,
};

const EXAMPLE_CONFIG: &str = include_str!("../../trader.toml.example");

/// Write the example configuration unless one already exists
pub fn init_workspace(config_path: &str, force: bool) -> LedgerResult<()> {
    let path = Path::new(config_path);
    if path.exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", config_path);
        return Ok(());
    }

    fs::write(path, EXAMPLE_CONFIG).map_err(|e| {
        currency_trader::ConfigError::FileWrite(format!("{}: {}", config_path, e))
    })?;
    info!("📝 Created {}", config_path);
    println!("Created {}. Edit the rate, delta and balances, then run: trader available", config_path);
    Ok(())
}

/// Load configuration and open the file-backed ledger it describes
pub fn open_ledger(config_path: &str) -> LedgerResult<LedgerEngine> {
    let config = Config::from_file(config_path)?;
    info!("📁 Config: {}", config_path);

    let engine = LedgerEngine::open(config)?;
    if let Some(Recovery::Corrupt(_)) = engine.recovery() {
        warn!("⚠️  Previous state was quarantined next to {}", engine.config().storage.state_file.display());
    }
    Ok(engine)
}

/// Execute one command and print its outcome
pub fn run_command(engine: &mut LedgerEngine, command: Command) -> LedgerResult<()> {
    let outcome = engine.execute(command)?;
    println!("{}", render_outcome(&outcome, &engine.config().currencies));
    Ok(())
}

/// Execute command lines in order, stopping at the first failure.
///
/// Every line is parsed before anything runs. Returns how many commands
/// changed the ledger.
pub fn run_script(engine: &mut LedgerEngine, lines: &[String]) -> LedgerResult<usize> {
    let commands = lines
        .iter()
        .map(|line| line.parse::<Command>())
        .collect::<LedgerResult<Vec<_>>>()?;

    let mut changes = 0;
    for (index, command) in commands.into_iter().enumerate() {
        info!("▶️  [{}/{}] {}", index + 1, lines.len(), command);
        run_command(engine, command)?;
        if command.is_mutating() {
            changes += 1;
        }
    }
    info!("✅ Script finished: {} commands, {} state changes", lines.len(), changes);
    Ok(changes)
}

/// Print the recorded history, newest last
pub fn show_history(engine: &LedgerEngine, limit: Option<usize>) {
    let history = engine.history();
    let skip = limit.map(|n| history.len().saturating_sub(n)).unwrap_or(0);
    let codes = &engine.config().currencies;

    if history.is_empty() {
        println!("No history recorded yet.");
        return;
    }

    for entry in &history[skip..] {
        let detail = match &entry.event {
            LedgerEvent::RateChanged { previous, rate } => {
                format!("RATE    {:.2} -> {:.2}", previous, rate)
            }
            LedgerEvent::Bought { amount, cost, rate } => format!(
                "BUY     {:.2} {} for {:.2} {} at {:.2}",
                amount, codes.foreign, cost, codes.domestic, rate
            ),
            LedgerEvent::Sold { amount, proceeds, rate } => format!(
                "SELL    {:.2} {} for {:.2} {} at {:.2}",
                amount, codes.foreign, proceeds, codes.domestic, rate
            ),
            LedgerEvent::Reset => "RESTART".to_string(),
        };
        println!("{}  {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), detail);
    }
}

pub fn render_outcome(outcome: &CommandOutcome, codes: &CurrencyConfig) -> String {
    match outcome {
        CommandOutcome::Rate(rate) => format!("{:.2}", rate),
        CommandOutcome::Balances(b) => format!(
            "{}: {:.2}, {}: {:.2}",
            codes.domestic, b.domestic, codes.foreign, b.foreign
        ),
        CommandOutcome::Bought(r) => format!(
            "Successfully bought {:.2} {} for {:.2} {}.",
            r.amount, codes.foreign, r.value, codes.domestic
        ),
        CommandOutcome::Sold(r) => format!(
            "Successfully sold {:.2} {} for {:.2} {}.",
            r.amount, codes.foreign, r.value, codes.domestic
        ),
        CommandOutcome::RateAdvanced { rate, .. } => format!("New rate: {:.2}", rate),
        CommandOutcome::Restarted { rate, balances } => format!(
            "Ledger restarted. Rate: {:.2}, {}: {:.2}, {}: {:.2}",
            rate, codes.domestic, balances.domestic, codes.foreign, balances.foreign
        ),
    }
}

pub fn render_error(error: &LedgerError, codes: &CurrencyConfig) -> String {
    match error {
        LedgerError::InsufficientFunds { currency, required, available } => {
            let code = match currency {
                currency_trader::Currency::Domestic => &codes.domestic,
                currency_trader::Currency::Foreign => &codes.foreign,
            };
            format!(
                "UNAVAILABLE. REQUIRED BALANCE {} {:.2}, AVAILABLE {:.2}",
                code, required, available
            )
        }
        other => other.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currency_trader::{
        Balances, Currency, EventKind, MemoryAuditLog, MemoryStateStore, TradeReceipt,
    };
    use rust_decimal::Decimal;

    #[test]
    fn test_render_balances() {
        let outcome = CommandOutcome::Balances(Balances {
            domestic: Decimal::new(730, 0),
            foreign: Decimal::new(10, 0),
        });
        assert_eq!(
            render_outcome(&outcome, &CurrencyConfig::default()),
            "UAH: 730.00, USD: 10.00"
        );
    }

    #[test]
    fn test_render_bought() {
        let outcome = CommandOutcome::Bought(TradeReceipt {
            kind: EventKind::Bought,
            amount: Decimal::new(10, 0),
            value: Decimal::new(270, 0),
            rate: Decimal::new(27, 0),
            balances: Balances {
                domestic: Decimal::new(730, 0),
                foreign: Decimal::new(10, 0),
            },
        });
        assert_eq!(
            render_outcome(&outcome, &CurrencyConfig::default()),
            "Successfully bought 10.00 USD for 270.00 UAH."
        );
    }

    fn memory_ledger() -> LedgerEngine {
        let mut config = Config::example();
        config.market.seed = Some(3);
        LedgerEngine::initialize(
            config,
            Box::new(MemoryStateStore::new()),
            Box::new(MemoryAuditLog::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_run_script_counts_state_changes() {
        let mut engine = memory_ledger();
        let lines: Vec<String> = ["BUY 10", "RATE", "available", "SELL ALL", "NEXT"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(run_script(&mut engine, &lines).unwrap(), 3);
        assert_eq!(engine.history().len(), 3);
        assert_eq!(engine.balances().foreign, Decimal::ZERO);
    }

    #[test]
    fn test_run_script_rejects_bad_line_before_running() {
        let mut engine = memory_ledger();
        let lines = vec!["BUY 10".to_string(), "HOLD".to_string()];

        assert!(matches!(
            run_script(&mut engine, &lines),
            Err(LedgerError::UnknownCommand(_))
        ));
        assert!(engine.history().is_empty());
        assert_eq!(engine.balances().foreign, Decimal::ZERO);
    }

    #[test]
    fn test_render_insufficient_funds() {
        let err = LedgerError::InsufficientFunds {
            currency: Currency::Domestic,
            required: Decimal::new(270, 0),
            available: Decimal::new(100, 0),
        };
        assert_eq!(
            render_error(&err, &CurrencyConfig::default()),
            "UNAVAILABLE. REQUIRED BALANCE UAH 270.00, AVAILABLE 100.00"
        );
    }
}
