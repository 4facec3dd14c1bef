// Currency Trader - CLI
// Single entry point for all ledger operations

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{debug, error, Level};
use currency_trader::{Command, CurrencyConfig, LedgerError, LedgerResult, TradeSize};

// Load command module from cli directory
#[path = "../cli/ledger_commands.rs"]
mod ledger_commands;

#[derive(Parser)]
#[command(name = "trader")]
#[command(version)]
#[command(about = "Two-currency exchange ledger simulator", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true, default_value = "trader.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the current exchange rate
    #[command(alias = "RATE")]
    Rate,

    /// Show both balances
    #[command(alias = "AVAILABLE")]
    Available,

    /// Buy foreign currency
    #[command(alias = "BUY")]
    Buy {
        /// Foreign amount, or ALL to spend the whole domestic balance
        amount: String,
    },

    /// Sell foreign currency
    #[command(alias = "SELL")]
    Sell {
        /// Foreign amount, or ALL to sell the whole foreign balance
        amount: String,
    },

    /// Advance the exchange rate by one random step
    #[command(alias = "NEXT")]
    Next,

    /// Reset balances and rate to the configured starting values
    #[command(alias = "RESTART")]
    Restart,

    /// Show recorded history
    History {
        /// Only show the most recent entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Execute several command lines in order, e.g. "BUY 10" "NEXT"
    Exec {
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr so command output stays clean
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    debug!("Currency Trader v{}", env!("CARGO_PKG_VERSION"));

    let mut codes = CurrencyConfig::default();
    match run(cli, &mut codes) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {} error: {}", e.category(), e);
            eprintln!("{}", ledger_commands::render_error(&e, &codes));
            if e.is_user_error() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}

fn run(cli: Cli, codes: &mut CurrencyConfig) -> LedgerResult<()> {
    // Init doesn't require config (it creates it)
    if let Commands::Init { force } = cli.command {
        return ledger_commands::init_workspace(&cli.config, force);
    }

    // Parse amounts before touching any state
    let command = match &cli.command {
        Commands::Rate => Some(Command::Rate),
        Commands::Available => Some(Command::Available),
        Commands::Buy { amount } => Some(Command::buy(amount.parse::<TradeSize>()?)),
        Commands::Sell { amount } => Some(Command::sell(amount.parse::<TradeSize>()?)),
        Commands::Next => Some(Command::Next),
        Commands::Restart => Some(Command::Restart),
        Commands::History { .. } | Commands::Exec { .. } | Commands::Init { .. } => None,
    };

    let mut engine = ledger_commands::open_ledger(&cli.config)?;
    *codes = engine.config().currencies.clone();

    match (command, cli.command) {
        (Some(command), _) => ledger_commands::run_command(&mut engine, command),
        (None, Commands::History { limit }) => {
            ledger_commands::show_history(&engine, limit);
            Ok(())
        }
        (None, Commands::Exec { commands }) => {
            ledger_commands::run_script(&mut engine, &commands).map(|_| ())
        }
        (None, _) => Err(LedgerError::Internal("command was not dispatched".to_string())),
    }
}
