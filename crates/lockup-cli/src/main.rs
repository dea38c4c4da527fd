// crates/lockup-cli/src/main.rs
//
// CLI entrypoint for the Lockup staking ledger.
//
// Every invocation opens the ledger database, runs one operation or query at
// the block given by `--block` (default: the last committed block), prints
// the result, and exits. Mutations are serialized by the database lock.

mod commands;
mod config;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::lifecycle::PositionArgs;
use config::LockupConfig;
use error::CliError;
use lockup_core::{Address, Amount, Decimal, TimeIndex};
use output::OutputFormat;

/// Lockup: stake tokens against registered pools and accrue interest.
#[derive(Parser, Debug)]
#[command(
    name = "lockup",
    version = "0.1.0",
    about = "Lockup staking ledger: stake, cancel, release, and withdraw pool interest"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.lockup/config.toml")]
    config: String,

    /// Block height to run at. Defaults to the last committed block.
    #[arg(long, global = true)]
    block: Option<TimeIndex>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Lock tokens against a pool.
    Stake {
        #[command(flatten)]
        position: PositionArgs,
        /// Amount in base units.
        #[arg(long)]
        amount: Amount,
    },

    /// Start the lockup period on a stake.
    Cancel(PositionArgs),

    /// Return a cancelled stake after its lockup has elapsed.
    Release(PositionArgs),

    /// Mint all accrued interest to the staker.
    WithdrawInterest(PositionArgs),

    /// Commit the emission curve at the current block.
    RefreshEmission,

    /// Credit tokens to an address (development faucet).
    Mint {
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: Amount,
    },

    /// Show a staker's position and withdrawable interest.
    Position(PositionArgs),

    /// Show a pool's stake and reward accounting.
    Pool {
        #[arg(long)]
        pool: Address,
    },

    /// Show staked totals for every registered pool and the aggregate.
    Totals,

    /// Show the emission curve.
    Emission,

    /// Import a pool from the price-per-unit model.
    ImportPool {
        #[arg(long)]
        pool: Address,
        /// Total staked in the pool under the legacy model.
        #[arg(long)]
        total_value: Amount,
        /// Legacy interest price per staked unit, e.g. "0.25".
        #[arg(long)]
        interest_price: Decimal,
    },

    /// Import a staker's position from the price-per-unit model.
    ImportPosition {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long)]
        amount: Amount,
        /// Interest price the staker last settled at.
        #[arg(long)]
        last_interest_price: Decimal,
    },
}

fn run(cli: &Cli, config: &LockupConfig) -> Result<(), CliError> {
    let format = OutputFormat::from_json_flag(cli.json);
    let ledger = commands::open(config, cli.block)?;

    match &cli.command {
        Commands::Stake { position, amount } => commands::lifecycle::stake(&ledger, position, *amount, format),
        Commands::Cancel(position) => commands::lifecycle::cancel(&ledger, position, format),
        Commands::Release(position) => commands::lifecycle::release(&ledger, position, format),
        Commands::WithdrawInterest(position) => commands::lifecycle::withdraw_interest(&ledger, position, format),
        Commands::RefreshEmission => commands::lifecycle::refresh_emission(&ledger, format),
        Commands::Mint { to, amount } => commands::admin::mint(&ledger, to, *amount, format),
        Commands::Position(position) => {
            commands::query::position(&ledger, &position.pool, &position.staker, format)
        }
        Commands::Pool { pool } => commands::query::pool(&ledger, pool, format),
        Commands::Totals => commands::query::totals(&ledger, &config.registered_pools, format),
        Commands::Emission => commands::query::emission(&ledger, format),
        Commands::ImportPool {
            pool,
            total_value,
            interest_price,
        } => commands::admin::import_pool(&ledger, pool, *total_value, *interest_price, format),
        Commands::ImportPosition {
            position,
            amount,
            last_interest_price,
        } => commands::admin::import_position(
            &ledger,
            &position.pool,
            &position.staker,
            *amount,
            *last_interest_price,
            format,
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    let loaded = LockupConfig::load(&cli.config);

    // Initialize tracing on stderr so JSON output on stdout stays clean.
    // RUST_LOG wins over the configured level.
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::debug!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            tracing::warn!("Could not load config from {}: {}. Using defaults.", cli.config, e);
            LockupConfig::default()
        }
    };

    if let Err(e) = run(&cli, &config) {
        tracing::warn!(code = e.code(), "Operation rejected: {}", e);
        eprintln!("error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}
