// crates/lockup-cli/src/commands/lifecycle.rs
//
// `lockup {stake, cancel, release, withdraw-interest, refresh-emission}`:
// the mutating ledger operations. Each prints the committed event.

use clap::Args;

use lockup_core::{Address, Amount};

use super::{print_event, Ledger};
use crate::error::CliError;
use crate::output::OutputFormat;

/// Identifies one staker's position in one pool.
#[derive(Args, Debug, Clone)]
pub struct PositionArgs {
    /// Pool address (hex).
    #[arg(long)]
    pub pool: Address,
    /// Staker address (hex).
    #[arg(long)]
    pub staker: Address,
}

pub fn stake(ledger: &Ledger, position: &PositionArgs, amount: Amount, format: OutputFormat) -> Result<(), CliError> {
    let event = ledger.engine.stake(&position.pool, &position.staker, amount)?;
    print_event(format, &event);
    Ok(())
}

pub fn cancel(ledger: &Ledger, position: &PositionArgs, format: OutputFormat) -> Result<(), CliError> {
    let event = ledger.engine.cancel(&position.pool, &position.staker)?;
    print_event(format, &event);
    Ok(())
}

pub fn release(ledger: &Ledger, position: &PositionArgs, format: OutputFormat) -> Result<(), CliError> {
    let event = ledger
        .engine
        .release_and_withdraw(&position.pool, &position.staker)?;
    print_event(format, &event);
    Ok(())
}

pub fn withdraw_interest(ledger: &Ledger, position: &PositionArgs, format: OutputFormat) -> Result<(), CliError> {
    let event = ledger
        .engine
        .withdraw_interest(&position.pool, &position.staker)?;
    print_event(format, &event);
    Ok(())
}

pub fn refresh_emission(ledger: &Ledger, format: OutputFormat) -> Result<(), CliError> {
    let event = ledger.engine.refresh_emission()?;
    print_event(format, &event);
    Ok(())
}
