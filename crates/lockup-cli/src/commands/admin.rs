// crates/lockup-cli/src/commands/admin.rs
//
// `lockup {mint, import-pool, import-position}`: operator commands.
//
// `mint` is a development faucet on the ledger's token book; it bypasses
// the engine and is how stakers get a balance to stake from.

use serde::Serialize;

use lockup_core::{Address, Amount, Decimal, FungibleToken};

use super::{print_event, Ledger};
use crate::error::CliError;
use crate::output::{emit, FieldRow, OutputFormat};

#[derive(Debug, Serialize)]
struct MintView {
    to: Address,
    amount: Amount,
    balance: Amount,
    total_supply: Amount,
}

pub fn mint(ledger: &Ledger, to: &Address, amount: Amount, format: OutputFormat) -> Result<(), CliError> {
    ledger.token.mint(to, amount)?;
    let view = MintView {
        to: *to,
        amount,
        balance: ledger.token.balance_of(to)?,
        total_supply: ledger.token.total_supply()?,
    };
    tracing::info!(to = %to, amount, supply = view.total_supply, "Minted tokens");
    let rows = vec![
        FieldRow::new("to", view.to),
        FieldRow::new("minted", view.amount),
        FieldRow::new("balance", view.balance),
        FieldRow::new("total supply", view.total_supply),
    ];
    emit(format, &rows, &view);
    Ok(())
}

pub fn import_pool(
    ledger: &Ledger,
    pool: &Address,
    total_value: Amount,
    interest_price: Decimal,
    format: OutputFormat,
) -> Result<(), CliError> {
    let event = ledger
        .engine
        .import_legacy_pool(pool, total_value, interest_price)?;
    print_event(format, &event);
    Ok(())
}

pub fn import_position(
    ledger: &Ledger,
    pool: &Address,
    staker: &Address,
    amount: Amount,
    last_interest_price: Decimal,
    format: OutputFormat,
) -> Result<(), CliError> {
    let event = ledger
        .engine
        .import_legacy_position(pool, staker, amount, last_interest_price)?;
    print_event(format, &event);
    Ok(())
}
