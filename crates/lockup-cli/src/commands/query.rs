// crates/lockup-cli/src/commands/query.rs
//
// `lockup {position, pool, totals, emission}`: read-only views evaluated at
// the clock's block.

use serde::Serialize;
use tabled::Tabled;

use lockup_core::{Address, Amount, Decimal, LedgerView, PoolKey, PositionStatus, TimeIndex};
use lockup_economics::token::format_units;

use super::Ledger;
use crate::error::CliError;
use crate::output::{emit, FieldRow, OutputFormat};

fn block_label(block: Option<TimeIndex>) -> String {
    block.map_or_else(|| "-".to_string(), |b| b.to_string())
}

fn amount_label(amount: Amount) -> String {
    format!("{} ({} tokens)", amount, format_units(amount))
}

#[derive(Debug, Serialize)]
struct PositionView {
    pool: Address,
    staker: Address,
    block: TimeIndex,
    status: PositionStatus,
    amount: Amount,
    pending_withdrawal: Amount,
    withdrawable: Amount,
    withdrawal_ready_at: Option<TimeIndex>,
    checkpoint_block: Option<TimeIndex>,
}

pub fn position(ledger: &Ledger, pool: &Address, staker: &Address, format: OutputFormat) -> Result<(), CliError> {
    let record = ledger.engine.position(pool, staker)?;
    let view = PositionView {
        pool: *pool,
        staker: *staker,
        block: ledger.clock_block(),
        status: record.status(),
        amount: record.amount,
        pending_withdrawal: record.pending_withdrawal,
        withdrawable: ledger.engine.withdrawable_amount(pool, staker)?,
        withdrawal_ready_at: record.withdrawal_ready_at,
        checkpoint_block: record.checkpoint_block,
    };
    let rows = vec![
        FieldRow::new("pool", view.pool),
        FieldRow::new("staker", view.staker),
        FieldRow::new("block", view.block),
        FieldRow::new("status", view.status),
        FieldRow::new("staked", amount_label(view.amount)),
        FieldRow::new("pending", amount_label(view.pending_withdrawal)),
        FieldRow::new("withdrawable", amount_label(view.withdrawable)),
        FieldRow::new("releasable at", block_label(view.withdrawal_ready_at)),
        FieldRow::new("last settled", block_label(view.checkpoint_block)),
    ];
    emit(format, &rows, &view);
    Ok(())
}

#[derive(Debug, Serialize)]
struct PoolView {
    pool: Address,
    block: TimeIndex,
    total_staked: Amount,
    cumulative_stake_area: Amount,
    last_block: TimeIndex,
    holders_reward: Amount,
    legacy_total_value: Amount,
    legacy_interest_price: Decimal,
    legacy_imported_value: Amount,
}

pub fn pool(ledger: &Ledger, pool: &Address, format: OutputFormat) -> Result<(), CliError> {
    let area = ledger.engine.cumulative_stake_area(&PoolKey::Pool(*pool))?;
    let entry = ledger.engine.store().pool(&PoolKey::Pool(*pool))?;
    let view = PoolView {
        pool: *pool,
        block: ledger.clock_block(),
        total_staked: area.unit,
        cumulative_stake_area: area.area,
        last_block: area.last_block,
        holders_reward: ledger.engine.cumulative_holders_reward(pool)?,
        legacy_total_value: entry.legacy_total_value,
        legacy_interest_price: entry.legacy_interest_price,
        legacy_imported_value: entry.legacy_imported_value,
    };
    let rows = vec![
        FieldRow::new("pool", view.pool),
        FieldRow::new("block", view.block),
        FieldRow::new("staked", amount_label(view.total_staked)),
        FieldRow::new("stake area", view.cumulative_stake_area),
        FieldRow::new("last change", view.last_block),
        FieldRow::new("holders reward", amount_label(view.holders_reward)),
        FieldRow::new("legacy total", view.legacy_total_value),
        FieldRow::new("legacy price", view.legacy_interest_price),
        FieldRow::new("legacy imported", view.legacy_imported_value),
    ];
    emit(format, &rows, &view);
    Ok(())
}

/// A row in the totals table.
#[derive(Debug, Serialize, Tabled)]
struct TotalRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Staked")]
    staked: Amount,
    #[tabled(rename = "Stake Area")]
    area: Amount,
}

pub fn totals(ledger: &Ledger, pools: &[Address], format: OutputFormat) -> Result<(), CliError> {
    let mut rows = Vec::with_capacity(pools.len() + 1);
    for pool in pools {
        let area = ledger.engine.cumulative_stake_area(&PoolKey::Pool(*pool))?;
        rows.push(TotalRow {
            pool: pool.to_string(),
            staked: area.unit,
            area: area.area,
        });
    }
    let all = ledger.engine.cumulative_stake_area(&PoolKey::All)?;
    rows.push(TotalRow {
        pool: PoolKey::All.to_string(),
        staked: all.unit,
        area: all.area,
    });
    emit(format, &rows, &rows);
    Ok(())
}

#[derive(Debug, Serialize)]
struct EmissionView {
    block: TimeIndex,
    cumulative_emission: Amount,
    last_emission_rate: Amount,
    last_emission_block: Option<TimeIndex>,
    projected_emission: Amount,
    policy_rate: Amount,
}

pub fn emission(ledger: &Ledger, format: OutputFormat) -> Result<(), CliError> {
    let state = ledger.engine.emission_state()?;
    let projected = ledger.engine.projected_emission()?;
    let view = EmissionView {
        block: ledger.clock_block(),
        cumulative_emission: state.cumulative_emission,
        last_emission_rate: state.last_emission_rate,
        last_emission_block: state.last_emission_block,
        projected_emission: projected.next_cumulative,
        policy_rate: projected.current_rate,
    };
    let rows = vec![
        FieldRow::new("block", view.block),
        FieldRow::new("committed emission", amount_label(view.cumulative_emission)),
        FieldRow::new("committed rate", view.last_emission_rate),
        FieldRow::new("committed at", block_label(view.last_emission_block)),
        FieldRow::new("emission now", amount_label(view.projected_emission)),
        FieldRow::new("policy rate", view.policy_rate),
    ];
    emit(format, &rows, &view);
    Ok(())
}
