//! Balance, plan, status and audit commands

use crate::audit::EntityType;
use crate::config::settings::Settings;
use crate::display::{format_balances, format_settlement_plan, format_status, PartyNames};
use crate::error::SplitpotResult;
use crate::services::{BalanceService, PeriodService};
use crate::storage::Storage;

/// Show every party's balance in a period
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    period: Option<&str>,
) -> SplitpotResult<()> {
    let period = PeriodService::new(storage, settings).resolve(period)?;
    let balances = BalanceService::new(storage, settings).compute_balances(period.id)?;
    let names = PartyNames::from_members(&storage.members.get_all()?);

    println!("Balances for {}", period);
    print!(
        "{}",
        format_balances(&balances, &names, &settings.currency_symbol)
    );
    Ok(())
}

/// Show the transfers that would settle a period, without recording them
pub fn handle_plan_command(
    storage: &Storage,
    settings: &Settings,
    period: Option<&str>,
) -> SplitpotResult<()> {
    let period = PeriodService::new(storage, settings).resolve(period)?;
    let plan = BalanceService::new(storage, settings).compute_settlement_plan(period.id)?;
    let names = PartyNames::from_members(&storage.members.get_all()?);

    println!("Settlement plan for {}", period);
    print!(
        "{}",
        format_settlement_plan(&plan, &names, &settings.currency_symbol)
    );
    Ok(())
}

/// Show the current period, members and fund cash
pub fn handle_status_command(storage: &Storage, settings: &Settings) -> SplitpotResult<()> {
    let report = BalanceService::new(storage, settings).status_report()?;
    print!(
        "{}",
        format_status(&report, &settings.group_name, &settings.currency_symbol)
    );
    Ok(())
}

/// Print the most recent audit entries, optionally for one entity type
pub fn handle_audit_command(
    storage: &Storage,
    count: usize,
    entity: Option<EntityType>,
) -> SplitpotResult<()> {
    let entries: Vec<_> = storage
        .audit()
        .read_all()?
        .into_iter()
        .filter(|e| entity.map_or(true, |t| e.entity_type == t))
        .collect();

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    let start = entries.len().saturating_sub(count);
    for entry in &entries[start..] {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
