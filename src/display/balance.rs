//! Balance, settlement plan, summary and status formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::ledger::{Balances, SettlementTransfer};
use crate::models::{Money, Period};
use crate::services::{PeriodSummary, StatusReport};

use super::PartyNames;

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Party")]
    party: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "")]
    note: &'static str,
}

#[derive(Tabled)]
struct TransferRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format every party's balance; positive is owed, negative owes
pub fn format_balances(balances: &Balances, names: &PartyNames, symbol: &str) -> String {
    let rows = balances.iter().map(|(party, amount)| BalanceRow {
        party: names.label(party),
        balance: amount.format_signed(symbol),
        note: if amount.is_positive() {
            "is owed"
        } else if amount.is_negative() {
            "owes"
        } else {
            ""
        },
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()));

    let mut output = format!("{}\n", table);
    output.push_str(&format!(
        "Fund cash on hand: {}\n",
        balances.fund_available().format_with_symbol(symbol)
    ));
    output
}

/// Format the transfers that would settle a period
pub fn format_settlement_plan(
    transfers: &[SettlementTransfer],
    names: &PartyNames,
    symbol: &str,
) -> String {
    if transfers.is_empty() {
        return "Nothing to settle: every balance is zero.\n".to_string();
    }

    let rows = transfers.iter().map(|t| TransferRow {
        from: names.label(t.from),
        to: names.label(t.to),
        amount: t.amount.format_with_symbol(symbol),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()));

    let total: Money = transfers.iter().map(|t| t.amount).sum();
    format!(
        "{}\n{} transfer(s), {} in total\n",
        table,
        transfers.len(),
        total.format_with_symbol(symbol)
    )
}

/// Format the totals of a period
pub fn format_period_summary(period: &Period, summary: &PeriodSummary, symbol: &str) -> String {
    let money = |m: Money| m.format_with_symbol(symbol);
    let mut output = String::new();

    output.push_str(&format!("Period: {} ({})\n", period.name, period.status));
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&format!("Individual expenses: {:>14}\n", money(summary.individual_expenses)));
    output.push_str(&format!("Shared expenses:     {:>14}\n", money(summary.shared_expenses)));
    output.push_str(&format!("  paid from fund:    {:>14}\n", money(summary.fund_covered)));
    output.push_str(&format!("  fronted by fund:   {:>14}\n", money(summary.fronted)));
    output.push_str(&format!("Personal expenses:   {:>14}\n", money(summary.personal_expenses)));
    output.push_str(&format!("Total expenses:      {:>14}\n", money(summary.total_expenses())));
    output.push_str(&format!("Deposits:            {:>14}\n", money(summary.deposits)));
    output.push_str(&format!("Refunds:             {:>14}\n", money(summary.refunds)));
    if !summary.settlement_volume.is_zero() {
        output.push_str(&format!(
            "Settlement payments: {:>14}\n",
            money(summary.settlement_volume)
        ));
    }
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&format!(
        "Transactions: {} ({} draft, {} pending, {} approved, {} rejected)\n",
        summary.transaction_count(),
        summary.draft,
        summary.pending,
        summary.approved,
        summary.rejected
    ));

    output
}

/// Format the overview shown by `splitpot status`
pub fn format_status(report: &StatusReport, group_name: &str, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", group_name));
    output.push_str(&"=".repeat(group_name.chars().count().max(8)));
    output.push('\n');

    match &report.period {
        Some(period) => output.push_str(&format!(
            "Current period:  {} (since {})\n",
            period.name,
            period.start_date.format("%Y-%m-%d")
        )),
        None => output.push_str("Current period:  none open\n"),
    }

    let active = report.members.iter().filter(|m| m.active).count();
    output.push_str(&format!(
        "Members:         {} active, {} total\n",
        active,
        report.members.len()
    ));
    output.push_str(&format!(
        "Fund cash:       {}\n",
        report.fund_available.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Awaiting review: {}\n", report.awaiting_review));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Member, MemberId, Party};

    fn names() -> PartyNames {
        let members = vec![
            Member::new(MemberId::new(1), "Ana"),
            Member::new(MemberId::new(2), "Bo"),
        ];
        PartyNames::from_members(&members)
    }

    #[test]
    fn test_format_balances() {
        let balances: Balances = vec![
            (Party::Member(MemberId::new(1)), Money::from_cents(500)),
            (Party::Member(MemberId::new(2)), Money::from_cents(-300)),
            (Party::PublicFund, Money::from_cents(-200)),
        ]
        .into_iter()
        .collect();

        let formatted = format_balances(&balances, &names(), "$");
        assert!(formatted.contains("+$5.00"));
        assert!(formatted.contains("-$3.00"));
        assert!(formatted.contains("public fund"));
        assert!(formatted.contains("Fund cash on hand: $2.00"));
    }

    #[test]
    fn test_format_settlement_plan() {
        let transfers = vec![SettlementTransfer::new(
            Party::Member(MemberId::new(2)),
            Party::Member(MemberId::new(1)),
            Money::from_cents(300),
        )];

        let formatted = format_settlement_plan(&transfers, &names(), "$");
        assert!(formatted.contains("Bo"));
        assert!(formatted.contains("1 transfer(s), $3.00 in total"));
    }

    #[test]
    fn test_format_empty_plan() {
        let formatted = format_settlement_plan(&[], &names(), "$");
        assert!(formatted.contains("Nothing to settle"));
    }

    #[test]
    fn test_format_period_summary() {
        let period = Period::open("March 2025");
        let summary = PeriodSummary {
            shared_expenses: Money::from_cents(900),
            fund_covered: Money::from_cents(600),
            fronted: Money::from_cents(300),
            approved: 1,
            ..PeriodSummary::default()
        };

        let formatted = format_period_summary(&period, &summary, "$");
        assert!(formatted.contains("Period: March 2025 (open)"));
        assert!(formatted.contains("$6.00"));
        assert!(formatted.contains("1 approved"));
        assert!(!formatted.contains("Settlement payments"));
    }
}
