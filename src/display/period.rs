//! Period display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Period;
use crate::services::SettlementOutcome;

use super::PartyNames;

#[derive(Tabled)]
struct PeriodRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Ended")]
    ended: String,
}

/// Format periods as a table, oldest first
pub fn format_period_list(periods: &[Period], date_format: &str) -> String {
    if periods.is_empty() {
        return "No periods found.\n".to_string();
    }

    let rows = periods.iter().map(|p| PeriodRow {
        id: p.id.to_string(),
        name: p.name.clone(),
        status: p.status.to_string(),
        started: p.start_date.format(date_format).to_string(),
        ended: p
            .end_date
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format what a settlement recorded
pub fn format_settlement_outcome(
    outcome: &SettlementOutcome,
    names: &PartyNames,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Settled period: {}\n", outcome.settled.name));

    if outcome.transfers.is_empty() {
        output.push_str("  No transfers needed.\n");
    } else {
        output.push_str("Transfers:\n");
        for transfer in &outcome.transfers {
            output.push_str(&format!(
                "  {} -> {}: {}\n",
                names.label(transfer.from),
                names.label(transfer.to),
                transfer.amount.format_with_symbol(symbol)
            ));
        }
        output.push_str(&format!(
            "Recorded {} settlement transaction(s)\n",
            outcome.transactions.len()
        ));
    }

    output.push_str(&format!("Opened period:  {}\n", outcome.next.name));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SettlementTransfer;
    use crate::models::{Member, MemberId, Money, Party};

    #[test]
    fn test_format_period_list() {
        let periods = vec![Period::open("January 2025")];
        let formatted = format_period_list(&periods, "%Y-%m-%d");

        assert!(formatted.contains("January 2025"));
        assert!(formatted.contains("open"));
    }

    #[test]
    fn test_format_settlement_outcome() {
        let mut settled = Period::open("January 2025");
        settled.close().unwrap();
        settled.settle(chrono::Utc::now()).unwrap();

        let outcome = SettlementOutcome {
            settled,
            next: Period::open("February 2025"),
            transfers: vec![SettlementTransfer::new(
                Party::PublicFund,
                Party::Member(MemberId::new(1)),
                Money::from_cents(150),
            )],
            transactions: Vec::new(),
        };
        let members = vec![Member::new(MemberId::new(1), "Ana")];

        let formatted =
            format_settlement_outcome(&outcome, &PartyNames::from_members(&members), "$");
        assert!(formatted.contains("public fund -> Ana: $1.50"));
        assert!(formatted.contains("Opened period:  February 2025"));
    }
}
