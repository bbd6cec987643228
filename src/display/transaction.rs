//! Transaction display formatting
//!
//! Provides the transaction list, the detail view with per-member shares,
//! and the split preview shown before an expense is recorded.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::ledger::SplitOutcome;
use crate::models::{Money, SplitKind, Transaction, TransactionKind, TransactionStatus};

use super::{truncate, PartyNames};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Payer")]
    payer: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn status_label(txn: &Transaction) -> String {
    let icon = match txn.status {
        TransactionStatus::Draft => "…",
        TransactionStatus::Pending => "?",
        TransactionStatus::Approved => "✓",
        TransactionStatus::Rejected => "✗",
    };
    format!("{} {}", icon, txn.status)
}

fn kind_label(txn: &Transaction) -> String {
    match txn.kind {
        TransactionKind::Expense => format!("expense/{}", txn.split_kind),
        kind if txn.settlement => format!("{} (settle)", kind),
        kind => kind.to_string(),
    }
}

/// Format transactions as a table
pub fn format_transaction_list(
    transactions: &[Transaction],
    names: &PartyNames,
    symbol: &str,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id.to_string(),
        date: txn.created_at.format(date_format).to_string(),
        kind: kind_label(txn),
        payer: names.label(txn.payer),
        amount: txn.amount.format_with_symbol(symbol),
        status: status_label(txn),
        description: truncate(&txn.description, 30),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(4)).with(Alignment::right()));
    format!("{}\n", table)
}

/// Format transaction details, including each member's share
pub fn format_transaction_details(
    txn: &Transaction,
    names: &PartyNames,
    category_name: Option<&str>,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Kind:        {}\n", txn.kind));
    if txn.kind == TransactionKind::Expense {
        output.push_str(&format!("Split:       {}\n", txn.split_kind));
    }
    output.push_str(&format!("Amount:      {}\n", txn.amount.format_with_symbol(symbol)));
    output.push_str(&format!("Payer:       {}\n", names.label(txn.payer)));
    output.push_str(&format!("Status:      {}\n", txn.status));

    if let Some(name) = category_name {
        output.push_str(&format!("Category:    {}\n", name));
    }
    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }
    if txn.settlement {
        output.push_str("Origin:      settlement\n");
    }
    output.push_str(&format!(
        "Created:     {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M")
    ));

    if txn.split_kind == SplitKind::Shared && txn.kind == TransactionKind::Expense {
        output.push_str(&format!(
            "Fund paid:   {}\n",
            txn.fund_covered.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Fronted:     {}\n",
            txn.fronted().format_with_symbol(symbol)
        ));
    }

    if !txn.shares.is_empty() {
        output.push_str("\nShares:\n");
        for share in &txn.shares {
            let marker = if txn.remainder_recipients.contains(&share.member_id) {
                " (+1 remainder)"
            } else {
                ""
            };
            output.push_str(&format!(
                "  {:<20} {:>12}{}\n",
                names.member(share.member_id),
                share.amount.format_with_symbol(symbol),
                marker
            ));
        }
    }

    output
}

/// Format the shares an expense would get
pub fn format_split_preview(
    amount: Money,
    outcome: &SplitOutcome,
    names: &PartyNames,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Split of {} paid by {}\n",
        amount.format_with_symbol(symbol),
        names.label(outcome.payer)
    ));

    for share in &outcome.shares {
        output.push_str(&format!(
            "  {:<20} {:>12}\n",
            names.member(share.member_id),
            share.amount.format_with_symbol(symbol)
        ));
    }

    if let Some(rotation) = &outcome.rotation {
        let recipients: Vec<String> = rotation
            .recipients
            .iter()
            .map(|id| names.member(*id))
            .collect();
        output.push_str(&format!("Remainder cents to: {}\n", recipients.join(", ")));
    }

    if outcome.payer.is_fund() {
        output.push_str(&format!(
            "Fund pays {} from cash, fronts {}\n",
            outcome.fund_covered.format_with_symbol(symbol),
            (amount - outcome.fund_covered).format_with_symbol(symbol)
        ));
    }

    output
}
