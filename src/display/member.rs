//! Member display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Member, Money};

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Remainder")]
    remainder: &'static str,
}

/// Format members as a table
pub fn format_member_list(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.\n".to_string();
    }

    let rows = members.iter().map(|m| MemberRow {
        id: m.id.to_string(),
        name: m.name.clone(),
        status: if m.active { "active" } else { "inactive" },
        remainder: if m.paid_remainder_in_cycle { "paid" } else { "" },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single member's details with their balance in a period
pub fn format_member_details(member: &Member, balance: Money, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Member: {}\n", member.name));
    output.push_str(&format!("  ID:        {}\n", member.id));
    output.push_str(&format!(
        "  Status:    {}\n",
        if member.active { "active" } else { "inactive" }
    ));
    output.push_str(&format!(
        "  Remainder: {}\n",
        if member.paid_remainder_in_cycle {
            "paid this cycle"
        } else {
            "not yet this cycle"
        }
    ));
    output.push_str(&format!("  Balance:   {}\n", balance.format_signed(symbol)));

    output
}
