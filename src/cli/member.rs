//! Member CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_member_details, format_member_list};
use crate::error::SplitpotResult;
use crate::services::{BalanceService, MemberService, PeriodService};
use crate::storage::Storage;

/// Member subcommands
#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a new member
    Add {
        /// Member name
        name: String,
    },
    /// List members
    List {
        /// Include inactive members
        #[arg(short, long)]
        all: bool,
    },
    /// Show a member and their balance in the current period
    Show {
        /// Member name or ID
        member: String,
    },
    /// Rename a member
    Rename {
        /// Member name or ID
        member: String,
        /// New name
        name: String,
    },
    /// Exclude a member from new splits
    Deactivate {
        /// Member name or ID
        member: String,
    },
    /// Include a member in new splits again
    Reactivate {
        /// Member name or ID
        member: String,
    },
}

/// Handle a member command
pub fn handle_member_command(
    storage: &Storage,
    settings: &Settings,
    cmd: MemberCommands,
) -> SplitpotResult<()> {
    let service = MemberService::new(storage);

    match cmd {
        MemberCommands::Add { name } => {
            let member = service.add(&name)?;
            println!("Added member: {}", member.name);
            println!("  ID: {}", member.id);
        }

        MemberCommands::List { all } => {
            let members = service.list(all)?;
            print!("{}", format_member_list(&members));
        }

        MemberCommands::Show { member } => {
            let found = service.require(&member)?;
            let balance = match PeriodService::new(storage, settings).current()? {
                Some(period) => BalanceService::new(storage, settings)
                    .compute_balances(period.id)?
                    .member(found.id),
                None => crate::models::Money::zero(),
            };
            print!(
                "{}",
                format_member_details(&found, balance, &settings.currency_symbol)
            );
        }

        MemberCommands::Rename { member, name } => {
            let found = service.require(&member)?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed {} to {}", found.name, renamed.name);
        }

        MemberCommands::Deactivate { member } => {
            let found = service.require(&member)?;
            let member = service.deactivate(found.id)?;
            println!("Deactivated member: {}", member.name);
        }

        MemberCommands::Reactivate { member } => {
            let found = service.require(&member)?;
            let member = service.reactivate(found.id)?;
            println!("Reactivated member: {}", member.name);
        }
    }

    Ok(())
}
