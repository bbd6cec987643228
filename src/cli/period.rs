//! Period CLI commands
//!
//! Close, reopen, rename and settle accounting periods.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_period_list, format_period_summary, format_settlement_outcome, PartyNames};
use crate::error::SplitpotResult;
use crate::services::{BalanceService, PeriodService};
use crate::storage::Storage;

/// Period subcommands
#[derive(Subcommand)]
pub enum PeriodCommands {
    /// Show the open period
    Current,
    /// List all periods
    List,
    /// Stop accepting new transactions
    Close {
        /// Period name or ID (defaults to the open period)
        period: Option<String>,
    },
    /// Reopen a closed period
    Reopen {
        /// Period name or ID
        period: String,
    },
    /// Rename an open or closed period
    Rename {
        /// Period name or ID
        period: String,
        /// New name
        name: String,
    },
    /// Settle a closed period and open the next one
    Settle {
        /// Period name or ID
        period: String,
        /// Name for the next period (defaults to the configured format)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show totals for a period
    Summary {
        /// Period name or ID (defaults to the open period)
        period: Option<String>,
    },
}

/// Handle a period command
pub fn handle_period_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PeriodCommands,
) -> SplitpotResult<()> {
    let service = PeriodService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        PeriodCommands::Current => match service.current()? {
            Some(period) => {
                println!("Current period: {}", period.name);
                println!("  ID:      {}", period.id);
                println!("  Started: {}", period.start_date.format(&settings.date_format));
            }
            None => {
                println!("No period is open.");
                println!("Settle or reopen a period with 'splitpot period settle|reopen'.");
            }
        },

        PeriodCommands::List => {
            let periods = service.list()?;
            print!("{}", format_period_list(&periods, &settings.date_format));
        }

        PeriodCommands::Close { period } => {
            let found = service.resolve(period.as_deref())?;
            let closed = service.close(found.id)?;
            println!("Closed period: {}", closed.name);
            println!("Run 'splitpot plan' to preview the settlement.");
        }

        PeriodCommands::Reopen { period } => {
            let found = service.resolve(Some(&period))?;
            let reopened = service.reopen(found.id)?;
            println!("Reopened period: {}", reopened.name);
        }

        PeriodCommands::Rename { period, name } => {
            let found = service.resolve(Some(&period))?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed {} to {}", found.name, renamed.name);
        }

        PeriodCommands::Settle { period, name } => {
            let found = service.resolve(Some(&period))?;
            let outcome = service.settle(found.id, name.as_deref())?;
            let names = PartyNames::from_members(&storage.members.get_all()?);
            print!("{}", format_settlement_outcome(&outcome, &names, symbol));
        }

        PeriodCommands::Summary { period } => {
            let found = service.resolve(period.as_deref())?;
            let summary = BalanceService::new(storage, settings).period_summary(found.id)?;
            print!("{}", format_period_summary(&found, &summary, symbol));
        }
    }

    Ok(())
}
