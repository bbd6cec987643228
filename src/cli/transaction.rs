//! Transaction CLI commands
//!
//! Records expenses, deposits and refunds and moves them through review.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{
    format_split_preview, format_transaction_details, format_transaction_list, PartyNames,
};
use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Party, SplitKind, Transaction};
use crate::services::{
    CategoryService, CreateTransactionInput, EditTransactionInput, PeriodService,
    TransactionFilter, TransactionService,
};
use crate::storage::Storage;

use super::{parse_amount, resolve_party, KindArg, SplitArg, StatusArg};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an expense
    Expense {
        /// Amount (e.g., "10.01" or "10")
        amount: String,
        /// Who paid; not needed for shared expenses
        #[arg(short, long)]
        payer: Option<String>,
        /// How the expense is divided
        #[arg(short, long, value_enum, default_value = "individual")]
        split: SplitArg,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Show the split without recording anything
        #[arg(long)]
        preview: bool,
    },
    /// Record cash paid into the public fund
    Deposit {
        /// Member name or ID
        member: String,
        /// Amount
        amount: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Record cash paid out of the public fund
    Refund {
        /// Member name or ID
        member: String,
        /// Amount
        amount: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List transactions (current period by default)
    List {
        /// Period name or ID
        #[arg(long)]
        period: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Member name or ID, or "fund"
        #[arg(long)]
        payer: Option<String>,
        /// Show at most N transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (full or short)
        id: String,
    },
    /// Edit a draft transaction
    Edit {
        /// Transaction ID
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        payer: Option<String>,
        #[arg(short, long, value_enum)]
        split: Option<SplitArg>,
        #[arg(short, long)]
        category: Option<String>,
        /// Remove the category
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a draft transaction
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Submit a draft for review
    Submit {
        /// Transaction ID
        id: String,
    },
    /// Approve a pending transaction
    Approve {
        /// Transaction ID
        id: String,
    },
    /// Reject a pending transaction
    Reject {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> SplitpotResult<()> {
    let service = TransactionService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();
    let names = PartyNames::from_members(&storage.members.get_all()?);

    match cmd {
        TransactionCommands::Expense {
            amount,
            payer,
            split,
            category,
            description,
            preview,
        } => {
            let amount = parse_amount(&amount)?;
            let split_kind = SplitKind::from(split);
            let payer = match (payer, split_kind) {
                (_, SplitKind::Shared) => Party::PublicFund,
                (Some(payer), _) => resolve_party(storage, &payer)?,
                (None, _) => {
                    return Err(SplitpotError::Validation(
                        "--payer is required unless the expense is shared".into(),
                    ))
                }
            };

            if preview {
                let outcome = service.preview_split(amount, split_kind, payer)?;
                print!("{}", format_split_preview(amount, &outcome, &names, symbol));
                return Ok(());
            }

            let mut input = CreateTransactionInput::expense(amount, payer, split_kind);
            input.description = description;
            if let Some(category) = category {
                input.category_id = Some(CategoryService::new(storage).require(&category)?.id);
            }

            let txn = service.create(input)?;
            print_recorded(&txn, &names, symbol);
        }

        TransactionCommands::Deposit {
            member,
            amount,
            description,
        } => {
            let mut input =
                CreateTransactionInput::deposit(parse_amount(&amount)?, resolve_party(storage, &member)?);
            input.description = description;
            let txn = service.create(input)?;
            print_recorded(&txn, &names, symbol);
        }

        TransactionCommands::Refund {
            member,
            amount,
            description,
        } => {
            let mut input =
                CreateTransactionInput::refund(parse_amount(&amount)?, resolve_party(storage, &member)?);
            input.description = description;
            let txn = service.create(input)?;
            print_recorded(&txn, &names, symbol);
        }

        TransactionCommands::List {
            period,
            status,
            kind,
            payer,
            limit,
        } => {
            let periods = PeriodService::new(storage, settings);
            let period_id = match period {
                Some(period) => Some(periods.resolve(Some(&period))?.id),
                None => periods.current()?.map(|p| p.id),
            };

            let mut filter = TransactionFilter::new();
            filter.period_id = period_id;
            filter.status = status.map(Into::into);
            filter.kind = kind.map(Into::into);
            filter.limit = limit;
            if let Some(payer) = payer {
                filter = filter.payer(resolve_party(storage, &payer)?);
            }

            let transactions = service.list(filter)?;
            print!(
                "{}",
                format_transaction_list(&transactions, &names, symbol, &settings.date_format)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = service.require(&id)?;
            let category = match txn.category_id {
                Some(id) => CategoryService::new(storage).get(id)?.map(|c| c.name),
                None => None,
            };
            print!(
                "{}",
                format_transaction_details(&txn, &names, category.as_deref(), symbol)
            );
        }

        TransactionCommands::Edit {
            id,
            amount,
            payer,
            split,
            category,
            clear_category,
            description,
        } => {
            let txn = service.require(&id)?;

            let mut input = EditTransactionInput {
                description,
                split_kind: split.map(Into::into),
                ..EditTransactionInput::default()
            };
            if let Some(amount) = amount {
                input.amount = Some(parse_amount(&amount)?);
            }
            if let Some(payer) = payer {
                input.payer = Some(resolve_party(storage, &payer)?);
            }
            if let Some(category) = category {
                input.category_id = Some(Some(CategoryService::new(storage).require(&category)?.id));
            } else if clear_category {
                input.category_id = Some(None);
            }

            let updated = service.edit(txn.id, input)?;
            println!("Updated transaction: {}", updated.id);
            if !updated.shares.is_empty() {
                print!(
                    "{}",
                    format_transaction_details(&updated, &names, None, symbol)
                );
            }
        }

        TransactionCommands::Delete { id } => {
            let txn = service.require(&id)?;
            service.delete(txn.id)?;
            println!("Deleted transaction: {}", txn.id);
        }

        TransactionCommands::Submit { id } => {
            let txn = service.submit(service.require(&id)?.id)?;
            println!("Submitted {} for review", txn.id);
        }

        TransactionCommands::Approve { id } => {
            let txn = service.approve(service.require(&id)?.id)?;
            println!("Approved {}", txn.id);
        }

        TransactionCommands::Reject { id } => {
            let txn = service.reject(service.require(&id)?.id)?;
            println!("Rejected {}", txn.id);
        }
    }

    Ok(())
}

fn print_recorded(txn: &Transaction, names: &PartyNames, symbol: &str) {
    println!(
        "Recorded {} of {} ({})",
        txn.kind,
        txn.amount.format_with_symbol(symbol),
        names.label(txn.payer)
    );
    println!("  ID: {}", txn.id);
    println!("  Status: {}", txn.status);
    for share in &txn.shares {
        println!(
            "  {:<20} {:>12}",
            names.member(share.member_id),
            share.amount.format_with_symbol(symbol)
        );
    }
}
