use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use splitpot::cli::{
    handle_audit_command, handle_balance_command, handle_category_command,
    handle_member_command, handle_period_command, handle_plan_command, handle_status_command,
    handle_transaction_command, EntityArg,
};
use splitpot::config::{paths::SplitpotPaths, settings::Settings};
use splitpot::storage::{initialize_storage, needs_initialization, Storage};

#[derive(Parser)]
#[command(
    name = "splitpot",
    version,
    about = "Shared-expense ledger for households and small groups",
    long_about = "splitpot records who paid what for a group, splits expenses to \
                  the exact cent with a fair rotation of leftover cents, tracks a \
                  shared public fund, and settles each period with the fewest \
                  transfers it can."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init,

    /// Show current configuration and paths
    Config,

    /// Show the current period, members and fund cash
    Status,

    /// Member management commands
    #[command(subcommand)]
    Member(splitpot::cli::MemberCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(splitpot::cli::CategoryCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Txn(splitpot::cli::TransactionCommands),

    /// Period lifecycle commands
    #[command(subcommand)]
    Period(splitpot::cli::PeriodCommands),

    /// Show balances for a period
    Balance {
        /// Period name or ID (defaults to the open period)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Preview the settlement transfers for a period
    Plan {
        /// Period name or ID (defaults to the open period)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
        /// Only entries for this kind of entity
        #[arg(short, long, value_enum)]
        entity: Option<EntityArg>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = SplitpotPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    debug!(base_dir = %paths.base_dir().display(), "Resolved paths");

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("splitpot - shared expenses, split fairly");
            println!();
            println!("Run 'splitpot --help' for usage information.");
            println!("Run 'splitpot init' to start a new ledger.");
            return Ok(());
        }
    };

    if needs_initialization(&paths) && !matches!(command, Commands::Init | Commands::Config) {
        bail!("No ledger found at {}. Run 'splitpot init' first.", paths.base_dir().display());
    }

    match command {
        Commands::Init => {
            println!("Initializing splitpot at: {}", paths.base_dir().display());
            initialize_storage(&paths, &settings)?;
            settings.save(&paths)?;
            storage.load_all()?;

            println!("Initialization complete!");
            println!();
            println!("Default categories have been created:");
            for category in storage.categories.get_all()? {
                println!("  - {}", category.name);
            }
            if let Some(period) = storage.periods.get_open()? {
                println!("Current period: {}", period.name);
            }
            println!();
            println!("Add members with 'splitpot member add <name>'.");
        }
        Commands::Config => {
            println!("splitpot Configuration");
            println!("======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Group name:         {}", settings.group_name);
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Date format:        {}", settings.date_format);
            println!("  Period name format: {}", settings.period_name_format);
            println!("  Balance inclusion:  {:?}", settings.balance_inclusion);
        }
        Commands::Status => handle_status_command(&storage, &settings)?,
        Commands::Member(cmd) => handle_member_command(&storage, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Txn(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Period(cmd) => handle_period_command(&storage, &settings, cmd)?,
        Commands::Balance { period } => {
            handle_balance_command(&storage, &settings, period.as_deref())?
        }
        Commands::Plan { period } => handle_plan_command(&storage, &settings, period.as_deref())?,
        Commands::Audit { count, entity } => {
            handle_audit_command(&storage, count, entity.map(Into::into))?
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber, writing to stderr
fn init_logging(verbose: bool) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None if verbose => EnvFilter::new(format!("{}=debug", env!("CARGO_CRATE_NAME"))),
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
