//! Category CLI commands
//!
//! Implements CLI commands for expense category management.

use clap::Subcommand;

use crate::display::format_category_list;
use crate::error::SplitpotResult;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category no transaction uses
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> SplitpotResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let categories = service.list_with_usage()?;
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Create { name } => {
            let category = service.create(&name)?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Rename { category, name } => {
            let cat = service.require(&category)?;
            let renamed = service.rename(cat.id, &name)?;
            println!("Renamed category {} to {}", cat.name, renamed.name);
        }

        CategoryCommands::Delete { category } => {
            let cat = service.require(&category)?;
            service.delete(cat.id)?;
            println!("Deleted category: {}", cat.name);
        }
    }

    Ok(())
}
