//! Category display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Used by")]
    used_by: usize,
}

/// Format categories with the number of transactions referencing each
pub fn format_category_list(categories: &[(Category, usize)]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    let rows = categories.iter().map(|(category, used_by)| CategoryRow {
        id: category.id.to_string(),
        name: category.name.clone(),
        used_by: *used_by,
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}
