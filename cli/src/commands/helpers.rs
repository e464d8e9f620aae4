use anyhow::{Result, bail};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vibefood_core::models::{Food, Ingredient};
use vibefood_core::store::{CatalogSource, PivotStore};
use vibefood_core::table::{Durability, EditOutcome, IngredientTableModel, Role};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

pub(crate) fn json_error(msg: &str) -> String {
    #[derive(Serialize)]
    struct ErrorResponse<'a> {
        error: &'a str,
    }
    serde_json::to_string(&ErrorResponse { error: msg })
        .unwrap_or_else(|_| format!(r#"{{"error":"{msg}"}}"#))
}

/// Turns an edit outcome into a command result.
pub(crate) fn require_durable(outcome: EditOutcome) -> Result<()> {
    match outcome {
        EditOutcome::Applied(Durability::Persisted) => Ok(()),
        EditOutcome::Applied(Durability::Skipped) => bail!("No food selected; change not saved"),
        EditOutcome::Applied(Durability::Failed(msg)) => bail!("Change not saved: {msg}"),
        EditOutcome::Rejected(reason) => bail!("{reason}"),
    }
}

pub(crate) fn print_food_table(foods: &[Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Recipe")]
        recipe: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            id: f.id,
            name: truncate(&f.name, 35),
            recipe: f
                .recipe
                .as_deref()
                .map(|r| truncate(r.lines().next().unwrap_or_default(), 40))
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Ingredient")]
        name: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            id: i.id,
            name: truncate(&i.name, 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

/// Renders every cell of an ingredient table model, headers first.
pub(crate) fn render_model<C: CatalogSource, P: PivotStore>(
    model: &IngredientTableModel<C, P>,
) -> String {
    let mut builder = Builder::default();
    builder.push_record((0..model.column_count()).map(|c| model.header_data(c).unwrap_or_default()));
    for row in 0..model.row_count() {
        builder.push_record((0..model.column_count()).map(|column| {
            let check = model.data(row, column, Role::CheckState);
            if check.is_null() {
                model.data(row, column, Role::Display).to_string()
            } else {
                check.to_string()
            }
        }));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
