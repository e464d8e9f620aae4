use anyhow::{Context, Result, bail};
use serde::Serialize;

use vibefood_core::models::{Food, FoodContext, Ingredient};
use vibefood_core::service::{IngredientTable, VibefoodService};
use vibefood_core::store::CatalogSource;
use vibefood_core::table::ColumnLayout;

use super::helpers::{render_model, require_durable};

#[derive(Debug, Serialize)]
struct TableRow {
    id: i64,
    name: String,
    checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
}

fn open_table<'a>(svc: &'a VibefoodService, food: &Food) -> Result<IngredientTable<'a>> {
    let table = svc.ingredient_table(FoodContext::food(food.id), None, ColumnLayout::default())?;
    svc.remember_food(table.context())?;
    Ok(table)
}

/// Checks `ingredient` for `food`, then stores the amount when one is given.
fn use_ingredient(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
    amount: Option<&str>,
) -> Result<(Food, Ingredient)> {
    let food = svc.resolve_food(food_query)?;
    let ingredient = svc.resolve_ingredient(ingredient_query)?;
    let mut table = open_table(svc, &food)?;

    require_durable(table.set_checked_by_id(ingredient.id, true))?;
    if let Some(amount) = amount {
        require_durable(table.set_amount_by_id(ingredient.id, amount))?;
    }
    Ok((food, ingredient))
}

fn unuse_ingredient(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
) -> Result<(Food, Ingredient, bool)> {
    let food = svc.resolve_food(food_query)?;
    let ingredient = svc.resolve_ingredient(ingredient_query)?;
    let mut table = open_table(svc, &food)?;

    let was_used = table.is_checked(ingredient.id);
    require_durable(table.set_checked_by_id(ingredient.id, false))?;
    Ok((food, ingredient, was_used))
}

fn amend_amount(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
    amount: &str,
) -> Result<(Food, Ingredient)> {
    let food = svc.resolve_food(food_query)?;
    let ingredient = svc.resolve_ingredient(ingredient_query)?;
    let mut table = open_table(svc, &food)?;

    if !table.is_checked(ingredient.id) {
        let food_name = &food.name;
        let ingredient_name = &ingredient.name;
        bail!(
            "{food_name} does not use {ingredient_name}. Add it first with: vibefood use \"{food_name}\" \"{ingredient_name}\""
        );
    }
    require_durable(table.set_amount_by_id(ingredient.id, amount))?;
    Ok((food, ingredient))
}

pub(crate) fn cmd_use(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
    amount: Option<&str>,
    json: bool,
) -> Result<()> {
    let (food, ingredient) = use_ingredient(svc, food_query, ingredient_query, amount)?;
    if json {
        let detail = svc.food_detail(food.id)?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        let food_name = &food.name;
        let ingredient_name = &ingredient.name;
        match amount {
            Some(amount) => println!("{food_name} uses {amount} of {ingredient_name}"),
            None => println!("{food_name} uses {ingredient_name}"),
        }
    }
    Ok(())
}

pub(crate) fn cmd_unuse(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
    json: bool,
) -> Result<()> {
    let (food, ingredient, was_used) = unuse_ingredient(svc, food_query, ingredient_query)?;
    if json {
        let detail = svc.food_detail(food.id)?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        let food_name = &food.name;
        let ingredient_name = &ingredient.name;
        if was_used {
            println!("Removed {ingredient_name} from {food_name}");
        } else {
            println!("{food_name} did not use {ingredient_name}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_amount(
    svc: &VibefoodService,
    food_query: &str,
    ingredient_query: &str,
    amount: &str,
    json: bool,
) -> Result<()> {
    let (food, ingredient) = amend_amount(svc, food_query, ingredient_query, amount)?;
    if json {
        let detail = svc.food_detail(food.id)?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        let food_name = &food.name;
        let ingredient_name = &ingredient.name;
        let amount = amount.trim();
        if amount.is_empty() {
            println!("Cleared amount of {ingredient_name} in {food_name}");
        } else {
            println!("{food_name} uses {amount} of {ingredient_name}");
        }
    }
    Ok(())
}

fn table_rows(table: &IngredientTable<'_>) -> Vec<TableRow> {
    let with_amount = table.layout().amount_column;
    table
        .catalog()
        .rows()
        .iter()
        .map(|ingredient| TableRow {
            id: ingredient.id,
            name: ingredient.name.clone(),
            checked: table.is_checked(ingredient.id),
            amount: with_amount.then(|| table.amount(ingredient.id).to_string()),
        })
        .collect()
}

/// Shows the full ingredient catalog marked up for one food.
pub(crate) fn cmd_table(
    svc: &VibefoodService,
    food_query: Option<&str>,
    filter: Option<&str>,
    compact: bool,
    json: bool,
) -> Result<()> {
    let context = match food_query {
        Some(query) => FoodContext::food(svc.resolve_food(query)?.id),
        None => svc.last_food()?,
    };
    let layout = if compact {
        ColumnLayout::CHECK_ONLY
    } else {
        ColumnLayout::default()
    };
    let table = svc.ingredient_table(context, filter, layout)?;
    svc.remember_food(context)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table_rows(&table))?);
        return Ok(());
    }

    match context.food_id() {
        Some(id) => {
            let food = svc.db().get_food_by_id(id).context("Selected food no longer exists")?;
            let name = &food.name;
            let used = table.checked_ids().len();
            println!("{name} (id: {id}, {used} ingredients)");
        }
        None => println!("No food selected. Pass a food to mark its ingredients."),
    }
    if table.catalog().row_count() == 0 {
        println!("No ingredients match");
        return Ok(());
    }
    println!("{}", render_model(&table));
    Ok(())
}
