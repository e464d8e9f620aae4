use anyhow::Result;
use std::process;

use vibefood_core::models::FoodContext;
use vibefood_core::service::VibefoodService;

use super::helpers::{json_error, print_food_table};

pub(crate) fn cmd_food_list(svc: &VibefoodService, search: Option<&str>, json: bool) -> Result<()> {
    let foods = svc.list_foods(search)?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
    }
    Ok(())
}

pub(crate) fn cmd_food_add(
    svc: &VibefoodService,
    name: &str,
    recipe: Option<&str>,
    json: bool,
) -> Result<()> {
    let food = svc.add_food(name, recipe)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let id = food.id;
        println!("Added food: {name} (id: {id})");
        println!("Pick its ingredients with: vibefood use \"{name}\" <ingredient>");
    }
    Ok(())
}

pub(crate) fn cmd_food_show(svc: &VibefoodService, query: &str, json: bool) -> Result<()> {
    let food = svc.resolve_food(query)?;
    let detail = svc.food_detail(food.id)?;
    svc.remember_food(FoodContext::food(food.id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let name = &detail.name;
    let id = detail.id;
    println!("{name} (id: {id})");
    println!();
    if detail.ingredients.is_empty() {
        println!("  No ingredients yet");
    } else {
        for ingredient in &detail.ingredients {
            let ingredient_name = &ingredient.name;
            if ingredient.amount.is_empty() {
                println!("  - {ingredient_name}");
            } else {
                let amount = &ingredient.amount;
                println!("  - {ingredient_name}: {amount}");
            }
        }
    }
    if let Some(recipe) = &detail.recipe {
        println!();
        println!("Recipe:");
        for line in recipe.lines() {
            println!("  {line}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_food_rename(
    svc: &VibefoodService,
    query: &str,
    new_name: &str,
    json: bool,
) -> Result<()> {
    let food = svc.resolve_food(query)?;
    let renamed = svc.rename_food(food.id, new_name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&renamed)?);
    } else {
        let old = &food.name;
        let new = &renamed.name;
        println!("Renamed {old} to {new}");
    }
    Ok(())
}

pub(crate) fn cmd_food_recipe(
    svc: &VibefoodService,
    query: &str,
    recipe: Option<&str>,
    json: bool,
) -> Result<()> {
    let food = svc.resolve_food(query)?;
    let updated = svc.set_recipe(food.id, recipe)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else if updated.recipe.is_some() {
        let name = &updated.name;
        println!("Updated recipe for {name}");
    } else {
        let name = &updated.name;
        println!("Cleared recipe for {name}");
    }
    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &VibefoodService, query: &str, json: bool) -> Result<()> {
    let food = svc.resolve_food(query)?;
    if svc.delete_food(food.id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": food.id }));
        } else {
            let name = &food.name;
            println!("Deleted {name}");
        }
    } else {
        let msg = format!("Food '{query}' not found");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_seed(svc: &VibefoodService, json: bool) -> Result<()> {
    let summary = svc.seed_if_empty()?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "foods": summary.foods,
                "ingredients": summary.ingredients,
                "links": summary.links,
            })
        );
    } else if summary.foods == 0 {
        println!("Database already has data; nothing seeded");
    } else {
        let foods = summary.foods;
        let ingredients = summary.ingredients;
        println!("Seeded {foods} foods and {ingredients} ingredients");
    }
    Ok(())
}
