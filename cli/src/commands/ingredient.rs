use anyhow::Result;
use std::process;

use vibefood_core::service::VibefoodService;

use super::helpers::{json_error, print_ingredient_table};

pub(crate) fn cmd_ingredient_list(
    svc: &VibefoodService,
    filter: Option<&str>,
    json: bool,
) -> Result<()> {
    let ingredients = svc.list_ingredients(filter)?;

    if ingredients.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No ingredients found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
    } else {
        print_ingredient_table(&ingredients);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_add(svc: &VibefoodService, name: &str, json: bool) -> Result<()> {
    let ingredient = svc.add_ingredient(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ingredient)?);
    } else {
        let name = &ingredient.name;
        let id = ingredient.id;
        println!("Added ingredient: {name} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_rename(
    svc: &VibefoodService,
    query: &str,
    new_name: &str,
    json: bool,
) -> Result<()> {
    let ingredient = svc.resolve_ingredient(query)?;
    let renamed = svc.rename_ingredient(ingredient.id, new_name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&renamed)?);
    } else {
        let old = &ingredient.name;
        let new = &renamed.name;
        println!("Renamed {old} to {new}");
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_delete(svc: &VibefoodService, query: &str, json: bool) -> Result<()> {
    let ingredient = svc.resolve_ingredient(query)?;
    if svc.delete_ingredient(ingredient.id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": ingredient.id }));
        } else {
            let name = &ingredient.name;
            println!("Deleted {name} (removed from every food)");
        }
    } else {
        let msg = format!("Ingredient '{query}' not found");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}
