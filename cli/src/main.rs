mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_amount, cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_recipe, cmd_food_rename,
    cmd_food_show, cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list,
    cmd_ingredient_rename, cmd_seed, cmd_table, cmd_unuse, cmd_use,
};
use crate::config::Config;
use vibefood_core::service::VibefoodService;

#[derive(Parser)]
#[command(
    name = "vibefood",
    version,
    about = "A small recipe manager: foods, their ingredients, and how much of each"
)]
struct Cli {
    /// Database file (overrides VIBEFOOD_DB and the default data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage foods
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Manage the ingredient catalog
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Mark an ingredient as used by a food
    Use {
        /// Food name or ID
        food: String,
        /// Ingredient name or ID
        ingredient: String,
        /// How much of it (free text, e.g. "2 tsp")
        #[arg(short, long)]
        amount: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient from a food (its amount is discarded)
    Unuse {
        /// Food name or ID
        food: String,
        /// Ingredient name or ID
        ingredient: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the amount of an ingredient a food already uses
    Amount {
        /// Food name or ID
        food: String,
        /// Ingredient name or ID
        ingredient: String,
        /// Amount (free text; empty clears it)
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the ingredient catalog marked up for a food (defaults to the last one)
    Table {
        /// Food name or ID
        food: Option<String>,
        /// Only show ingredients whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Hide the amount column
        #[arg(long)]
        compact: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the stock foods and ingredients into an empty database
    Seed {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// List foods
    List {
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a food
    Add {
        /// Food name
        name: String,
        /// Free-text recipe
        #[arg(short, long)]
        recipe: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a food with its ingredients and recipe
    Show {
        /// Food name or ID
        food: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a food
    Rename {
        /// Food name or ID
        food: String,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a food's recipe text (omit the text to clear it)
    Recipe {
        /// Food name or ID
        food: String,
        /// Recipe text
        text: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food and its ingredient links
    Delete {
        /// Food name or ID
        food: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// List the ingredient catalog
    List {
        /// Only show ingredients whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an ingredient to the catalog
    Add {
        /// Ingredient name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename an ingredient
    Rename {
        /// Ingredient name or ID
        ingredient: String,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an ingredient (removes it from every food)
    Delete {
        /// Ingredient name or ID
        ingredient: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    tracing::debug!(db = %config.db_path.display(), data_dir = %config.data_dir.display(), "opening database");
    let svc = VibefoodService::new(&config.db_path)?;

    match cli.command {
        Commands::Food { command } => match command {
            FoodCommands::List { search, json } => cmd_food_list(&svc, search.as_deref(), json),
            FoodCommands::Add { name, recipe, json } => {
                cmd_food_add(&svc, &name, recipe.as_deref(), json)
            }
            FoodCommands::Show { food, json } => cmd_food_show(&svc, &food, json),
            FoodCommands::Rename { food, name, json } => cmd_food_rename(&svc, &food, &name, json),
            FoodCommands::Recipe { food, text, json } => {
                cmd_food_recipe(&svc, &food, text.as_deref(), json)
            }
            FoodCommands::Delete { food, json } => cmd_food_delete(&svc, &food, json),
        },
        Commands::Ingredient { command } => match command {
            IngredientCommands::List { filter, json } => {
                cmd_ingredient_list(&svc, filter.as_deref(), json)
            }
            IngredientCommands::Add { name, json } => cmd_ingredient_add(&svc, &name, json),
            IngredientCommands::Rename {
                ingredient,
                name,
                json,
            } => cmd_ingredient_rename(&svc, &ingredient, &name, json),
            IngredientCommands::Delete { ingredient, json } => {
                cmd_ingredient_delete(&svc, &ingredient, json)
            }
        },
        Commands::Use {
            food,
            ingredient,
            amount,
            json,
        } => cmd_use(&svc, &food, &ingredient, amount.as_deref(), json),
        Commands::Unuse {
            food,
            ingredient,
            json,
        } => cmd_unuse(&svc, &food, &ingredient, json),
        Commands::Amount {
            food,
            ingredient,
            amount,
            json,
        } => cmd_amount(&svc, &food, &ingredient, &amount, json),
        Commands::Table {
            food,
            filter,
            compact,
            json,
        } => cmd_table(&svc, food.as_deref(), filter.as_deref(), compact, json),
        Commands::Seed { json } => cmd_seed(&svc, json),
    }
}
