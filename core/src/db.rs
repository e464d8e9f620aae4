use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{
    Food, FoodDetail, FoodIngredient, Ingredient, NewFood, normalize_recipe, validate_name,
};

/// Stock foods and the ingredients each one uses, loaded into an empty database.
const SEED: &[(&str, &[&str])] = &[
    ("Tortilla", &["Tortilla wrap", "Minced meat", "Cheese", "Lettuce"]),
    ("Salmon soup", &["Salmon", "Potatoes", "Cream", "Dill"]),
    ("Fried liver", &["Liver", "Butter", "Onion"]),
    ("Pasta Bolognese", &["Pasta", "Minced meat", "Tomato sauce"]),
    ("Cured salmon", &["Salmon", "Salt", "Sugar", "Dill"]),
    ("Hamburger", &["Bun", "Beef patty", "Cheddar", "Pickles"]),
    ("Fried mushrooms", &["Mushrooms", "Oil", "Garlic"]),
    ("Salmon nigiri", &["Rice", "Salmon", "Nori"]),
    ("Macaroni casserole", &["Macaroni", "Minced meat", "Cheese"]),
    ("Ribs", &["Pork ribs", "BBQ sauce"]),
    ("Pulled Pork", &["Pulled pork", "BBQ sauce", "Bun"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub foods: usize,
    pub ingredients: usize,
    pub links: usize,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    recipe TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS ingredients (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS food_ingredients (
                    food_id INTEGER NOT NULL REFERENCES foods(id) ON DELETE CASCADE,
                    ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                    amount TEXT NOT NULL DEFAULT '',
                    PRIMARY KEY (food_id, ingredient_id)
                );

                CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name);
                CREATE INDEX IF NOT EXISTS idx_food_ingredients_ingredient
                    ON food_ingredients(ingredient_id);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS user_settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 2;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            name: row.get(1)?,
            recipe: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
        Ok(Ingredient {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn like_pattern(query: &str) -> String {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    // --- Foods ---

    pub fn insert_food(&self, food: &NewFood) -> Result<Food> {
        let name = validate_name("Food", &food.name)?;
        let recipe = normalize_recipe(food.recipe.as_deref());
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO foods (name, recipe, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, recipe, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_food_by_id(id)
    }

    pub fn get_food_by_id(&self, id: i64) -> Result<Food> {
        self.conn
            .query_row(
                "SELECT id, name, recipe, created_at, updated_at FROM foods WHERE id = ?1",
                params![id],
                Self::food_from_row,
            )
            .context("Food not found")
    }

    pub fn find_food_by_name(&self, name: &str) -> Result<Option<Food>> {
        let food = self
            .conn
            .query_row(
                "SELECT id, name, recipe, created_at, updated_at FROM foods
                 WHERE LOWER(name) = LOWER(?1) ORDER BY id LIMIT 1",
                params![name.trim()],
                Self::food_from_row,
            )
            .optional()?;
        Ok(food)
    }

    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        let foods = if let Some(query) = search {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, recipe, created_at, updated_at FROM foods
                 WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
            )?;
            stmt.query_map(params![Self::like_pattern(query)], Self::food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, recipe, created_at, updated_at FROM foods ORDER BY name",
            )?;
            stmt.query_map([], Self::food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(foods)
    }

    pub fn rename_food(&self, id: i64, name: &str) -> Result<Food> {
        let name = validate_name("Food", name)?;
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE foods SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, now, id],
        )?;
        if rows == 0 {
            bail!("Food not found");
        }
        self.get_food_by_id(id)
    }

    pub fn set_food_recipe(&self, id: i64, recipe: Option<&str>) -> Result<Food> {
        let recipe = normalize_recipe(recipe);
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE foods SET recipe = ?1, updated_at = ?2 WHERE id = ?3",
            params![recipe, now, id],
        )?;
        if rows == 0 {
            bail!("Food not found");
        }
        self.get_food_by_id(id)
    }

    /// Deletes the food; its ingredient links go with it.
    pub fn delete_food(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn get_food_detail(&self, id: i64) -> Result<FoodDetail> {
        let food = self.get_food_by_id(id)?;
        let ingredients = self.food_ingredients(id)?;
        Ok(FoodDetail {
            id: food.id,
            name: food.name,
            recipe: food.recipe,
            ingredients,
        })
    }

    // --- Ingredients ---

    pub fn insert_ingredient(&self, name: &str) -> Result<Ingredient> {
        let name = validate_name("Ingredient", name)?;
        if self.find_ingredient_by_name(&name)?.is_some() {
            bail!("Ingredient '{name}' already exists");
        }
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO ingredients (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_ingredient_by_id(id)
    }

    /// Returns the existing ingredient with this name, creating it if needed.
    pub fn ensure_ingredient(&self, name: &str) -> Result<Ingredient> {
        let name = validate_name("Ingredient", name)?;
        match self.find_ingredient_by_name(&name)? {
            Some(existing) => Ok(existing),
            None => self.insert_ingredient(&name),
        }
    }

    pub fn get_ingredient_by_id(&self, id: i64) -> Result<Ingredient> {
        self.conn
            .query_row(
                "SELECT id, name FROM ingredients WHERE id = ?1",
                params![id],
                Self::ingredient_from_row,
            )
            .context("Ingredient not found")
    }

    pub fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let ingredient = self
            .conn
            .query_row(
                "SELECT id, name FROM ingredients WHERE name = ?1",
                params![name.trim()],
                Self::ingredient_from_row,
            )
            .optional()?;
        Ok(ingredient)
    }

    /// Catalog listing ordered by name, optionally narrowed by a substring filter.
    pub fn list_ingredients(&self, filter: Option<&str>) -> Result<Vec<Ingredient>> {
        let ingredients = if let Some(query) = filter.filter(|q| !q.trim().is_empty()) {
            let mut stmt = self.conn.prepare(
                "SELECT id, name FROM ingredients WHERE name LIKE ?1 ESCAPE '\\'
                 ORDER BY name, id",
            )?;
            stmt.query_map(
                params![Self::like_pattern(query.trim())],
                Self::ingredient_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self
                .conn
                .prepare("SELECT id, name FROM ingredients ORDER BY name, id")?;
            stmt.query_map([], Self::ingredient_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(ingredients)
    }

    /// Every ingredient id, ignoring any filter.
    pub fn ingredient_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM ingredients ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    pub fn rename_ingredient(&self, id: i64, name: &str) -> Result<Ingredient> {
        let name = validate_name("Ingredient", name)?;
        if let Some(existing) = self.find_ingredient_by_name(&name)? {
            if existing.id != id {
                bail!("Ingredient '{name}' already exists");
            }
        }
        let rows = self.conn.execute(
            "UPDATE ingredients SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        if rows == 0 {
            bail!("Ingredient not found");
        }
        self.get_ingredient_by_id(id)
    }

    /// Deletes the ingredient and every food link that referenced it.
    pub fn delete_ingredient(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ingredients WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Food <-> ingredient links ---

    /// Insert-or-ignore: an existing link (and its amount) is left untouched.
    pub fn link_ingredient(
        &self,
        food_id: i64,
        ingredient_id: i64,
        amount: Option<&str>,
    ) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO food_ingredients (food_id, ingredient_id, amount)
                 VALUES (?1, ?2, ?3)",
                params![food_id, ingredient_id, amount.unwrap_or("").trim()],
            )
            .with_context(|| {
                format!("Failed to link ingredient {ingredient_id} to food {food_id}")
            })?;
        Ok(rows > 0)
    }

    pub fn unlink_ingredient(&self, food_id: i64, ingredient_id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM food_ingredients WHERE food_id = ?1 AND ingredient_id = ?2",
                params![food_id, ingredient_id],
            )
            .with_context(|| {
                format!("Failed to unlink ingredient {ingredient_id} from food {food_id}")
            })?;
        Ok(rows > 0)
    }

    /// Upsert the amount for a link, creating the link if it is missing.
    pub fn set_link_amount(&self, food_id: i64, ingredient_id: i64, amount: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO food_ingredients (food_id, ingredient_id, amount)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(food_id, ingredient_id) DO UPDATE SET amount = excluded.amount",
                params![food_id, ingredient_id, amount.trim()],
            )
            .with_context(|| {
                format!("Failed to set amount of ingredient {ingredient_id} in food {food_id}")
            })?;
        Ok(())
    }

    /// Raw `(ingredient_id, amount)` pairs for one food, ordered by ingredient id.
    pub fn link_amounts(&self, food_id: i64) -> Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT ingredient_id, amount FROM food_ingredients
             WHERE food_id = ?1 ORDER BY ingredient_id",
        )?;
        let pairs = stmt
            .query_map(params![food_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    pub fn food_ingredients(&self, food_id: i64) -> Result<Vec<FoodIngredient>> {
        let mut stmt = self.conn.prepare(
            "SELECT fi.food_id, fi.ingredient_id, i.name, fi.amount
             FROM food_ingredients fi
             JOIN ingredients i ON fi.ingredient_id = i.id
             WHERE fi.food_id = ?1
             ORDER BY i.name",
        )?;
        let ingredients = stmt
            .query_map(params![food_id], |row| {
                Ok(FoodIngredient {
                    food_id: row.get(0)?,
                    ingredient_id: row.get(1)?,
                    name: row.get(2)?,
                    amount: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn count_links(&self, food_id: i64, ingredient_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM food_ingredients WHERE food_id = ?1 AND ingredient_id = ?2",
            params![food_id, ingredient_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // --- Seeding ---

    /// Loads the stock foods and ingredients, but only into an empty database.
    pub fn seed_if_empty(&self) -> Result<SeedSummary> {
        let foods: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        let ingredients: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        if foods > 0 || ingredients > 0 {
            return Ok(SeedSummary::default());
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut summary = SeedSummary::default();
        for (food_name, ingredient_names) in SEED {
            let food = self.insert_food(&NewFood {
                name: (*food_name).to_string(),
                recipe: None,
            })?;
            summary.foods += 1;
            for ingredient_name in *ingredient_names {
                let ingredient = match self.find_ingredient_by_name(ingredient_name)? {
                    Some(existing) => existing,
                    None => {
                        summary.ingredients += 1;
                        self.insert_ingredient(ingredient_name)?
                    }
                };
                if self.link_ingredient(food.id, ingredient.id, None)? {
                    summary.links += 1;
                }
            }
        }
        tx.commit()?;
        Ok(summary)
    }

    // --- User Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO user_settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM user_settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_food(name: &str) -> NewFood {
        NewFood {
            name: name.to_string(),
            recipe: None,
        }
    }

    #[test]
    fn test_insert_and_get_food() {
        let db = Database::open_in_memory().unwrap();
        let food = db
            .insert_food(&NewFood {
                name: " Hamburger ".to_string(),
                recipe: Some("Grill the patty.".to_string()),
            })
            .unwrap();
        assert_eq!(food.name, "Hamburger");
        assert_eq!(food.recipe.as_deref(), Some("Grill the patty."));

        let fetched = db.get_food_by_id(food.id).unwrap();
        assert_eq!(fetched.id, food.id);
        assert_eq!(fetched.name, "Hamburger");
    }

    #[test]
    fn test_insert_food_rejects_blank_name() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_food(&sample_food("  ")).is_err());
    }

    #[test]
    fn test_list_foods_with_search() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&sample_food("Salmon soup")).unwrap();
        db.insert_food(&sample_food("Ribs")).unwrap();
        db.insert_food(&sample_food("Cured salmon")).unwrap();

        let all = db.list_foods(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Cured salmon");

        let salmon = db.list_foods(Some("salmon")).unwrap();
        assert_eq!(salmon.len(), 2);

        let none = db.list_foods(Some("100%")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_rename_and_recipe() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Tortila")).unwrap();
        let renamed = db.rename_food(food.id, "Tortilla").unwrap();
        assert_eq!(renamed.name, "Tortilla");

        let with_recipe = db.set_food_recipe(food.id, Some("Wrap it.")).unwrap();
        assert_eq!(with_recipe.recipe.as_deref(), Some("Wrap it."));
        let cleared = db.set_food_recipe(food.id, Some("  ")).unwrap();
        assert_eq!(cleared.recipe, None);

        assert!(db.rename_food(9999, "Nope").is_err());
        assert!(db.set_food_recipe(9999, None).is_err());
    }

    #[test]
    fn test_find_food_by_name_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Pulled Pork")).unwrap();
        let found = db.find_food_by_name("pulled pork").unwrap().unwrap();
        assert_eq!(found.id, food.id);
        assert!(db.find_food_by_name("Brisket").unwrap().is_none());
    }

    #[test]
    fn test_ingredient_names_unique_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        assert!(db.insert_ingredient("salt").is_err());
        let again = db.ensure_ingredient("SALT").unwrap();
        assert_eq!(again.id, salt.id);
    }

    #[test]
    fn test_list_ingredients_filter_and_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_ingredient("Salt").unwrap();
        db.insert_ingredient("Pepper").unwrap();
        db.insert_ingredient("Salmon").unwrap();

        let all = db.list_ingredients(None).unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Pepper", "Salmon", "Salt"]);

        let sal = db.list_ingredients(Some("sal")).unwrap();
        assert_eq!(sal.len(), 2);

        let blank = db.list_ingredients(Some("  ")).unwrap();
        assert_eq!(blank.len(), 3);
    }

    #[test]
    fn test_ingredient_ids_ignore_filter() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        let pepper = db.insert_ingredient("Pepper").unwrap();
        assert_eq!(db.ingredient_ids().unwrap(), vec![salt.id, pepper.id]);
        db.delete_ingredient(salt.id).unwrap();
        assert_eq!(db.ingredient_ids().unwrap(), vec![pepper.id]);
    }

    #[test]
    fn test_rename_ingredient_conflict() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        db.insert_ingredient("Pepper").unwrap();
        assert!(db.rename_ingredient(salt.id, "pepper").is_err());
        let renamed = db.rename_ingredient(salt.id, "Sea salt").unwrap();
        assert_eq!(renamed.name, "Sea salt");
        // Renaming to its own name in another case is allowed
        assert!(db.rename_ingredient(salt.id, "SEA SALT").is_ok());
    }

    #[test]
    fn test_link_is_insert_or_ignore() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Cured salmon")).unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();

        assert!(db.link_ingredient(food.id, salt.id, Some("2 tsp")).unwrap());
        assert!(!db.link_ingredient(food.id, salt.id, None).unwrap());
        assert_eq!(db.count_links(food.id, salt.id).unwrap(), 1);

        // Existing amount survives the ignored insert
        let pairs = db.link_amounts(food.id).unwrap();
        assert_eq!(pairs, vec![(salt.id, "2 tsp".to_string())]);
    }

    #[test]
    fn test_set_link_amount_upserts() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Cured salmon")).unwrap();
        let sugar = db.insert_ingredient("Sugar").unwrap();

        db.set_link_amount(food.id, sugar.id, "1 tbsp").unwrap();
        db.set_link_amount(food.id, sugar.id, "2 tbsp").unwrap();
        assert_eq!(db.count_links(food.id, sugar.id).unwrap(), 1);
        assert_eq!(
            db.link_amounts(food.id).unwrap(),
            vec![(sugar.id, "2 tbsp".to_string())]
        );
    }

    #[test]
    fn test_unlink_removes_amount() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Ribs")).unwrap();
        let sauce = db.insert_ingredient("BBQ sauce").unwrap();
        db.link_ingredient(food.id, sauce.id, Some("1 cup")).unwrap();

        assert!(db.unlink_ingredient(food.id, sauce.id).unwrap());
        assert!(!db.unlink_ingredient(food.id, sauce.id).unwrap());

        // Relinking starts from an empty amount
        db.link_ingredient(food.id, sauce.id, None).unwrap();
        assert_eq!(
            db.link_amounts(food.id).unwrap(),
            vec![(sauce.id, String::new())]
        );
    }

    #[test]
    fn test_link_unknown_ids_fails() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Ribs")).unwrap();
        assert!(db.link_ingredient(food.id, 404, None).is_err());
        assert!(db.set_link_amount(404, 404, "1").is_err());
    }

    #[test]
    fn test_delete_cascades_links() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Ribs")).unwrap();
        let other = db.insert_food(&sample_food("Pulled Pork")).unwrap();
        let sauce = db.insert_ingredient("BBQ sauce").unwrap();
        db.link_ingredient(food.id, sauce.id, None).unwrap();
        db.link_ingredient(other.id, sauce.id, None).unwrap();

        assert!(db.delete_food(food.id).unwrap());
        assert!(db.link_amounts(food.id).unwrap().is_empty());
        assert_eq!(db.link_amounts(other.id).unwrap().len(), 1);

        assert!(db.delete_ingredient(sauce.id).unwrap());
        assert!(db.link_amounts(other.id).unwrap().is_empty());
    }

    #[test]
    fn test_food_detail_joins_names() {
        let db = Database::open_in_memory().unwrap();
        let food = db.insert_food(&sample_food("Cured salmon")).unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        let dill = db.insert_ingredient("Dill").unwrap();
        db.link_ingredient(food.id, salt.id, Some("2 tsp")).unwrap();
        db.link_ingredient(food.id, dill.id, None).unwrap();

        let detail = db.get_food_detail(food.id).unwrap();
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.ingredients[0].name, "Dill");
        assert_eq!(detail.ingredients[1].amount, "2 tsp");
    }

    #[test]
    fn test_seed_if_empty() {
        let db = Database::open_in_memory().unwrap();
        let summary = db.seed_if_empty().unwrap();
        assert_eq!(summary.foods, 11);
        assert!(summary.ingredients > 0);
        assert!(summary.links > summary.ingredients);

        let salmon = db.find_ingredient_by_name("Salmon").unwrap().unwrap();
        let soup = db.find_food_by_name("Salmon soup").unwrap().unwrap();
        assert_eq!(db.count_links(soup.id, salmon.id).unwrap(), 1);

        // Second run is a no-op
        assert_eq!(db.seed_if_empty().unwrap(), SeedSummary::default());
        assert_eq!(db.list_foods(None).unwrap().len(), 11);
    }

    #[test]
    fn test_user_settings_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("last_food").unwrap().is_none());
        db.set_setting("last_food", "3").unwrap();
        db.set_setting("last_food", "4").unwrap();
        assert_eq!(db.get_setting("last_food").unwrap().as_deref(), Some("4"));
        assert!(db.delete_setting("last_food").unwrap());
        assert!(!db.delete_setting("last_food").unwrap());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibefood.db");
        {
            let db = Database::open(&path).unwrap();
            let food = db.insert_food(&sample_food("Ribs")).unwrap();
            let sauce = db.insert_ingredient("BBQ sauce").unwrap();
            db.set_link_amount(food.id, sauce.id, "1 cup").unwrap();
        }
        let db = Database::open(&path).unwrap();
        let food = db.find_food_by_name("Ribs").unwrap().unwrap();
        let detail = db.get_food_detail(food.id).unwrap();
        assert_eq!(detail.ingredients[0].amount, "1 cup");
    }
}
