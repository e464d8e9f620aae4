use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::db::{Database, SeedSummary};
use crate::models::{Food, FoodContext, FoodDetail, Ingredient, NewFood};
use crate::store::IngredientCatalog;
use crate::table::{ColumnLayout, IngredientTableModel};

/// Ingredient table bound to a service's database.
pub type IngredientTable<'a> = IngredientTableModel<IngredientCatalog<'a>, &'a Database>;

const LAST_FOOD_KEY: &str = "last_food_id";

pub struct VibefoodService {
    db: Database,
}

impl VibefoodService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn seed_if_empty(&self) -> Result<SeedSummary> {
        self.db.seed_if_empty()
    }

    // --- Foods ---

    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        self.db.list_foods(search)
    }

    pub fn add_food(&self, name: &str, recipe: Option<&str>) -> Result<Food> {
        self.db.insert_food(&NewFood {
            name: name.to_string(),
            recipe: recipe.map(ToString::to_string),
        })
    }

    pub fn food_detail(&self, food_id: i64) -> Result<FoodDetail> {
        self.db.get_food_detail(food_id)
    }

    pub fn rename_food(&self, food_id: i64, name: &str) -> Result<Food> {
        self.db.rename_food(food_id, name)
    }

    pub fn set_recipe(&self, food_id: i64, recipe: Option<&str>) -> Result<Food> {
        self.db.set_food_recipe(food_id, recipe)
    }

    pub fn delete_food(&self, food_id: i64) -> Result<bool> {
        let deleted = self.db.delete_food(food_id)?;
        if deleted && self.last_food()? == FoodContext::food(food_id) {
            self.db.delete_setting(LAST_FOOD_KEY)?;
        }
        Ok(deleted)
    }

    /// Accepts a numeric id or a case-insensitive name.
    pub fn resolve_food(&self, query: &str) -> Result<Food> {
        if let Ok(id) = query.trim().parse::<i64>() {
            return self.db.get_food_by_id(id);
        }
        if let Some(food) = self.db.find_food_by_name(query)? {
            return Ok(food);
        }
        let matches = self.db.list_foods(Some(query.trim()))?;
        match matches.len() {
            0 => bail!("No food found for '{query}'"),
            1 => Ok(matches.into_iter().next().context("No food found")?),
            n => {
                let names: Vec<&str> = matches.iter().map(|f| f.name.as_str()).collect();
                bail!("'{query}' matches {n} foods: {}", names.join(", "))
            }
        }
    }

    // --- Ingredients ---

    pub fn list_ingredients(&self, filter: Option<&str>) -> Result<Vec<Ingredient>> {
        self.db.list_ingredients(filter)
    }

    pub fn add_ingredient(&self, name: &str) -> Result<Ingredient> {
        self.db.insert_ingredient(name)
    }

    pub fn rename_ingredient(&self, ingredient_id: i64, name: &str) -> Result<Ingredient> {
        self.db.rename_ingredient(ingredient_id, name)
    }

    pub fn delete_ingredient(&self, ingredient_id: i64) -> Result<bool> {
        self.db.delete_ingredient(ingredient_id)
    }

    /// Accepts a numeric id or an exact (case-insensitive) name.
    pub fn resolve_ingredient(&self, query: &str) -> Result<Ingredient> {
        if let Ok(id) = query.trim().parse::<i64>() {
            return self.db.get_ingredient_by_id(id);
        }
        self.db
            .find_ingredient_by_name(query)?
            .with_context(|| format!("No ingredient named '{}'", query.trim()))
    }

    // --- Selection ---

    pub fn last_food(&self) -> Result<FoodContext> {
        let raw = self.db.get_setting(LAST_FOOD_KEY)?;
        Ok(raw
            .and_then(|v| v.parse::<i64>().ok())
            .map_or(FoodContext::none(), FoodContext::from_raw))
    }

    pub fn remember_food(&self, context: FoodContext) -> Result<()> {
        match context.food_id() {
            Some(id) => self.db.set_setting(LAST_FOOD_KEY, &id.to_string()),
            None => self.db.delete_setting(LAST_FOOD_KEY).map(|_| ()),
        }
    }

    /// Builds an ingredient table over the full catalog, selected for `context`.
    pub fn ingredient_table(
        &self,
        context: FoodContext,
        filter: Option<&str>,
        layout: ColumnLayout,
    ) -> Result<IngredientTable<'_>> {
        let mut catalog = IngredientCatalog::new(&self.db);
        catalog.set_filter(filter);
        let mut table = IngredientTableModel::new(catalog, &self.db, layout);
        table.reload_catalog()?;
        table.switch_context(context)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, Role};

    #[test]
    fn test_resolve_food_by_id_and_name() {
        let svc = VibefoodService::new_in_memory().unwrap();
        let ribs = svc.add_food("Ribs", None).unwrap();
        svc.add_food("Salmon soup", None).unwrap();
        svc.add_food("Cured salmon", None).unwrap();

        assert_eq!(svc.resolve_food(&ribs.id.to_string()).unwrap().id, ribs.id);
        assert_eq!(svc.resolve_food("ribs").unwrap().id, ribs.id);
        assert_eq!(svc.resolve_food("soup").unwrap().name, "Salmon soup");
        assert!(svc.resolve_food("salmon").is_err());
        assert!(svc.resolve_food("pizza").is_err());
    }

    #[test]
    fn test_resolve_ingredient() {
        let svc = VibefoodService::new_in_memory().unwrap();
        let dill = svc.add_ingredient("Dill").unwrap();
        assert_eq!(svc.resolve_ingredient("dill").unwrap().id, dill.id);
        assert_eq!(svc.resolve_ingredient(&dill.id.to_string()).unwrap().id, dill.id);
        assert!(svc.resolve_ingredient("Di").is_err());
    }

    #[test]
    fn test_last_food_setting() {
        let svc = VibefoodService::new_in_memory().unwrap();
        assert_eq!(svc.last_food().unwrap(), FoodContext::none());
        let food = svc.add_food("Ribs", None).unwrap();
        svc.remember_food(FoodContext::food(food.id)).unwrap();
        assert_eq!(svc.last_food().unwrap(), FoodContext::food(food.id));

        svc.delete_food(food.id).unwrap();
        assert_eq!(svc.last_food().unwrap(), FoodContext::none());
    }

    #[test]
    fn test_ingredient_table_for_seeded_food() {
        let svc = VibefoodService::new_in_memory().unwrap();
        svc.seed_if_empty().unwrap();
        let soup = svc.resolve_food("Salmon soup").unwrap();
        let dill = svc.resolve_ingredient("Dill").unwrap();
        let bun = svc.resolve_ingredient("Bun").unwrap();

        let mut table = svc
            .ingredient_table(FoodContext::food(soup.id), None, ColumnLayout::default())
            .unwrap();
        assert_eq!(table.row_count(), svc.list_ingredients(None).unwrap().len());
        assert!(table.is_checked(dill.id));
        assert!(!table.is_checked(bun.id));

        let row = table.row_for_id(dill.id).unwrap();
        let amount_col = table.column_count() - 1;
        assert!(
            table
                .set_data(row, amount_col, &CellValue::text("1 bunch"), Role::Edit)
                .is_durable()
        );
        drop(table);

        let detail = svc.food_detail(soup.id).unwrap();
        let dill_link = detail
            .ingredients
            .iter()
            .find(|i| i.ingredient_id == dill.id)
            .unwrap();
        assert_eq!(dill_link.amount, "1 bunch");
    }

    #[test]
    fn test_ingredient_table_without_selection() {
        let svc = VibefoodService::new_in_memory().unwrap();
        svc.seed_if_empty().unwrap();
        let table = svc
            .ingredient_table(FoodContext::none(), Some("salm"), ColumnLayout::CHECK_ONLY)
            .unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.checked_ids().is_empty());
        assert_eq!(table.column_count(), 3);
    }
}
