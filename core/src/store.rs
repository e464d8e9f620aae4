use std::collections::HashSet;

use anyhow::{Result, bail};

use crate::db::Database;
use crate::models::Ingredient;
use crate::table::{CellValue, ItemFlags};

/// Tabular catalog the table model decorates.
pub trait CatalogSource {
    /// Re-query the backing store.
    fn select(&mut self) -> Result<()>;
    fn row_count(&self) -> usize;
    fn row(&self, row: usize) -> Option<&Ingredient>;
    /// Whether `id` existed at the last `select`, including rows a filter hides.
    fn contains_id(&self, id: i64) -> bool;
    fn column_count(&self) -> usize;
    fn header(&self, column: usize) -> Option<String>;
    fn cell(&self, row: usize, column: usize) -> CellValue;
    fn set_cell(&mut self, row: usize, column: usize, value: &CellValue) -> Result<()>;
    fn flags(&self, column: usize) -> ItemFlags;
}

/// Food <-> ingredient relation with a per-pair amount.
pub trait PivotStore {
    /// Insert-or-ignore. An existing link keeps its amount.
    fn link(&self, food_id: i64, ingredient_id: i64, amount: Option<&str>) -> Result<()>;
    fn unlink(&self, food_id: i64, ingredient_id: i64) -> Result<()>;
    /// Upsert keyed by `(food_id, ingredient_id)`.
    fn set_amount(&self, food_id: i64, ingredient_id: i64, amount: &str) -> Result<()>;
    /// `(ingredient_id, amount)` for every ingredient linked to `food_id`.
    fn associations(&self, food_id: i64) -> Result<Vec<(i64, String)>>;
}

impl PivotStore for Database {
    fn link(&self, food_id: i64, ingredient_id: i64, amount: Option<&str>) -> Result<()> {
        self.link_ingredient(food_id, ingredient_id, amount)?;
        Ok(())
    }

    fn unlink(&self, food_id: i64, ingredient_id: i64) -> Result<()> {
        self.unlink_ingredient(food_id, ingredient_id)?;
        Ok(())
    }

    fn set_amount(&self, food_id: i64, ingredient_id: i64, amount: &str) -> Result<()> {
        self.set_link_amount(food_id, ingredient_id, amount)
    }

    fn associations(&self, food_id: i64) -> Result<Vec<(i64, String)>> {
        self.link_amounts(food_id)
    }
}

impl<P: PivotStore + ?Sized> PivotStore for &P {
    fn link(&self, food_id: i64, ingredient_id: i64, amount: Option<&str>) -> Result<()> {
        (**self).link(food_id, ingredient_id, amount)
    }

    fn unlink(&self, food_id: i64, ingredient_id: i64) -> Result<()> {
        (**self).unlink(food_id, ingredient_id)
    }

    fn set_amount(&self, food_id: i64, ingredient_id: i64, amount: &str) -> Result<()> {
        (**self).set_amount(food_id, ingredient_id, amount)
    }

    fn associations(&self, food_id: i64) -> Result<Vec<(i64, String)>> {
        (**self).associations(food_id)
    }
}

pub const CATALOG_ID_COLUMN: usize = 0;
pub const CATALOG_NAME_COLUMN: usize = 1;

/// Ingredient catalog backed by the `ingredients` table.
///
/// Rows are cached on [`CatalogSource::select`] and ordered by name, so row
/// positions shift whenever the catalog or its filter changes.
pub struct IngredientCatalog<'a> {
    db: &'a Database,
    filter: Option<String>,
    rows: Vec<Ingredient>,
    known_ids: HashSet<i64>,
}

impl<'a> IngredientCatalog<'a> {
    /// Empty until the first `select`.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            filter: None,
            rows: Vec::new(),
            known_ids: HashSet::new(),
        }
    }

    /// Changes the name filter. Takes effect on the next `select`.
    pub fn set_filter(&mut self, filter: Option<&str>) {
        self.filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(ToString::to_string);
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn rows(&self) -> &[Ingredient] {
        &self.rows
    }
}

impl CatalogSource for IngredientCatalog<'_> {
    fn select(&mut self) -> Result<()> {
        self.rows = self.db.list_ingredients(self.filter.as_deref())?;
        self.known_ids = self.db.ingredient_ids()?.into_iter().collect();
        Ok(())
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, row: usize) -> Option<&Ingredient> {
        self.rows.get(row)
    }

    fn contains_id(&self, id: i64) -> bool {
        self.known_ids.contains(&id)
    }

    fn column_count(&self) -> usize {
        2
    }

    fn header(&self, column: usize) -> Option<String> {
        match column {
            CATALOG_ID_COLUMN => Some("ID".to_string()),
            CATALOG_NAME_COLUMN => Some("Ingredient".to_string()),
            _ => None,
        }
    }

    fn cell(&self, row: usize, column: usize) -> CellValue {
        let Some(ingredient) = self.rows.get(row) else {
            return CellValue::Null;
        };
        match column {
            CATALOG_ID_COLUMN => CellValue::Int(ingredient.id),
            CATALOG_NAME_COLUMN => CellValue::Text(ingredient.name.clone()),
            _ => CellValue::Null,
        }
    }

    fn set_cell(&mut self, row: usize, column: usize, value: &CellValue) -> Result<()> {
        let Some(ingredient) = self.rows.get_mut(row) else {
            bail!("Row {row} is out of range");
        };
        match (column, value) {
            (CATALOG_NAME_COLUMN, CellValue::Text(name)) => {
                let renamed = self.db.rename_ingredient(ingredient.id, name)?;
                ingredient.name = renamed.name;
                Ok(())
            }
            (CATALOG_NAME_COLUMN, _) => bail!("Ingredient name must be text"),
            (CATALOG_ID_COLUMN, _) => bail!("Ingredient id is read-only"),
            _ => bail!("Column {column} is out of range"),
        }
    }

    fn flags(&self, column: usize) -> ItemFlags {
        match column {
            CATALOG_ID_COLUMN => ItemFlags::ENABLED | ItemFlags::SELECTABLE,
            CATALOG_NAME_COLUMN => ItemFlags::ENABLED | ItemFlags::SELECTABLE | ItemFlags::EDITABLE,
            _ => ItemFlags::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_empty_until_select() {
        let db = Database::open_in_memory().unwrap();
        db.insert_ingredient("Salt").unwrap();
        let mut catalog = IngredientCatalog::new(&db);
        assert_eq!(catalog.row_count(), 0);
        catalog.select().unwrap();
        assert_eq!(catalog.row_count(), 1);
        assert_eq!(catalog.row(0).unwrap().name, "Salt");
        assert!(catalog.row(1).is_none());
    }

    #[test]
    fn test_catalog_filter() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        db.insert_ingredient("Pepper").unwrap();
        let mut catalog = IngredientCatalog::new(&db);
        catalog.set_filter(Some(" pep "));
        assert_eq!(catalog.filter(), Some("pep"));
        catalog.select().unwrap();
        assert_eq!(catalog.row_count(), 1);
        assert_eq!(catalog.cell(0, CATALOG_NAME_COLUMN), CellValue::text("Pepper"));
        // Hidden, not gone
        assert!(catalog.contains_id(salt.id));

        catalog.set_filter(Some(""));
        assert_eq!(catalog.filter(), None);
        catalog.select().unwrap();
        assert_eq!(catalog.row_count(), 2);

        db.delete_ingredient(salt.id).unwrap();
        catalog.select().unwrap();
        assert_eq!(catalog.row_count(), 1);
        assert!(!catalog.contains_id(salt.id));
    }

    #[test]
    fn test_catalog_cells_and_headers() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        let mut catalog = IngredientCatalog::new(&db);
        catalog.select().unwrap();

        assert_eq!(catalog.cell(0, CATALOG_ID_COLUMN), CellValue::Int(salt.id));
        assert_eq!(catalog.cell(0, 5), CellValue::Null);
        assert_eq!(catalog.cell(3, CATALOG_ID_COLUMN), CellValue::Null);
        assert_eq!(catalog.header(CATALOG_NAME_COLUMN).as_deref(), Some("Ingredient"));
        assert_eq!(catalog.header(2), None);
        assert!(!catalog.flags(CATALOG_ID_COLUMN).contains(ItemFlags::EDITABLE));
        assert!(catalog.flags(CATALOG_NAME_COLUMN).contains(ItemFlags::EDITABLE));
    }

    #[test]
    fn test_catalog_rename_through_cell() {
        let db = Database::open_in_memory().unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        let mut catalog = IngredientCatalog::new(&db);
        catalog.select().unwrap();

        catalog
            .set_cell(0, CATALOG_NAME_COLUMN, &CellValue::text("Sea salt"))
            .unwrap();
        assert_eq!(catalog.row(0).unwrap().name, "Sea salt");
        assert_eq!(db.get_ingredient_by_id(salt.id).unwrap().name, "Sea salt");

        assert!(catalog.set_cell(0, CATALOG_ID_COLUMN, &CellValue::Int(9)).is_err());
        assert!(catalog.set_cell(0, CATALOG_NAME_COLUMN, &CellValue::Int(9)).is_err());
        assert!(catalog.set_cell(4, CATALOG_NAME_COLUMN, &CellValue::text("x")).is_err());
    }

    #[test]
    fn test_pivot_store_for_database() {
        let db = Database::open_in_memory().unwrap();
        let food = db
            .insert_food(&crate::models::NewFood {
                name: "Cured salmon".to_string(),
                recipe: None,
            })
            .unwrap();
        let salt = db.insert_ingredient("Salt").unwrap();
        let pivot: &dyn PivotStore = &db;

        pivot.link(food.id, salt.id, None).unwrap();
        pivot.link(food.id, salt.id, None).unwrap();
        pivot.set_amount(food.id, salt.id, "2 tsp").unwrap();
        assert_eq!(
            pivot.associations(food.id).unwrap(),
            vec![(salt.id, "2 tsp".to_string())]
        );
        pivot.unlink(food.id, salt.id).unwrap();
        assert!(pivot.associations(food.id).unwrap().is_empty());
    }
}
