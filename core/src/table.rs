use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::ops::{BitOr, Range};

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::FoodContext;
use crate::store::{CatalogSource, PivotStore};

const LOG_TARGET: &str = "vibefood::table";

/// Which aspect of a cell is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Display,
    Edit,
    CheckState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Int(i64),
    Text(String),
    Check(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_check(&self) -> Option<bool> {
        match self {
            Self::Check(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Check(true) => f.write_str("[x]"),
            Self::Check(false) => f.write_str("[ ]"),
        }
    }
}

/// Interaction flags for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags(u8);

impl ItemFlags {
    pub const NONE: Self = Self(0);
    pub const SELECTABLE: Self = Self(1);
    pub const ENABLED: Self = Self(1 << 1);
    pub const EDITABLE: Self = Self(1 << 2);
    pub const USER_CHECKABLE: Self = Self(1 << 3);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ItemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Column identity, independent of its position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Checked,
    Catalog(usize),
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Show the per-food amount column after the catalog columns.
    pub amount_column: bool,
}

impl ColumnLayout {
    pub const CHECK_ONLY: Self = Self {
        amount_column: false,
    };

    pub const fn derived_columns(self) -> usize {
        if self.amount_column { 2 } else { 1 }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            amount_column: true,
        }
    }
}

/// Why an edit was refused. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditRejection {
    #[error("cell ({row}, {column}) is out of range")]
    InvalidIndex { row: usize, column: usize },
    #[error("column {column} does not accept {role:?} edits")]
    UnsupportedRole { column: usize, role: Role },
    #[error("column {column} does not accept this value")]
    TypeMismatch { column: usize },
    #[error("column {column} is read-only")]
    ReadOnlyColumn { column: usize },
    #[error("ingredient {ingredient_id} is not in the current view")]
    NotInView { ingredient_id: i64 },
    #[error("ingredient {ingredient_id} is not used by the selected food")]
    AmountOnUnchecked { ingredient_id: i64 },
    #[error("no food is selected")]
    NoContext,
    #[error("catalog rejected the edit: {0}")]
    Catalog(String),
}

/// Whether an accepted edit reached the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    Persisted,
    /// No food selected: the edit only exists in memory.
    Skipped,
    /// The write failed and was logged. In-memory state was kept.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(Durability),
    Rejected(EditRejection),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Applied and persisted.
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Applied(Durability::Persisted))
    }

    pub fn rejection(&self) -> Option<&EditRejection> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Applied(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// Cells in `rows` x `columns` changed for the given roles.
    DataChanged {
        rows: Range<usize>,
        columns: Vec<usize>,
        roles: Vec<Role>,
    },
    /// The catalog was re-selected; row positions may have moved.
    Reset,
}

pub type Listener = Box<dyn FnMut(&ModelEvent)>;

/// Ingredient catalog decorated with per-food "used" and "amount" columns.
///
/// Columns are laid out as `[checked, catalog..., amount]`. The amount column
/// is present unless the layout is [`ColumnLayout::CHECK_ONLY`].
pub struct IngredientTableModel<C, P> {
    catalog: C,
    pivot: P,
    layout: ColumnLayout,
    context: FoodContext,
    /// Ingredient id -> amount. Presence means the ingredient is checked.
    associations: BTreeMap<i64, String>,
    listeners: Vec<Listener>,
}

impl<C: CatalogSource, P: PivotStore> IngredientTableModel<C, P> {
    pub fn new(catalog: C, pivot: P, layout: ColumnLayout) -> Self {
        Self {
            catalog,
            pivot,
            layout,
            context: FoodContext::none(),
            associations: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Changes made here (a new filter, say) show up after `reload_catalog`.
    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    pub fn pivot(&self) -> &P {
        &self.pivot
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    // --- Selection context ---

    pub fn context(&self) -> FoodContext {
        self.context
    }

    /// Derived columns stay as they were until `load_associations` runs.
    pub fn set_context(&mut self, context: FoodContext) {
        debug!(target: LOG_TARGET, food_id = context.as_raw(), "selection context changed");
        self.context = context;
    }

    /// Replaces all derived state in one step and emits a single change event.
    ///
    /// Amounts for ids outside `ids` are dropped: an unchecked ingredient never
    /// carries an amount.
    pub fn load_associations(&mut self, ids: &HashSet<i64>, amounts: &HashMap<i64, String>) {
        self.associations = ids
            .iter()
            .map(|id| (*id, amounts.get(id).cloned().unwrap_or_default()))
            .collect();
        debug!(
            target: LOG_TARGET,
            food_id = self.context.as_raw(),
            checked = self.associations.len(),
            "associations loaded"
        );

        let event = ModelEvent::DataChanged {
            rows: 0..self.row_count(),
            columns: self.derived_column_indices(),
            roles: self.derived_roles(),
        };
        self.emit(&event);
    }

    /// Sets the context and loads its associations from the pivot store.
    ///
    /// If the store query fails the derived state is cleared rather than left
    /// showing the previous food, and the error is returned.
    pub fn switch_context(&mut self, context: FoodContext) -> Result<()> {
        self.set_context(context);
        let Some(food_id) = context.food_id() else {
            self.load_associations(&HashSet::new(), &HashMap::new());
            return Ok(());
        };
        match self.pivot.associations(food_id) {
            Ok(pairs) => {
                let ids: HashSet<i64> = pairs.iter().map(|(id, _)| *id).collect();
                let amounts: HashMap<i64, String> = pairs.into_iter().collect();
                self.load_associations(&ids, &amounts);
                Ok(())
            }
            Err(err) => {
                self.load_associations(&HashSet::new(), &HashMap::new());
                Err(err.context(format!("Failed to load ingredients for food {food_id}")))
            }
        }
    }

    /// Re-selects the catalog. Derived state is keyed by id and survives for
    /// every id the catalog still has, visible or filtered out. Ids the catalog
    /// no longer knows are dropped.
    pub fn reload_catalog(&mut self) -> Result<()> {
        if let Err(err) = self.catalog.select() {
            warn!(target: LOG_TARGET, error = %format!("{err:#}"), "catalog reload failed");
            return Err(err);
        }
        let before = self.associations.len();
        let catalog = &self.catalog;
        self.associations.retain(|id, _| catalog.contains_id(*id));
        debug!(
            target: LOG_TARGET,
            rows = self.catalog.row_count(),
            dropped = before - self.associations.len(),
            "catalog reloaded"
        );
        self.emit(&ModelEvent::Reset);
        Ok(())
    }

    // --- Shape ---

    pub fn row_count(&self) -> usize {
        self.catalog.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.catalog.column_count() + self.layout.derived_columns()
    }

    pub fn column(&self, index: usize) -> Option<Column> {
        let catalog_columns = self.catalog.column_count();
        match index {
            0 => Some(Column::Checked),
            i if i <= catalog_columns => Some(Column::Catalog(i - 1)),
            i if i == catalog_columns + 1 && self.layout.amount_column => Some(Column::Amount),
            _ => None,
        }
    }

    pub fn column_index(&self, column: Column) -> Option<usize> {
        match column {
            Column::Checked => Some(0),
            Column::Catalog(i) if i < self.catalog.column_count() => Some(i + 1),
            Column::Catalog(_) => None,
            Column::Amount if self.layout.amount_column => Some(self.catalog.column_count() + 1),
            Column::Amount => None,
        }
    }

    fn derived_column_indices(&self) -> Vec<usize> {
        [Column::Checked, Column::Amount]
            .into_iter()
            .filter_map(|c| self.column_index(c))
            .collect()
    }

    fn derived_roles(&self) -> Vec<Role> {
        if self.layout.amount_column {
            vec![Role::CheckState, Role::Display, Role::Edit]
        } else {
            vec![Role::CheckState]
        }
    }

    // --- Lookups by id ---

    pub fn id_for_row(&self, row: usize) -> Option<i64> {
        self.catalog.row(row).map(|r| r.id)
    }

    pub fn row_for_id(&self, ingredient_id: i64) -> Option<usize> {
        (0..self.catalog.row_count()).find(|&row| self.id_for_row(row) == Some(ingredient_id))
    }

    pub fn is_checked(&self, ingredient_id: i64) -> bool {
        self.associations.contains_key(&ingredient_id)
    }

    /// Empty for unchecked ingredients.
    pub fn amount(&self, ingredient_id: i64) -> &str {
        self.associations
            .get(&ingredient_id)
            .map_or("", String::as_str)
    }

    /// Checked ingredient ids in ascending order, including ids the current
    /// catalog filter hides.
    pub fn checked_ids(&self) -> Vec<i64> {
        self.associations.keys().copied().collect()
    }

    // --- Cell access ---

    /// Out-of-range cells read as [`CellValue::Null`].
    pub fn data(&self, row: usize, column: usize, role: Role) -> CellValue {
        let (Some(id), Some(col)) = (self.id_for_row(row), self.column(column)) else {
            return CellValue::Null;
        };
        match (col, role) {
            (Column::Checked, Role::CheckState) => CellValue::Check(self.is_checked(id)),
            (Column::Amount, Role::Display | Role::Edit) => CellValue::text(self.amount(id)),
            (Column::Catalog(c), Role::Display | Role::Edit) => self.catalog.cell(row, c),
            _ => CellValue::Null,
        }
    }

    pub fn header_data(&self, column: usize) -> Option<String> {
        match self.column(column)? {
            Column::Checked => Some(String::new()),
            Column::Amount => Some("Amount".to_string()),
            Column::Catalog(c) => self.catalog.header(c),
        }
    }

    pub fn flags(&self, row: usize, column: usize) -> ItemFlags {
        let (Some(id), Some(col)) = (self.id_for_row(row), self.column(column)) else {
            return ItemFlags::NONE;
        };
        match col {
            Column::Checked => {
                ItemFlags::ENABLED | ItemFlags::SELECTABLE | ItemFlags::USER_CHECKABLE
            }
            Column::Amount if self.is_checked(id) => {
                ItemFlags::ENABLED | ItemFlags::SELECTABLE | ItemFlags::EDITABLE
            }
            Column::Amount => ItemFlags::ENABLED | ItemFlags::SELECTABLE,
            Column::Catalog(c) => self.catalog.flags(c),
        }
    }

    /// Applies an edit and writes it through to the pivot store.
    pub fn set_data(
        &mut self,
        row: usize,
        column: usize,
        value: &CellValue,
        role: Role,
    ) -> EditOutcome {
        let (Some(id), Some(col)) = (self.id_for_row(row), self.column(column)) else {
            return EditOutcome::Rejected(EditRejection::InvalidIndex { row, column });
        };
        match (col, role) {
            (Column::Checked, Role::CheckState) => match value {
                CellValue::Check(checked) => self.set_checked(row, id, *checked),
                _ => EditOutcome::Rejected(EditRejection::TypeMismatch { column }),
            },
            (Column::Amount, Role::Edit) => match value {
                CellValue::Text(amount) => self.set_amount(row, id, amount),
                CellValue::Null => self.set_amount(row, id, ""),
                _ => EditOutcome::Rejected(EditRejection::TypeMismatch { column }),
            },
            (Column::Catalog(c), Role::Edit) => self.set_catalog_cell(row, column, c, value),
            _ => EditOutcome::Rejected(EditRejection::UnsupportedRole { column, role }),
        }
    }

    /// Marks `ingredient_id` used or unused by the selected food.
    ///
    /// Ids the current catalog filter hides are rejected with `NotInView`.
    pub fn set_checked_by_id(&mut self, ingredient_id: i64, checked: bool) -> EditOutcome {
        match self.row_for_id(ingredient_id) {
            Some(row) => self.set_checked(row, ingredient_id, checked),
            None => EditOutcome::Rejected(EditRejection::NotInView { ingredient_id }),
        }
    }

    pub fn set_amount_by_id(&mut self, ingredient_id: i64, amount: &str) -> EditOutcome {
        match self.row_for_id(ingredient_id) {
            Some(row) => self.set_amount(row, ingredient_id, amount),
            None => EditOutcome::Rejected(EditRejection::NotInView { ingredient_id }),
        }
    }

    fn set_checked(&mut self, row: usize, id: i64, checked: bool) -> EditOutcome {
        if checked {
            self.associations.entry(id).or_default();
        } else {
            self.associations.remove(&id);
        }
        let event = ModelEvent::DataChanged {
            rows: row..row + 1,
            columns: self.derived_column_indices(),
            roles: self.derived_roles(),
        };
        self.emit(&event);

        let Some(food_id) = self.context.food_id() else {
            debug!(target: LOG_TARGET, ingredient_id = id, "no food selected; check not persisted");
            return EditOutcome::Applied(Durability::Skipped);
        };
        let result = if checked {
            self.pivot.link(food_id, id, None)
        } else {
            self.pivot.unlink(food_id, id)
        };
        Self::durability(result, food_id, id)
    }

    fn set_amount(&mut self, row: usize, id: i64, amount: &str) -> EditOutcome {
        let Some(column) = self.column_index(Column::Amount) else {
            return EditOutcome::Rejected(EditRejection::InvalidIndex {
                row,
                column: self.column_count(),
            });
        };
        let Some(food_id) = self.context.food_id() else {
            return EditOutcome::Rejected(EditRejection::NoContext);
        };
        let Some(stored) = self.associations.get_mut(&id) else {
            return EditOutcome::Rejected(EditRejection::AmountOnUnchecked { ingredient_id: id });
        };
        let amount = amount.trim();
        amount.clone_into(stored);
        self.emit(&ModelEvent::DataChanged {
            rows: row..row + 1,
            columns: vec![column],
            roles: vec![Role::Display, Role::Edit],
        });

        let result = self.pivot.set_amount(food_id, id, amount);
        Self::durability(result, food_id, id)
    }

    fn set_catalog_cell(
        &mut self,
        row: usize,
        column: usize,
        catalog_column: usize,
        value: &CellValue,
    ) -> EditOutcome {
        if !self
            .catalog
            .flags(catalog_column)
            .contains(ItemFlags::EDITABLE)
        {
            return EditOutcome::Rejected(EditRejection::ReadOnlyColumn { column });
        }
        match self.catalog.set_cell(row, catalog_column, value) {
            Ok(()) => {
                self.emit(&ModelEvent::DataChanged {
                    rows: row..row + 1,
                    columns: vec![column],
                    roles: vec![Role::Display, Role::Edit],
                });
                EditOutcome::Applied(Durability::Persisted)
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(target: LOG_TARGET, row, column, error = %message, "catalog edit failed");
                EditOutcome::Rejected(EditRejection::Catalog(message))
            }
        }
    }

    fn durability(result: Result<()>, food_id: i64, ingredient_id: i64) -> EditOutcome {
        match result {
            Ok(()) => EditOutcome::Applied(Durability::Persisted),
            Err(err) => {
                let message = format!("{err:#}");
                warn!(
                    target: LOG_TARGET,
                    food_id,
                    ingredient_id,
                    error = %message,
                    "write-through failed; in-memory state kept"
                );
                EditOutcome::Applied(Durability::Failed(message))
            }
        }
    }

    fn emit(&mut self, event: &ModelEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
