use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Longest name accepted for foods and ingredients.
pub const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub recipe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// An ingredient as used by one food, joined with its catalog name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodIngredient {
    pub food_id: i64,
    pub ingredient_id: i64,
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodDetail {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub ingredients: Vec<FoodIngredient>,
}

/// Currently selected food. An unset context renders every association empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoodContext(Option<i64>);

impl FoodContext {
    /// Raw id used by callers that still pass `-1` for "nothing selected".
    pub const NONE_SENTINEL: i64 = -1;

    pub const fn none() -> Self {
        Self(None)
    }

    pub const fn food(id: i64) -> Self {
        Self(Some(id))
    }

    /// Negative ids (the `-1` sentinel included) map to no selection.
    pub const fn from_raw(id: i64) -> Self {
        if id < 0 { Self(None) } else { Self(Some(id)) }
    }

    pub const fn food_id(self) -> Option<i64> {
        self.0
    }

    pub const fn is_set(self) -> bool {
        self.0.is_some()
    }

    pub fn as_raw(self) -> i64 {
        self.0.unwrap_or(Self::NONE_SENTINEL)
    }
}

impl From<Option<i64>> for FoodContext {
    fn from(id: Option<i64>) -> Self {
        id.map_or(Self::none(), Self::from_raw)
    }
}

/// Trim and validate a food or ingredient name.
pub fn validate_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("{kind} name must not be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        bail!("{kind} name must be at most {MAX_NAME_LEN} characters");
    }
    Ok(trimmed.to_string())
}

/// Normalise a free-text recipe: blank text means "no recipe".
pub fn normalize_recipe(recipe: Option<&str>) -> Option<String> {
    recipe
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
}
