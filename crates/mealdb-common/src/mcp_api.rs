use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{IngredientLine, Meal, MealSummary};

/// A browsable page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Every meal, aggregated from the per-letter search.
    AllMeals,
    /// The aggregated catalog narrowed by a name query.
    Search,
    /// Meals of the selected category.
    Categories,
    /// Meals of the selected national cuisine.
    Areas,
    /// Meals containing the selected ingredient.
    Ingredients,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ScreenParams {
    /// Which page to act on: all_meals, search, categories, areas or ingredients.
    pub screen: Screen,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchMealsParams {
    /// Case-insensitive text matched against meal names. Empty shows every meal.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SelectParams {
    /// Exact option name as returned by the matching list tool.
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListIngredientsParams {
    /// Optional case-insensitive filter over ingredient names.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MealDetailsParams {
    /// Meal name, optionally with `-` in place of spaces (e.g. "Beef-Wellington").
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Failed,
    Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MealCard {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
}

impl From<&MealSummary> for MealCard {
    fn from(meal: &MealSummary) -> Self {
        Self {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            thumbnail: meal.thumbnail.clone(),
        }
    }
}

impl From<&Meal> for MealCard {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            thumbnail: meal.thumbnail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageResponse {
    pub screen: Screen,
    pub status: LoadStatus,
    /// User-facing message when `status` is `failed`.
    pub message: Option<String>,
    /// Active name query, for screens that filter.
    pub query: Option<String>,
    /// Selected category, area or ingredient, for selection screens.
    pub selected: Option<String>,
    pub items: Vec<MealCard>,
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// Empty grid slots left on a short final page.
    pub placeholders: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OptionsResponse {
    pub screen: Screen,
    pub status: LoadStatus,
    pub message: Option<String>,
    pub options: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngredientEntry {
    pub ingredient: String,
    pub measure: String,
}

impl From<&IngredientLine> for IngredientEntry {
    fn from(line: &IngredientLine) -> Self {
        Self {
            ingredient: line.ingredient.clone(),
            measure: line.measure.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MealDetail {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub tags: Option<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub ingredients: Vec<IngredientEntry>,
}

impl From<&Meal> for MealDetail {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            thumbnail: meal.thumbnail.clone(),
            category: meal.category.clone(),
            area: meal.area.clone(),
            instructions: meal.instructions.clone(),
            tags: meal.tags.clone(),
            youtube: meal.youtube.clone(),
            source: meal.source.clone(),
            ingredients: meal.ingredients.iter().map(IngredientEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MealDetailResponse {
    pub status: LoadStatus,
    pub message: Option<String>,
    pub meal: Option<MealDetail>,
}
