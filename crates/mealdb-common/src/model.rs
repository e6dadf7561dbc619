use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of `strIngredientN` / `strMeasureN` slots on a meal record.
pub const MEAL_INGREDIENT_SLOTS: usize = 20;

const COLLECTION_KEY: &str = "meals";

/// Meal identifier. The API has served it both as a JSON string and as a number.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum MealId {
    Text(String),
    Number(u64),
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealId::Text(s) => f.write_str(s),
            MealId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl PartialEq for MealId {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for MealId {}

/// Anything with a display name that a text query can be matched against.
pub trait Named {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct MealSummary {
    #[serde(rename = "idMeal")]
    pub id: MealId,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

impl Named for MealSummary {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct IngredientLine {
    pub ingredient: String,
    pub measure: String,
}

/// Full meal record as returned by `search.php`, `lookup.php` and `random.php`.
///
/// The flat numbered ingredient and measure fields are folded into
/// [`Meal::ingredients`] during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawMeal")]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub tags: Option<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub ingredients: Vec<IngredientLine>,
}

impl Named for Meal {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Deserialize)]
struct RawMeal {
    #[serde(rename = "idMeal")]
    id: MealId,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strMealThumb", default)]
    thumbnail: Option<String>,
    #[serde(rename = "strCategory", default)]
    category: Option<String>,
    #[serde(rename = "strArea", default)]
    area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    instructions: Option<String>,
    #[serde(rename = "strTags", default)]
    tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    youtube: Option<String>,
    #[serde(rename = "strSource", default)]
    source: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawMeal> for Meal {
    fn from(raw: RawMeal) -> Self {
        let ingredients = (1..=MEAL_INGREDIENT_SLOTS)
            .filter_map(|slot| {
                let ingredient = non_blank(raw.rest.get(&format!("strIngredient{slot}")))?;
                let measure = non_blank(raw.rest.get(&format!("strMeasure{slot}")))?;
                Some(IngredientLine {
                    ingredient,
                    measure,
                })
            })
            .collect();

        Self {
            id: raw.id,
            name: raw.name,
            thumbnail: raw.thumbnail,
            category: raw.category,
            area: raw.area,
            instructions: raw.instructions,
            tags: raw.tags,
            youtube: raw.youtube,
            source: raw.source,
            ingredients,
        }
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CategoryName {
    #[serde(rename = "strCategory")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct AreaName {
    #[serde(rename = "strArea")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct IngredientName {
    #[serde(rename = "strIngredient")]
    pub name: String,
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(CategoryName, AreaName, IngredientName);

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

/// Pull the `meals` collection out of a response envelope.
///
/// Returns `None` when the key is missing, null, not an array, or the array
/// does not deserialize as a list of `T`.
pub fn meals_from_envelope<T: DeserializeOwned>(envelope: &Value) -> Option<Vec<T>> {
    let items = envelope.get(COLLECTION_KEY)?;
    if !items.is_array() {
        return None;
    }
    Vec::<T>::deserialize(items).ok()
}
