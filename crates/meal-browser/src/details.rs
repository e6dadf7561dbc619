use tracing::{error, info};

use mealdb_common::error::CommonError;
use mealdb_common::gateway::MealDbClient;
use mealdb_common::mcp_api::{LoadStatus, MealDetail, MealDetailResponse};
use mealdb_common::model::Meal;

pub const DETAILS_FAILED: &str = "Error fetching meal details.";
pub const DETAILS_NOT_FOUND: &str = "Meal details not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Found(Box<Meal>),
    NotFound,
}

/// Meal links carry the name with `-` in place of spaces.
pub fn name_from_slug(slug: &str) -> String {
    slug.replace('-', " ")
}

pub fn first_match(meals: Vec<Meal>) -> DetailOutcome {
    match meals.into_iter().next() {
        Some(meal) => DetailOutcome::Found(Box::new(meal)),
        None => DetailOutcome::NotFound,
    }
}

/// Search by the name in `slug` and take the first hit. An empty result is
/// `NotFound`; a null result has no list to index and counts as a failure.
pub async fn lookup(client: &MealDbClient, slug: &str) -> Result<DetailOutcome, CommonError> {
    let name = name_from_slug(slug);
    let meals = CommonError::require(client.search_by_name(&name).await?, "meal")?;
    let outcome = first_match(meals);
    if outcome == DetailOutcome::NotFound {
        info!(name = %name, "no meal matched");
    }
    Ok(outcome)
}

pub fn detail_response(result: Result<DetailOutcome, CommonError>) -> MealDetailResponse {
    match result {
        Ok(DetailOutcome::Found(meal)) => MealDetailResponse {
            status: LoadStatus::Ready,
            message: None,
            meal: Some(MealDetail::from(meal.as_ref())),
        },
        Ok(DetailOutcome::NotFound) => MealDetailResponse {
            status: LoadStatus::Ready,
            message: Some(DETAILS_NOT_FOUND.to_string()),
            meal: None,
        },
        Err(e) => {
            error!(error = %e, "meal detail lookup failed");
            MealDetailResponse {
                status: LoadStatus::Failed,
                message: Some(DETAILS_FAILED.to_string()),
                meal: None,
            }
        }
    }
}
