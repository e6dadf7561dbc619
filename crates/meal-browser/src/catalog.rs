//! "All meals" catalog: 26 concurrent first-letter searches merged into one list.
use std::future::Future;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use mealdb_common::error::CommonError;
use mealdb_common::gateway::{GatewayError, MealDbClient};
use mealdb_common::mcp_api::{PageResponse, Screen};
use mealdb_common::model::Meal;

use crate::error::AppError;
use crate::view::{FilteredCatalog, LoadState, PagedScreen};

pub const CATALOG_LETTERS: RangeInclusive<char> = 'a'..='z';

pub const CATALOG_LOAD_FAILED: &str = "Failed to load meals. Please try again later.";

/// Run `fetch` once per letter `a`..=`z`, all at once, and concatenate the results
/// in letter order.
///
/// A letter whose payload carried no well-formed list (`Ok(None)`) contributes
/// nothing. The first failing letter fails the whole aggregation.
pub async fn aggregate_with<T, F, Fut>(fetch: F) -> Result<Vec<T>, AppError>
where
    F: Fn(char) -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>, CommonError>>,
{
    let requests = CATALOG_LETTERS.map(|letter| {
        let request = fetch(letter);
        async move {
            request
                .await
                .map(|items| (letter, items))
                .map_err(|source| AppError::Aggregation { letter, source })
        }
    });

    let pages = try_join_all(requests).await?;

    let mut catalog = Vec::new();
    for (letter, items) in pages {
        match items {
            Some(items) => {
                debug!(%letter, count = items.len(), "letter merged");
                catalog.extend(items);
            }
            None => debug!(%letter, "letter returned no meal list, skipped"),
        }
    }
    info!(total = catalog.len(), "catalog aggregated");
    Ok(catalog)
}

/// Aggregate the catalog from the remote API.
///
/// A letter whose body is not JSON is discarded like a null list; only
/// transport failures and error statuses fail the load.
pub async fn aggregate(client: &MealDbClient) -> Result<Vec<Meal>, AppError> {
    aggregate_with(|letter| async move {
        match client.search_by_first_letter(letter).await {
            Ok(items) => Ok(items),
            Err(GatewayError::InvalidJson(e)) => {
                warn!(%letter, error = %e, "letter body was not JSON, skipped");
                Ok(None)
            }
            Err(e) => Err(CommonError::from(e)),
        }
    })
    .await
}

/// The all-meals and search screens: an aggregated catalog behind a name filter.
#[derive(Debug, Clone)]
pub struct CatalogScreen {
    screen: Screen,
    view: FilteredCatalog<Meal>,
    state: LoadState,
}

impl CatalogScreen {
    pub fn new(screen: Screen, page_size: NonZeroUsize) -> Self {
        Self {
            screen,
            view: FilteredCatalog::new(page_size),
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Install a finished aggregation. On failure the previous list is left untouched.
    pub fn finish_load(&mut self, result: Result<Vec<Meal>, AppError>) {
        match result {
            Ok(meals) => {
                self.view.set_source(meals);
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(screen = ?self.screen, error = %e, "catalog load failed");
                self.state = LoadState::Failed(CATALOG_LOAD_FAILED.to_string());
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.view.set_query(query);
    }
}

impl PagedScreen for CatalogScreen {
    fn next_page(&mut self) -> bool {
        self.view.next_page()
    }

    fn prev_page(&mut self) -> bool {
        self.view.prev_page()
    }

    fn page_response(&self) -> PageResponse {
        let query = match self.screen {
            Screen::Search => Some(self.view.query().to_string()),
            _ => None,
        };
        PageResponse {
            query,
            ..self.view.page_response(self.screen, &self.state)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::Query;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use mealdb_common::gateway::MealDbClientConfig;
    use mealdb_common::mcp_api::LoadStatus;
    use mealdb_common::model::MealId;
    use serde_json::json;
    use tokio::sync::Barrier;

    use super::*;

    fn meal(id: &str, name: &str) -> Meal {
        serde_json::from_value(json!({ "idMeal": id, "strMeal": name })).unwrap()
    }

    fn count_for(letter: char) -> usize {
        (letter as usize - 'a' as usize) % 4
    }

    #[tokio::test]
    async fn concatenates_every_letter_in_order() {
        let catalog = aggregate_with(|letter| async move {
            let items = (0..count_for(letter))
                .map(|i| format!("{letter}{i}"))
                .collect::<Vec<_>>();
            Ok::<_, CommonError>(Some(items))
        })
        .await
        .unwrap();

        let expected_len: usize = CATALOG_LETTERS.map(count_for).sum();
        assert_eq!(catalog.len(), expected_len);

        let firsts: Vec<char> = catalog.iter().filter_map(|s| s.chars().next()).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(firsts, sorted, "letter order preserved");
        assert_eq!(catalog[0], "b0");
        assert_eq!(catalog[1], "c0");
        assert_eq!(catalog[2], "c1");
    }

    #[tokio::test]
    async fn letters_without_a_list_are_skipped() {
        let catalog = aggregate_with(|letter| async move {
            if letter == 'b' {
                Ok::<_, CommonError>(Some(vec![meal("1", "Beef Stew")]))
            } else {
                Ok(None)
            }
        })
        .await
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, MealId::Number(1));
    }

    #[tokio::test]
    async fn one_failing_letter_fails_everything() {
        let result = aggregate_with(|letter| async move {
            if letter == 'q' {
                Err(CommonError::MissingCollection("meal"))
            } else {
                Ok(Some(vec![letter]))
            }
        })
        .await;

        match result {
            Err(AppError::Aggregation { letter, .. }) => assert_eq!(letter, 'q'),
            other => panic!("expected aggregation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicates_across_letters_are_kept() {
        let catalog = aggregate_with(|letter| async move {
            match letter {
                'a' | 'b' => {
                    Ok::<_, CommonError>(Some(vec![meal("7", "Apple & Blackberry Crumble")]))
                }
                _ => Ok(Some(Vec::new())),
            }
        })
        .await
        .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn letters_are_fetched_concurrently() {
        let barrier = Arc::new(Barrier::new(CATALOG_LETTERS.count()));
        let run = aggregate_with(|letter| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                Ok::<_, CommonError>(Some(vec![letter]))
            }
        });
        let catalog = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("all 26 requests should be in flight together")
            .unwrap();
        assert_eq!(catalog.len(), 26);
    }

    #[test]
    fn failed_reload_keeps_previous_catalog() {
        let mut screen = CatalogScreen::new(Screen::AllMeals, NonZeroUsize::new(9).unwrap());
        screen.begin_load();
        assert!(matches!(screen.page_response().status, LoadStatus::Loading));

        screen.finish_load(Ok(vec![meal("1", "Apam balik"), meal("2", "Bakewell tart")]));
        assert!(screen.state().is_ready());

        screen.begin_load();
        screen.finish_load(Err(AppError::Aggregation {
            letter: 'x',
            source: CommonError::MissingCollection("meal"),
        }));

        let page = screen.page_response();
        assert!(matches!(page.status, LoadStatus::Failed));
        assert_eq!(page.message.as_deref(), Some(CATALOG_LOAD_FAILED));
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(screen.view.filtered_len(), 2);
    }

    #[test]
    fn reload_in_flight_hides_previous_cards() {
        let mut screen = CatalogScreen::new(Screen::AllMeals, NonZeroUsize::new(9).unwrap());
        screen.finish_load(Ok(vec![meal("1", "Apam balik")]));
        assert_eq!(screen.page_response().items.len(), 1);

        screen.begin_load();
        let page = screen.page_response();
        assert!(matches!(page.status, LoadStatus::Loading));
        assert!(page.items.is_empty());
    }

    #[test]
    fn failed_first_load_shows_no_items() {
        let mut screen = CatalogScreen::new(Screen::Search, NonZeroUsize::new(9).unwrap());
        screen.begin_load();
        screen.finish_load(Err(AppError::Aggregation {
            letter: 'a',
            source: CommonError::MissingCollection("meal"),
        }));
        let page = screen.page_response();
        assert!(page.items.is_empty());
        assert_eq!(page.query.as_deref(), Some(""));
    }

    async fn letter_fixture() -> MealDbClient {
        async fn by_letter(Query(params): Query<HashMap<String, String>>) -> Response {
            match params.get("f").map(String::as_str) {
                Some("a") => Json(json!({ "meals": [
                    { "idMeal": "52768", "strMeal": "Apple Frangipan Tart" }
                ]}))
                .into_response(),
                Some("b") => Json(json!({ "meals": [
                    { "idMeal": "52767", "strMeal": "Bakewell tart" },
                    { "idMeal": "52855", "strMeal": "Banana Pancakes" }
                ]}))
                .into_response(),
                Some("x") => "<html>maintenance</html>".into_response(),
                _ => Json(json!({ "meals": null })).into_response(),
            }
        }

        let app = Router::new().route("/search.php", get(by_letter));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let config = MealDbClientConfig::new(format!("http://{addr}"), Duration::from_secs(5), 64);
        MealDbClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn non_json_letter_is_discarded_and_the_rest_merge() {
        let client = letter_fixture().await;
        let catalog = aggregate(&client).await.unwrap();
        let names: Vec<&str> = catalog.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Apple Frangipan Tart", "Bakewell tart", "Banana Pancakes"]);
    }

    #[test]
    fn search_screen_pages_through_filtered_meals() {
        let mut screen = CatalogScreen::new(Screen::Search, NonZeroUsize::new(1).unwrap());
        screen.finish_load(Ok(vec![
            meal("1", "Chicken Alfredo"),
            meal("2", "Beef Stew"),
            meal("3", "Chickpea Curry"),
        ]));
        screen.set_query("chick");

        let first = screen.page_response();
        assert_eq!(first.total_items, 2);
        assert_eq!(first.items[0].name, "Chicken Alfredo");

        assert!(screen.next_page());
        assert_eq!(screen.page_response().items[0].name, "Chickpea Curry");
        assert!(!screen.next_page());

        screen.set_query("CHICK");
        assert_eq!(screen.page_response().page, 0);
    }
}
