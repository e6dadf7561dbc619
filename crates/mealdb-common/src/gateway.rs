//! HTTP gateway to the public MealDB JSON API.
//!
//! One configured `reqwest::Client` bound to a base URL. Every call is a single
//! GET: there is no retry, backoff or caching at this layer.
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{
    meals_from_envelope, AreaName, CategoryName, IngredientName, Meal, MealSummary,
};

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

#[derive(Clone, Debug)]
pub struct MealDbClientConfig {
    pub base_url: String,
    pub default_timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl MealDbClientConfig {
    /// Optional:
    /// - `MEALDB_BASE_URL` (default: the public v1 test-key endpoint)
    /// - `MEALDB_TIMEOUT_SECS` (default: 30)
    /// - `MEALDB_MAX_ERROR_BODY_BYTES` (default: 8192)
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MEALDB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let default_timeout = std::env::var("MEALDB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_error_body_bytes = std::env::var("MEALDB_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self::new(base_url, default_timeout, max_error_body_bytes)
    }

    pub fn new(base_url: String, default_timeout: Duration, max_error_body_bytes: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
            max_error_body_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct MealDbClient {
    config: MealDbClientConfig,
    http: reqwest::Client,
}

impl MealDbClient {
    pub fn new(config: MealDbClientConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent("meal-browser")
            .build()?;
        Ok(Self { config, http })
    }

    /// GET `{base_url}/{path}` and return the parsed JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        self.get_json_with_query(path, &[]).await
    }

    /// Like [`MealDbClient::get_json`], with URL-encoded query parameters.
    pub async fn get_json_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let url = format!("{}/{}", self.config.base_url, path.trim_start_matches('/'));
        debug!(url = %url, ?query, "mealdb request");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .timeout(self.config.default_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
            warn!(url = %url, %status, "mealdb returned an error status");
            return Err(GatewayError::Upstream { status, body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn collection<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Vec<T>>, GatewayError> {
        let envelope = self.get_json_with_query(path, query).await?;
        let items = meals_from_envelope(&envelope);
        if items.is_none() {
            debug!(path, ?query, "response carried no meal collection");
        }
        Ok(items)
    }

    pub async fn list_categories(&self) -> Result<Option<Vec<CategoryName>>, GatewayError> {
        self.collection("list.php", &[("c", "list")]).await
    }

    pub async fn list_areas(&self) -> Result<Option<Vec<AreaName>>, GatewayError> {
        self.collection("list.php", &[("a", "list")]).await
    }

    pub async fn list_ingredients(&self) -> Result<Option<Vec<IngredientName>>, GatewayError> {
        self.collection("list.php", &[("i", "list")]).await
    }

    pub async fn filter_by_category(
        &self,
        category: &str,
    ) -> Result<Option<Vec<MealSummary>>, GatewayError> {
        self.collection("filter.php", &[("c", category)]).await
    }

    pub async fn filter_by_area(
        &self,
        area: &str,
    ) -> Result<Option<Vec<MealSummary>>, GatewayError> {
        self.collection("filter.php", &[("a", area)]).await
    }

    pub async fn filter_by_ingredient(
        &self,
        ingredient: &str,
    ) -> Result<Option<Vec<MealSummary>>, GatewayError> {
        self.collection("filter.php", &[("i", ingredient)]).await
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Option<Vec<Meal>>, GatewayError> {
        self.collection("search.php", &[("s", name)]).await
    }

    pub async fn search_by_first_letter(
        &self,
        letter: char,
    ) -> Result<Option<Vec<Meal>>, GatewayError> {
        let letter = letter.to_string();
        self.collection("search.php", &[("f", letter.as_str())]).await
    }

    pub async fn random_meal(&self) -> Result<Option<Meal>, GatewayError> {
        let meals: Option<Vec<Meal>> = self.collection("random.php", &[]).await?;
        Ok(meals.and_then(|m| m.into_iter().next()))
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        if let Some(name) = params.get("s") {
            if name == "Beef Stew" {
                return Json(json!({ "meals": [
                    { "idMeal": "1", "strMeal": "Beef Stew", "strMealThumb": "b.jpg",
                      "strIngredient1": "Beef", "strMeasure1": "1kg" }
                ]}));
            }
            return Json(json!({ "meals": null }));
        }
        match params.get("f").map(String::as_str) {
            Some("a") => Json(json!({ "meals": [
                { "idMeal": 2, "strMeal": "Apple Frangipan Tart", "strMealThumb": "a.jpg" }
            ]})),
            _ => Json(json!({ "meals": null })),
        }
    }

    async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        if params.contains_key("c") {
            Json(json!({ "meals": [{ "strCategory": "Beef" }, { "strCategory": "Dessert" }] }))
        } else {
            Json(json!({ "meals": null }))
        }
    }

    async fn fixture() -> MealDbClient {
        let app = Router::new()
            .route("/search.php", get(search))
            .route("/list.php", get(list))
            .route(
                "/random.php",
                get(|| async {
                    Json(json!({ "meals": [{ "idMeal": "7", "strMeal": "Kumpir" }] }))
                }),
            )
            .route(
                "/broken.php",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
            )
            .route("/garbage.php", get(|| async { "<html>not json</html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = MealDbClientConfig::new(format!("http://{addr}/"), Duration::from_secs(5), 8);
        MealDbClient::new(config).unwrap()
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = MealDbClientConfig::new(
            "http://localhost:9000/api/".to_string(),
            Duration::from_secs(1),
            16,
        );
        assert_eq!(config.base_url, "http://localhost:9000/api");
    }

    #[tokio::test]
    async fn search_by_name_encodes_query_and_parses_detail() {
        let client = fixture().await;
        let meals = client.search_by_name("Beef Stew").await.unwrap().unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].ingredients.len(), 1);
        assert_eq!(meals[0].ingredients[0].measure, "1kg");
    }

    #[tokio::test]
    async fn null_collection_is_none_not_error() {
        let client = fixture().await;
        assert!(client.search_by_first_letter('q').await.unwrap().is_none());
        assert!(client.list_areas().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wrappers_hit_expected_endpoints() {
        let client = fixture().await;

        let categories = client.list_categories().await.unwrap().unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Beef", "Dessert"]);

        let by_letter = client.search_by_first_letter('a').await.unwrap().unwrap();
        assert_eq!(by_letter[0].id.to_string(), "2");

        let random = client.random_meal().await.unwrap().unwrap();
        assert_eq!(random.name, "Kumpir");
    }

    #[tokio::test]
    async fn error_status_carries_truncated_body() {
        let client = fixture().await;
        let err = client.get_json("broken.php").await.unwrap_err();
        match err {
            GatewayError::Upstream { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "upstream");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let client = fixture().await;
        let err = client.get_json("/garbage.php").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidJson(_)));
    }
}
