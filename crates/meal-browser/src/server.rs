/// MCP server for browsing MealDB recipes.
///
/// Each screen of the browser is a set of tools over per-session view state:
/// - `load_all_meals` / `search_meals`: the aggregated catalog, optionally filtered by name
/// - `list_categories` / `select_category`, `list_areas` / `select_area`,
///   `list_ingredients` / `select_ingredient`: option lists and the meals of one option
/// - `next_page` / `prev_page` / `current_page`: page window of any screen
/// - `get_meal_details` / `random_meal`: a single meal with its ingredient lines
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use mealdb_common::gateway::MealDbClient;
use mealdb_common::mcp_api::{
    ListIngredientsParams, MealDetailResponse, MealDetailsParams, OptionsResponse, PageResponse,
    Screen, ScreenParams, SearchMealsParams, SelectParams,
};

use crate::browse::{self, BrowserKind, SelectionBrowser};
use crate::catalog::{self, CatalogScreen};
use crate::config::Config;
use crate::details::{self, DetailOutcome};
use crate::view::PagedScreen;

/// View state of one browsing session. Discarded when the session ends.
pub struct SessionState {
    pub all_meals: CatalogScreen,
    pub search: CatalogScreen,
    pub categories: SelectionBrowser,
    pub areas: SelectionBrowser,
    pub ingredients: SelectionBrowser,
}

impl SessionState {
    pub fn new(config: &Config) -> Self {
        Self {
            all_meals: CatalogScreen::new(Screen::AllMeals, config.meal_page_size),
            search: CatalogScreen::new(Screen::Search, config.meal_page_size),
            categories: SelectionBrowser::new(BrowserKind::Categories, config.meal_page_size),
            areas: SelectionBrowser::new(BrowserKind::Areas, config.meal_page_size),
            ingredients: SelectionBrowser::new(
                BrowserKind::Ingredients,
                config.ingredient_page_size,
            ),
        }
    }

    fn catalog_mut(&mut self, screen: Screen) -> &mut CatalogScreen {
        match screen {
            Screen::Search => &mut self.search,
            _ => &mut self.all_meals,
        }
    }

    fn browser_mut(&mut self, kind: BrowserKind) -> &mut SelectionBrowser {
        match kind {
            BrowserKind::Categories => &mut self.categories,
            BrowserKind::Areas => &mut self.areas,
            BrowserKind::Ingredients => &mut self.ingredients,
        }
    }

    fn screen_mut(&mut self, screen: Screen) -> &mut dyn PagedScreen {
        match screen {
            Screen::AllMeals => &mut self.all_meals,
            Screen::Search => &mut self.search,
            Screen::Categories => &mut self.categories,
            Screen::Areas => &mut self.areas,
            Screen::Ingredients => &mut self.ingredients,
        }
    }
}

#[derive(Clone)]
pub struct MealBrowserServer {
    client: Arc<MealDbClient>,
    config: Config,
    session: Arc<RwLock<SessionState>>,
    tool_router: ToolRouter<MealBrowserServer>,
}

impl MealBrowserServer {
    pub fn new(client: Arc<MealDbClient>, config: Config) -> Self {
        let session = Arc::new(RwLock::new(SessionState::new(&config)));
        Self {
            client,
            config,
            session,
            tool_router: Self::tool_router(),
        }
    }

    /// A server sharing this one's HTTP client but with fresh view state.
    pub fn new_session(&self) -> Self {
        Self::new(Arc::clone(&self.client), self.config.clone())
    }

    /// Re-run the catalog aggregation for the all-meals or search screen.
    async fn load_catalog(&self, screen: Screen) {
        self.session.write().await.catalog_mut(screen).begin_load();
        let result = catalog::aggregate(&self.client).await;
        self.session
            .write()
            .await
            .catalog_mut(screen)
            .finish_load(result);
    }

    /// Load the option list for `kind` unless it is already loaded, then the
    /// meals of the default selection.
    async fn ensure_options(&self, kind: BrowserKind) {
        {
            let mut state = self.session.write().await;
            let browser = state.browser_mut(kind);
            if browser.options_ready() {
                return;
            }
            browser.begin_options_load();
        }

        let result = browse::fetch_options(&self.client, kind).await;
        let first = self
            .session
            .write()
            .await
            .browser_mut(kind)
            .finish_options_load(result);

        if let Some(name) = first {
            self.load_selection(kind, name).await;
        }
    }

    async fn load_selection(&self, kind: BrowserKind, name: String) {
        self.session
            .write()
            .await
            .browser_mut(kind)
            .begin_meals_load();
        let result = browse::fetch_meals(&self.client, kind, &name).await;
        self.session
            .write()
            .await
            .browser_mut(kind)
            .finish_meals_load(&name, result);
    }

    async fn select(&self, kind: BrowserKind, name: &str) -> Result<PageResponse, String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("name must not be empty".to_string());
        }

        self.ensure_options(kind).await;
        {
            let mut state = self.session.write().await;
            let browser = state.browser_mut(kind);
            if !browser.options_ready() {
                return Ok(browser.page_response());
            }
            browser.select(&name).map_err(|e| e.to_string())?;
        }
        info!(%kind, name = %name, "option selected");

        self.load_selection(kind, name).await;
        Ok(self.page(kind.screen()).await)
    }

    async fn options(&self, kind: BrowserKind) -> OptionsResponse {
        self.ensure_options(kind).await;
        self.session
            .write()
            .await
            .browser_mut(kind)
            .options_response()
    }

    async fn page(&self, screen: Screen) -> PageResponse {
        self.session.write().await.screen_mut(screen).page_response()
    }
}

#[tool_router]
impl MealBrowserServer {
    #[tool(description = "Load every meal (one request per letter a-z, all at once) and show the first page. Any failed request fails the whole load.")]
    async fn load_all_meals(&self) -> Result<Json<PageResponse>, String> {
        self.load_catalog(Screen::AllMeals).await;
        Ok(Json(self.page(Screen::AllMeals).await))
    }

    #[tool(description = "Filter all meals by a case-insensitive name query and show the first page of matches. Loads the catalog on first use.")]
    async fn search_meals(
        &self,
        Parameters(params): Parameters<SearchMealsParams>,
    ) -> Result<Json<PageResponse>, String> {
        let loaded = self.session.read().await.search.state().is_ready();
        if !loaded {
            self.load_catalog(Screen::Search).await;
        }
        self.session.write().await.search.set_query(params.query);
        Ok(Json(self.page(Screen::Search).await))
    }

    #[tool(description = "Advance a screen to its next page. Does nothing on the last page.")]
    async fn next_page(
        &self,
        Parameters(params): Parameters<ScreenParams>,
    ) -> Result<Json<PageResponse>, String> {
        let mut state = self.session.write().await;
        let screen = state.screen_mut(params.screen);
        screen.next_page();
        Ok(Json(screen.page_response()))
    }

    #[tool(description = "Move a screen back to its previous page. Does nothing on the first page.")]
    async fn prev_page(
        &self,
        Parameters(params): Parameters<ScreenParams>,
    ) -> Result<Json<PageResponse>, String> {
        let mut state = self.session.write().await;
        let screen = state.screen_mut(params.screen);
        screen.prev_page();
        Ok(Json(screen.page_response()))
    }

    #[tool(description = "Show the current page of a screen, including its loading or error state.")]
    async fn current_page(
        &self,
        Parameters(params): Parameters<ScreenParams>,
    ) -> Result<Json<PageResponse>, String> {
        Ok(Json(self.page(params.screen).await))
    }

    #[tool(description = "List meal categories. The first category is selected on first load.")]
    async fn list_categories(&self) -> Result<Json<OptionsResponse>, String> {
        Ok(Json(self.options(BrowserKind::Categories).await))
    }

    #[tool(description = "Select a meal category by name and show the first page of its meals.")]
    async fn select_category(
        &self,
        Parameters(params): Parameters<SelectParams>,
    ) -> Result<Json<PageResponse>, String> {
        Ok(Json(self.select(BrowserKind::Categories, &params.name).await?))
    }

    #[tool(description = "List national cuisines (areas). The first area is selected on first load.")]
    async fn list_areas(&self) -> Result<Json<OptionsResponse>, String> {
        Ok(Json(self.options(BrowserKind::Areas).await))
    }

    #[tool(description = "Select a national cuisine by name and show the first page of its meals.")]
    async fn select_area(
        &self,
        Parameters(params): Parameters<SelectParams>,
    ) -> Result<Json<PageResponse>, String> {
        Ok(Json(self.select(BrowserKind::Areas, &params.name).await?))
    }

    #[tool(description = "List ingredients, optionally narrowed by a case-insensitive filter. If the selected ingredient is filtered out, the first match becomes selected.")]
    async fn list_ingredients(
        &self,
        Parameters(params): Parameters<ListIngredientsParams>,
    ) -> Result<Json<OptionsResponse>, String> {
        self.ensure_options(BrowserKind::Ingredients).await;

        let changed = self
            .session
            .write()
            .await
            .ingredients
            .set_option_filter(params.filter.unwrap_or_default());
        if let Some(name) = changed {
            self.load_selection(BrowserKind::Ingredients, name).await;
        }

        Ok(Json(
            self.session.read().await.ingredients.options_response(),
        ))
    }

    #[tool(description = "Select an ingredient by name and show the first page of meals that use it.")]
    async fn select_ingredient(
        &self,
        Parameters(params): Parameters<SelectParams>,
    ) -> Result<Json<PageResponse>, String> {
        Ok(Json(self.select(BrowserKind::Ingredients, &params.name).await?))
    }

    #[tool(description = "Get one meal's details (category, cuisine, instructions, ingredient lines) by name; dashes in the slug are read as spaces.")]
    async fn get_meal_details(
        &self,
        Parameters(params): Parameters<MealDetailsParams>,
    ) -> Result<Json<MealDetailResponse>, String> {
        let slug = params.slug.trim().to_string();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }
        let result = details::lookup(&self.client, &slug).await;
        Ok(Json(details::detail_response(result)))
    }

    #[tool(description = "Get the details of one random meal.")]
    async fn random_meal(&self) -> Result<Json<MealDetailResponse>, String> {
        let result = self
            .client
            .random_meal()
            .await
            .map(|meal| match meal {
                Some(meal) => DetailOutcome::Found(Box::new(meal)),
                None => DetailOutcome::NotFound,
            })
            .map_err(Into::into);
        Ok(Json(details::detail_response(result)))
    }
}

#[tool_handler]
impl ServerHandler for MealBrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "meal-browser".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Recipe browser over TheMealDB. Use load_all_meals or search_meals for the full \
catalog, list_categories/list_areas/list_ingredients with the matching select_* tool to browse \
by group, next_page/prev_page/current_page to move through any screen, and get_meal_details or \
random_meal for a single recipe."
                    .to_string(),
            ),
        }
    }
}
