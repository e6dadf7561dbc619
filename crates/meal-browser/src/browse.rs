//! Category, area and ingredient screens: pick one option from a list, page
//! through the meals that belong to it.
use std::fmt;
use std::num::NonZeroUsize;

use tracing::{error, info};

use mealdb_common::error::CommonError;
use mealdb_common::gateway::MealDbClient;
use mealdb_common::mcp_api::{OptionsResponse, PageResponse, Screen};
use mealdb_common::model::MealSummary;

use crate::error::AppError;
use crate::view::{matches_query, FilteredCatalog, LoadState, PagedScreen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Categories,
    Areas,
    Ingredients,
}

impl BrowserKind {
    pub fn screen(self) -> Screen {
        match self {
            BrowserKind::Categories => Screen::Categories,
            BrowserKind::Areas => Screen::Areas,
            BrowserKind::Ingredients => Screen::Ingredients,
        }
    }

    pub fn options_failed_message(self) -> &'static str {
        match self {
            BrowserKind::Categories => "Failed to load meal categories.",
            BrowserKind::Areas => "Failed to load categories.",
            BrowserKind::Ingredients => "Failed to load ingredients.",
        }
    }

    pub fn meals_failed_message(self, selected: &str) -> String {
        match self {
            BrowserKind::Categories => format!("Failed to load menu items for {selected}"),
            BrowserKind::Areas => "Failed to load menu items.".to_string(),
            BrowserKind::Ingredients => "Failed to load meals.".to_string(),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrowserKind::Categories => "category",
            BrowserKind::Areas => "area",
            BrowserKind::Ingredients => "ingredient",
        })
    }
}

/// Fetch the option names for a screen.
///
/// A missing category list is shown as empty; a missing area or ingredient list is a failure.
pub async fn fetch_options(
    client: &MealDbClient,
    kind: BrowserKind,
) -> Result<Vec<String>, CommonError> {
    let names = match kind {
        BrowserKind::Categories => client
            .list_categories()
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.name)
            .collect(),
        BrowserKind::Areas => CommonError::require(client.list_areas().await?, "area")?
            .into_iter()
            .map(|a| a.name)
            .collect(),
        BrowserKind::Ingredients => {
            CommonError::require(client.list_ingredients().await?, "ingredient")?
                .into_iter()
                .map(|i| i.name)
                .collect()
        }
    };
    Ok(names)
}

/// Fetch the meals for one option. A null collection means no meals.
pub async fn fetch_meals(
    client: &MealDbClient,
    kind: BrowserKind,
    name: &str,
) -> Result<Vec<MealSummary>, CommonError> {
    let meals = match kind {
        BrowserKind::Categories => client.filter_by_category(name).await?,
        BrowserKind::Areas => client.filter_by_area(name).await?,
        BrowserKind::Ingredients => client.filter_by_ingredient(name).await?,
    };
    Ok(meals.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct SelectionBrowser {
    kind: BrowserKind,
    options: Vec<String>,
    options_state: LoadState,
    option_filter: String,
    selected: Option<String>,
    meals: FilteredCatalog<MealSummary>,
    meals_state: LoadState,
}

impl SelectionBrowser {
    pub fn new(kind: BrowserKind, page_size: NonZeroUsize) -> Self {
        Self {
            kind,
            options: Vec::new(),
            options_state: LoadState::Idle,
            option_filter: String::new(),
            selected: None,
            meals: FilteredCatalog::new(page_size),
            meals_state: LoadState::Idle,
        }
    }

    pub fn options_ready(&self) -> bool {
        self.options_state.is_ready()
    }

    pub fn begin_options_load(&mut self) {
        self.options_state = LoadState::Loading;
    }

    /// Install the option list. Returns the option whose meals should be loaded
    /// next: the first option, when nothing is selected yet.
    pub fn finish_options_load(
        &mut self,
        result: Result<Vec<String>, CommonError>,
    ) -> Option<String> {
        match result {
            Ok(options) => {
                info!(kind = %self.kind, count = options.len(), "options loaded");
                self.options = options;
                self.options_state = LoadState::Ready;
                if self.selected.is_none() {
                    let first = self.visible_options().first().map(|s| s.to_string());
                    self.selected = first;
                }
                self.selected.clone()
            }
            Err(e) => {
                error!(kind = %self.kind, error = %e, "options load failed");
                let message = self.kind.options_failed_message().to_string();
                self.options_state = LoadState::Failed(message);
                None
            }
        }
    }

    /// Options that pass the current option filter, in source order.
    pub fn visible_options(&self) -> Vec<&str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|name| matches_query(name, &self.option_filter))
            .collect()
    }

    /// Narrow the option list. If the selection is filtered out, it moves to the
    /// first visible option (or to nothing). Returns the new selection when it changed.
    pub fn set_option_filter(&mut self, filter: impl Into<String>) -> Option<String> {
        self.option_filter = filter.into();
        if self.option_filter.is_empty() {
            return None;
        }

        let next = {
            let visible = self.visible_options();
            let still_visible = self
                .selected
                .as_deref()
                .is_some_and(|s| visible.contains(&s));
            if still_visible {
                return None;
            }
            visible.first().map(|s| s.to_string())
        };
        self.selected = next.clone();
        if next.is_none() {
            self.meals.set_source(Vec::new());
            self.meals_state = LoadState::Idle;
        }
        next
    }

    /// Select an option by exact name. Only names from the loaded list are accepted.
    pub fn select(&mut self, name: &str) -> Result<(), AppError> {
        if !self.options.iter().any(|o| o == name) {
            return Err(AppError::UnknownOption {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    pub fn begin_meals_load(&mut self) {
        self.meals_state = LoadState::Loading;
    }

    /// Install the meals fetched for `name`. Results for an option that is no
    /// longer selected are dropped.
    pub fn finish_meals_load(&mut self, name: &str, result: Result<Vec<MealSummary>, CommonError>) {
        if self.selected.as_deref() != Some(name) {
            info!(kind = %self.kind, name, "dropping meals for a stale selection");
            return;
        }
        match result {
            Ok(meals) => {
                self.meals.set_source(meals);
                self.meals_state = LoadState::Ready;
            }
            Err(e) => {
                error!(kind = %self.kind, name, error = %e, "meals load failed");
                self.meals_state = LoadState::Failed(self.kind.meals_failed_message(name));
            }
        }
    }

    fn state(&self) -> &LoadState {
        if matches!(self.options_state, LoadState::Failed(_) | LoadState::Loading) {
            return &self.options_state;
        }
        &self.meals_state
    }

    pub fn options_response(&self) -> OptionsResponse {
        OptionsResponse {
            screen: self.kind.screen(),
            status: self.options_state.status(),
            message: self.options_state.message().map(str::to_string),
            options: self.visible_options().into_iter().map(str::to_string).collect(),
            selected: self.selected.clone(),
        }
    }
}

impl PagedScreen for SelectionBrowser {
    fn next_page(&mut self) -> bool {
        self.meals.next_page()
    }

    fn prev_page(&mut self) -> bool {
        self.meals.prev_page()
    }

    fn page_response(&self) -> PageResponse {
        PageResponse {
            selected: self.selected.clone(),
            ..self.meals.page_response(self.kind.screen(), self.state())
        }
    }
}
