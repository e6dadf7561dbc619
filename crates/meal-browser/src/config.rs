use std::num::NonZeroUsize;

use mealdb_common::gateway::MealDbClientConfig;

use crate::error::AppError;

const DEFAULT_MEAL_PAGE_SIZE: usize = 9;
const DEFAULT_INGREDIENT_PAGE_SIZE: usize = 12;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Meal cards per page on the all-meals, search, category and area screens.
    pub meal_page_size: NonZeroUsize,
    /// Meal cards per page on the ingredient screen.
    pub ingredient_page_size: NonZeroUsize,
    /// Serve MCP over TCP on this address instead of stdio.
    pub tcp_listen_addr: Option<String>,
    pub mealdb: MealDbClientConfig,
}

impl Config {
    /// Optional:
    /// - `MEAL_PAGE_SIZE` (default: 9)
    /// - `INGREDIENT_PAGE_SIZE` (default: 12)
    /// - `MCP_TCP_LISTEN_ADDR` (e.g. "127.0.0.1:7070"; stdio when unset)
    /// - `MEALDB_BASE_URL`, `MEALDB_TIMEOUT_SECS`, `MEALDB_MAX_ERROR_BODY_BYTES`
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            meal_page_size: parse_page_size(
                "MEAL_PAGE_SIZE",
                std::env::var("MEAL_PAGE_SIZE").ok().as_deref(),
                DEFAULT_MEAL_PAGE_SIZE,
            )?,
            ingredient_page_size: parse_page_size(
                "INGREDIENT_PAGE_SIZE",
                std::env::var("INGREDIENT_PAGE_SIZE").ok().as_deref(),
                DEFAULT_INGREDIENT_PAGE_SIZE,
            )?,
            tcp_listen_addr: std::env::var("MCP_TCP_LISTEN_ADDR").ok(),
            mealdb: MealDbClientConfig::from_env(),
        })
    }
}

fn parse_page_size(
    var: &str,
    raw: Option<&str>,
    default: usize,
) -> Result<NonZeroUsize, AppError> {
    let value = match raw.map(str::trim) {
        None | Some("") => default,
        Some(s) => s
            .parse::<usize>()
            .map_err(|e| AppError::Config(format!("{var} must be a positive integer: {e}")))?,
    };
    NonZeroUsize::new(value)
        .ok_or_else(|| AppError::Config(format!("{var} must be greater than 0")))
}
