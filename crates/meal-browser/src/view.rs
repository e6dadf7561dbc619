//! Filter-and-paginate view model shared by every browsable screen.
use std::num::NonZeroUsize;
use std::ops::Range;

use mealdb_common::mcp_api::{LoadStatus, MealCard, PageResponse, Screen};
use mealdb_common::model::Named;

/// Fixed-size page window over a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: NonZeroUsize,
}

impl Pager {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page: 0, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Index range of the current page, clamped to `len`.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = self.page.saturating_mul(self.page_size()).min(len);
        let end = start.saturating_add(self.page_size()).min(len);
        start..end
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self, len: usize) -> bool {
        (self.page + 1).saturating_mul(self.page_size()) < len
    }

    /// Advance one page. Returns `false` and leaves the index alone on the last page.
    pub fn next(&mut self, len: usize) -> bool {
        if !self.has_next(len) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back one page. Returns `false` on the first page.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }
}

/// Case-insensitive substring match. An empty query matches every name.
pub fn matches_query(name: &str, query: &str) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Source list plus a live name query and a page window over the matches.
#[derive(Debug, Clone)]
pub struct FilteredCatalog<T> {
    source: Vec<T>,
    query: String,
    pager: Pager,
}

impl<T: Named> FilteredCatalog<T> {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            source: Vec::new(),
            query: String::new(),
            pager: Pager::new(page_size),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the source list. The page index goes back to 0.
    pub fn set_source(&mut self, items: Vec<T>) {
        self.source = items;
        self.pager.reset();
    }

    /// Replace the query. The page index goes back to 0 even if the text is unchanged.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pager.reset();
    }

    pub fn filtered(&self) -> Vec<&T> {
        self.source
            .iter()
            .filter(|item| matches_query(item.name(), &self.query))
            .collect()
    }

    pub fn filtered_len(&self) -> usize {
        if self.query.is_empty() {
            return self.source.len();
        }
        self.filtered().len()
    }

    pub fn next_page(&mut self) -> bool {
        let len = self.filtered_len();
        self.pager.next(len)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn current_page(&self) -> PageView<'_, T> {
        let filtered = self.filtered();
        let total_items = filtered.len();
        let window = self.pager.window(total_items);
        PageView {
            items: filtered[window].to_vec(),
            page: self.pager.page(),
            page_size: self.pager.page_size(),
            total_items,
            page_count: self.pager.page_count(total_items),
            has_prev: self.pager.has_prev(),
            has_next: self.pager.has_next(total_items),
        }
    }

    /// Render the current page for `screen`. While `state` is loading or failed
    /// no cards are shown, even if an earlier list is still held.
    pub fn page_response(&self, screen: Screen, state: &LoadState) -> PageResponse
    where
        for<'a> MealCard: From<&'a T>,
    {
        let mut response = PageResponse {
            screen,
            status: state.status(),
            message: state.message().map(str::to_string),
            query: None,
            selected: None,
            items: Vec::new(),
            page: 0,
            page_size: self.pager.page_size(),
            total_items: 0,
            page_count: 0,
            has_prev: false,
            has_next: false,
            placeholders: 0,
        };
        if !state.shows_items() {
            return response;
        }

        let page = self.current_page();
        response.placeholders = page.placeholders();
        response.items = page.items.iter().map(|item| MealCard::from(*item)).collect();
        response.page = page.page;
        response.total_items = page.total_items;
        response.page_count = page.page_count;
        response.has_prev = page.has_prev;
        response.has_next = page.has_next;
        response
    }
}

#[derive(Debug)]
pub struct PageView<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> PageView<'_, T> {
    /// Empty grid slots needed to keep a short page the same height as a full one.
    pub fn placeholders(&self) -> usize {
        self.page_size.saturating_sub(self.items.len())
    }
}

/// Fetch lifecycle of a screen. Every failure cause collapses into one static message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready,
}

impl LoadState {
    pub fn status(&self) -> LoadStatus {
        match self {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Failed(_) => LoadStatus::Failed,
            LoadState::Ready => LoadStatus::Ready,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    pub fn shows_items(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Ready)
    }
}

/// A screen that shows one page of meal cards at a time.
pub trait PagedScreen {
    fn next_page(&mut self) -> bool;
    fn prev_page(&mut self) -> bool;
    fn page_response(&self) -> PageResponse;
}
