//! # Search State Container
//! View-level search state on top of [`SearchOrchestrator`]: current query and
//! filters, results and paging within them, typeahead suggestions, advanced
//! filter fields and the search history.
//!
//! Advanced filters are held as state for the presentation layer only; they
//! are not applied to search results.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ErrorState};
use crate::history::SearchHistory;
use crate::model::{FilterConfig, FilterUpdate, NewsItem, SearchHistoryEntry, Suggestion};
use crate::paginate::{total_pages, Page};
use crate::search::{has_more_results, normalize_query, SearchOrchestrator, SearchOutcome};

/// Number of history entries scanned for `recent_searches`.
pub const RECENT_SEARCHES: usize = 5;

pub const POPULAR_SEARCHES: [&str; 8] = [
    "COVID-19 vaccine",
    "Climate change",
    "Technology breakthrough",
    "Political news",
    "Health misinformation",
    "Social media",
    "Artificial intelligence",
    "Economic policy",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilters {
    pub author: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_votes: u32,
    pub max_votes: u32,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
}

impl Default for AdvancedFilters {
    fn default() -> Self {
        Self {
            author: String::new(),
            date_from: None,
            date_to: None,
            min_votes: 0,
            max_votes: 1000,
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub query: String,
    pub total_results: usize,
    pub search_time_ms: f64,
    pub current_page: usize,
    pub total_pages: usize,
    pub filters: FilterConfig,
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    filters: FilterConfig,
    results: Vec<NewsItem>,
    search_time: Duration,
    page: usize,
    in_flight: usize,
    error: Option<ErrorState>,
    suggestions: Vec<Suggestion>,
    advanced: AdvancedFilters,
    search_seq: u64,
    suggest_seq: u64,
}

pub struct SearchStore {
    orchestrator: SearchOrchestrator,
    state: Mutex<SearchState>,
}

impl SearchStore {
    pub fn new(orchestrator: SearchOrchestrator) -> Self {
        Self {
            orchestrator,
            state: Mutex::new(SearchState {
                page: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn page_size(&self) -> usize {
        self.orchestrator.page_size()
    }

    // ---- reads ----

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn filters(&self) -> FilterConfig {
        self.lock().filters.clone()
    }

    pub fn results(&self) -> Vec<NewsItem> {
        self.lock().results.clone()
    }

    pub fn total_results(&self) -> usize {
        self.lock().results.len()
    }

    pub fn search_time(&self) -> Duration {
        self.lock().search_time
    }

    pub fn current_page(&self) -> usize {
        self.lock().page
    }

    pub fn is_searching(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<ErrorState> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.lock().suggestions.clone()
    }

    pub fn advanced_filters(&self) -> AdvancedFilters {
        self.lock().advanced.clone()
    }

    pub fn popular_searches(&self) -> &'static [&'static str] {
        &POPULAR_SEARCHES
    }

    // ---- derived ----

    pub fn paginated_results(&self) -> Page<NewsItem> {
        let g = self.lock();
        Page::slice(&g.results, g.page, self.page_size())
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_results(), self.page_size())
    }

    pub fn has_results(&self) -> bool {
        !self.lock().results.is_empty()
    }

    /// Recomputed from the result count and current page on every read.
    pub fn has_more_results(&self) -> bool {
        let g = self.lock();
        has_more_results(g.results.len(), g.page, self.page_size())
    }

    pub fn summary(&self) -> Option<SearchSummary> {
        let g = self.lock();
        if g.results.is_empty() {
            return None;
        }
        Some(SearchSummary {
            query: g.query.clone(),
            total_results: g.results.len(),
            search_time_ms: g.search_time.as_secs_f64() * 1_000.0,
            current_page: g.page,
            total_pages: total_pages(g.results.len(), self.page_size()),
            filters: g.filters.clone(),
        })
    }

    // ---- actions ----

    /// Search with the current filters, optionally merged with `update`.
    /// Resets paging. A response superseded by a newer search is not applied.
    pub async fn perform_search(
        &self,
        query: &str,
        update: Option<&FilterUpdate>,
    ) -> Result<SearchOutcome, ApiError> {
        let (seq, query, filters) = {
            let mut g = self.lock();
            g.query = normalize_query(query);
            if let Some(u) = update {
                g.filters = g.filters.merged(u);
            }
            g.page = 1;
            g.search_seq += 1;
            g.in_flight += 1;
            g.error = None;
            (g.search_seq, g.query.clone(), g.filters.clone())
        };

        let res = self.orchestrator.search(&query, &filters).await;

        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        if seq != g.search_seq {
            debug!(target: "search", seq, latest = g.search_seq, "discarding stale search response");
            return res;
        }
        match &res {
            Ok(outcome) => {
                g.results = outcome.results.clone();
                g.search_time = outcome.elapsed;
            }
            Err(e) => {
                g.error = Some(ErrorState::from_api("Search failed", e));
            }
        }
        res
    }

    /// Advance one page within the results. Returns false when there is
    /// nothing more or a search is in flight.
    pub fn load_more_results(&self) -> bool {
        let mut g = self.lock();
        if g.in_flight > 0 || !has_more_results(g.results.len(), g.page, self.page_size()) {
            return false;
        }
        g.page += 1;
        true
    }

    /// Merge `update` into the filters; re-runs the search when a query is active.
    pub async fn update_filters(
        &self,
        update: &FilterUpdate,
    ) -> Option<Result<SearchOutcome, ApiError>> {
        let query = {
            let mut g = self.lock();
            g.filters = g.filters.merged(update);
            g.query.clone()
        };
        if query.is_empty() {
            return None;
        }
        Some(self.perform_search(&query, None).await)
    }

    /// Reset query, results, paging, error and filters. History is kept.
    pub fn clear_search(&self) {
        let mut g = self.lock();
        g.query.clear();
        g.results.clear();
        g.search_time = Duration::ZERO;
        g.page = 1;
        g.error = None;
        g.filters = FilterConfig::default();
        // Bump so an in-flight search cannot repopulate cleared state.
        g.search_seq += 1;
    }

    pub async fn suggest(&self, partial: &str) -> Vec<Suggestion> {
        let seq = {
            let mut g = self.lock();
            g.suggest_seq += 1;
            g.suggest_seq
        };
        let list = self.orchestrator.suggest(partial).await;
        let mut g = self.lock();
        if seq == g.suggest_seq {
            g.suggestions = list.clone();
        }
        list
    }

    pub fn set_advanced_filters(&self, edit: impl FnOnce(&mut AdvancedFilters)) {
        edit(&mut self.lock().advanced);
    }

    pub fn clear_advanced_filters(&self) {
        self.lock().advanced = AdvancedFilters::default();
    }

    // ---- history ----

    pub fn history(&self) -> &SearchHistory {
        self.orchestrator.history()
    }

    pub fn history_entries(&self) -> Vec<SearchHistoryEntry> {
        self.history().entries()
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.history().recent(RECENT_SEARCHES)
    }

    pub fn remove_history_entry(&self, id: &str) -> bool {
        self.history().remove(id)
    }

    /// Drop the persisted history; transient search state is untouched.
    pub fn clear_history(&self) {
        self.history().clear();
    }
}
