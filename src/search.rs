//! # Search Orchestrator
//! Remote title search, local structured post-filter, timing, history and
//! typeahead suggestions.

use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::DynNewsApi;
use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_SUGGESTION_MIN_CHARS};
use crate::error::ApiError;
use crate::history::SearchHistory;
use crate::model::{FilterConfig, NewsItem, Suggestion};
use crate::telemetry::ensure_metrics_described;
use crate::view::matches_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Normalized query that was actually dispatched.
    pub query: String,
    pub filters: FilterConfig,
    pub results: Vec<NewsItem>,
    pub total_count: usize,
    #[serde(serialize_with = "serialize_ms")]
    pub elapsed: Duration,
    pub has_more_results: bool,
}

fn serialize_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1_000.0)
}

/// Trim and collapse inner whitespace.
pub fn normalize_query(raw: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(raw.trim(), " ").into_owned()
}

/// Structured narrowing on top of the server's text match: category and status,
/// case-insensitive, `"all"` passes. The server's candidate order is kept.
pub fn post_filter(candidates: Vec<NewsItem>, filters: &FilterConfig) -> Vec<NewsItem> {
    candidates
        .into_iter()
        .filter(|n| matches_ignore_case(&n.category, &filters.category))
        .filter(|n| matches_ignore_case(n.status.as_str(), &filters.status))
        .collect()
}

/// `result_count > current_page * page_size`.
pub fn has_more_results(result_count: usize, current_page: usize, page_size: usize) -> bool {
    result_count > current_page.max(1).saturating_mul(page_size.max(1))
}

pub struct SearchOrchestrator {
    api: DynNewsApi,
    history: SearchHistory,
    page_size: usize,
    suggestion_min_chars: usize,
}

impl SearchOrchestrator {
    pub fn new(api: DynNewsApi, history: SearchHistory) -> Self {
        Self {
            api,
            history,
            page_size: DEFAULT_PAGE_SIZE,
            suggestion_min_chars: DEFAULT_SUGGESTION_MIN_CHARS,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_suggestion_min_chars(mut self, min_chars: usize) -> Self {
        self.suggestion_min_chars = min_chars.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Run one search. History is appended on every completed search, zero
    /// results included, and never on transport failure.
    pub async fn search(&self, query: &str, filters: &FilterConfig) -> Result<SearchOutcome, ApiError> {
        ensure_metrics_described();
        let query = normalize_query(query);
        let filters = filters.clone();

        counter!("search_requests_total").increment(1);
        let started = Instant::now();
        let candidates = match self.api.search_by_title(&query).await {
            Ok(v) => v,
            Err(e) => {
                counter!("search_errors_total").increment(1);
                warn!(target: "search", error = %e, query = %query, "search failed");
                return Err(e);
            }
        };

        let now = Utc::now();
        let candidate_count = candidates.len();
        let results = post_filter(candidates, &filters);
        let elapsed = started.elapsed();
        let total_count = results.len();

        histogram!("search_elapsed_ms").record(elapsed.as_secs_f64() * 1_000.0);
        info!(
            target: "search",
            query = %query,
            candidates = candidate_count,
            results = total_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "search completed"
        );

        self.history.record(&query, &filters, total_count, now);

        Ok(SearchOutcome {
            query,
            filters,
            results,
            total_count,
            elapsed,
            has_more_results: has_more_results(total_count, 1, self.page_size),
        })
    }

    /// Typeahead. Short input returns empty without a remote call; remote
    /// failures degrade to an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<Suggestion> {
        let partial = normalize_query(partial);
        if partial.chars().count() < self.suggestion_min_chars {
            return Vec::new();
        }
        match self.api.suggestions(&partial).await {
            Ok(v) => v,
            Err(e) => {
                debug!(target: "search", error = %e, "suggestions unavailable");
                Vec::new()
            }
        }
    }
}
