//! # News State Container
//! Owns the canonical news collection, the focused item and its comments, the
//! listing parameters, and the loading/error state. Derived views are computed
//! on every read and never stored.
//!
//! All actions take `&self`; the state lock is never held across an `.await`.
//! Each fetch slot carries a request sequence number and responses that are
//! not the latest for their slot are dropped.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiResult, DynNewsApi};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{ApiError, ErrorKind, ErrorState, VOTE_ACTION};
use crate::model::{
    Comment, CommentDraft, FilterConfig, NewComment, NewsDraft, NewsItem, NewsPatch, NewsStatus,
    SortKey, SortOrder, Vote, VoteRequest, VoteType, ALL,
};
use crate::paginate::Page;
use crate::telemetry::ensure_metrics_described;
use crate::view::{matches_exact_or_all, view, within_date_range, ViewCriteria};

/// Items need more than this many `real` votes to be featured.
pub const FEATURED_MIN_REAL_VOTES: u32 = 20;
pub const ANONYMOUS_AUTHOR: &str = "Anonymous User";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStats {
    pub total: usize,
    pub real: usize,
    pub fake: usize,
    pub pending: usize,
    pub real_percentage: u32,
    pub fake_percentage: u32,
}

/// Current listing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub category: String,
    pub status: String,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl ListingParams {
    fn defaults(page_size: usize) -> Self {
        Self {
            category: ALL.to_string(),
            status: ALL.to_string(),
            sort_by: SortKey::Date,
            sort_order: SortOrder::Desc,
            page: 1,
            page_size,
        }
    }

    fn criteria(&self) -> ViewCriteria {
        ViewCriteria {
            category: self.category.clone(),
            status: self.status.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug)]
struct NewsState {
    news: Vec<NewsItem>,
    current: Option<NewsItem>,
    comments: Vec<Comment>,
    in_flight: usize,
    error: Option<ErrorState>,
    params: ListingParams,
    list_seq: u64,
    focus_seq: u64,
    comments_seq: u64,
}

pub struct NewsStore {
    api: DynNewsApi,
    state: Mutex<NewsState>,
}

impl NewsStore {
    pub fn new(api: DynNewsApi) -> Self {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: DynNewsApi, page_size: usize) -> Self {
        Self {
            api,
            state: Mutex::new(NewsState {
                news: Vec::new(),
                current: None,
                comments: Vec::new(),
                in_flight: 0,
                error: None,
                params: ListingParams::defaults(page_size.max(1)),
                list_seq: 0,
                focus_seq: 0,
                comments_seq: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NewsState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    // ---- plain state reads ----

    pub fn news(&self) -> Vec<NewsItem> {
        self.lock().news.clone()
    }

    pub fn total_count(&self) -> usize {
        self.lock().news.len()
    }

    pub fn current(&self) -> Option<NewsItem> {
        self.lock().current.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.lock().comments.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<ErrorState> {
        self.lock().error.clone()
    }

    pub fn params(&self) -> ListingParams {
        self.lock().params.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    // ---- derived views ----

    pub fn filtered_news(&self) -> Vec<NewsItem> {
        let g = self.lock();
        view(&g.news, &g.params.criteria(), Utc::now())
    }

    /// Filter, sort and page from one snapshot of the collection and params.
    pub fn paginated_news(&self) -> Page<NewsItem> {
        let g = self.lock();
        let filtered = view(&g.news, &g.params.criteria(), Utc::now());
        Page::slice(&filtered, g.params.page, g.params.page_size)
    }

    pub fn has_more(&self) -> bool {
        self.paginated_news().has_more()
    }

    pub fn news_stats(&self) -> NewsStats {
        stats_for(&self.lock().news)
    }

    pub fn featured_news(&self) -> Option<NewsItem> {
        featured_in(&self.lock().news).cloned()
    }

    // ---- parameter actions ----

    pub fn set_category(&self, category: &str) {
        let mut g = self.lock();
        g.params.category = category.to_string();
        g.params.page = 1;
    }

    pub fn set_status(&self, status: &str) {
        let mut g = self.lock();
        g.params.status = status.to_string();
        g.params.page = 1;
    }

    pub fn set_sorting(&self, sort_by: SortKey, sort_order: SortOrder) {
        let mut g = self.lock();
        g.params.sort_by = sort_by;
        g.params.sort_order = sort_order;
        g.params.page = 1;
    }

    pub fn set_page(&self, page: usize) {
        self.lock().params.page = page.max(1);
    }

    pub fn load_more(&self) {
        let mut g = self.lock();
        g.params.page = g.params.page.saturating_add(1);
    }

    pub fn reset_filters(&self) {
        let mut g = self.lock();
        let page_size = g.params.page_size;
        g.params = ListingParams::defaults(page_size);
    }

    // ---- remote actions ----

    /// Replace the collection wholesale. On failure the previous collection stays.
    pub async fn fetch_all(&self) -> Result<usize, ApiError> {
        self.replace_list("Failed to fetch news", self.api.list_news())
            .await
    }

    pub async fn fetch_by_category(&self, category: &str) -> Result<usize, ApiError> {
        self.replace_list(
            "Failed to fetch news by category",
            self.api.list_by_category(category),
        )
        .await
    }

    pub async fn fetch_by_status(&self, status: NewsStatus) -> Result<usize, ApiError> {
        self.replace_list(
            "Failed to fetch news by status",
            self.api.list_by_status(status),
        )
        .await
    }

    async fn replace_list<F>(&self, action: &str, fut: F) -> Result<usize, ApiError>
    where
        F: Future<Output = ApiResult<Vec<NewsItem>>>,
    {
        ensure_metrics_described();
        let seq = {
            let mut g = self.lock();
            g.list_seq += 1;
            g.in_flight += 1;
            g.error = None;
            g.list_seq
        };

        let res = fut.await;

        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        if seq != g.list_seq {
            counter!("news_stale_responses_total").increment(1);
            debug!(target: "news", seq, latest = g.list_seq, "discarding stale list response");
            return res.map(|v| v.len());
        }
        match res {
            Ok(items) => {
                let n = items.len();
                g.news = items;
                info!(target: "news", count = n, "news collection replaced");
                Ok(n)
            }
            Err(e) => {
                counter!("news_fetch_errors_total").increment(1);
                warn!(target: "news", error = %e, "{action}");
                g.error = Some(ErrorState::from_api(action, &e));
                Err(e)
            }
        }
    }

    /// Focus a single item. `Ok(None)` means "not found", distinct from failure.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<NewsItem>, ApiError> {
        let seq = {
            let mut g = self.lock();
            g.focus_seq += 1;
            g.in_flight += 1;
            g.error = None;
            g.focus_seq
        };

        let res = self.api.get_news(id).await;

        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        if seq != g.focus_seq {
            counter!("news_stale_responses_total").increment(1);
            debug!(target: "news", id, "discarding stale focus response");
            return res;
        }
        match res {
            Ok(found) => {
                g.current = found.clone();
                Ok(found)
            }
            Err(e) => {
                warn!(target: "news", id, error = %e, "Failed to fetch news");
                g.error = Some(ErrorState::from_api("Failed to fetch news", &e));
                Err(e)
            }
        }
    }

    /// Remote first; counters move only after the remote accepted the vote.
    pub async fn vote(&self, news_id: &str, vote_type: VoteType) -> Result<Vote, ApiError> {
        ensure_metrics_described();
        let req = VoteRequest {
            news_id: news_id.to_string(),
            vote_type,
            created_at: Utc::now(),
            user_id: None,
        };

        match self.api.submit_vote(&req).await {
            Ok(vote) => {
                counter!("votes_submitted_total").increment(1);
                let mut g = self.lock();
                if let Some(n) = g.news.iter_mut().find(|n| n.id == news_id) {
                    n.record_vote(vote_type);
                }
                // The focus item is an independent copy, not an alias.
                if let Some(cur) = g.current.as_mut().filter(|c| c.id == news_id) {
                    cur.record_vote(vote_type);
                }
                Ok(vote)
            }
            Err(e) => {
                if e.kind() == ErrorKind::Conflict {
                    counter!("vote_conflicts_total").increment(1);
                }
                warn!(target: "news", news_id, error = %e, "{VOTE_ACTION}");
                self.lock().error = Some(ErrorState::from_api(VOTE_ACTION, &e));
                Err(e)
            }
        }
    }

    /// Remote-create and prepend the server's entity (newest first).
    pub async fn submit(&self, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
        self.begin();
        let res = self.api.submit_news(draft).await;
        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        match res {
            Ok(created) => {
                g.news.insert(0, created.clone());
                info!(target: "news", id = %created.id, "news submitted");
                Ok(created)
            }
            Err(e) => {
                warn!(target: "news", error = %e, "Failed to submit news");
                g.error = Some(ErrorState::from_api("Failed to submit news", &e));
                Err(e)
            }
        }
    }

    pub async fn update(&self, id: &str, patch: &NewsPatch) -> Result<NewsItem, ApiError> {
        self.begin();
        let res = self.api.update_news(id, patch).await;
        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        match res {
            Ok(updated) => {
                if let Some(n) = g.news.iter_mut().find(|n| n.id == id) {
                    *n = updated.clone();
                }
                if let Some(cur) = g.current.as_mut().filter(|c| c.id == id) {
                    *cur = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                warn!(target: "news", id, error = %e, "Failed to update news");
                g.error = Some(ErrorState::from_api("Failed to update news", &e));
                Err(e)
            }
        }
    }

    /// Remote delete, then drop the item locally; clears focus if it was focused.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.begin();
        let res = self.api.delete_news(id).await;
        let mut g = self.lock();
        g.in_flight = g.in_flight.saturating_sub(1);
        match res {
            Ok(()) => {
                g.news.retain(|n| n.id != id);
                if g.current.as_ref().is_some_and(|c| c.id == id) {
                    g.current = None;
                }
                Ok(())
            }
            Err(e) => {
                warn!(target: "news", id, error = %e, "Failed to delete news");
                g.error = Some(ErrorState::from_api("Failed to delete news", &e));
                Err(e)
            }
        }
    }

    pub async fn fetch_comments(&self, news_id: &str) -> Result<Vec<Comment>, ApiError> {
        let seq = {
            let mut g = self.lock();
            g.comments_seq += 1;
            g.comments_seq
        };
        let res = self.api.list_comments(news_id).await;
        let mut g = self.lock();
        if seq != g.comments_seq {
            debug!(target: "news", news_id, "discarding stale comments response");
            return res;
        }
        match res {
            Ok(list) => {
                g.comments = list.clone();
                Ok(list)
            }
            Err(e) => {
                warn!(target: "news", news_id, error = %e, "Failed to fetch comments");
                g.error = Some(ErrorState::from_api("Failed to fetch comments", &e));
                Err(e)
            }
        }
    }

    /// Validates required fields before any remote call; author defaults to
    /// "Anonymous User".
    pub async fn submit_comment(&self, draft: &CommentDraft) -> Result<Comment, ApiError> {
        let payload = match validate_comment(draft) {
            Ok(p) => p,
            Err(e) => {
                self.lock().error = Some(ErrorState::from_api("Failed to submit comment", &e));
                return Err(e);
            }
        };
        match self.api.submit_comment(&payload).await {
            Ok(created) => {
                self.lock().comments.insert(0, created.clone());
                Ok(created)
            }
            Err(e) => {
                warn!(target: "news", error = %e, "Failed to submit comment");
                self.lock().error = Some(ErrorState::from_api("Failed to submit comment", &e));
                Err(e)
            }
        }
    }

    /// Client-side substring search over the canonical collection (title,
    /// summary, content), optionally narrowed by category/status/date range.
    pub fn search_local(&self, query: &str, filters: Option<&FilterConfig>) -> Vec<NewsItem> {
        let needle = query.trim().to_lowercase();
        let now = Utc::now();
        let g = self.lock();
        g.news
            .iter()
            .filter(|n| {
                needle.is_empty()
                    || n.title.to_lowercase().contains(&needle)
                    || n.summary.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .filter(|n| match filters {
                Some(f) => {
                    matches_exact_or_all(&n.category, &f.category)
                        && matches_exact_or_all(n.status.as_str(), &f.status)
                        && within_date_range(n, f.date_range, now)
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    fn begin(&self) {
        let mut g = self.lock();
        g.in_flight += 1;
        g.error = None;
    }
}

fn validate_comment(draft: &CommentDraft) -> Result<NewComment, ApiError> {
    let mut missing = Vec::new();
    if draft.news_id.trim().is_empty() {
        missing.push("newsId");
    }
    if draft.content.trim().is_empty() {
        missing.push("content");
    }
    if draft.vote_type.is_none() {
        missing.push("voteType");
    }
    let Some(vote_type) = draft.vote_type.filter(|_| missing.is_empty()) else {
        return Err(ApiError::Validation(format!(
            "Missing required comment fields: {}",
            missing.join(", ")
        )));
    };
    let author = draft
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(ANONYMOUS_AUTHOR)
        .to_string();
    Ok(NewComment {
        news_id: draft.news_id.clone(),
        author,
        content: draft.content.clone(),
        vote_type,
        created_at: Utc::now(),
    })
}

/// Counts by status and rounded shares; all zero for an empty collection.
pub fn stats_for(items: &[NewsItem]) -> NewsStats {
    let total = items.len();
    let count = |s: NewsStatus| items.iter().filter(|n| n.status == s).count();
    let (real, fake, pending) = (
        count(NewsStatus::Real),
        count(NewsStatus::Fake),
        count(NewsStatus::Pending),
    );
    let pct = |part: usize| -> u32 {
        if total == 0 {
            0
        } else {
            ((part as f64 / total as f64) * 100.0).round() as u32
        }
    };
    NewsStats {
        total,
        real,
        fake,
        pending,
        real_percentage: pct(real),
        fake_percentage: pct(fake),
    }
}

/// Highest vote sum among verified-real items with more than 20 real votes.
/// Ties go to the earlier item.
pub fn featured_in(items: &[NewsItem]) -> Option<&NewsItem> {
    items
        .iter()
        .filter(|n| n.status == NewsStatus::Real && n.real_votes > FEATURED_MIN_REAL_VOTES)
        .fold(None, |best: Option<&NewsItem>, n| match best {
            Some(b) if b.total_votes() >= n.total_votes() => Some(b),
            _ => Some(n),
        })
}
