// src/api/mod.rs
//! Remote news repository: the trait the state containers talk to, plus the
//! reqwest implementation against the REST data server.

pub mod http;

use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{
    Comment, NewComment, NewsDraft, NewsItem, NewsPatch, NewsStatus, Suggestion, Vote, VoteRequest,
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Request/response mapping only; no filtering or ordering guarantees beyond
/// what each endpoint documents.
#[async_trait::async_trait]
pub trait NewsApi: Send + Sync {
    async fn list_news(&self) -> ApiResult<Vec<NewsItem>>;
    /// `Ok(None)` when the id does not exist.
    async fn get_news(&self, id: &str) -> ApiResult<Option<NewsItem>>;
    async fn list_by_category(&self, category: &str) -> ApiResult<Vec<NewsItem>>;
    async fn list_by_status(&self, status: NewsStatus) -> ApiResult<Vec<NewsItem>>;
    /// Text relevance match on titles; the candidate set is unordered.
    async fn search_by_title(&self, query: &str) -> ApiResult<Vec<NewsItem>>;
    async fn suggestions(&self, partial: &str) -> ApiResult<Vec<Suggestion>>;
    /// `Err(ApiError::Conflict)` on a duplicate vote.
    async fn submit_vote(&self, vote: &VoteRequest) -> ApiResult<Vote>;
    async fn list_comments(&self, news_id: &str) -> ApiResult<Vec<Comment>>;
    async fn submit_comment(&self, comment: &NewComment) -> ApiResult<Comment>;
    async fn submit_news(&self, draft: &NewsDraft) -> ApiResult<NewsItem>;
    async fn update_news(&self, id: &str, patch: &NewsPatch) -> ApiResult<NewsItem>;
    async fn delete_news(&self, id: &str) -> ApiResult<()>;
    fn name(&self) -> &'static str;
}

pub type DynNewsApi = Arc<dyn NewsApi>;
