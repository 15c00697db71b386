//! # Mock data server
//! In-memory REST endpoints in the json-server style the client expects:
//! `/news`, `/news/{id}`, `/comments`, `/votes`, `/health`.
//! Nothing is written back to disk; the optional seed file is read once.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::model::{
    Comment, NewComment, NewsDraft, NewsItem, NewsPatch, NewsStatus, Vote, VoteRequest,
};

const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MockDb {
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl MockDb {
    pub fn load_seed(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed from {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing seed {}", path.display()))
    }

    /// First id above every numeric id already present.
    fn next_id_floor(&self) -> u64 {
        let ids = self
            .news
            .iter()
            .map(|n| n.id.as_str())
            .chain(self.comments.iter().map(|c| c.id.as_str()))
            .chain(self.votes.iter().map(|v| v.id.as_str()));
        ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0) + 1
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not found")]
    NotFound,

    #[error("Already voted on this news item")]
    DuplicateVote,

    #[error("Malformed payload: {0}")]
    Validation(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::DuplicateVote => StatusCode::CONFLICT,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Clone)]
pub struct ServerState {
    db: Arc<RwLock<MockDb>>,
    next_id: Arc<AtomicU64>,
}

impl ServerState {
    pub fn new(db: MockDb) -> Self {
        let floor = db.next_id_floor();
        Self {
            db: Arc::new(RwLock::new(db)),
            next_id: Arc::new(AtomicU64::new(floor)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MockDb> {
        match self.db.read() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockDb> {
        match self.db.write() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn fresh_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    pub fn snapshot(&self) -> MockDb {
        self.read().clone()
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/news", get(list_news).post(create_news))
        .route(
            "/news/{id}",
            get(get_news)
                .patch(update_news)
                .put(update_news)
                .delete(delete_news),
        )
        .route("/comments", get(list_comments).post(create_comment))
        .route("/votes", get(list_votes).post(create_vote))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthCounts {
    news: usize,
    comments: usize,
    votes: usize,
}

#[derive(Serialize)]
struct HealthOut {
    status: &'static str,
    timestamp: String,
    data: HealthCounts,
}

async fn health(State(state): State<ServerState>) -> Json<HealthOut> {
    let db = state.read();
    Json(HealthOut {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        data: HealthCounts {
            news: db.news.len(),
            comments: db.comments.len(),
            votes: db.votes.len(),
        },
    })
}

async fn list_news(
    State(state): State<ServerState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<NewsItem>> {
    let category = q.get("category");
    let status = q.get("status");
    let title_like = q.get("title_like").map(|s| s.to_lowercase());
    let db = state.read();
    let out = db
        .news
        .iter()
        .filter(|n| category.map_or(true, |c| &n.category == c))
        .filter(|n| status.map_or(true, |s| n.status.as_str() == s.as_str()))
        .filter(|n| {
            title_like
                .as_ref()
                .map_or(true, |t| n.title.to_lowercase().contains(t.as_str()))
        })
        .cloned()
        .collect();
    Json(out)
}

async fn get_news(
    State(state): State<ServerState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<NewsItem>, ServerError> {
    state
        .read()
        .news
        .iter()
        .find(|n| n.id == id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound)
}

async fn create_news(
    State(state): State<ServerState>,
    Json(draft): Json<NewsDraft>,
) -> Result<(StatusCode, Json<NewsItem>), ServerError> {
    if draft.title.trim().is_empty() || draft.category.trim().is_empty() {
        return Err(ServerError::Validation("title and category are required".into()));
    }
    let now = Utc::now();
    let item = NewsItem {
        id: state.fresh_id(),
        title: draft.title,
        summary: draft.summary,
        content: draft.content,
        image_url: draft.image_url,
        category: draft.category,
        status: NewsStatus::Pending,
        reporter: draft.reporter,
        created_at: now,
        submitted_by: draft.submitted_by,
        submitted_at: Some(now),
        verified_at: None,
        source_url: draft.source_url,
        real_votes: 0,
        fake_votes: 0,
        confidence: None,
        tags: draft.tags,
        views: Some(0),
        shares: Some(0),
    };
    state.write().news.push(item.clone());
    info!(target: "mock_server", id = %item.id, "news created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_news(
    State(state): State<ServerState>,
    UrlPath(id): UrlPath<String>,
    Json(patch): Json<NewsPatch>,
) -> Result<Json<NewsItem>, ServerError> {
    let mut db = state.write();
    let item = db
        .news
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or(ServerError::NotFound)?;
    item.apply_patch(&patch);
    Ok(Json(item.clone()))
}

async fn delete_news(
    State(state): State<ServerState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut db = state.write();
    let before = db.news.len();
    db.news.retain(|n| n.id != id);
    if db.news.len() == before {
        return Err(ServerError::NotFound);
    }
    Ok(Json(serde_json::json!({})))
}

#[derive(Deserialize)]
struct ByNews {
    #[serde(rename = "newsId")]
    news_id: Option<String>,
}

async fn list_comments(
    State(state): State<ServerState>,
    Query(q): Query<ByNews>,
) -> Json<Vec<Comment>> {
    let db = state.read();
    let out = db
        .comments
        .iter()
        .filter(|c| q.news_id.as_ref().map_or(true, |id| &c.news_id == id))
        .cloned()
        .collect();
    Json(out)
}

async fn create_comment(
    State(state): State<ServerState>,
    Json(body): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ServerError> {
    if body.content.trim().is_empty() {
        return Err(ServerError::Validation("content is required".into()));
    }
    let comment = Comment {
        id: state.fresh_id(),
        news_id: body.news_id,
        author: body.author,
        content: body.content,
        vote_type: body.vote_type,
        created_at: body.created_at,
    };
    state.write().comments.push(comment.clone());
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_votes(State(state): State<ServerState>, Query(q): Query<ByNews>) -> Json<Vec<Vote>> {
    let db = state.read();
    let out = db
        .votes
        .iter()
        .filter(|v| q.news_id.as_ref().map_or(true, |id| &v.news_id == id))
        .cloned()
        .collect();
    Json(out)
}

/// The bearer credential (if any) identifies the voter; the mock does not verify it.
fn voter_id(headers: &HeaderMap, body: &VoteRequest) -> String {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.user_id.clone())
        .unwrap_or_else(|| ANONYMOUS_USER.to_string())
}

async fn create_vote(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<VoteRequest>,
) -> Result<(StatusCode, Json<Vote>), ServerError> {
    let user_id = voter_id(&headers, &body);
    let id = state.fresh_id();
    let mut db = state.write();
    if db
        .votes
        .iter()
        .any(|v| v.news_id == body.news_id && v.user_id == user_id)
    {
        return Err(ServerError::DuplicateVote);
    }
    let item = db
        .news
        .iter_mut()
        .find(|n| n.id == body.news_id)
        .ok_or(ServerError::NotFound)?;
    item.record_vote(body.vote_type);

    let vote = Vote {
        id,
        news_id: body.news_id,
        user_id,
        vote_type: body.vote_type,
        created_at: body.created_at,
    };
    db.votes.push(vote.clone());
    Ok((StatusCode::CREATED, Json(vote)))
}
