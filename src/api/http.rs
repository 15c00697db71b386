// src/api/http.rs
//! reqwest client for the json-server style data API.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiResult, NewsApi};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{
    Comment, NewComment, NewsDraft, NewsItem, NewsPatch, NewsStatus, Suggestion, Vote, VoteRequest,
};
use crate::suggest::{derive_suggestions, MAX_SUGGESTIONS};

/// Collection responses come either bare or wrapped, e.g. `{"news": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    News { news: Vec<T> },
    Comments { comments: Vec<T> },
    Votes { votes: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(v) => v,
            Listing::News { news } => news,
            Listing::Comments { comments } => comments,
            Listing::Votes { votes } => votes,
        }
    }
}

pub struct HttpNewsApi {
    http: Client,
    base_url: String,
    /// Opaque bearer credential issued by the auth collaborator.
    token: RwLock<Option<String>>,
}

impl HttpNewsApi {
    pub fn new(cfg: &ApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(cfg.token.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace (or clear) the bearer credential forwarded on mutating calls.
    pub fn set_token(&self, token: Option<String>) {
        let mut g = match self.token.write() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        *g = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        let token = match self.token.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        };
        match token {
            Some(t) if !t.is_empty() => req.bearer_auth(t),
            _ => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let resp = req.send().await.map_err(|e| {
            warn!(target: "api", error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        debug!(target: "api", status = status.as_u16(), "non-success response");
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Transport(format!("decoding response: {e}")))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<Vec<T>> {
        let resp = self.send(self.http.get(self.url(path)).query(query)).await?;
        let listing: Listing<T> = Self::decode(resp).await?;
        Ok(listing.into_vec())
    }
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn list_news(&self) -> ApiResult<Vec<NewsItem>> {
        self.get_list("/news", &[]).await
    }

    async fn get_news(&self, id: &str) -> ApiResult<Option<NewsItem>> {
        let req = self.http.get(self.url(&format!("/news/{id}")));
        match self.send(req).await {
            Ok(resp) => Ok(Some(Self::decode(resp).await?)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_by_category(&self, category: &str) -> ApiResult<Vec<NewsItem>> {
        self.get_list("/news", &[("category", category)]).await
    }

    async fn list_by_status(&self, status: NewsStatus) -> ApiResult<Vec<NewsItem>> {
        self.get_list("/news", &[("status", status.as_str())]).await
    }

    async fn search_by_title(&self, query: &str) -> ApiResult<Vec<NewsItem>> {
        if query.is_empty() {
            return self.list_news().await;
        }
        self.get_list("/news", &[("title_like", query)]).await
    }

    async fn suggestions(&self, partial: &str) -> ApiResult<Vec<Suggestion>> {
        let matches = self.search_by_title(partial).await?;
        Ok(derive_suggestions(partial, &matches, MAX_SUGGESTIONS))
    }

    async fn submit_vote(&self, vote: &VoteRequest) -> ApiResult<Vote> {
        let req = self.authed(self.http.post(self.url("/votes")).json(vote));
        Self::decode(self.send(req).await?).await
    }

    async fn list_comments(&self, news_id: &str) -> ApiResult<Vec<Comment>> {
        self.get_list("/comments", &[("newsId", news_id)]).await
    }

    async fn submit_comment(&self, comment: &NewComment) -> ApiResult<Comment> {
        let req = self.authed(self.http.post(self.url("/comments")).json(comment));
        Self::decode(self.send(req).await?).await
    }

    async fn submit_news(&self, draft: &NewsDraft) -> ApiResult<NewsItem> {
        let req = self.authed(self.http.post(self.url("/news")).json(draft));
        Self::decode(self.send(req).await?).await
    }

    async fn update_news(&self, id: &str, patch: &NewsPatch) -> ApiResult<NewsItem> {
        let req = self.authed(self.http.patch(self.url(&format!("/news/{id}"))).json(patch));
        Self::decode(self.send(req).await?).await
    }

    async fn delete_news(&self, id: &str) -> ApiResult<()> {
        let req = self.authed(self.http.delete(self.url(&format!("/news/{id}"))));
        self.send(req).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
