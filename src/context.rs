//! Application context: one instance per session, built at startup and passed
//! by reference to whatever presents the state.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::http::HttpNewsApi;
use crate::api::{DynNewsApi, NewsApi};
use crate::config::FactcheckConfig;
use crate::history::SearchHistory;
use crate::news_store::NewsStore;
use crate::search::SearchOrchestrator;
use crate::search_store::SearchStore;
use crate::storage::{DynStore, FileStore, MemoryStore};

pub struct AppContext {
    pub news: NewsStore,
    pub search: SearchStore,
    http: Option<Arc<HttpNewsApi>>,
}

impl AppContext {
    /// HTTP client + file-backed (or in-memory) storage, per `cfg`.
    pub fn from_config(cfg: &FactcheckConfig) -> Result<Self> {
        let http = Arc::new(HttpNewsApi::new(&cfg.api)?);
        let store: DynStore = match &cfg.storage.dir {
            Some(dir) => Arc::new(FileStore::new(dir)?),
            None => Arc::new(MemoryStore::new()),
        };
        info!(
            target: "factcheck",
            base_url = http.base_url(),
            has_token = cfg.api.token.is_some(),
            "context built"
        );
        let mut ctx = Self::with_parts(http.clone(), store, cfg);
        ctx.http = Some(http);
        Ok(ctx)
    }

    /// Wire the containers around any `NewsApi` and key-value store.
    pub fn with_parts(api: DynNewsApi, store: DynStore, cfg: &FactcheckConfig) -> Self {
        info!(
            target: "factcheck",
            api = api.name(),
            page_size = cfg.listing.page_size,
            history_cap = cfg.search.history_cap,
            "wiring state containers"
        );
        let history = SearchHistory::load(store, cfg.search.history_cap);
        let orchestrator = SearchOrchestrator::new(api.clone(), history)
            .with_page_size(cfg.search.page_size)
            .with_suggestion_min_chars(cfg.search.suggestion_min_chars);
        Self {
            news: NewsStore::with_page_size(api, cfg.listing.page_size),
            search: SearchStore::new(orchestrator),
            http: None,
        }
    }

    /// Forward a bearer credential from the auth collaborator. No-op when the
    /// context was not built over the HTTP client.
    pub fn set_token(&self, token: Option<String>) {
        if let Some(http) = &self.http {
            http.set_token(token);
        }
    }
}
