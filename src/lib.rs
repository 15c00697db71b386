// src/lib.rs
// Public library surface for the server binary, demos and integration tests.

pub mod model;
pub mod paginate;
pub mod view;

pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod suggest;

// Search pipeline and state containers
pub mod history;
pub mod news_store;
pub mod search;
pub mod search_store;

pub mod context;
pub mod metrics;
pub mod mock_server;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{DynNewsApi, NewsApi};
pub use crate::context::AppContext;
pub use crate::error::{ApiError, ErrorKind, ErrorState};
pub use crate::mock_server::router;
pub use crate::news_store::NewsStore;
pub use crate::search::{SearchOrchestrator, SearchOutcome};
pub use crate::search_store::SearchStore;
