//! Mock data server entrypoint.
//! Serves the in-memory REST endpoints the news client talks to, plus `/metrics`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{info, warn};

use factcheck_news::config::FactcheckConfig;
use factcheck_news::metrics::Metrics;
use factcheck_news::mock_server::{self, MockDb, ServerState};
use factcheck_news::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = FactcheckConfig::load()?;

    let db = match &cfg.server.seed_path {
        Some(path) => match MockDb::load_seed(path) {
            Ok(db) => db,
            Err(e) => {
                warn!(target: "mock_server", error = %e, "seed not loaded, starting empty");
                MockDb::default()
            }
        },
        None => MockDb::default(),
    };
    let seeded = db.news.len();

    let metrics = Metrics::init(seeded)?;
    let app = mock_server::router(ServerState::new(db)).merge(metrics.router());

    let addr: SocketAddr = format!("{}:{}", cfg.server.bind, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.bind, cfg.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(target: "mock_server", %addr, news = seeded, "mock data server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
