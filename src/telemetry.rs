//! Tracing subscriber setup and metric descriptions.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "factcheck=info,news=info,search=info,mock_server=info,warn";

/// Install a compact fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("search_requests_total", "Searches dispatched to the remote API.");
        describe_counter!("search_errors_total", "Searches that failed in transport.");
        describe_histogram!("search_elapsed_ms", "Search round-trip time in milliseconds.");
        describe_counter!("news_fetch_errors_total", "Failed news collection fetches.");
        describe_counter!(
            "news_stale_responses_total",
            "Responses discarded because a newer request was issued."
        );
        describe_counter!("votes_submitted_total", "Votes accepted by the remote API.");
        describe_counter!("vote_conflicts_total", "Duplicate votes rejected remotely.");
    });
}
