//! Demo that boots the mock data server on an ephemeral port and drives the
//! listing and search containers against it over HTTP.

use anyhow::Result;
use chrono::{Duration, Utc};
use factcheck_news::config::FactcheckConfig;
use factcheck_news::mock_server::{self, MockDb, ServerState};
use factcheck_news::model::{FilterUpdate, NewsItem, NewsStatus, SortKey, SortOrder, VoteType};
use factcheck_news::{telemetry, AppContext};

fn seed_item(id: u32, title: &str, category: &str, status: NewsStatus, days_ago: i64, real: u32) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: format!("Summary of {title}"),
        content: String::new(),
        image_url: String::new(),
        category: category.to_string(),
        status,
        reporter: "Demo Desk".to_string(),
        created_at: Utc::now() - Duration::days(days_ago),
        submitted_by: None,
        submitted_at: None,
        verified_at: None,
        source_url: None,
        real_votes: real,
        fake_votes: real / 3,
        confidence: None,
        tags: vec![category.to_string()],
        views: None,
        shares: None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let db = MockDb {
        news: vec![
            seed_item(1, "Vaccine trial results published", "health", NewsStatus::Real, 2, 42),
            seed_item(2, "Miracle vaccine cures everything", "health", NewsStatus::Fake, 1, 3),
            seed_item(3, "Chip breakthrough doubles battery life", "technology", NewsStatus::Pending, 10, 8),
            seed_item(4, "Climate summit reaches agreement", "politics", NewsStatus::Real, 40, 25),
        ],
        ..Default::default()
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = mock_server::router(ServerState::new(db));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let mut cfg = FactcheckConfig::default();
    cfg.api.base_url = format!("http://{addr}");
    cfg.storage.dir = None;
    let ctx = AppContext::from_config(&cfg)?;
    ctx.set_token(Some("demo-user".into()));

    let n = ctx.news.fetch_all().await?;
    println!("fetched {n} items");

    ctx.news.set_sorting(SortKey::Votes, SortOrder::Desc);
    for item in ctx.news.paginated_news().items {
        println!("  [{}] {} ({} votes)", item.status, item.title, item.total_votes());
    }
    println!("stats: {:?}", ctx.news.news_stats());
    if let Some(f) = ctx.news.featured_news() {
        println!("featured: {}", f.title);
    }

    ctx.news.vote("3", VoteType::Real).await?;
    if let Err(e) = ctx.news.vote("3", VoteType::Real).await {
        println!("second vote rejected: {e}");
    }

    let outcome = ctx
        .search
        .perform_search(
            "  vaccine ",
            Some(&FilterUpdate {
                category: Some("health".into()),
                ..Default::default()
            }),
        )
        .await?;
    println!(
        "search '{}' -> {} results in {:?}",
        outcome.query, outcome.total_count, outcome.elapsed
    );
    println!("suggestions for 'va': {:?}", ctx.search.suggest("va").await);
    println!("recent searches: {:?}", ctx.search.recent_searches());

    println!("search-demo done");
    Ok(())
}
