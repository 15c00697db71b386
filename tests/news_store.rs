// tests/news_store.rs
//
// News state container against the scripted fake API.
//
// Covered:
// - vote counters move only after the remote accepted the vote
// - failures keep the previous collection and set the error slot
// - stale list responses are discarded
// - focus handling on fetch/update/delete
// - derived stats, featured item and paging

mod common;

use std::time::Duration;

use common::{ids, item, FakeNewsApi};
use factcheck_news::error::{ApiError, ErrorKind};
use factcheck_news::model::{CommentDraft, NewsDraft, NewsPatch, NewsStatus, SortKey, SortOrder, VoteType};
use factcheck_news::news_store::{NewsStats, NewsStore};

fn seeded() -> (std::sync::Arc<FakeNewsApi>, NewsStore) {
    let api = FakeNewsApi::with_news(vec![
        item("1", "Vaccine rollout", "health", NewsStatus::Real, 3, 1),
        item("2", "Moon made of cheese", "science", NewsStatus::Fake, 0, 9),
        item("3", "Budget vote delayed", "politics", NewsStatus::Pending, 2, 2),
    ]);
    let store = NewsStore::new(api.as_dyn());
    (api, store)
}

fn real_votes(store: &NewsStore, id: &str) -> u32 {
    store
        .news()
        .into_iter()
        .find(|n| n.id == id)
        .map(|n| n.real_votes)
        .expect("item present")
}

#[tokio::test]
async fn vote_increments_only_after_remote_success() {
    let (api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    assert_eq!(real_votes(&store, "1"), 3);

    api.delay_votes(Duration::from_millis(50));
    let (res, during) = tokio::join!(store.vote("1", VoteType::Real), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        real_votes(&store, "1")
    });
    res.expect("vote accepted");
    assert_eq!(during, 3, "no optimistic increment while in flight");
    assert_eq!(real_votes(&store, "1"), 4);
}

#[tokio::test]
async fn failed_vote_keeps_counters_and_sets_error() {
    let (api, store) = seeded();
    store.fetch_all().await.expect("fetch");

    api.fail_with(ApiError::Transport("connection reset".into()));
    let err = store.vote("1", VoteType::Real).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(real_votes(&store, "1"), 3);

    let state = store.error().expect("error recorded");
    assert_eq!(state.kind, ErrorKind::Transport);
    assert!(state.message.starts_with("Failed to submit vote"));
}

#[tokio::test]
async fn duplicate_vote_surfaces_conflict() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");

    store.vote("2", VoteType::Fake).await.expect("first vote");
    let err = store.vote("2", VoteType::Fake).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let state = store.error().expect("error recorded");
    assert_eq!(state.kind, ErrorKind::Conflict);
    assert_eq!(state.message, "You have already voted on this news item");
    // only the accepted vote counted
    let fake = store.news().into_iter().find(|n| n.id == "2").unwrap().fake_votes;
    assert_eq!(fake, 10);
}

#[tokio::test]
async fn vote_updates_focused_copy_too() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    store.fetch_by_id("3").await.expect("focus").expect("found");

    store.vote("3", VoteType::Real).await.expect("vote");
    assert_eq!(store.current().unwrap().real_votes, 3);
    assert_eq!(real_votes(&store, "3"), 3);
}

#[tokio::test]
async fn failed_fetch_preserves_collection() {
    let (api, store) = seeded();
    assert_eq!(store.fetch_all().await.expect("fetch"), 3);

    api.fail_with(ApiError::Transport("timeout".into()));
    assert!(store.fetch_all().await.is_err());
    assert_eq!(store.total_count(), 3);
    assert!(!store.loading());
    assert!(store.error().unwrap().message.starts_with("Failed to fetch news"));

    api.recover();
    store.fetch_all().await.expect("refetch");
    assert!(store.error().is_none(), "new action clears the error slot");
}

#[tokio::test]
async fn stale_list_response_is_discarded() {
    let (api, store) = seeded();
    let slow = vec![item("old", "Old", "x", NewsStatus::Real, 0, 0)];
    let fast = vec![item("new", "New", "x", NewsStatus::Real, 0, 0)];
    api.script_list(Duration::from_millis(80), Ok(slow));
    api.script_list(Duration::from_millis(10), Ok(fast));

    let (first, second) = tokio::join!(store.fetch_all(), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.fetch_all().await
    });
    assert!(first.is_ok() && second.is_ok());
    assert_eq!(ids(&store.news()), vec!["new"]);
    assert!(!store.loading());
}

#[tokio::test]
async fn fetch_by_id_not_found_is_distinct_from_failure() {
    let (api, store) = seeded();
    store.fetch_by_id("1").await.expect("focus");
    assert_eq!(store.current().unwrap().id, "1");

    assert_eq!(store.fetch_by_id("404").await.expect("no failure"), None);
    assert!(store.current().is_none());
    assert!(store.error().is_none());

    api.fail_with(ApiError::Status { status: 500 });
    assert!(store.fetch_by_id("1").await.is_err());
    assert!(store.error().is_some());
}

#[tokio::test]
async fn delete_clears_focus_only_for_that_item() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    store.fetch_by_id("1").await.expect("focus");

    store.delete("2").await.expect("delete other");
    assert_eq!(store.current().unwrap().id, "1");
    assert_eq!(ids(&store.news()), vec!["1", "3"]);

    store.delete("1").await.expect("delete focused");
    assert!(store.current().is_none());
    assert_eq!(ids(&store.news()), vec!["3"]);
}

#[tokio::test]
async fn update_replaces_list_entry_and_focus() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    store.fetch_by_id("3").await.expect("focus");

    let patch = NewsPatch {
        status: Some(NewsStatus::Real),
        ..Default::default()
    };
    store.update("3", &patch).await.expect("update");
    assert_eq!(store.current().unwrap().status, NewsStatus::Real);
    assert_eq!(store.news_stats().real, 2);
}

#[tokio::test]
async fn submit_prepends_pending_item() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    let created = store
        .submit(&NewsDraft {
            title: "Fresh claim".into(),
            category: "health".into(),
            ..Default::default()
        })
        .await
        .expect("submit");
    assert_eq!(created.status, NewsStatus::Pending);
    assert_eq!(store.news()[0].id, created.id);
}

#[tokio::test]
async fn invalid_comment_is_rejected_without_remote_call() {
    let (api, store) = seeded();
    let err = store
        .submit_comment(&CommentDraft {
            news_id: "1".into(),
            content: "   ".into(),
            author: None,
            vote_type: Some(VoteType::Real),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(api.calls("submit_comment"), 0);

    let ok = store
        .submit_comment(&CommentDraft {
            news_id: "1".into(),
            content: "Checked the source".into(),
            author: None,
            vote_type: Some(VoteType::Real),
        })
        .await
        .expect("comment");
    assert_eq!(ok.author, "Anonymous User");
    assert_eq!(store.fetch_comments("1").await.expect("comments").len(), 1);
}

#[tokio::test]
async fn empty_collection_yields_zero_stats_and_no_featured() {
    let api = FakeNewsApi::with_news(Vec::new());
    let store = NewsStore::new(api.as_dyn());
    store.fetch_all().await.expect("fetch");
    assert_eq!(store.news_stats(), NewsStats::default());
    assert!(store.featured_news().is_none());
    assert!(store.paginated_news().is_empty());
    assert!(!store.has_more());
}

#[tokio::test]
async fn parameter_changes_reset_paging() {
    let news = (0..25)
        .map(|i| item(&format!("n{i}"), "t", "health", NewsStatus::Real, i, 0))
        .collect();
    let api = FakeNewsApi::with_news(news);
    let store = NewsStore::with_page_size(api.as_dyn(), 12);
    store.fetch_all().await.expect("fetch");

    store.set_sorting(SortKey::Votes, SortOrder::Desc);
    assert_eq!(store.paginated_news().items[0].id, "n24");
    store.load_more();
    store.load_more();
    let last = store.paginated_news();
    assert_eq!(last.current_page, 3);
    assert_eq!(last.items.len(), 1);
    assert!(!store.has_more());

    store.set_category("health");
    assert_eq!(store.params().page, 1);
    store.set_category("sports");
    assert!(store.paginated_news().is_empty());

    store.reset_filters();
    assert_eq!(store.filtered_news().len(), 25);
    assert_eq!(store.params().page_size, 12);
}

#[tokio::test]
async fn fetch_by_status_replaces_collection() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    assert_eq!(store.fetch_by_status(NewsStatus::Fake).await.expect("status"), 1);
    assert_eq!(ids(&store.news()), vec!["2"]);
    assert_eq!(store.fetch_by_category("health").await.expect("category"), 1);
    assert_eq!(ids(&store.news()), vec!["1"]);
}

#[tokio::test]
async fn paginated_view_pairs_page_with_matching_filter() {
    let news = (0..25)
        .map(|i| item(&format!("n{i}"), "t", "health", NewsStatus::Real, i, 0))
        .collect();
    let api = FakeNewsApi::with_news(news);
    let store = NewsStore::with_page_size(api.as_dyn(), 12);
    store.fetch_all().await.expect("fetch");

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..500 {
                store.set_category("health");
                store.set_page(3);
                store.set_category("sports");
            }
        });
        for _ in 0..500 {
            let page = store.paginated_news();
            match page.total {
                0 => assert_eq!(page.current_page, 1, "empty filter paired with a later page"),
                25 => {
                    let expected = if page.current_page == 3 { 1 } else { 12 };
                    assert_eq!(page.items.len(), expected);
                }
                other => panic!("unexpected total {other}"),
            }
        }
    });
}

#[tokio::test]
async fn conflict_outside_voting_keeps_action_message() {
    let (api, store) = seeded();
    store.fetch_all().await.expect("fetch");

    api.fail_with(ApiError::Conflict("stale revision".into()));
    let err = store.update("1", &NewsPatch::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let state = store.error().expect("error recorded");
    assert_eq!(state.kind, ErrorKind::Conflict);
    assert!(state.message.starts_with("Failed to update news"));
    assert!(!state.message.contains("already voted"));
}

#[tokio::test]
async fn empty_category_filter_matches_nothing() {
    let (_api, store) = seeded();
    store.fetch_all().await.expect("fetch");
    store.set_category("");
    assert!(store.filtered_news().is_empty());
    store.set_category("all");
    assert_eq!(store.filtered_news().len(), 3);
}
