//! # Filter/Sort Engine
//! Pure functions that turn a news collection plus criteria into an ordered view.
//! No I/O, no clock reads: the caller passes `now` once per invocation so that
//! relevance ordering is reproducible for a given snapshot.

use chrono::{DateTime, Duration, Months, Utc};
use std::cmp::Ordering;

use crate::model::{is_all, DateRange, NewsItem, SortKey, SortOrder};

/// Weight of the vote volume in the relevance score.
pub const RELEVANCE_VOTE_WEIGHT: f64 = 0.7;
/// Weight of the item age (milliseconds) in the relevance score.
pub const RELEVANCE_AGE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCriteria {
    pub category: String,
    pub status: String,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for ViewCriteria {
    fn default() -> Self {
        Self {
            category: crate::model::ALL.to_string(),
            status: crate::model::ALL.to_string(),
            sort_by: SortKey::Date,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Filter by category/status (exact match, `"all"` passes) and sort stably.
pub fn view(items: &[NewsItem], criteria: &ViewCriteria, now: DateTime<Utc>) -> Vec<NewsItem> {
    let mut out: Vec<NewsItem> = items
        .iter()
        .filter(|n| matches_exact_or_all(&n.category, &criteria.category))
        .filter(|n| matches_exact_or_all(n.status.as_str(), &criteria.status))
        .cloned()
        .collect();
    sort_in_place(&mut out, criteria.sort_by, criteria.sort_order, now);
    out
}

/// Stable sort by `key`; `Desc` reverses the comparison, ties keep input order.
pub fn sort_in_place(items: &mut [NewsItem], key: SortKey, order: SortOrder, now: DateTime<Utc>) {
    items.sort_by(|a, b| {
        let cmp = compare(a, b, key, now);
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
}

fn compare(a: &NewsItem, b: &NewsItem, key: SortKey, now: DateTime<Utc>) -> Ordering {
    match key {
        SortKey::Date => a.created_at.cmp(&b.created_at),
        SortKey::Votes => a.total_votes().cmp(&b.total_votes()),
        SortKey::Relevance => relevance_score(a, now).total_cmp(&relevance_score(b, now)),
    }
}

/// `0.7 * votes + 0.3 * age_ms`, evaluated against a frozen `now`.
pub fn relevance_score(item: &NewsItem, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - item.created_at).num_milliseconds() as f64;
    RELEVANCE_VOTE_WEIGHT * item.total_votes() as f64 + RELEVANCE_AGE_WEIGHT * age_ms
}

pub fn matches_exact_or_all(value: &str, wanted: &str) -> bool {
    is_all(wanted) || value == wanted
}

/// Case-insensitive variant used by the search post-filter.
pub fn matches_ignore_case(value: &str, wanted: &str) -> bool {
    is_all(wanted) || value.eq_ignore_ascii_case(wanted.trim())
}

/// Earliest creation instant admitted by `range`, or `None` for `All`.
pub fn date_range_floor(range: DateRange, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match range {
        DateRange::Today => Some(now - Duration::days(1)),
        DateRange::Week => Some(now - Duration::days(7)),
        DateRange::Month => Some(
            now.checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        ),
        DateRange::All => None,
    }
}

pub fn within_date_range(item: &NewsItem, range: DateRange, now: DateTime<Utc>) -> bool {
    match date_range_floor(range, now) {
        Some(floor) => item.created_at >= floor,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsStatus;
    use chrono::TimeZone;

    fn item(id: &str, category: &str, status: NewsStatus, day: u32, real: u32, fake: u32) -> NewsItem {
        NewsItem {
            id: id.into(),
            title: format!("title {id}"),
            summary: String::new(),
            content: String::new(),
            image_url: String::new(),
            category: category.into(),
            status,
            reporter: "r".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            submitted_by: None,
            submitted_at: None,
            verified_at: None,
            source_url: None,
            real_votes: real,
            fake_votes: fake,
            confidence: None,
            tags: Vec::new(),
            views: None,
            shares: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap()
    }

    fn ids(v: &[NewsItem]) -> Vec<&str> {
        v.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn category_and_status_filters_are_exact() {
        let items = vec![
            item("a", "health", NewsStatus::Real, 1, 0, 0),
            item("b", "Health", NewsStatus::Real, 2, 0, 0),
            item("c", "health", NewsStatus::Fake, 3, 0, 0),
        ];
        let criteria = ViewCriteria {
            category: "health".into(),
            status: "real".into(),
            sort_by: SortKey::Date,
            sort_order: SortOrder::Asc,
        };
        assert_eq!(ids(&view(&items, &criteria, now())), vec!["a"]);
    }

    #[test]
    fn date_sort_orders_by_instant() {
        let items = vec![
            item("mid", "x", NewsStatus::Real, 10, 0, 0),
            item("new", "x", NewsStatus::Real, 20, 0, 0),
            item("old", "x", NewsStatus::Real, 1, 0, 0),
        ];
        let desc = view(&items, &ViewCriteria::default(), now());
        assert_eq!(ids(&desc), vec!["new", "mid", "old"]);
    }

    #[test]
    fn relevance_uses_frozen_now() {
        let items = vec![
            item("a", "x", NewsStatus::Real, 10, 5, 0),
            item("b", "x", NewsStatus::Real, 20, 500, 0),
        ];
        let criteria = ViewCriteria {
            sort_by: SortKey::Relevance,
            ..Default::default()
        };
        let first = view(&items, &criteria, now());
        let second = view(&items, &criteria, now());
        assert_eq!(ids(&first), ids(&second));
        // Ten days of age dominate a few hundred votes in the composite score.
        assert_eq!(ids(&first), vec!["a", "b"]);
    }

    #[test]
    fn input_is_left_untouched() {
        let items = vec![
            item("a", "x", NewsStatus::Real, 1, 0, 0),
            item("b", "x", NewsStatus::Real, 2, 0, 0),
        ];
        let before = items.clone();
        let _ = view(&items, &ViewCriteria::default(), now());
        assert_eq!(items, before);
    }

    #[test]
    fn date_range_buckets() {
        let now = now();
        let recent = item("r", "x", NewsStatus::Real, 29, 0, 0);
        let older = item("o", "x", NewsStatus::Real, 10, 0, 0);
        assert!(within_date_range(&recent, DateRange::Today, now));
        assert!(!within_date_range(&older, DateRange::Week, now));
        assert!(within_date_range(&older, DateRange::Month, now));
        assert!(within_date_range(&older, DateRange::All, now));
    }

    #[test]
    fn ignore_case_matching_honors_sentinel() {
        assert!(matches_ignore_case("Health", "health"));
        assert!(matches_ignore_case("anything", "all"));
        assert!(!matches_ignore_case("tech", "health"));
    }

    #[test]
    fn empty_category_is_not_the_sentinel() {
        let items = vec![item("a", "health", NewsStatus::Real, 1, 0, 0)];
        let criteria = ViewCriteria {
            category: String::new(),
            ..Default::default()
        };
        assert!(view(&items, &criteria, now()).is_empty());
    }
}
