//! # Data model
//! Wire types shared by the API client, the mock server and the state containers.
//! Field names are camelCase on the wire to match the REST data server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel filter value meaning "no restriction on this field".
pub const ALL: &str = "all";

/// True only for the literal `"all"` sentinel. An empty value is a real
/// (empty) filter and matches nothing.
pub fn is_all(value: &str) -> bool {
    value == ALL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Real,
    Fake,
    Pending,
}

impl NewsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NewsStatus::Real => "real",
            NewsStatus::Fake => "fake",
            NewsStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for NewsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(NewsStatus::Real),
            "fake" => Ok(NewsStatus::Fake),
            "pending" => Ok(NewsStatus::Pending),
            other => Err(format!("unknown news status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Real,
    Fake,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Real => "real",
            VoteType::Fake => "fake",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
    pub status: NewsStatus,
    #[serde(default)]
    pub reporter: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub real_votes: u32,
    #[serde(default)]
    pub fake_votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
}

impl NewsItem {
    /// `real_votes + fake_votes`, widened so the sum cannot overflow.
    pub fn total_votes(&self) -> u64 {
        u64::from(self.real_votes) + u64::from(self.fake_votes)
    }

    /// Bump the counter matching `vote_type`.
    pub fn record_vote(&mut self, vote_type: VoteType) {
        match vote_type {
            VoteType::Real => self.real_votes = self.real_votes.saturating_add(1),
            VoteType::Fake => self.fake_votes = self.fake_votes.saturating_add(1),
        }
    }

    /// Overlay the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: &NewsPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.summary {
            self.summary = v.clone();
        }
        if let Some(v) = &patch.content {
            self.content = v.clone();
        }
        if let Some(v) = &patch.image_url {
            self.image_url = v.clone();
        }
        if let Some(v) = &patch.category {
            self.category = v.clone();
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = &patch.reporter {
            self.reporter = v.clone();
        }
        if let Some(v) = &patch.source_url {
            self.source_url = Some(v.clone());
        }
        if let Some(v) = patch.verified_at {
            self.verified_at = Some(v);
        }
        if let Some(v) = &patch.tags {
            self.tags = v.clone();
        }
    }
}

/// Submission input. The server assigns id, `pending` status and zeroed counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
    #[serde(default)]
    pub reporter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NewsStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub news_id: String,
    pub author: String,
    pub content: String,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

/// Comment as typed by the user. Missing fields are rejected before any remote call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    #[serde(default)]
    pub news_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<VoteType>,
}

/// Comment payload sent to `POST /comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub news_id: String,
    pub author: String,
    pub content: String,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub news_id: String,
    pub user_id: String,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

/// Payload sent to `POST /votes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub news_id: String,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Date,
    Votes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Snapshot of the structured search filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub category: String,
    pub status: String,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub sort_by: SortKey,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category: ALL.to_string(),
            status: ALL.to_string(),
            date_range: DateRange::All,
            sort_by: SortKey::Relevance,
        }
    }
}

/// Partial filter update merged over the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub status: Option<String>,
    pub date_range: Option<DateRange>,
    pub sort_by: Option<SortKey>,
}

impl FilterConfig {
    pub fn merged(&self, update: &FilterUpdate) -> FilterConfig {
        FilterConfig {
            category: update
                .category
                .clone()
                .unwrap_or_else(|| self.category.clone()),
            status: update.status.clone().unwrap_or_else(|| self.status.clone()),
            date_range: update.date_range.unwrap_or(self.date_range),
            sort_by: update.sort_by.unwrap_or(self.sort_by),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub filters: FilterConfig,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Query,
    Category,
    Tag,
}

/// Typeahead hint. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_item_reads_camel_case_wire_format() {
        let raw = r#"{
            "id": "1",
            "title": "Vaccine rumor",
            "summary": "s",
            "content": "c",
            "imageUrl": "https://img/1.png",
            "category": "health",
            "status": "fake",
            "reporter": "Ann",
            "createdAt": "2024-01-10T08:00:00Z",
            "realVotes": 3,
            "fakeVotes": 41,
            "tags": ["covid"]
        }"#;
        let item: NewsItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.status, NewsStatus::Fake);
        assert_eq!(item.image_url, "https://img/1.png");
        assert_eq!(item.total_votes(), 44);
        assert_eq!(item.tags, vec!["covid".to_string()]);
    }

    #[test]
    fn missing_vote_counters_default_to_zero() {
        let raw = r#"{"id":"2","title":"t","category":"tech","status":"pending","createdAt":"2024-01-10T08:00:00Z"}"#;
        let item: NewsItem = serde_json::from_str(raw).unwrap();
        assert_eq!((item.real_votes, item.fake_votes), (0, 0));
    }

    #[test]
    fn sentinel_is_the_literal_all() {
        assert!(is_all("all"));
        assert!(!is_all("ALL"));
        assert!(!is_all(""));
        assert!(!is_all("health"));
    }

    #[test]
    fn filter_merge_keeps_unset_fields() {
        let base = FilterConfig::default();
        let merged = base.merged(&FilterUpdate {
            status: Some("real".into()),
            ..Default::default()
        });
        assert_eq!(merged.status, "real");
        assert_eq!(merged.category, ALL);
        assert_eq!(merged.sort_by, SortKey::Relevance);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut item: NewsItem = serde_json::from_str(
            r#"{"id":"3","title":"old","category":"tech","status":"pending","createdAt":"2024-01-10T08:00:00Z"}"#,
        )
        .unwrap();
        item.apply_patch(&NewsPatch {
            status: Some(NewsStatus::Real),
            ..Default::default()
        });
        assert_eq!(item.status, NewsStatus::Real);
        assert_eq!(item.title, "old");
    }
}
