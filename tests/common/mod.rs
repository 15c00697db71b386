// tests/common/mod.rs
//
// Scripted in-memory `NewsApi` shared by the integration tests.
// Counts calls per method, can fail on demand, and can delay or replace
// individual `list_news` responses to provoke out-of-order completion.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use factcheck_news::api::{ApiResult, DynNewsApi, NewsApi};
use factcheck_news::error::ApiError;
use factcheck_news::model::{
    Comment, NewComment, NewsDraft, NewsItem, NewsPatch, NewsStatus, Suggestion, Vote, VoteRequest,
};
use factcheck_news::suggest::{derive_suggestions, MAX_SUGGESTIONS};

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()
}

pub fn item(id: &str, title: &str, category: &str, status: NewsStatus, real: u32, fake: u32) -> NewsItem {
    NewsItem {
        id: id.into(),
        title: title.into(),
        summary: String::new(),
        content: String::new(),
        image_url: String::new(),
        category: category.into(),
        status,
        reporter: "desk".into(),
        created_at: Utc::now(),
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

pub fn item_at(id: &str, created_at: DateTime<Utc>, real: u32, fake: u32) -> NewsItem {
    NewsItem {
        created_at,
        ..item(id, &format!("Story {id}"), "general", NewsStatus::Real, real, fake)
    }
}

pub fn ids(items: &[NewsItem]) -> Vec<String> {
    items.iter().map(|n| n.id.clone()).collect()
}

/// A scripted response for one `list_news` call.
pub struct Scripted {
    pub delay: Duration,
    pub result: ApiResult<Vec<NewsItem>>,
}

#[derive(Default)]
pub struct FakeNewsApi {
    news: Mutex<Vec<NewsItem>>,
    comments: Mutex<Vec<Comment>>,
    voted: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    fail_with: Mutex<Option<ApiError>>,
    list_script: Mutex<VecDeque<Scripted>>,
    vote_delay: Mutex<Duration>,
}

impl FakeNewsApi {
    pub fn with_news(news: Vec<NewsItem>) -> Arc<Self> {
        let api = Self::default();
        *api.news.lock().unwrap() = news;
        Arc::new(api)
    }

    pub fn as_dyn(self: &Arc<Self>) -> DynNewsApi {
        self.clone()
    }

    /// Every following call fails with `err` until `recover()`.
    pub fn fail_with(&self, err: ApiError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn script_list(&self, delay: Duration, result: ApiResult<Vec<NewsItem>>) {
        self.list_script
            .lock()
            .unwrap()
            .push_back(Scripted { delay, result });
    }

    pub fn delay_votes(&self, delay: Duration) {
        *self.vote_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    fn enter(&self, method: &'static str) -> ApiResult<()> {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
        match self.fail_with.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn snapshot(&self) -> Vec<NewsItem> {
        self.news.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsApi for FakeNewsApi {
    async fn list_news(&self) -> ApiResult<Vec<NewsItem>> {
        let scripted = self.list_script.lock().unwrap().pop_front();
        if let Some(s) = scripted {
            *self.calls.lock().unwrap().entry("list_news").or_default() += 1;
            tokio::time::sleep(s.delay).await;
            return s.result;
        }
        self.enter("list_news")?;
        Ok(self.snapshot())
    }

    async fn get_news(&self, id: &str) -> ApiResult<Option<NewsItem>> {
        self.enter("get_news")?;
        Ok(self.snapshot().into_iter().find(|n| n.id == id))
    }

    async fn list_by_category(&self, category: &str) -> ApiResult<Vec<NewsItem>> {
        self.enter("list_by_category")?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|n| n.category == category)
            .collect())
    }

    async fn list_by_status(&self, status: NewsStatus) -> ApiResult<Vec<NewsItem>> {
        self.enter("list_by_status")?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|n| n.status == status)
            .collect())
    }

    async fn search_by_title(&self, query: &str) -> ApiResult<Vec<NewsItem>> {
        self.enter("search_by_title")?;
        let q = query.to_lowercase();
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|n| n.title.to_lowercase().contains(&q))
            .collect())
    }

    async fn suggestions(&self, partial: &str) -> ApiResult<Vec<Suggestion>> {
        self.enter("suggestions")?;
        let q = partial.to_lowercase();
        let matches: Vec<NewsItem> = self
            .snapshot()
            .into_iter()
            .filter(|n| n.title.to_lowercase().contains(&q))
            .collect();
        Ok(derive_suggestions(partial, &matches, MAX_SUGGESTIONS))
    }

    async fn submit_vote(&self, vote: &VoteRequest) -> ApiResult<Vote> {
        self.enter("submit_vote")?;
        let delay = *self.vote_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        if !self.voted.lock().unwrap().insert(vote.news_id.clone()) {
            return Err(ApiError::Conflict("already voted".into()));
        }
        Ok(Vote {
            id: format!("v-{}", vote.news_id),
            news_id: vote.news_id.clone(),
            user_id: "tester".into(),
            vote_type: vote.vote_type,
            created_at: vote.created_at,
        })
    }

    async fn list_comments(&self, news_id: &str) -> ApiResult<Vec<Comment>> {
        self.enter("list_comments")?;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.news_id == news_id)
            .cloned()
            .collect())
    }

    async fn submit_comment(&self, comment: &NewComment) -> ApiResult<Comment> {
        self.enter("submit_comment")?;
        let mut all = self.comments.lock().unwrap();
        let created = Comment {
            id: format!("c{}", all.len() + 1),
            news_id: comment.news_id.clone(),
            author: comment.author.clone(),
            content: comment.content.clone(),
            vote_type: comment.vote_type,
            created_at: comment.created_at,
        };
        all.push(created.clone());
        Ok(created)
    }

    async fn submit_news(&self, draft: &NewsDraft) -> ApiResult<NewsItem> {
        self.enter("submit_news")?;
        let mut all = self.news.lock().unwrap();
        let created = NewsItem {
            summary: draft.summary.clone(),
            ..item(
                &format!("n{}", all.len() + 1),
                &draft.title,
                &draft.category,
                NewsStatus::Pending,
                0,
                0,
            )
        };
        all.push(created.clone());
        Ok(created)
    }

    async fn update_news(&self, id: &str, patch: &NewsPatch) -> ApiResult<NewsItem> {
        self.enter("update_news")?;
        let mut all = self.news.lock().unwrap();
        let n = all
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(ApiError::NotFound)?;
        n.apply_patch(patch);
        Ok(n.clone())
    }

    async fn delete_news(&self, id: &str) -> ApiResult<()> {
        self.enter("delete_news")?;
        let mut all = self.news.lock().unwrap();
        let before = all.len();
        all.retain(|n| n.id != id);
        if all.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
