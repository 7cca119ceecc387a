//! Deterministic fixtures shared by unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::RangeInclusive;

use tweetline_core::ApiError;

use crate::model::{Entities, Tweet, TwitterUser};
use crate::source::{ApiCall, Endpoint, Page, TweetSource};

/// One recorded page request
#[derive(Debug, Clone)]
pub struct Request {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
    pub cursor: Option<String>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Page source driven by a scripted queue of outcomes.
///
/// Requests past the end of the script return an empty final page, so a
/// short script never hangs a test.
pub struct StubSource {
    steps: RefCell<VecDeque<Result<Page, ApiError>>>,
    pub requests: RefCell<Vec<Request>>,
}

impl StubSource {
    pub fn new(steps: Vec<Result<Page, ApiError>>) -> Self {
        Self {
            steps: RefCell::new(steps.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn request(&self, idx: usize) -> Request {
        self.requests.borrow()[idx].clone()
    }
}

impl TweetSource for StubSource {
    fn fetch_page(&self, call: &ApiCall, cursor: Option<&str>) -> Result<Page, ApiError> {
        self.requests.borrow_mut().push(Request {
            endpoint: call.endpoint,
            params: call.params.clone(),
            cursor: cursor.map(String::from),
        });
        self.steps
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::default()))
    }
}

/// Fixture tweet with deterministic content derived from `id`
pub fn tweet(id: u64) -> Tweet {
    Tweet {
        id: Some(id),
        id_str: id.to_string(),
        created_at: "Mon Sep 24 03:35:21 +0000 2012".to_string(),
        full_text: format!("fixture tweet {id}"),
        lang: Some("en".to_string()),
        favorite_count: id as i64 % 10,
        retweet_count: id as i64 % 3,
        entities: Entities::default(),
        user: TwitterUser {
            id_str: "42".to_string(),
            screen_name: "poster".to_string(),
            verified: false,
            followers_count: 10,
            friends_count: 5,
            location: None,
        },
    }
}

pub fn tweets(ids: RangeInclusive<u64>) -> Vec<Tweet> {
    ids.map(tweet).collect()
}

pub fn page(ids: RangeInclusive<u64>, next_cursor: Option<&str>) -> Page {
    Page {
        items: tweets(ids),
        next_cursor: next_cursor.map(String::from),
    }
}
