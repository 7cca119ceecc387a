//! Authenticated client handle with wait-on-limit behavior
//!
//! One handle per orchestrator run. The handle owns the quota accounting
//! the remote advertises through `x-rate-limit-*` headers and blocks the
//! calling thread, rather than failing, whenever the next request would
//! exceed the quota.

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tweetline_core::{ApiError, ApiResponse, api};

use crate::auth::{Credentials, oauth1_header};
use crate::model::Tweet;
use crate::source::{ApiCall, Endpoint, Page, TweetSource};

/// Default v1.1 API base
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";

/// Rate-limit window length enforced by the remote (15 minutes)
const RATE_WINDOW_SECS: u64 = 15 * 60;

/// Wait applied when the remote reports exhaustion without a usable reset
/// header
const FALLBACK_WAIT_SECS: u64 = 60;

/// Quota state as last advertised by the remote
#[derive(Debug, Clone, Copy, Default)]
struct QuotaState {
    remaining: Option<u64>,
    reset_epoch: Option<u64>,
}

/// Seconds to sleep before the next request may be issued, `None` when the
/// budget allows it now. Clamped to one full window so a skewed reset
/// header cannot stall a run for hours.
fn wait_secs(state: QuotaState, now_epoch: u64) -> Option<u64> {
    if state.remaining != Some(0) {
        return None;
    }
    match state.reset_epoch {
        Some(reset) if reset > now_epoch => Some((reset - now_epoch + 1).min(RATE_WINDOW_SECS)),
        Some(_) => None, // window already rolled over
        None => Some(FALLBACK_WAIT_SECS),
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Authenticated session against the remote API.
///
/// Create via [`crate::auth::authenticate`]; reuse for every request in a
/// run — each handle carries its own wait-on-limit counters, so redundant
/// handles duplicate and waste rate budget.
#[derive(Debug)]
pub struct TwitterClient {
    credentials: Credentials,
    api_base: String,
    quota: Mutex<QuotaState>,
}

impl TwitterClient {
    pub(crate) fn new(credentials: Credentials, api_base: &str) -> Self {
        Self {
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            quota: Mutex::new(QuotaState::default()),
        }
    }

    /// Signed GET under the API base, waiting out the quota window when
    /// the handle's accounting or the remote says so.
    pub(crate) fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiResponse, ApiError> {
        let base_url = format!("{}/{}", self.api_base, path);
        loop {
            self.wait_if_exhausted();

            let auth = oauth1_header("GET", &base_url, query, &self.credentials);
            let url = build_url(&base_url, query);
            let resp = api::get(&url, &[("Authorization", auth)])?;
            self.update_quota(&resp);

            if resp.status == 429 {
                let wait = resp
                    .header_u64("x-rate-limit-reset")
                    .and_then(|reset| {
                        wait_secs(
                            QuotaState {
                                remaining: Some(0),
                                reset_epoch: Some(reset),
                            },
                            now_epoch(),
                        )
                    })
                    .unwrap_or(FALLBACK_WAIT_SECS);
                log::warn!("Rate limit reached on {path}, waiting {wait}s for the window to reset");
                std::thread::sleep(Duration::from_secs(wait));
                continue;
            }
            if resp.status >= 400 {
                return Err(ApiError::Http {
                    status: Some(resp.status),
                    message: error_message(&resp.body),
                });
            }
            return Ok(resp);
        }
    }

    fn wait_if_exhausted(&self) {
        let state = *self.quota.lock().unwrap();
        if let Some(wait) = wait_secs(state, now_epoch()) {
            log::warn!("Rate limit budget exhausted, waiting {wait}s for the window to reset");
            std::thread::sleep(Duration::from_secs(wait));
        }
    }

    fn update_quota(&self, resp: &ApiResponse) {
        let remaining = resp.header_u64("x-rate-limit-remaining");
        let reset = resp.header_u64("x-rate-limit-reset");
        if remaining.is_some() || reset.is_some() {
            let mut state = self.quota.lock().unwrap();
            if remaining.is_some() {
                state.remaining = remaining;
            }
            if reset.is_some() {
                state.reset_epoch = reset;
            }
        }
    }

    fn timeline_page(&self, call: &ApiCall, cursor: Option<&str>) -> Result<Page, ApiError> {
        let mut query = call.params.clone();
        if let Some(max_id) = cursor {
            query.push(("max_id".to_string(), max_id.to_string()));
        }
        let resp = self.get(call.endpoint.path(), &query)?;
        let items: Vec<Tweet> = serde_json::from_str(&resp.body)
            .map_err(|e| ApiError::Invalid(format!("timeline payload: {e}")))?;
        // No explicit cursor on this endpoint: page with max_id one below
        // the oldest item (the API returns reverse-chronological order)
        let next_cursor = items
            .last()
            .and_then(Tweet::numeric_id)
            .map(|id| id.saturating_sub(1).to_string());
        Ok(Page { items, next_cursor })
    }

    fn search_page(&self, call: &ApiCall, cursor: Option<&str>) -> Result<Page, ApiError> {
        let mut query = call.params.clone();
        if let Some(max_id) = cursor {
            query.push(("max_id".to_string(), max_id.to_string()));
        }
        let resp = self.get(call.endpoint.path(), &query)?;
        let parsed: SearchResponse = serde_json::from_str(&resp.body)
            .map_err(|e| ApiError::Invalid(format!("search payload: {e}")))?;
        let next_cursor = parsed
            .search_metadata
            .next_results
            .as_deref()
            .and_then(parse_max_id);
        Ok(Page {
            items: parsed.statuses,
            next_cursor,
        })
    }
}

impl TweetSource for TwitterClient {
    fn fetch_page(&self, call: &ApiCall, cursor: Option<&str>) -> Result<Page, ApiError> {
        match call.endpoint {
            Endpoint::UserTimeline => self.timeline_page(call, cursor),
            Endpoint::SearchTweets => self.search_page(call, cursor),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Tweet>,
    #[serde(default)]
    search_metadata: SearchMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct SearchMetadata {
    #[serde(default)]
    next_results: Option<String>,
}

/// Pull the max_id value out of a `next_results` query fragment like
/// `?max_id=1234&q=%23sale&count=100`
fn parse_max_id(next_results: &str) -> Option<String> {
    next_results
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("max_id="))
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn build_url(base_url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return base_url.to_string();
    }
    let qs = query
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base_url}?{qs}")
}

/// Best-effort extraction of the remote's error message from a body like
/// `{"errors":[{"code":88,"message":"Rate limit exceeded"}]}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("errors")?
                .as_array()?
                .first()?
                .get("message")?
                .as_str()
                .map(String::from)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
