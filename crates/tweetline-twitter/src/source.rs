//! The page-source capability the fetcher is written against
//!
//! Two operations cover everything the pipeline needs from the remote:
//! authenticate (see [`crate::auth`]) and fetch one page. The real
//! [`crate::TwitterClient`] implements the latter; tests use deterministic
//! stubs.

use tweetline_core::ApiError;

use crate::model::Tweet;

/// Remote endpoints the pipeline calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    UserTimeline,
    SearchTweets,
}

impl Endpoint {
    /// Path under the API base
    pub fn path(self) -> &'static str {
        match self {
            Self::UserTimeline => "statuses/user_timeline.json",
            Self::SearchTweets => "search/tweets.json",
        }
    }
}

/// One page-capable API call: endpoint, query parameters and a diagnostic
/// label naming the mode and key (e.g. `timeline @acme`).
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
    pub label: String,
}

impl ApiCall {
    pub fn new(endpoint: Endpoint, label: impl Into<String>) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
            label: label.into(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }
}

/// One page of raw items plus the opaque cursor for the next page.
///
/// `next_cursor` is `None` when the remote signals there are no more
/// pages. How the cursor is derived is endpoint-specific and entirely the
/// source's business.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Tweet>,
    pub next_cursor: Option<String>,
}

/// Capability to issue one page request against the remote API.
pub trait TweetSource {
    /// Fetch one page. `cursor` is `None` for the first page, otherwise
    /// the value the previous page returned.
    ///
    /// May block while the handle waits out a rate-limit window.
    fn fetch_page(&self, call: &ApiCall, cursor: Option<&str>) -> Result<Page, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::UserTimeline.path(), "statuses/user_timeline.json");
        assert_eq!(Endpoint::SearchTweets.path(), "search/tweets.json");
    }

    #[test]
    fn api_call_builder_keeps_param_order() {
        let call = ApiCall::new(Endpoint::SearchTweets, "search \"x\"")
            .param("q", "x")
            .param("count", "100");
        assert_eq!(call.params[0], ("q".to_string(), "x".to_string()));
        assert_eq!(call.params[1], ("count".to_string(), "100".to_string()));
        assert_eq!(call.label, "search \"x\"");
    }
}
