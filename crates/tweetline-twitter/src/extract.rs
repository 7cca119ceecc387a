//! Extraction modes
//!
//! Four thin strategies over the paginated fetcher. Each builds the call
//! for its endpoint, walks the pages and flattens every raw item into a
//! normalized record. A fetch failure surfaces as a short (possibly
//! empty) record list, never as an error — the paginator has already
//! logged which mode and key failed.

use chrono::NaiveDate;

use crate::model::Tweet;
use crate::pagination::Paginator;
use crate::source::{ApiCall, Endpoint, TweetSource};
use crate::transform::{SearchRecord, TimelineRecord};

/// Remote maximum for items per page request
pub const MAX_PAGE_SIZE: usize = 200;

/// Result ordering preference for search-based modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultType {
    #[default]
    Mixed,
    Recent,
    Popular,
}

impl ResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::Recent => "recent",
            Self::Popular => "popular",
        }
    }
}

/// Parameters shared by every extraction
#[derive(Debug, Clone)]
pub struct FetchParams {
    /// Items per page request, clamped to [`MAX_PAGE_SIZE`]
    pub page_size: usize,
    /// Total items to collect per extraction
    pub extraction_size: usize,
    pub result_type: ResultType,
    /// Upper date bound for search-based modes; the remote enforces its
    /// own ~7-day lookback regardless
    pub until: Option<NaiveDate>,
    /// Exclude replies from timeline extractions
    pub exclude_replies: bool,
    /// Include the user's own retweets in timeline extractions
    pub include_rts: bool,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            extraction_size: 10_000,
            result_type: ResultType::Mixed,
            until: None,
            exclude_replies: false,
            include_rts: false,
        }
    }
}

impl FetchParams {
    pub fn effective_page_size(&self) -> usize {
        self.page_size.min(MAX_PAGE_SIZE)
    }
}

fn collect<S: TweetSource>(source: &S, call: ApiCall, params: &FetchParams) -> Vec<Tweet> {
    Paginator::new(source, call, params.extraction_size).collect()
}

fn search_call(label: String, query: &str, language: &str, params: &FetchParams) -> ApiCall {
    let mut call = ApiCall::new(Endpoint::SearchTweets, label)
        .param("q", query)
        .param("lang", language)
        .param("result_type", params.result_type.as_str())
        .param("count", params.effective_page_size().to_string())
        .param("tweet_mode", "extended");
    if let Some(until) = params.until {
        call = call.param("until", until.format("%Y-%m-%d").to_string());
    }
    call
}

/// Extract posts authored by one user
pub fn user_timeline<S: TweetSource>(
    source: &S,
    screen_name: &str,
    user_type: Option<&str>,
    params: &FetchParams,
) -> Vec<TimelineRecord> {
    log::info!("Extracting timeline for @{screen_name}");
    let call = ApiCall::new(Endpoint::UserTimeline, format!("timeline @{screen_name}"))
        .param("screen_name", screen_name)
        .param("count", params.effective_page_size().to_string())
        .param("tweet_mode", "extended")
        .param("exclude_replies", params.exclude_replies.to_string())
        .param("include_rts", params.include_rts.to_string());
    collect(source, call, params)
        .iter()
        .map(|t| TimelineRecord::from_tweet(screen_name, user_type, t))
        .collect()
}

/// Extract posts replying to one user within the freshness window
pub fn replies_to_user<S: TweetSource>(
    source: &S,
    username: &str,
    language: &str,
    params: &FetchParams,
) -> Vec<SearchRecord> {
    log::info!("Extracting replies to @{username} [{language}]");
    let call = search_call(
        format!("replies @{username} [{language}]"),
        &format!("to:{username}"),
        language,
        params,
    );
    collect(source, call, params)
        .iter()
        .map(|t| SearchRecord::from_tweet(username, language, t))
        .collect()
}

/// Extract posts matching an arbitrary search query within the freshness
/// window
pub fn search_tweets<S: TweetSource>(
    source: &S,
    query: &str,
    language: &str,
    params: &FetchParams,
) -> Vec<SearchRecord> {
    log::info!("Extracting search for {query:?} [{language}]");
    let call = search_call(
        format!("search {query:?} [{language}]"),
        query,
        language,
        params,
    );
    collect(source, call, params)
        .iter()
        .map(|t| SearchRecord::from_tweet(query, language, t))
        .collect()
}

/// Extract posts in a hashtag within the freshness window.
///
/// The `#` marker is (re)applied to the tag and the prefixed form becomes
/// the mode key of every record.
pub fn hashtag_tweets<S: TweetSource>(
    source: &S,
    tag: &str,
    language: &str,
    params: &FetchParams,
) -> Vec<SearchRecord> {
    let query = format!("#{}", tag.trim_start_matches('#'));
    log::info!("Extracting hashtag {query} [{language}]");
    let call = search_call(format!("hashtag {query} [{language}]"), &query, language, params);
    collect(source, call, params)
        .iter()
        .map(|t| SearchRecord::from_tweet(&query, language, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetline_core::ApiError;

    use crate::testing::{StubSource, page};

    fn params(page_size: usize, extraction_size: usize) -> FetchParams {
        FetchParams {
            page_size,
            extraction_size,
            ..Default::default()
        }
    }

    #[test]
    fn timeline_builds_expected_call() {
        let stub = StubSource::new(vec![Ok(page(1..=2, None))]);
        let records = user_timeline(&stub, "acme", Some("customer"), &params(100, 50));
        assert_eq!(records.len(), 2);

        let req = stub.request(0);
        assert_eq!(req.endpoint, Endpoint::UserTimeline);
        assert_eq!(req.param("screen_name"), Some("acme"));
        assert_eq!(req.param("count"), Some("100"));
        assert_eq!(req.param("tweet_mode"), Some("extended"));
        assert_eq!(req.param("exclude_replies"), Some("false"));
        assert_eq!(req.param("include_rts"), Some("false"));
    }

    #[test]
    fn page_size_clamped_to_remote_maximum() {
        let stub = StubSource::new(vec![Ok(page(1..=1, None))]);
        user_timeline(&stub, "acme", None, &params(5_000, 10));
        assert_eq!(stub.request(0).param("count"), Some("200"));
    }

    #[test]
    fn replies_query_targets_username() {
        let stub = StubSource::new(vec![Ok(page(1..=1, None))]);
        let records = replies_to_user(&stub, "acme", "en", &params(200, 10));
        let req = stub.request(0);
        assert_eq!(req.endpoint, Endpoint::SearchTweets);
        assert_eq!(req.param("q"), Some("to:acme"));
        assert_eq!(req.param("lang"), Some("en"));
        assert_eq!(req.param("result_type"), Some("mixed"));
        assert_eq!(records[0].key, "acme");
        assert_eq!(records[0].requested_language, "en");
    }

    #[test]
    fn search_passes_query_verbatim() {
        let stub = StubSource::new(vec![Ok(page(1..=1, None))]);
        let records = search_tweets(&stub, "rust lang", "es", &params(200, 10));
        assert_eq!(stub.request(0).param("q"), Some("rust lang"));
        assert_eq!(records[0].key, "rust lang");
        assert_eq!(records[0].requested_language, "es");
    }

    #[test]
    fn hashtag_prefixes_marker_and_keys_records_on_it() {
        let stub = StubSource::new(vec![Ok(page(1..=3, None))]);
        let records = hashtag_tweets(&stub, "sale", "en", &params(200, 10));
        assert_eq!(stub.request(0).param("q"), Some("#sale"));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.key == "#sale"));
    }

    #[test]
    fn hashtag_input_with_marker_is_not_doubled() {
        let stub = StubSource::new(vec![Ok(page(1..=1, None))]);
        let records = hashtag_tweets(&stub, "#sale", "en", &params(200, 10));
        assert_eq!(stub.request(0).param("q"), Some("#sale"));
        assert_eq!(records[0].key, "#sale");
    }

    #[test]
    fn until_bound_is_forwarded() {
        let stub = StubSource::new(vec![Ok(page(1..=1, None))]);
        let mut p = params(200, 10);
        p.until = NaiveDate::from_ymd_opt(2022, 3, 14);
        search_tweets(&stub, "q", "en", &p);
        assert_eq!(stub.request(0).param("until"), Some("2022-03-14"));
    }

    #[test]
    fn fetch_failure_after_k_items_yields_k_records() {
        let stub = StubSource::new(vec![
            Ok(page(1..=4, Some("c1"))),
            Err(ApiError::Http {
                status: Some(500),
                message: "flaky".to_string(),
            }),
        ]);
        let records = search_tweets(&stub, "q", "en", &params(4, 100));
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn fetch_failure_on_first_page_yields_empty_not_error() {
        let stub = StubSource::new(vec![Err(ApiError::Invalid("bad".to_string()))]);
        let records = replies_to_user(&stub, "acme", "en", &params(200, 100));
        assert!(records.is_empty());
    }

    #[test]
    fn identical_requests_yield_identical_records() {
        let script = || {
            StubSource::new(vec![
                Ok(page(1..=5, Some("c1"))),
                Ok(page(6..=8, None)),
            ])
        };
        let a = search_tweets(&script(), "q", "en", &params(5, 100));
        let b = search_tweets(&script(), "q", "en", &params(5, 100));
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }
}
