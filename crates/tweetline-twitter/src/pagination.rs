//! Cursor-walking fetcher
//!
//! Lazily produces a bounded sequence of raw items from a page source:
//! finite, not restartable, yielding items in the order the remote returns
//! them. A fetch failure ends the sequence after logging the operation —
//! items from completed pages are preserved, so callers must treat a short
//! sequence as possibly incomplete rather than as a hard failure.

use std::collections::VecDeque;

use crate::model::Tweet;
use crate::source::{ApiCall, Page, TweetSource};

pub struct Paginator<'a, S: TweetSource> {
    source: &'a S,
    call: ApiCall,
    /// Items still to yield before the extraction budget is exhausted
    remaining: usize,
    cursor: Option<String>,
    buffer: VecDeque<Tweet>,
    /// Set once the remote signals the last page or a fetch fails
    done: bool,
}

impl<'a, S: TweetSource> Paginator<'a, S> {
    pub fn new(source: &'a S, call: ApiCall, extraction_size: usize) -> Self {
        Self {
            source,
            call,
            remaining: extraction_size,
            cursor: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    fn fetch_next_page(&mut self) {
        match self.source.fetch_page(&self.call, self.cursor.as_deref()) {
            Ok(Page { items, next_cursor }) => {
                if items.is_empty() || next_cursor.is_none() {
                    self.done = true;
                }
                self.cursor = next_cursor;
                self.buffer.extend(items);
            }
            Err(e) => {
                log::error!(
                    "{}: aborting pagination, keeping items already fetched: {e}",
                    self.call.label
                );
                self.done = true;
            }
        }
    }
}

impl<S: TweetSource> Iterator for Paginator<'_, S> {
    type Item = Tweet;

    fn next(&mut self) -> Option<Tweet> {
        if self.remaining == 0 {
            return None;
        }
        if self.buffer.is_empty() && !self.done {
            self.fetch_next_page();
        }
        let tweet = self.buffer.pop_front()?;
        self.remaining -= 1;
        Some(tweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetline_core::ApiError;

    use crate::source::Endpoint;
    use crate::testing::{StubSource, page, tweets};

    fn call() -> ApiCall {
        ApiCall::new(Endpoint::UserTimeline, "timeline @acme").param("screen_name", "acme")
    }

    #[test]
    fn budget_equal_to_page_size_requests_one_page() {
        let stub = StubSource::new(vec![Ok(page(1..=5, Some("c1")))]);
        let items: Vec<_> = Paginator::new(&stub, call(), 5).collect();
        assert_eq!(items.len(), 5);
        assert_eq!(stub.request_count(), 1);
    }

    #[test]
    fn budget_one_over_page_size_requests_one_extra_page() {
        let stub = StubSource::new(vec![
            Ok(page(1..=5, Some("c1"))),
            Ok(page(6..=10, Some("c2"))),
        ]);
        let items: Vec<_> = Paginator::new(&stub, call(), 6).collect();
        assert_eq!(items.len(), 6);
        assert_eq!(stub.request_count(), 2);
    }

    #[test]
    fn zero_budget_requests_nothing() {
        let stub = StubSource::new(vec![Ok(page(1..=5, Some("c1")))]);
        let items: Vec<_> = Paginator::new(&stub, call(), 0).collect();
        assert!(items.is_empty());
        assert_eq!(stub.request_count(), 0);
    }

    #[test]
    fn stops_when_remote_signals_no_more_pages() {
        let stub = StubSource::new(vec![Ok(page(1..=3, None))]);
        let items: Vec<_> = Paginator::new(&stub, call(), 100).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(stub.request_count(), 1);
    }

    #[test]
    fn stops_on_empty_page() {
        let stub = StubSource::new(vec![Ok(Page {
            items: Vec::new(),
            next_cursor: Some("c1".to_string()),
        })]);
        let items: Vec<_> = Paginator::new(&stub, call(), 100).collect();
        assert!(items.is_empty());
        assert_eq!(stub.request_count(), 1);
    }

    #[test]
    fn cursor_from_previous_page_is_passed_back() {
        let stub = StubSource::new(vec![
            Ok(page(1..=2, Some("c1"))),
            Ok(page(3..=4, None)),
        ]);
        let _items: Vec<_> = Paginator::new(&stub, call(), 100).collect();
        let requests = stub.requests.borrow();
        assert_eq!(requests[0].cursor, None);
        assert_eq!(requests[1].cursor, Some("c1".to_string()));
    }

    #[test]
    fn failure_preserves_items_from_completed_pages() {
        let stub = StubSource::new(vec![
            Ok(page(1..=4, Some("c1"))),
            Err(ApiError::Invalid("truncated".to_string())),
        ]);
        let items: Vec<_> = Paginator::new(&stub, call(), 100).collect();
        assert_eq!(items.len(), 4);
        assert_eq!(stub.request_count(), 2);
    }

    #[test]
    fn failure_on_first_page_yields_nothing() {
        let stub = StubSource::new(vec![Err(ApiError::Http {
            status: Some(500),
            message: "oops".to_string(),
        })]);
        let items: Vec<_> = Paginator::new(&stub, call(), 100).collect();
        assert!(items.is_empty());
    }

    #[test]
    fn yields_in_remote_order_and_truncates_to_budget() {
        let stub = StubSource::new(vec![Ok(page(1..=10, Some("c1")))]);
        let items: Vec<_> = Paginator::new(&stub, call(), 7).collect();
        let ids: Vec<String> = items.iter().map(|t| t.id_string()).collect();
        let expected: Vec<String> = tweets(1..=7).iter().map(|t| t.id_string()).collect();
        assert_eq!(ids, expected);
        assert_eq!(stub.request_count(), 1);
    }
}
