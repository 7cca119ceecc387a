//! Batch orchestration over input row lists
//!
//! One runner per result table, mirroring the pipeline nodes upstream of
//! this crate: iterate the input rows serially against one shared client
//! handle, skip rows with blank keys, isolate per-row failures, and
//! accumulate every normalized record into a single table.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use indicatif::ProgressBar;
use tweetline_core::Accumulator;

use crate::extract::{self, FetchParams};
use crate::schema;
use crate::source::TweetSource;
use crate::transform::{SearchAccumulator, TimelineAccumulator};

/// Input row for the user-keyed orchestrations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRow {
    pub username: Option<String>,
    /// Classification carried into the timeline table's `type` column
    pub user_type: Option<String>,
}

/// Input row for the search-query orchestration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRow {
    pub query: Option<String>,
}

/// Input row for the hashtag orchestration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashtagRow {
    pub hashtag: Option<String>,
}

/// Key of a row, `None` when the field is missing or blank
fn key_of(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The five orchestrations, one per result table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orchestration {
    Timelines,
    Replies,
    SearchUsers,
    SearchQueries,
    Hashtags,
}

impl Orchestration {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Timelines => "timelines",
            Self::Replies => "replies",
            Self::SearchUsers => "searched_users",
            Self::SearchQueries => "search_queries",
            Self::Hashtags => "hashtags",
        }
    }

    pub fn schema(self) -> &'static Arc<Schema> {
        match self {
            Self::Timelines => schema::timeline(),
            Self::Replies => schema::replies(),
            Self::SearchUsers => schema::searched_users(),
            Self::SearchQueries => schema::search_queries(),
            Self::Hashtags => schema::hashtags(),
        }
    }
}

impl std::fmt::Display for Orchestration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Summary of one orchestration run
#[derive(Debug)]
pub struct RunSummary {
    pub rows_in: usize,
    pub rows_skipped: usize,
    /// Extraction calls issued (row × language fan-out included)
    pub extractions: usize,
    /// Extractions that produced no records — failed or legitimately
    /// empty; the log is what tells those apart
    pub empty_extractions: usize,
    pub records: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self, orchestration: Orchestration) {
        log::info!("=== {} summary ===", orchestration);
        log::info!(
            "Rows: {} in, {} skipped for blank keys",
            self.rows_in,
            self.rows_skipped
        );
        log::info!(
            "Extractions: {} issued, {} returned nothing",
            self.extractions,
            self.empty_extractions
        );
        log::info!("Records: {}", self.records);
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// One orchestration's output: the result table plus run accounting
#[derive(Debug)]
pub struct Extraction {
    pub table: RecordBatch,
    pub summary: RunSummary,
}

/// Shared iterate/accumulate/summarize skeleton. `keys` yields the
/// non-blank key per row; `extract_row` performs every extraction for one
/// key and returns how many calls it issued and how many came back empty.
fn run_rows<A, K>(
    orchestration: Orchestration,
    mut acc: A,
    keys: Vec<Option<K>>,
    pb: &ProgressBar,
    mut extract_row: impl FnMut(&mut A, K) -> (usize, usize),
) -> Extraction
where
    A: Accumulator,
{
    let start = Instant::now();
    let rows_in = keys.len();
    let mut rows_skipped = 0;
    let mut extractions = 0;
    let mut empty_extractions = 0;

    for key in keys {
        match key {
            Some(key) => {
                let (issued, empty) = extract_row(&mut acc, key);
                extractions += issued;
                empty_extractions += empty;
            }
            None => {
                log::debug!("Skipping row with blank key");
                rows_skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let table = acc.take_batch();
    let summary = RunSummary {
        rows_in,
        rows_skipped,
        extractions,
        empty_extractions,
        records: table.num_rows(),
        elapsed: start.elapsed(),
    };
    summary.log(orchestration);
    Extraction { table, summary }
}

/// Extract every listed user's timeline into one table
pub fn run_timelines<S: TweetSource>(
    source: &S,
    rows: &[UserRow],
    params: &FetchParams,
    pb: &ProgressBar,
) -> Extraction {
    log::info!("Starting extraction of user timelines ({} rows)", rows.len());
    let keys: Vec<Option<(String, Option<String>)>> = rows
        .iter()
        .map(|row| {
            key_of(&row.username).map(|name| (name.to_string(), row.user_type.clone()))
        })
        .collect();

    run_rows(
        Orchestration::Timelines,
        TimelineAccumulator::new(),
        keys,
        pb,
        |acc, (name, user_type)| {
            pb.set_message(format!("@{name}"));
            let records = extract::user_timeline(source, &name, user_type.as_deref(), params);
            let empty = usize::from(records.is_empty());
            acc.extend(records);
            (1, empty)
        },
    )
}

/// Run one search-based extraction per configured language for one key,
/// concatenating the outcomes
fn fan_out_languages<A: Accumulator>(
    acc: &mut A,
    languages: &[String],
    mut extract_one: impl FnMut(&str) -> Vec<A::Row>,
) -> (usize, usize) {
    let mut issued = 0;
    let mut empty = 0;
    for language in languages {
        let records = extract_one(language);
        issued += 1;
        empty += usize::from(records.is_empty());
        acc.extend(records);
    }
    (issued, empty)
}

/// Extract up to the freshness window's worth of replies to every listed
/// user, once per configured language
pub fn run_replies<S: TweetSource>(
    source: &S,
    rows: &[UserRow],
    params: &FetchParams,
    languages: &[String],
    pb: &ProgressBar,
) -> Extraction {
    log::info!("Starting extraction of replies to users ({} rows)", rows.len());
    let keys: Vec<Option<String>> = rows
        .iter()
        .map(|row| key_of(&row.username).map(String::from))
        .collect();

    run_rows(
        Orchestration::Replies,
        SearchAccumulator::new(schema::replies()),
        keys,
        pb,
        |acc, name| {
            pb.set_message(format!("@{name}"));
            fan_out_languages(acc, languages, |language| {
                extract::replies_to_user(source, &name, language, params)
            })
        },
    )
}

/// Search for every listed username, once per configured language
pub fn run_search_users<S: TweetSource>(
    source: &S,
    rows: &[UserRow],
    params: &FetchParams,
    languages: &[String],
    pb: &ProgressBar,
) -> Extraction {
    log::info!("Starting extraction of user searches ({} rows)", rows.len());
    let keys: Vec<Option<String>> = rows
        .iter()
        .map(|row| key_of(&row.username).map(String::from))
        .collect();

    run_rows(
        Orchestration::SearchUsers,
        SearchAccumulator::new(schema::searched_users()),
        keys,
        pb,
        |acc, name| {
            pb.set_message(format!("@{name}"));
            fan_out_languages(acc, languages, |language| {
                extract::search_tweets(source, &name, language, params)
            })
        },
    )
}

/// Search for every listed query, once per configured language
pub fn run_search_queries<S: TweetSource>(
    source: &S,
    rows: &[QueryRow],
    params: &FetchParams,
    languages: &[String],
    pb: &ProgressBar,
) -> Extraction {
    log::info!("Starting extraction of search queries ({} rows)", rows.len());
    let keys: Vec<Option<String>> = rows
        .iter()
        .map(|row| key_of(&row.query).map(String::from))
        .collect();

    run_rows(
        Orchestration::SearchQueries,
        SearchAccumulator::new(schema::search_queries()),
        keys,
        pb,
        |acc, query| {
            pb.set_message(query.clone());
            fan_out_languages(acc, languages, |language| {
                extract::search_tweets(source, &query, language, params)
            })
        },
    )
}

/// Extract every listed hashtag, once per configured language
pub fn run_hashtags<S: TweetSource>(
    source: &S,
    rows: &[HashtagRow],
    params: &FetchParams,
    languages: &[String],
    pb: &ProgressBar,
) -> Extraction {
    log::info!("Starting extraction of hashtags ({} rows)", rows.len());
    let keys: Vec<Option<String>> = rows
        .iter()
        .map(|row| key_of(&row.hashtag).map(String::from))
        .collect();

    run_rows(
        Orchestration::Hashtags,
        SearchAccumulator::new(schema::hashtags()),
        keys,
        pb,
        |acc, tag| {
            pb.set_message(tag.clone());
            fan_out_languages(acc, languages, |language| {
                extract::hashtag_tweets(source, &tag, language, params)
            })
        },
    )
}
