//! Normalized records and their Arrow accumulators
//!
//! Two record shapes cover the four modes: timelines key on the extracted
//! user and carry the input's `type` classification; the search-based
//! modes (replies, search, hashtag) share one shape whose key field holds
//! the username, query text or `#hashtag` respectively.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::Schema;
use tweetline_core::Accumulator;

use crate::model::Tweet;
use crate::schema;

/// Normalized record from a timeline extraction
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRecord {
    pub extracted_user: String,
    pub user_type: Option<String>,
    pub id: String,
    pub created_at: String,
    pub text: String,
    pub likes: i64,
    pub retweets: i64,
    pub urls: String,
    pub medias: String,
    pub hashtags: String,
    pub user_id: String,
    pub user_screen_name: String,
    pub user_verified: bool,
    pub user_followers: i64,
    pub user_following: i64,
    pub location: String,
}

impl TimelineRecord {
    pub fn from_tweet(screen_name: &str, user_type: Option<&str>, tweet: &Tweet) -> Self {
        Self {
            extracted_user: screen_name.to_string(),
            user_type: user_type.map(String::from),
            id: tweet.id_string(),
            created_at: tweet.created_at_rfc3339(),
            text: tweet.full_text.clone(),
            likes: tweet.favorite_count,
            retweets: tweet.retweet_count,
            urls: tweet.entities.urls_json(),
            medias: tweet.entities.media_json(),
            hashtags: tweet.entities.hashtags_json(),
            user_id: tweet.user.id_str.clone(),
            user_screen_name: tweet.user.screen_name.clone(),
            user_verified: tweet.user.verified,
            user_followers: tweet.user.followers_count,
            user_following: tweet.user.friends_count,
            location: tweet.location(),
        }
    }
}

/// Normalized record from the search-based extractions
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub key: String,
    pub requested_language: String,
    pub id: String,
    pub created_at: String,
    pub text: String,
    /// Language the remote declared on the post itself
    pub language: Option<String>,
    pub likes: i64,
    pub retweets: i64,
    pub urls: String,
    pub medias: String,
    pub hashtags: String,
    pub user_id: String,
    pub user_screen_name: String,
    pub user_verified: bool,
    pub user_followers: i64,
    pub user_following: i64,
    pub location: String,
}

impl SearchRecord {
    pub fn from_tweet(key: &str, requested_language: &str, tweet: &Tweet) -> Self {
        Self {
            key: key.to_string(),
            requested_language: requested_language.to_string(),
            id: tweet.id_string(),
            created_at: tweet.created_at_rfc3339(),
            text: tweet.full_text.clone(),
            language: tweet.lang.clone(),
            likes: tweet.favorite_count,
            retweets: tweet.retweet_count,
            urls: tweet.entities.urls_json(),
            medias: tweet.entities.media_json(),
            hashtags: tweet.entities.hashtags_json(),
            user_id: tweet.user.id_str.clone(),
            user_screen_name: tweet.user.screen_name.clone(),
            user_verified: tweet.user.verified,
            user_followers: tweet.user.followers_count,
            user_following: tweet.user.friends_count,
            location: tweet.location(),
        }
    }
}

/// Accumulator for timeline records
pub struct TimelineAccumulator {
    schema: Arc<Schema>,
    extracted_user: Vec<String>,
    user_type: Vec<Option<String>>,
    id: Vec<String>,
    created_at: Vec<String>,
    text: Vec<String>,
    likes: Vec<i64>,
    retweets: Vec<i64>,
    urls: Vec<String>,
    medias: Vec<String>,
    hashtags: Vec<String>,
    user_id: Vec<String>,
    user_screen_name: Vec<String>,
    user_verified: Vec<bool>,
    user_followers: Vec<i64>,
    user_following: Vec<i64>,
    location: Vec<String>,
}

impl TimelineAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::timeline().clone(),
            extracted_user: Vec::new(),
            user_type: Vec::new(),
            id: Vec::new(),
            created_at: Vec::new(),
            text: Vec::new(),
            likes: Vec::new(),
            retweets: Vec::new(),
            urls: Vec::new(),
            medias: Vec::new(),
            hashtags: Vec::new(),
            user_id: Vec::new(),
            user_screen_name: Vec::new(),
            user_verified: Vec::new(),
            user_followers: Vec::new(),
            user_following: Vec::new(),
            location: Vec::new(),
        }
    }
}

impl Default for TimelineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for TimelineAccumulator {
    type Row = TimelineRecord;

    fn push(&mut self, row: TimelineRecord) {
        self.extracted_user.push(row.extracted_user);
        self.user_type.push(row.user_type);
        self.id.push(row.id);
        self.created_at.push(row.created_at);
        self.text.push(row.text);
        self.likes.push(row.likes);
        self.retweets.push(row.retweets);
        self.urls.push(row.urls);
        self.medias.push(row.medias);
        self.hashtags.push(row.hashtags);
        self.user_id.push(row.user_id);
        self.user_screen_name.push(row.user_screen_name);
        self.user_verified.push(row.user_verified);
        self.user_followers.push(row.user_followers);
        self.user_following.push(row.user_following);
        self.location.push(row.location);
    }

    fn len(&self) -> usize {
        self.id.len()
    }

    fn take_batch(&mut self) -> RecordBatch {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.extracted_user))),
            Arc::new(StringArray::from(std::mem::take(&mut self.user_type))),
            Arc::new(StringArray::from(std::mem::take(&mut self.id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.created_at))),
            Arc::new(StringArray::from(std::mem::take(&mut self.text))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.likes))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.retweets))),
            Arc::new(StringArray::from(std::mem::take(&mut self.urls))),
            Arc::new(StringArray::from(std::mem::take(&mut self.medias))),
            Arc::new(StringArray::from(std::mem::take(&mut self.hashtags))),
            Arc::new(StringArray::from(std::mem::take(&mut self.user_id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.user_screen_name))),
            Arc::new(BooleanArray::from(std::mem::take(&mut self.user_verified))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.user_followers))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.user_following))),
            Arc::new(StringArray::from(std::mem::take(&mut self.location))),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays).expect("timeline schema mismatch")
    }
}

/// Accumulator for search-based records; the same shape backs the
/// replies, searched_users, search_queries and hashtags tables, so the
/// target schema is picked at construction.
pub struct SearchAccumulator {
    schema: Arc<Schema>,
    key: Vec<String>,
    requested_language: Vec<String>,
    id: Vec<String>,
    created_at: Vec<String>,
    text: Vec<String>,
    language: Vec<Option<String>>,
    likes: Vec<i64>,
    retweets: Vec<i64>,
    urls: Vec<String>,
    medias: Vec<String>,
    hashtags: Vec<String>,
    user_id: Vec<String>,
    user_screen_name: Vec<String>,
    user_verified: Vec<bool>,
    user_followers: Vec<i64>,
    user_following: Vec<i64>,
    location: Vec<String>,
}

impl SearchAccumulator {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: schema.clone(),
            key: Vec::new(),
            requested_language: Vec::new(),
            id: Vec::new(),
            created_at: Vec::new(),
            text: Vec::new(),
            language: Vec::new(),
            likes: Vec::new(),
            retweets: Vec::new(),
            urls: Vec::new(),
            medias: Vec::new(),
            hashtags: Vec::new(),
            user_id: Vec::new(),
            user_screen_name: Vec::new(),
            user_verified: Vec::new(),
            user_followers: Vec::new(),
            user_following: Vec::new(),
            location: Vec::new(),
        }
    }
}

impl Accumulator for SearchAccumulator {
    type Row = SearchRecord;

    fn push(&mut self, row: SearchRecord) {
        self.key.push(row.key);
        self.requested_language.push(row.requested_language);
        self.id.push(row.id);
        self.created_at.push(row.created_at);
        self.text.push(row.text);
        self.language.push(row.language);
        self.likes.push(row.likes);
        self.retweets.push(row.retweets);
        self.urls.push(row.urls);
        self.medias.push(row.medias);
        self.hashtags.push(row.hashtags);
        self.user_id.push(row.user_id);
        self.user_screen_name.push(row.user_screen_name);
        self.user_verified.push(row.user_verified);
        self.user_followers.push(row.user_followers);
        self.user_following.push(row.user_following);
        self.location.push(row.location);
    }

    fn len(&self) -> usize {
        self.id.len()
    }

    fn take_batch(&mut self) -> RecordBatch {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.key))),
            Arc::new(StringArray::from(std::mem::take(
                &mut self.requested_language,
            ))),
            Arc::new(StringArray::from(std::mem::take(&mut self.id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.created_at))),
            Arc::new(StringArray::from(std::mem::take(&mut self.text))),
            Arc::new(StringArray::from(std::mem::take(&mut self.language))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.likes))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.retweets))),
            Arc::new(StringArray::from(std::mem::take(&mut self.urls))),
            Arc::new(StringArray::from(std::mem::take(&mut self.medias))),
            Arc::new(StringArray::from(std::mem::take(&mut self.hashtags))),
            Arc::new(StringArray::from(std::mem::take(&mut self.user_id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.user_screen_name))),
            Arc::new(BooleanArray::from(std::mem::take(&mut self.user_verified))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.user_followers))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.user_following))),
            Arc::new(StringArray::from(std::mem::take(&mut self.location))),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays).expect("search schema mismatch")
    }
}
