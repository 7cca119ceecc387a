//! Raw item deserialization for v1.1 payloads
//!
//! Only the fields the normalized record needs are modeled; everything is
//! `#[serde(default)]`-tolerant so a sparse payload degrades to empty
//! values instead of a parse error.

use serde::Deserialize;
use serde_json::Value;

/// Entity collections attached to a tweet.
///
/// Kept opaque: ordered JSON entries serialized back out verbatim, never
/// decomposed into columns of their own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub urls: Vec<Value>,
    #[serde(default)]
    pub media: Vec<Value>,
    #[serde(default)]
    pub hashtags: Vec<Value>,
}

impl Entities {
    fn to_json(values: &[Value]) -> String {
        serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn urls_json(&self) -> String {
        Self::to_json(&self.urls)
    }

    pub fn media_json(&self) -> String {
        Self::to_json(&self.media)
    }

    pub fn hashtags_json(&self) -> String {
        Self::to_json(&self.hashtags)
    }
}

/// Author metadata embedded in every tweet payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitterUser {
    #[serde(default)]
    pub id_str: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub friends_count: i64,
    /// Free-text profile location; absent for most accounts
    #[serde(default)]
    pub location: Option<String>,
}

/// One tweet as returned by the remote API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tweet {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub id_str: String,
    /// v1.1 format, e.g. "Mon Sep 24 03:35:21 +0000 2012"
    #[serde(default)]
    pub created_at: String,
    /// Extended-mode body; compat payloads carry `text` instead
    #[serde(default, alias = "text")]
    pub full_text: String,
    /// Language the remote detected for the post (BCP 47, may be "und")
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub retweet_count: i64,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub user: TwitterUser,
}

impl Tweet {
    /// String identifier, falling back to the numeric `id` field
    pub fn id_string(&self) -> String {
        if !self.id_str.is_empty() {
            self.id_str.clone()
        } else {
            self.id.map(|id| id.to_string()).unwrap_or_default()
        }
    }

    /// Numeric identifier, used for max_id cursor derivation
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.or_else(|| self.id_str.parse().ok())
    }

    /// Creation timestamp normalized to RFC 3339; unparseable values pass
    /// through untouched
    pub fn created_at_rfc3339(&self) -> String {
        chrono::DateTime::parse_from_str(&self.created_at, "%a %b %d %H:%M:%S %z %Y")
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|_| self.created_at.clone())
    }

    /// Author location coerced to `""` so records never carry a null
    pub fn location(&self) -> String {
        self.user.location.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TWEET: &str = r#"{
        "id": 1050118621198921700,
        "id_str": "1050118621198921728",
        "created_at": "Mon Sep 24 03:35:21 +0000 2012",
        "full_text": "Just another day at the office. https://t.co/example",
        "lang": "en",
        "favorite_count": 42,
        "retweet_count": 7,
        "entities": {
            "hashtags": [{"text": "sale", "indices": [0, 5]}],
            "urls": [
                {"url": "https://t.co/a", "expanded_url": "https://example.com/a"},
                {"url": "https://t.co/b", "expanded_url": "https://example.com/b"}
            ],
            "media": []
        },
        "user": {
            "id_str": "6253282",
            "screen_name": "acme",
            "verified": true,
            "followers_count": 6133636,
            "friends_count": 12,
            "location": "San Francisco, CA"
        }
    }"#;

    #[test]
    fn parse_sample_tweet() {
        let tweet: Tweet = serde_json::from_str(SAMPLE_TWEET).unwrap();
        assert_eq!(tweet.id_string(), "1050118621198921728");
        assert!(tweet.full_text.starts_with("Just another day"));
        assert_eq!(tweet.lang.as_deref(), Some("en"));
        assert_eq!(tweet.favorite_count, 42);
        assert_eq!(tweet.retweet_count, 7);
        assert_eq!(tweet.user.screen_name, "acme");
        assert!(tweet.user.verified);
    }

    #[test]
    fn created_at_normalizes_to_rfc3339() {
        let tweet: Tweet = serde_json::from_str(SAMPLE_TWEET).unwrap();
        assert_eq!(tweet.created_at_rfc3339(), "2012-09-24T03:35:21+00:00");
    }

    #[test]
    fn created_at_passes_through_when_unparseable() {
        let tweet = Tweet {
            created_at: "not a date".to_string(),
            ..Default::default()
        };
        assert_eq!(tweet.created_at_rfc3339(), "not a date");
    }

    #[test]
    fn location_coerced_to_empty_string() {
        let tweet = Tweet::default();
        assert_eq!(tweet.location(), "");

        let parsed: Tweet = serde_json::from_str(SAMPLE_TWEET).unwrap();
        assert_eq!(parsed.location(), "San Francisco, CA");
    }

    #[test]
    fn entities_preserve_order() {
        let tweet: Tweet = serde_json::from_str(SAMPLE_TWEET).unwrap();
        let urls = tweet.entities.urls_json();
        let a = urls.find("https://t.co/a").unwrap();
        let b = urls.find("https://t.co/b").unwrap();
        assert!(a < b);
        assert_eq!(tweet.entities.media_json(), "[]");
        assert!(tweet.entities.hashtags_json().contains("\"sale\""));
    }

    #[test]
    fn compat_text_field_accepted() {
        let tweet: Tweet = serde_json::from_str(r#"{"text": "short form"}"#).unwrap();
        assert_eq!(tweet.full_text, "short form");
    }

    #[test]
    fn minimal_payload_defaults() {
        let tweet: Tweet = serde_json::from_str("{}").unwrap();
        assert_eq!(tweet.id_string(), "");
        assert_eq!(tweet.full_text, "");
        assert!(tweet.lang.is_none());
        assert_eq!(tweet.entities.urls_json(), "[]");
    }

    #[test]
    fn numeric_id_falls_back_to_id_str() {
        let tweet: Tweet = serde_json::from_str(r#"{"id_str": "99"}"#).unwrap();
        assert_eq!(tweet.numeric_id(), Some(99));
        assert_eq!(tweet.id_string(), "99");
    }
}
