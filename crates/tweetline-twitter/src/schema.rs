//! Arrow schema definitions for the result tables
//!
//! One schema per orchestration. Column order is part of the contract:
//! downstream consumers key on position as well as name, so the field
//! lists below are never reordered.

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};

fn utf8(name: &str, nullable: bool) -> Field {
    Field::new(name, DataType::Utf8, nullable)
}

fn int64(name: &str) -> Field {
    Field::new(name, DataType::Int64, false)
}

/// Engagement, entity and author columns shared by every table.
///
/// `urls`/`medias`/`hashtags` hold the remote's entity arrays as JSON text,
/// order preserved. `location` is non-nullable: absent locations are
/// coerced to `""` at the normalization boundary.
fn tail_fields() -> Vec<Field> {
    vec![
        int64("likes"),
        int64("retweets"),
        utf8("urls", false),
        utf8("medias", false),
        utf8("hashtags", false),
        utf8("user_id", false),
        utf8("user_screen_name", false),
        Field::new("user_verified", DataType::Boolean, false),
        int64("user_followers"),
        int64("user_following"),
        utf8("location", false),
    ]
}

fn search_like(key_column: &str) -> Schema {
    let mut fields = vec![
        utf8(key_column, false),
        utf8("requested_language", false),
        utf8("id", false),
        utf8("created_at", false),
        utf8("text", false),
        utf8("language", true),
    ];
    fields.extend(tail_fields());
    Schema::new(fields)
}

/// timelines table — posts authored by the extracted users
pub fn timeline() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        let mut fields = vec![
            utf8("extracted_user", false),
            utf8("type", true),
            utf8("id", false),
            utf8("created_at", false),
            utf8("text", false),
        ];
        fields.extend(tail_fields());
        Arc::new(Schema::new(fields))
    });
    &SCHEMA
}

/// replies table — posts directed "to:" the extracted users
pub fn replies() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(search_like("extracted_user")));
    &SCHEMA
}

/// searched_users table — posts matching a username used as a query
pub fn searched_users() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(search_like("searched_user")));
    &SCHEMA
}

/// search_queries table — posts matching arbitrary query strings
pub fn search_queries() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(search_like("search_query")));
    &SCHEMA
}

/// hashtags table — posts in a hashtag
pub fn hashtags() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(search_like("hashtag")));
    &SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_column_order_is_the_contract() {
        let names: Vec<&str> = timeline().fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "extracted_user",
                "type",
                "id",
                "created_at",
                "text",
                "likes",
                "retweets",
                "urls",
                "medias",
                "hashtags",
                "user_id",
                "user_screen_name",
                "user_verified",
                "user_followers",
                "user_following",
                "location",
            ]
        );
    }

    #[test]
    fn replies_column_order_is_the_contract() {
        let names: Vec<&str> = replies().fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "extracted_user",
                "requested_language",
                "id",
                "created_at",
                "text",
                "language",
                "likes",
                "retweets",
                "urls",
                "medias",
                "hashtags",
                "user_id",
                "user_screen_name",
                "user_verified",
                "user_followers",
                "user_following",
                "location",
            ]
        );
    }

    #[test]
    fn search_tables_differ_only_in_key_column() {
        for (schema, key) in [
            (searched_users(), "searched_user"),
            (search_queries(), "search_query"),
            (hashtags(), "hashtag"),
        ] {
            assert_eq!(schema.field(0).name(), key);
            assert_eq!(schema.fields().len(), replies().fields().len());
        }
    }

    #[test]
    fn arity_per_mode() {
        assert_eq!(timeline().fields().len(), 16);
        assert_eq!(replies().fields().len(), 17);
        assert_eq!(searched_users().fields().len(), 17);
        assert_eq!(search_queries().fields().len(), 17);
        assert_eq!(hashtags().fields().len(), 17);
    }

    #[test]
    fn location_is_never_nullable() {
        for schema in [
            timeline(),
            replies(),
            searched_users(),
            search_queries(),
            hashtags(),
        ] {
            let field = schema.field_with_name("location").unwrap();
            assert!(!field.is_nullable());
        }
    }

    #[test]
    fn language_is_nullable_where_present() {
        assert!(replies().field_with_name("language").unwrap().is_nullable());
        assert!(timeline().field_with_name("language").is_err());
    }
}
