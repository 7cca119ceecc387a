//! Input list parsing
//!
//! Plain line-based lists, matching the tabular inputs of the upstream
//! pipeline: `username[,type]` for user rows, one key per line for
//! queries and hashtags. Empty lines are dropped; a line with a blank key
//! field (e.g. `,competitor`) is kept as a row so the orchestrator's skip
//! accounting sees it.

use std::path::Path;

use anyhow::{Context, Result};
use tweetline_twitter::{HashtagRow, QueryRow, UserRow};

pub fn load_user_rows(path: &Path) -> Result<Vec<UserRow>> {
    Ok(parse_user_rows(&read(path)?))
}

pub fn load_query_rows(path: &Path) -> Result<Vec<QueryRow>> {
    Ok(parse_query_rows(&read(path)?))
}

pub fn load_hashtag_rows(path: &Path) -> Result<Vec<HashtagRow>> {
    Ok(parse_hashtag_rows(&read(path)?))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read input list {}", path.display()))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_user_rows(content: &str) -> Vec<UserRow> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(',') {
            Some((name, user_type)) => UserRow {
                username: non_empty(name),
                user_type: non_empty(user_type),
            },
            None => UserRow {
                username: non_empty(line),
                user_type: None,
            },
        })
        .collect()
}

fn parse_query_rows(content: &str) -> Vec<QueryRow> {
    // Queries may legitimately contain commas, so no column split here
    content
        .lines()
        .filter_map(non_empty)
        .map(|query| QueryRow { query: Some(query) })
        .collect()
}

fn parse_hashtag_rows(content: &str) -> Vec<HashtagRow> {
    content
        .lines()
        .filter_map(non_empty)
        .map(|hashtag| HashtagRow {
            hashtag: Some(hashtag),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rows_with_and_without_type() {
        let rows = parse_user_rows("alice,customer\nbob\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username.as_deref(), Some("alice"));
        assert_eq!(rows[0].user_type.as_deref(), Some("customer"));
        assert_eq!(rows[1].username.as_deref(), Some("bob"));
        assert_eq!(rows[1].user_type, None);
    }

    #[test]
    fn blank_username_field_is_kept_as_a_row() {
        let rows = parse_user_rows("alice,customer\n,competitor\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].username, None);
        assert_eq!(rows[1].user_type.as_deref(), Some("competitor"));
    }

    #[test]
    fn empty_lines_are_dropped() {
        let rows = parse_user_rows("alice\n\n   \nbob\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn fields_are_trimmed() {
        let rows = parse_user_rows("  alice , customer \n");
        assert_eq!(rows[0].username.as_deref(), Some("alice"));
        assert_eq!(rows[0].user_type.as_deref(), Some("customer"));
    }

    #[test]
    fn query_rows_keep_commas() {
        let rows = parse_query_rows("rust lang, memory safety\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query.as_deref(), Some("rust lang, memory safety"));
    }

    #[test]
    fn hashtag_rows_pass_markers_through() {
        let rows = parse_hashtag_rows("#sale\nsale2\n");
        assert_eq!(rows[0].hashtag.as_deref(), Some("#sale"));
        assert_eq!(rows[1].hashtag.as_deref(), Some("sale2"));
    }
}
