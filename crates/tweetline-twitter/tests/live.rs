//! Live integration tests against the real API
//!
//! These tests require network access and TWITTER_* credentials in the
//! environment and are marked #[ignore] by default.
//! Run with: cargo test -p tweetline-twitter --test live -- --ignored

use indicatif::ProgressBar;
use tweetline_twitter::{
    AuthError, Credentials, DEFAULT_API_BASE, FetchParams, UserRow, authenticate, run_timelines,
};

fn credentials_from_env() -> Option<Credentials> {
    Some(Credentials {
        consumer_key: std::env::var("TWITTER_CONSUMER_KEY").ok()?,
        consumer_secret: std::env::var("TWITTER_CONSUMER_SECRET").ok()?,
        access_token: std::env::var("TWITTER_ACCESS_TOKEN").ok()?,
        access_token_secret: std::env::var("TWITTER_ACCESS_SECRET").ok()?,
    })
}

#[test]
#[ignore]
fn authenticate_and_fetch_one_timeline_page() {
    let credentials = credentials_from_env().expect("TWITTER_* env vars required");
    let client = authenticate(credentials, DEFAULT_API_BASE).expect("handshake should succeed");

    let params = FetchParams {
        page_size: 50,
        extraction_size: 50,
        ..Default::default()
    };
    let rows = vec![UserRow {
        username: Some("TwitterDev".to_string()),
        user_type: Some("platform".to_string()),
    }];
    let result = run_timelines(&client, &rows, &params, &ProgressBar::hidden());

    assert_eq!(result.summary.rows_in, 1);
    assert_eq!(result.summary.rows_skipped, 0);
    assert_eq!(result.table.num_columns(), 16);
    assert!(result.table.num_rows() <= 50);
}

#[test]
#[ignore]
fn bad_credentials_are_rejected() {
    let credentials = Credentials {
        consumer_key: "invalid".to_string(),
        consumer_secret: "invalid".to_string(),
        access_token: "invalid".to_string(),
        access_token_secret: "invalid".to_string(),
    };
    let err = authenticate(credentials, DEFAULT_API_BASE).unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
}
