//! Credentials and OAuth 1.0a request signing
//!
//! The four credential strings are opaque, held in memory only, and never
//! reach logs (the `Debug` impl redacts them). Authentication is a live
//! handshake: a signed `verify_credentials` call that either yields a
//! working [`TwitterClient`] or a diagnostic [`AuthError`].

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{Rng, distributions::Alphanumeric};
use sha1::{Digest, Sha1};
use tweetline_core::ApiError;

use crate::client::TwitterClient;

/// The four opaque credential strings for a client session
#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Failure of the authentication handshake
#[derive(Debug)]
pub enum AuthError {
    /// The remote rejected the credentials (fatal to the run)
    Rejected(ApiError),
    /// The handshake never completed (network or protocol failure)
    Network(ApiError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "credentials rejected: {e}"),
            Self::Network(e) => write!(f, "auth handshake failed: {e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) | Self::Network(e) => Some(e),
        }
    }
}

/// Authenticate against the remote API.
///
/// On success the returned handle is configured to wait out rate-limit
/// windows instead of failing; extraction jobs are long-running batch
/// tasks, so blocking until the quota resets beats erroring.
pub fn authenticate(credentials: Credentials, api_base: &str) -> Result<TwitterClient, AuthError> {
    let client = TwitterClient::new(credentials, api_base);
    match client.get("account/verify_credentials.json", &[]) {
        Ok(resp) => {
            let screen_name = serde_json::from_str::<serde_json::Value>(&resp.body)
                .ok()
                .and_then(|v| v.get("screen_name")?.as_str().map(String::from))
                .unwrap_or_else(|| "unknown".to_string());
            log::info!("Authenticated with the Twitter API as @{screen_name}");
            Ok(client)
        }
        Err(e) if e.is_auth() => {
            log::error!("Twitter API rejected the provided credentials: {e}");
            Err(AuthError::Rejected(e))
        }
        Err(e) => {
            log::error!("Auth handshake with the Twitter API failed: {e}");
            Err(AuthError::Network(e))
        }
    }
}

/// RFC 3986 percent-encoding; `urlencoding` leaves exactly the unreserved
/// set (`A-Z a-z 0-9 - . _ ~`) untouched, which is what the signature base
/// string requires.
fn percent(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

/// HMAC-SHA1 (RFC 2104) composed over the sha1 digest
fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; 20] {
    const BLOCK: usize = 64;
    let mut key_block = [0u8; BLOCK];
    if key.len() > BLOCK {
        key_block[..20].copy_from_slice(&Sha1::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let ipad: Vec<u8> = key_block.iter().map(|b| b ^ 0x36).collect();
    let opad: Vec<u8> = key_block.iter().map(|b| b ^ 0x5c).collect();

    let mut inner = Sha1::new();
    inner.update(&ipad);
    inner.update(message);
    let inner_digest = inner.finalize();

    let mut outer = Sha1::new();
    outer.update(&opad);
    outer.update(inner_digest);
    outer.finalize().into()
}

/// Build the `Authorization: OAuth ...` header for one signed request
pub(crate) fn oauth1_header(
    method: &str,
    base_url: &str,
    query: &[(String, String)],
    credentials: &Credentials,
) -> String {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    sign(method, base_url, query, credentials, &nonce, timestamp)
}

/// Deterministic signing core, split out so tests can pin nonce and
/// timestamp
fn sign(
    method: &str,
    base_url: &str,
    query: &[(String, String)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: u64,
) -> String {
    let timestamp = timestamp.to_string();
    let oauth_params: [(&str, &str); 6] = [
        ("oauth_consumer_key", &credentials.consumer_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", &timestamp),
        ("oauth_token", &credentials.access_token),
        ("oauth_version", "1.0"),
    ];

    // Parameter string: every query and oauth parameter, percent-encoded,
    // sorted by encoded name then value
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (percent(k).into_owned(), percent(v).into_owned()))
        .chain(
            oauth_params
                .iter()
                .map(|(k, v)| (k.to_string(), percent(v).into_owned())),
        )
        .collect();
    pairs.sort();
    let param_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent(base_url),
        percent(&param_string)
    );
    let signing_key = format!(
        "{}&{}",
        percent(&credentials.consumer_secret),
        percent(&credentials.access_token_secret)
    );
    let signature = STANDARD.encode(hmac_sha1(signing_key.as_bytes(), base_string.as_bytes()));

    let mut header_params: Vec<(&str, String)> = oauth_params
        .iter()
        .map(|(k, v)| (*k, percent(v).into_owned()))
        .collect();
    header_params.push(("oauth_signature", percent(&signature).into_owned()));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn twitter_doc_credentials() -> Credentials {
        // The worked example from the v1.1 "creating a signature" docs
        Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    #[test]
    fn hmac_sha1_rfc2202_case_1() {
        let digest = hmac_sha1(&[0x0b; 20], b"Hi There");
        assert_eq!(hex(&digest), "b617318655057264e28bc0b6fb378c8ef146be00");
    }

    #[test]
    fn hmac_sha1_rfc2202_case_2() {
        let digest = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex(&digest), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn hmac_sha1_long_key_is_hashed_first() {
        let long_key = [0xaa; 80];
        let short = hmac_sha1(&Sha1::digest(long_key), b"msg");
        let long = hmac_sha1(&long_key, b"msg");
        assert_eq!(short, long);
    }

    #[test]
    fn percent_encoding_unreserved_set() {
        assert_eq!(percent("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
        assert_eq!(
            percent("Ladies + Gentlemen"),
            "Ladies%20%2B%20Gentlemen"
        );
        assert_eq!(percent("#sale"), "%23sale");
        assert_eq!(percent("to:acme"), "to%3Aacme");
    }

    #[test]
    fn signature_matches_documented_example() {
        let creds = twitter_doc_credentials();
        let query = vec![
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
            ("include_entities".to_string(), "true".to_string()),
        ];
        let header = sign(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &query,
            &creds,
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1318622958,
        );
        // base64("hCtSmYh+iHYCEqBWrE7C7hYmtUk=") percent-encoded
        assert!(
            header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""),
            "unexpected header: {header}"
        );
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn signing_is_deterministic() {
        let creds = twitter_doc_credentials();
        let query = vec![("q".to_string(), "#sale".to_string())];
        let a = sign("GET", "https://api.twitter.com/1.1/search/tweets.json", &query, &creds, "n", 1);
        let b = sign("GET", "https://api.twitter.com/1.1/search/tweets.json", &query, &creds, "n", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn debug_never_reveals_secrets() {
        let creds = twitter_doc_credentials();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("xvz1evFS4wEEPTGEFPHBog"));
        assert!(!rendered.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
