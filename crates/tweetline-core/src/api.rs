//! HTTP facade over async reqwest.
//!
//! The orchestrator is strictly serial against one rate-limited handle, so
//! requests present a sync interface and `block_on` the shared runtime at
//! the call boundary only.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout (small JSON pages, not bulk downloads)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error from a single API request
#[derive(Debug)]
pub enum ApiError {
    /// HTTP-level failure with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response arrived but could not be interpreted
    Invalid(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Invalid(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create from a reqwest error, without echoing the URL into logs
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        Self::Http {
            status,
            message: e.without_url().to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Invalid(_) => None,
        }
    }

    /// Remote quota exhausted; wait and retry rather than fail
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Credential rejection (fatal to the run)
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Raw response: status, headers and body, left for the caller to interpret.
///
/// Rate-limit accounting needs the `x-rate-limit-*` headers even on 429
/// responses, so no `error_for_status` happens at this layer.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub body: String,
}

impl ApiResponse {
    /// Parse a numeric header, if present and well-formed
    pub fn header_u64(&self, name: &str) -> Option<u64> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Blocking GET with extra request headers.
///
/// Network-level failures map to [`ApiError::Http`]; any status that made
/// it onto the wire is returned in the [`ApiResponse`] untouched.
pub fn get(url: &str, headers: &[(&str, String)]) -> Result<ApiResponse, ApiError> {
    SHARED_RUNTIME.handle().block_on(async {
        let mut req = SHARED_CLIENT.get(url);
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        let resp = req.send().await.map_err(ApiError::from_reqwest)?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(ApiError::from_reqwest)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    })
}
