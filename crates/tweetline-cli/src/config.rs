//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tweetline_twitter::Credentials;

/// Global configuration for tweetline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: tweetline_twitter::DEFAULT_API_BASE.to_string(),
        }
    }
}

/// The four credential strings, each a literal or a `${ENV_VAR}`
/// reference so secrets stay out of config files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub consumer_key: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub consumer_secret: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub access_token: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub access_token_secret: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            consumer_key: std::env::var("TWITTER_CONSUMER_KEY").ok(),
            consumer_secret: std::env::var("TWITTER_CONSUMER_SECRET").ok(),
            access_token: std::env::var("TWITTER_ACCESS_TOKEN").ok(),
            access_token_secret: std::env::var("TWITTER_ACCESS_SECRET").ok(),
        }
    }
}

impl CredentialsConfig {
    pub fn configured(&self) -> bool {
        self.consumer_key.is_some()
            && self.consumer_secret.is_some()
            && self.access_token.is_some()
            && self.access_token_secret.is_some()
    }

    /// Materialize the credential set, naming whichever string is missing
    pub fn resolve(&self) -> Result<Credentials> {
        fn require(value: &Option<String>, name: &str) -> Result<String> {
            value.clone().with_context(|| {
                format!("Missing credential `{name}`: set [credentials] {name} or the TWITTER_* environment variable")
            })
        }
        Ok(Credentials {
            consumer_key: require(&self.consumer_key, "consumer_key")?,
            consumer_secret: require(&self.consumer_secret, "consumer_secret")?,
            access_token: require(&self.access_token, "access_token")?,
            access_token_secret: require(&self.access_token_secret, "access_token_secret")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Items per page request (remote maximum 200)
    pub page_size: usize,
    /// Total items to collect per extraction
    pub extraction_size: usize,
    /// Languages the search-based orchestrations fan out over
    pub languages: Vec<String>,
    /// mixed, recent or popular
    pub result_type: String,
    pub exclude_replies: bool,
    pub include_rts: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            extraction_size: 10_000,
            languages: vec!["en".to_string(), "es".to_string()],
            result_type: "mixed".to_string(),
            exclude_replies: false,
            include_rts: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub compression_level: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            compression_level: 3,
        }
    }
}

/// Deserialize a string that may contain an environment variable
/// reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to the environment variable's value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./tweetline.toml (current directory)
    /// 2. ~/.config/tweetline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("tweetline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "tweetline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
