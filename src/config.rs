//! Configuration file handling.
//!
//! Everything lives in one TOML file; every key is optional except the
//! vision API key, and unknown keys are rejected to catch typos early.
//!
//! ```toml
//! time_unit_ms = 1000
//! log_directory = "logs"
//!
//! [vision]
//! api_key = "..."
//!
//! [filters]
//! extra_words = ["swastika"]
//! tags = ["text", "screenshot", "military uniform"]
//!
//! [mastodon]
//! instance = "https://botsin.space"
//! access_token = "..."
//! ```
//!
//! A destination is enabled by the presence of its section.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::filter::category::default_category_blacklist;
use crate::filter::gender::default_gendered_words;
use crate::filter::tags::default_tag_blacklist;
use crate::http::DEFAULT_USER_AGENT;
use crate::timing::Timing;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub user_agent: String,
    /// Base duration every politeness delay and backoff is a multiple of.
    pub time_unit_ms: u64,
    pub http_timeout_secs: u64,
    /// How many repository fetches one pipeline attempt may spend looking for
    /// a usable candidate.
    pub max_fetch_attempts: u32,
    /// When set, `all.log` and `filtered.log` are written here.
    pub log_directory: Option<PathBuf>,
    pub mediawiki: MediaWikiConfig,
    pub vision: VisionConfig,
    pub filters: FilterConfig,
    pub twitter: Option<TwitterConfig>,
    pub tumblr: Option<TumblrConfig>,
    pub mastodon: Option<MastodonConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            time_unit_ms: 1000,
            http_timeout_secs: 60,
            max_fetch_attempts: 100,
            log_directory: None,
            mediawiki: MediaWikiConfig::default(),
            vision: VisionConfig::default(),
            filters: FilterConfig::default(),
            twitter: None,
            tumblr: None,
            mastodon: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaWikiConfig {
    pub endpoint: String,
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        MediaWikiConfig {
            endpoint: "https://commons.wikimedia.org/w/api.php".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            endpoint: "https://westus.api.cognitive.microsoft.com/vision/v3.2/analyze".to_string(),
            api_key: String::new(),
        }
    }
}

/// Blacklists and the gender map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Root word to the variants that should also match it.
    pub words: BTreeMap<String, Vec<String>>,
    pub extra_words: Vec<String>,
    /// Matched as substrings of file descriptions.
    pub phrases: Vec<String>,
    /// Words only checked against generated captions.
    pub caption_words: Vec<String>,
    pub caption_phrases: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub gendered_words: BTreeMap<String, String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let mut words = BTreeMap::new();
        words.insert(
            "nazi".to_string(),
            vec!["nazis".to_string(), "nazism".to_string()],
        );
        words.insert("hitler".to_string(), vec![]);

        FilterConfig {
            words,
            extra_words: vec![],
            phrases: vec![],
            caption_words: vec![],
            caption_phrases: vec!["a suit and tie".to_string()],
            categories: default_category_blacklist(),
            tags: default_tag_blacklist(),
            gendered_words: default_gendered_words(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwitterConfig {
    /// OAuth 2.0 user-context access token with `tweet.write` and `media.write`.
    pub access_token: String,
    #[serde(default = "default_twitter_api")]
    pub api_base: String,
}

fn default_twitter_api() -> String {
    "https://api.x.com".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TumblrConfig {
    pub access_token: String,
    pub blog_id: String,
    #[serde(default = "default_tumblr_api")]
    pub api_base: String,
    #[serde(default = "default_about_url")]
    pub about_url: String,
    /// Also tag posts with the vision service's tags.
    #[serde(default)]
    pub include_tags: bool,
    #[serde(default)]
    pub tag_blacklist: Vec<String>,
}

fn default_tumblr_api() -> String {
    "https://api.tumblr.com".to_string()
}

fn default_about_url() -> String {
    "https://picdescbot.tumblr.com/about".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MastodonConfig {
    pub instance: String,
    pub access_token: String,
    #[serde(default = "default_sensitive")]
    pub sensitive: bool,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_sensitive() -> bool {
    true
}

fn default_visibility() -> String {
    "public".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fetch_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_fetch_attempts must be at least 1".to_string(),
            ));
        }
        self.mediawiki_endpoint()?;
        self.vision_endpoint()?;
        if let Some(tumblr) = &self.tumblr {
            if tumblr.blog_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "tumblr.blog_id must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn mediawiki_endpoint(&self) -> Result<Url, ConfigError> {
        parse_endpoint("mediawiki.endpoint", &self.mediawiki.endpoint)
    }

    pub fn vision_endpoint(&self) -> Result<Url, ConfigError> {
        parse_endpoint("vision.endpoint", &self.vision.endpoint)
    }

    pub fn timing(&self) -> Timing {
        Timing::new(Duration::from_millis(self.time_unit_ms))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_endpoint(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|err| ConfigError::Validation(format!("{} is not a URL ({}): {}", key, err, value)))
}
