//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Public lost-item feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Local data store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Outbound notification mail settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Periodic job intervals
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;
        self.store.validate()?;
        self.mail.validate()?;
        self.schedule.validate()?;
        Ok(())
    }
}

/// Settings for the public lost-item feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL the index range is appended to, e.g.
    /// `https://host/KEY/json/lostArticleInfo/` yields requests like
    /// `https://host/KEY/json/lostArticleInfo/50/150`.
    #[serde(default)]
    pub base_url: String,

    /// How many trailing records each pass fetches.
    #[serde(default = "defaults::tail_window")]
    pub tail_window: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::validation("feed.base_url is empty"));
        }
        if Url::parse(&self.base_url).is_err() {
            return Err(AppError::validation(format!(
                "feed.base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.tail_window == 0 {
            return Err(AppError::validation("feed.tail_window must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("feed.timeout_secs must be positive"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("feed.user_agent is empty"));
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            tail_window: defaults::tail_window(),
            timeout_secs: defaults::timeout_secs(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Settings for the local data store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the JSON collection files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(AppError::validation("store.data_dir is empty"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

/// Settings for outbound notification mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP relay endpoint that accepts the notification payload as JSON
    #[serde(default)]
    pub endpoint_url: String,

    /// Sender address stamped on every notification
    #[serde(default = "defaults::mail_from")]
    pub from: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl MailConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(AppError::validation("mail.endpoint_url is empty"));
        }
        if Url::parse(&self.endpoint_url).is_err() {
            return Err(AppError::validation(format!(
                "mail.endpoint_url is not a valid URL: {}",
                self.endpoint_url
            )));
        }
        if self.from.trim().is_empty() {
            return Err(AppError::validation("mail.from is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("mail.timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            from: defaults::mail_from(),
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

/// Intervals for the two periodic jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between feed reconciliation passes
    #[serde(default = "defaults::reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,

    /// Seconds between match notification passes
    #[serde(default = "defaults::notify_interval_secs")]
    pub notify_interval_secs: u64,
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reconcile_interval_secs == 0 {
            return Err(AppError::validation(
                "schedule.reconcile_interval_secs must be positive",
            ));
        }
        if self.notify_interval_secs == 0 {
            return Err(AppError::validation(
                "schedule.notify_interval_secs must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: defaults::reconcile_interval_secs(),
            notify_interval_secs: defaults::notify_interval_secs(),
        }
    }
}

/// Default values for configuration.
mod defaults {
    pub fn tail_window() -> u32 {
        100
    }

    pub fn timeout_secs() -> u64 {
        10
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; refound/0.1)".to_string()
    }

    pub fn data_dir() -> String {
        "data".to_string()
    }

    pub fn mail_from() -> String {
        "no-reply@refound.example".to_string()
    }

    pub fn reconcile_interval_secs() -> u64 {
        3600
    }

    pub fn notify_interval_secs() -> u64 {
        600
    }
}
