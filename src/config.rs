use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::util::html::{SanitizePolicy, DEFAULT_ALLOWED_TAGS};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub preview_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://status.entur.org/history.rss".to_string(),
            refresh_interval_secs: 600,
            request_timeout_secs: 15,
            preview_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub rotation_secs: u64,
    pub reload_interval_secs: u64,
    pub ongoing_heading: String,
    pub ongoing_empty_text: String,
    pub scheduled_heading: String,
    pub scheduled_empty_text: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Driftstatus".to_string(),
            rotation_secs: 30,
            reload_interval_secs: 300,
            ongoing_heading: "Pågående hendelser".to_string(),
            ongoing_empty_text: "Ingen pågående driftshendelser".to_string(),
            scheduled_heading: "Planlagt vedlikehold".to_string(),
            scheduled_empty_text: "Ingen planlagt vedlikehold".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub allowed_tags: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            allowed_tags: DEFAULT_ALLOWED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl SanitizerConfig {
    pub fn policy(&self) -> SanitizePolicy {
        SanitizePolicy::new(&self.allowed_tags)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/driftstatus.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub display: DisplayConfig,
    pub sanitizer: SanitizerConfig,
    pub logging: LoggingConfig,
}

/// Values the kiosk page needs to drive its own chrome.
#[derive(Debug, Clone, Serialize)]
pub struct FrontendPublicConfig {
    pub title: String,
    pub reload_interval_secs: u64,
    pub rotation_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else {
            let path = locate_default_config();
            if let Some(path) = path {
                Self::load_from_file(&path)?
            } else {
                AppConfig::default()
            }
        };

        Self::apply_env_overrides(config)
    }

    pub fn frontend_public_config(&self) -> FrontendPublicConfig {
        FrontendPublicConfig {
            title: self.display.title.clone(),
            reload_interval_secs: self.display.reload_interval_secs,
            rotation_interval_secs: self.display.rotation_secs,
        }
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_yaml(&contents).with_context(|| format!("failed to parse config file {:?}", path))
    }

    fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Ok(bind) = std::env::var("SERVER_BIND") {
            config.server.bind = bind;
        }

        if let Ok(url) = std::env::var("FEED_URL") {
            config.feed.url = url;
        }

        if let Some(interval) = parse_optional_env("FEED_REFRESH_SECS")? {
            config.feed.refresh_interval_secs = interval;
        }

        if let Some(timeout) = parse_optional_env("FEED_TIMEOUT_SECS")? {
            config.feed.request_timeout_secs = timeout;
        }

        if let Some(limit) = parse_optional_env("FEED_PREVIEW_LIMIT")? {
            config.feed.preview_limit = limit;
        }

        if let Some(rotation) = parse_optional_env("ROTATION_SECS")? {
            config.display.rotation_secs = rotation;
        }

        if let Some(reload) = parse_optional_env("RELOAD_SECS")? {
            config.display.reload_interval_secs = reload;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(self.feed.url.trim())
            .with_context(|| format!("invalid feed url {:?}", self.feed.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "feed url must use http or https; set FEED_URL or feed.url in config file"
            ));
        }
        Ok(())
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ];

    candidates.into_iter().find(|path| path.exists())
}
