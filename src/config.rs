use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::infra::retry::RetryPolicy;

const CONFIG_DIR_NAME: &str = "warroom";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_CANDIDATE_LIMIT: usize = 5;

const ENV_BASE_URL: &str = "WARROOM_JIRA_BASE_URL";
const ENV_EMAIL: &str = "WARROOM_JIRA_EMAIL";
const ENV_TOKEN: &str = "WARROOM_JIRA_TOKEN";

/// Settings persisted by `warroom config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humans_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_initial_backoff_ms: Option<u64>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Effective settings: stored values with environment overrides applied.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub candidate_limit: usize,
    pub humans_only: bool,
    pub retry: RetryPolicy,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::from_sources(stored, |name| env::var(name).ok())
    }

    pub fn from_sources<F>(stored: StoredConfig, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let candidate_limit = stored.candidate_limit.unwrap_or(DEFAULT_CANDIDATE_LIMIT);
        if candidate_limit == 0 {
            return Err(AppError::Configuration(
                "candidate_limit must be at least 1".to_string(),
            ));
        }

        let mut retry = RetryPolicy::default();
        if let Some(attempts) = stored.retry_attempts {
            retry.max_attempts = attempts.max(1);
        }
        if let Some(ms) = stored.retry_initial_backoff_ms {
            retry.initial_backoff = Duration::from_millis(ms);
        }

        Ok(Self {
            jira_base_url: from_env(ENV_BASE_URL).or(stored.jira_base_url),
            jira_email: from_env(ENV_EMAIL).or(stored.jira_email),
            jira_token: from_env(ENV_TOKEN).or(stored.jira_token),
            candidate_limit,
            humans_only: stored.humans_only.unwrap_or(false),
            retry,
        })
    }
}
