use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_SETTINGS_DB: &str = "sqlite://quizgen.sqlite3";

const API_URL_VAR: &str = "QUIZ_API_URL";
const POLL_INTERVAL_VAR: &str = "QUIZ_POLL_INTERVAL_MS";
const SETTINGS_DB_VAR: &str = "QUIZ_SETTINGS_DB";

/// Questions per page of the attempt navigator, by viewport class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    Compact,
    #[default]
    Wide,
}

impl PageSize {
    #[must_use]
    pub fn get(self) -> usize {
        match self {
            PageSize::Compact => 4,
            PageSize::Wide => 30,
        }
    }
}

/// Where the client talks to and where it keeps its own state.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub poll_interval: Duration,
    pub settings_db: String,
}

impl ClientConfig {
    /// Read `QUIZ_API_URL`, `QUIZ_POLL_INTERVAL_MS` and `QUIZ_SETTINGS_DB`,
    /// falling back to defaults for unset or blank values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = read(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidApiUrl {
            value: raw_url.clone(),
            source,
        })?;

        let poll_interval = match read(POLL_INTERVAL_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidPollInterval(raw))?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let settings_db = read(SETTINGS_DB_VAR).unwrap_or_else(|| DEFAULT_SETTINGS_DB.to_string());

        Ok(Self {
            api_url,
            poll_interval,
            settings_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.settings_db, DEFAULT_SETTINGS_DB);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
    }

    #[test]
    fn overrides_are_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://quiz.example.com/api"),
            (POLL_INTERVAL_VAR, "250"),
            (SETTINGS_DB_VAR, "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("quiz.example.com"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.settings_db, "sqlite::memory:");
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "not a url")])),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(POLL_INTERVAL_VAR, "0")])),
            Err(ConfigError::InvalidPollInterval(_))
        ));
    }

    #[test]
    fn page_sizes_match_viewport_classes() {
        assert_eq!(PageSize::Compact.get(), 4);
        assert_eq!(PageSize::Wide.get(), 30);
    }
}
