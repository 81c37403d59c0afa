use thiserror::Error;

/// Client-side preferences persisted between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSettings {
    api_key: Option<String>,
    first_login: bool,
}

#[derive(Clone, Debug)]
pub struct AppSettingsDraft {
    pub api_key: Option<String>,
    pub first_login: bool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("API key must not contain whitespace")]
    InvalidApiKey,
}

impl Default for AppSettingsDraft {
    fn default() -> Self {
        Self {
            api_key: None,
            first_login: true,
        }
    }
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the API key contains inner whitespace.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let api_key = normalize_optional(self.api_key);

        if api_key
            .as_deref()
            .is_some_and(|key| key.chars().any(char::is_whitespace))
        {
            return Err(AppSettingsError::InvalidApiKey);
        }

        Ok(AppSettings {
            api_key,
            first_login: self.first_login,
        })
    }
}

impl AppSettings {
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the stored values no longer validate.
    pub fn from_persisted(
        api_key: Option<String>,
        first_login: bool,
    ) -> Result<Self, AppSettingsError> {
        AppSettingsDraft {
            api_key,
            first_login,
        }
        .validate()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn first_login(&self) -> bool {
        self.first_login
    }

    #[must_use]
    pub fn to_draft(&self) -> AppSettingsDraft {
        AppSettingsDraft {
            api_key: self.api_key.clone(),
            first_login: self.first_login,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            first_login: true,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
