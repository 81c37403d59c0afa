use std::sync::Arc;

use quiz_core::model::{AppSettings, AppSettingsDraft};
use storage::SettingsRepository;

use crate::error::SettingsServiceError;

/// Reads and updates the locally persisted API key and first-login flag.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<AppSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// The stored API key, if any.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn api_key(&self) -> Result<Option<String>, SettingsServiceError> {
        Ok(self.load().await?.api_key().map(str::to_owned))
    }

    /// Validate and persist a new API key.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if the key is malformed or persistence fails.
    pub async fn set_api_key(&self, key: &str) -> Result<AppSettings, SettingsServiceError> {
        let mut draft = self.load().await?.to_draft();
        draft.api_key = Some(key.to_string());
        self.save(draft).await
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn clear_api_key(&self) -> Result<AppSettings, SettingsServiceError> {
        let mut draft = self.load().await?.to_draft();
        draft.api_key = None;
        self.save(draft).await
    }

    /// True only the first time it is asked; the flag is cleared on read.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn is_first_login(&self) -> Result<bool, SettingsServiceError> {
        let settings = self.load().await?;
        if !settings.first_login() {
            return Ok(false);
        }
        self.set_first_login(false).await?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn set_first_login(
        &self,
        first_login: bool,
    ) -> Result<AppSettings, SettingsServiceError> {
        let mut draft = self.load().await?.to_draft();
        draft.first_login = first_login;
        self.save(draft).await
    }

    async fn save(&self, draft: AppSettingsDraft) -> Result<AppSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AppSettingsError;
    use storage::InMemoryRepository;

    fn service() -> (SettingsService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (SettingsService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn defaults_when_nothing_saved() {
        let (service, _) = service();
        let settings = service.load().await.unwrap();
        assert_eq!(settings.api_key(), None);
        assert!(settings.first_login());
    }

    #[tokio::test]
    async fn api_key_is_trimmed_and_cleared() {
        let (service, _) = service();

        service.set_api_key("  sk-test  ").await.unwrap();
        assert_eq!(service.api_key().await.unwrap().as_deref(), Some("sk-test"));

        service.clear_api_key().await.unwrap();
        assert_eq!(service.api_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_key_is_rejected() {
        let (service, _) = service();
        let err = service.set_api_key("sk test").await.unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(AppSettingsError::InvalidApiKey)
        ));
    }

    #[tokio::test]
    async fn first_login_is_reported_once() {
        let (service, repo) = service();

        assert!(service.is_first_login().await.unwrap());
        assert!(!service.is_first_login().await.unwrap());

        repo.reset().unwrap();
        assert!(service.is_first_login().await.unwrap());
    }
}
