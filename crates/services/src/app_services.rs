use std::sync::Arc;
use std::time::Duration;

use quiz_api::{HttpQuizApi, QuizApi};
use storage::Storage;

use crate::catalog::CatalogService;
use crate::config::ClientConfig;
use crate::creation::QuizCreationService;
use crate::error::AppServicesError;
use crate::notifications::Notifier;
use crate::settings_service::SettingsService;

/// Assembles app-facing services around one API client and one settings store.
#[derive(Clone)]
pub struct AppServices {
    api: Arc<dyn QuizApi>,
    settings: Arc<SettingsService>,
    catalog: Arc<CatalogService>,
    creation: Arc<QuizCreationService>,
    notifier: Notifier,
}

impl AppServices {
    /// Build services talking HTTP to the configured server, with settings
    /// persisted in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the API
    /// url is unusable.
    pub async fn connect(config: &ClientConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.settings_db).await?;
        let api: Arc<dyn QuizApi> = Arc::new(HttpQuizApi::new(config.api_url.as_str())?);
        tracing::debug!(api_url = %config.api_url, settings_db = %config.settings_db, "services ready");
        Ok(Self::from_parts(api, storage, config.poll_interval))
    }

    /// Wire services over an existing API client and storage.
    #[must_use]
    pub fn from_parts(api: Arc<dyn QuizApi>, storage: Storage, poll_interval: Duration) -> Self {
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));
        let catalog = Arc::new(CatalogService::new(Arc::clone(&api)));
        let creation = Arc::new(
            QuizCreationService::new(Arc::clone(&api), Arc::clone(&settings))
                .with_poll_interval(poll_interval),
        );

        Self {
            api,
            settings,
            catalog,
            creation,
            notifier: Notifier::new(),
        }
    }

    /// Raw API client, for flows that drive it directly (attempt submission).
    #[must_use]
    pub fn api(&self) -> Arc<dyn QuizApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn creation(&self) -> Arc<QuizCreationService> {
        Arc::clone(&self.creation)
    }

    #[must_use]
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }
}
