use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SettingsRepository, StorageError};
use quiz_core::model::AppSettings;

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT api_key, first_login
            FROM app_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let api_key: Option<String> = row
            .try_get("api_key")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let first_login: bool = row
            .try_get("first_login")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        AppSettings::from_persisted(api_key, first_login)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_settings (id, api_key, first_login, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                api_key = excluded.api_key,
                first_login = excluded.first_login,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(settings.api_key())
        .bind(settings.first_login())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
