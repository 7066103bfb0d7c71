use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::db_error;
use crate::repository::{ApiToken, ApiTokenRepository, NewApiToken};
use crate::CompanyError;

#[derive(Clone)]
pub struct SqliteApiTokenRepository {
    pool: SqlitePool,
}

impl SqliteApiTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ApiTokenRecord {
    id: i64,
    user_id: i64,
    name: String,
    token_hash: String,
    /// JSON array of ability strings.
    abilities: String,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApiTokenRecord> for ApiToken {
    fn from(row: ApiTokenRecord) -> Self {
        let abilities = serde_json::from_str(&row.abilities).unwrap_or_else(|e| {
            log::warn!(
                target: "companies",
                "msg=\"unreadable token abilities\", token_id={}, error=\"{e}\"",
                row.id
            );
            Vec::new()
        });

        ApiToken {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            token_hash: row.token_hash,
            abilities,
            last_used_at: row.last_used_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TOKEN_COLUMNS: &str =
    "id, user_id, name, token_hash, abilities, last_used_at, created_at, updated_at";

fn abilities_json(abilities: &[String]) -> Result<String, CompanyError> {
    serde_json::to_string(abilities).map_err(|e| CompanyError::Internal(e.to_string()))
}

#[async_trait]
impl ApiTokenRepository for SqliteApiTokenRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create_token(&self, data: NewApiToken) -> Result<ApiToken, CompanyError> {
        let now = Utc::now();
        let row: ApiTokenRecord = sqlx::query_as(&format!(
            "INSERT INTO api_tokens (user_id, name, token_hash, abilities, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(data.user_id)
        .bind(&data.name)
        .bind(&data.token_hash)
        .bind(abilities_json(&data.abilities)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create_token"))?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token_hash), err))]
    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<ApiToken>, CompanyError> {
        let row: Option<ApiTokenRecord> = sqlx::query_as(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE token_hash = ?"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_token_by_hash"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_token(
        &self,
        user_id: i64,
        token_id: i64,
    ) -> Result<Option<ApiToken>, CompanyError> {
        let row: Option<ApiTokenRecord> = sqlx::query_as(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE id = ? AND user_id = ?"
        ))
        .bind(token_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_user_token"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn tokens_for_user(&self, user_id: i64) -> Result<Vec<ApiToken>, CompanyError> {
        let rows: Vec<ApiTokenRecord> = sqlx::query_as(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE user_id = ? ORDER BY name, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("tokens_for_user"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, abilities), err))]
    async fn update_abilities(
        &self,
        token_id: i64,
        abilities: &[String],
    ) -> Result<ApiToken, CompanyError> {
        let row: ApiTokenRecord = sqlx::query_as(&format!(
            "UPDATE api_tokens SET abilities = ?, updated_at = ? WHERE id = ? RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(abilities_json(abilities)?)
        .bind(Utc::now())
        .bind(token_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CompanyError::ApiTokenNotFound,
            e => db_error("update_abilities")(e),
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn touch_last_used(&self, token_id: i64) -> Result<(), CompanyError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("touch_last_used"))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_token(&self, token_id: i64) -> Result<(), CompanyError> {
        sqlx::query("DELETE FROM api_tokens WHERE id = ?")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_token"))?;

        Ok(())
    }
}
