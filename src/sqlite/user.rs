use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::{db_error, is_unique_violation};
use crate::repository::{NewUser, User, UserRepository};
use crate::CompanyError;

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    hashed_password: String,
    current_company_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(row: UserRecord) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            hashed_password: row.hashed_password,
            current_company_id: row.current_company_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, hashed_password, current_company_id, created_at, updated_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CompanyError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_user_by_id"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CompanyError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find_user_by_email"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create_user(&self, data: NewUser) -> Result<User, CompanyError> {
        let now = Utc::now();
        let row: UserRecord = sqlx::query_as(&format!(
            "INSERT INTO users (name, email, hashed_password, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.hashed_password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CompanyError::UserAlreadyExists
            } else {
                db_error("create_user")(e)
            }
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, name, email), err))]
    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
    ) -> Result<User, CompanyError> {
        let row: UserRecord = sqlx::query_as(&format!(
            "UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CompanyError::UserNotFound,
            e if is_unique_violation(&e) => CompanyError::UserAlreadyExists,
            e => db_error("update_profile")(e),
        })?;

        Ok(row.into())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, hashed_password), err)
    )]
    async fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<(), CompanyError> {
        let result =
            sqlx::query("UPDATE users SET hashed_password = ?, updated_at = ? WHERE id = ?")
                .bind(hashed_password)
                .bind(Utc::now())
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(db_error("update_password"))?;

        if result.rows_affected() == 0 {
            return Err(CompanyError::UserNotFound);
        }

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_user(&self, user_id: i64) -> Result<(), CompanyError> {
        const OWNED: &str = "SELECT id FROM companies WHERE user_id = ?";

        let mut tx = self.pool.begin().await.map_err(db_error("delete_user"))?;

        sqlx::query(&format!(
            "UPDATE users SET current_company_id = NULL WHERE current_company_id IN ({OWNED})"
        ))
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete_user"))?;

        sqlx::query(&format!(
            "DELETE FROM company_invitations WHERE company_id IN ({OWNED})"
        ))
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete_user"))?;

        sqlx::query(&format!(
            "DELETE FROM company_user WHERE user_id = ? OR company_id IN ({OWNED})"
        ))
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete_user"))?;

        sqlx::query("DELETE FROM companies WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete_user"))?;

        sqlx::query("DELETE FROM api_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete_user"))?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete_user"))?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(CompanyError::UserNotFound);
        }

        tx.commit().await.map_err(db_error("delete_user"))?;

        Ok(())
    }
}
