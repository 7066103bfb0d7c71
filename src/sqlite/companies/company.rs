use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{COMPANY_COLUMNS, CompanyRecord};
use crate::companies::{Company, CompanyRepository, NewCompany};
use crate::sqlite::db_error;
use crate::CompanyError;

#[derive(Clone)]
pub struct SqliteCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for SqliteCompanyRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create_company(&self, data: NewCompany) -> Result<Company, CompanyError> {
        let now = Utc::now();
        let row: CompanyRecord = sqlx::query_as(&format!(
            "INSERT INTO companies (user_id, name, personal_company, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(data.user_id)
        .bind(&data.name)
        .bind(data.personal_company)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create_company"))?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_company(&self, id: i64) -> Result<Option<Company>, CompanyError> {
        let row: Option<CompanyRecord> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_company"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn owned_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError> {
        let rows: Vec<CompanyRecord> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE user_id = ? ORDER BY name, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("owned_companies"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn personal_company(&self, user_id: i64) -> Result<Option<Company>, CompanyError> {
        let row: Option<CompanyRecord> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE user_id = ? AND personal_company = 1 ORDER BY id LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("personal_company"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, name), err))]
    async fn update_company_name(&self, id: i64, name: &str) -> Result<Company, CompanyError> {
        let row: CompanyRecord = sqlx::query_as(&format!(
            "UPDATE companies SET name = ?, updated_at = ? WHERE id = ? RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CompanyError::CompanyNotFound,
            e => db_error("update_company_name")(e),
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn purge_company(&self, id: i64) -> Result<(), CompanyError> {
        let mut tx = self.pool.begin().await.map_err(db_error("purge_company"))?;

        sqlx::query("UPDATE users SET current_company_id = NULL WHERE current_company_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("purge_company"))?;

        sqlx::query("DELETE FROM company_invitations WHERE company_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("purge_company"))?;

        sqlx::query("DELETE FROM company_user WHERE company_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("purge_company"))?;

        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("purge_company"))?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(CompanyError::CompanyNotFound);
        }

        tx.commit().await.map_err(db_error("purge_company"))?;

        Ok(())
    }
}
