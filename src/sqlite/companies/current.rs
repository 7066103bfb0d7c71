use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::companies::CurrentCompanyRepository;
use crate::sqlite::db_error;
use crate::CompanyError;

/// Writes `users.current_company_id`.
#[derive(Clone)]
pub struct SqliteCurrentCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCurrentCompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurrentCompanyRepository for SqliteCurrentCompanyRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn set_current_company(
        &self,
        user_id: i64,
        company_id: Option<i64>,
    ) -> Result<(), CompanyError> {
        let result =
            sqlx::query("UPDATE users SET current_company_id = ?, updated_at = ? WHERE id = ?")
                .bind(company_id)
                .bind(Utc::now())
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(db_error("set_current_company"))?;

        if result.rows_affected() == 0 {
            return Err(CompanyError::UserNotFound);
        }

        Ok(())
    }
}
