use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::{COMPANY_COLUMNS, CompanyRecord, MEMBERSHIP_COLUMNS, MembershipRecord};
use crate::companies::{
    Company, CompanyEmployee, CompanyMembership, CompanyMembershipRepository, NewMembership,
};
use crate::sqlite::{db_error, is_unique_violation};
use crate::CompanyError;

/// Backed by the `company_user` pivot table.
#[derive(Clone)]
pub struct SqliteCompanyMembershipRepository {
    pool: SqlitePool,
}

impl SqliteCompanyMembershipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EmployeeRecord {
    user_id: i64,
    name: String,
    email: String,
    role: Option<String>,
    joined_at: DateTime<Utc>,
}

impl From<EmployeeRecord> for CompanyEmployee {
    fn from(row: EmployeeRecord) -> Self {
        CompanyEmployee {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            role: row.role,
            joined_at: row.joined_at,
        }
    }
}

#[async_trait]
impl CompanyMembershipRepository for SqliteCompanyMembershipRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn add_member(&self, data: NewMembership) -> Result<CompanyMembership, CompanyError> {
        let now = Utc::now();
        let row: MembershipRecord = sqlx::query_as(&format!(
            "INSERT INTO company_user (company_id, user_id, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(data.company_id)
        .bind(data.user_id)
        .bind(&data.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CompanyError::AlreadyMember
            } else {
                db_error("add_member")(e)
            }
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_membership(
        &self,
        company_id: i64,
        user_id: i64,
    ) -> Result<Option<CompanyMembership>, CompanyError> {
        let row: Option<MembershipRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM company_user WHERE company_id = ? AND user_id = ?"
        ))
        .bind(company_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_membership"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn employees(&self, company_id: i64) -> Result<Vec<CompanyEmployee>, CompanyError> {
        let rows: Vec<EmployeeRecord> = sqlx::query_as(
            r"
            SELECT u.id AS user_id, u.name, u.email, cu.role, cu.created_at AS joined_at
            FROM company_user cu
            JOIN users u ON u.id = cu.user_id
            WHERE cu.company_id = ?
            ORDER BY u.name, u.id
            ",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("employees"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn member_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError> {
        let columns = COMPANY_COLUMNS
            .split(", ")
            .map(|c| format!("c.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let rows: Vec<CompanyRecord> = sqlx::query_as(&format!(
            "SELECT {columns} FROM companies c JOIN company_user cu ON cu.company_id = c.id WHERE cu.user_id = ? ORDER BY c.name, c.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("member_companies"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_role(
        &self,
        company_id: i64,
        user_id: i64,
        role: Option<&str>,
    ) -> Result<CompanyMembership, CompanyError> {
        let row: MembershipRecord = sqlx::query_as(&format!(
            "UPDATE company_user SET role = ?, updated_at = ? WHERE company_id = ? AND user_id = ? RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(role)
        .bind(Utc::now())
        .bind(company_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CompanyError::EmployeeNotFound,
            e => db_error("update_role")(e),
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn remove_member(&self, company_id: i64, user_id: i64) -> Result<(), CompanyError> {
        let mut tx = self.pool.begin().await.map_err(db_error("remove_member"))?;

        let result = sqlx::query("DELETE FROM company_user WHERE company_id = ? AND user_id = ?")
            .bind(company_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("remove_member"))?;

        if result.rows_affected() == 0 {
            return Err(CompanyError::EmployeeNotFound);
        }

        sqlx::query(
            "UPDATE users SET current_company_id = NULL WHERE id = ? AND current_company_id = ?",
        )
        .bind(user_id)
        .bind(company_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("remove_member"))?;

        tx.commit().await.map_err(db_error("remove_member"))?;

        Ok(())
    }
}
