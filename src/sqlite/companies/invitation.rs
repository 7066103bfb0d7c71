use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::{MEMBERSHIP_COLUMNS, MembershipRecord};
use crate::companies::{
    CompanyInvitation, CompanyInvitationRepository, CompanyMembership, NewInvitation,
};
use crate::sqlite::{db_error, is_unique_violation};
use crate::CompanyError;

#[derive(Clone)]
pub struct SqliteCompanyInvitationRepository {
    pool: SqlitePool,
}

impl SqliteCompanyInvitationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InvitationRecord {
    id: i64,
    company_id: i64,
    email: String,
    role: Option<String>,
    token_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InvitationRecord> for CompanyInvitation {
    fn from(row: InvitationRecord) -> Self {
        CompanyInvitation {
            id: row.id,
            company_id: row.company_id,
            email: row.email,
            role: row.role,
            token_hash: row.token_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const INVITATION_COLUMNS: &str = "id, company_id, email, role, token_hash, created_at, updated_at";

#[async_trait]
impl CompanyInvitationRepository for SqliteCompanyInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create_invitation(
        &self,
        data: NewInvitation,
    ) -> Result<CompanyInvitation, CompanyError> {
        let now = Utc::now();
        let row: InvitationRecord = sqlx::query_as(&format!(
            "INSERT INTO company_invitations (company_id, email, role, token_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(data.company_id)
        .bind(&data.email)
        .bind(&data.role)
        .bind(&data.token_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CompanyError::AlreadyInvited
            } else {
                db_error("create_invitation")(e)
            }
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_invitation(&self, id: i64) -> Result<Option<CompanyInvitation>, CompanyError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM company_invitations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_invitation"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token_hash), err))]
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM company_invitations WHERE token_hash = ?"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_invitation_by_token_hash"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_by_company_and_email(
        &self,
        company_id: i64,
        email: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM company_invitations WHERE company_id = ? AND email = ?"
        ))
        .bind(company_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_invitation_by_email"))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn invitations_for_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<CompanyInvitation>, CompanyError> {
        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM company_invitations WHERE company_id = ? ORDER BY id"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("invitations_for_company"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_invitation(&self, id: i64) -> Result<(), CompanyError> {
        let result = sqlx::query("DELETE FROM company_invitations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_invitation"))?;

        if result.rows_affected() == 0 {
            return Err(CompanyError::InvitationNotFound);
        }

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn accept_invitation(
        &self,
        invitation_id: i64,
        user_id: i64,
    ) -> Result<CompanyMembership, CompanyError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("accept_invitation"))?;

        let invitation: InvitationRecord = sqlx::query_as(&format!(
            "DELETE FROM company_invitations WHERE id = ? RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(invitation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => CompanyError::InvitationNotFound,
            e => db_error("accept_invitation")(e),
        })?;

        let now = Utc::now();
        let membership: MembershipRecord = sqlx::query_as(&format!(
            "INSERT INTO company_user (company_id, user_id, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(invitation.company_id)
        .bind(user_id)
        .bind(&invitation.role)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // the transaction is dropped uncommitted, restoring the invitation
            if is_unique_violation(&e) {
                CompanyError::AlreadyMember
            } else {
                db_error("accept_invitation")(e)
            }
        })?;

        tx.commit().await.map_err(db_error("accept_invitation"))?;

        Ok(membership.into())
    }
}
