use chrono::Utc;

use crate::companies::{
    CompanyInvitationRepository, CompanyMembership, CompanyMembershipRepository,
    CompanyRepository,
};
use crate::crypto::hash_token;
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::{CompanyError, SecretString};

/// Accepts an invitation with the plain token the invitee received.
///
/// The invitation row is deleted and the membership inserted in one
/// transaction; on any failure the invitation stays pending.
pub struct AcceptCompanyInvitationAction<C, M, I>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    I: CompanyInvitationRepository,
{
    companies: C,
    memberships: M,
    invitations: I,
}

impl<C, M, I> AcceptCompanyInvitationAction<C, M, I>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    I: CompanyInvitationRepository,
{
    pub fn new(companies: C, memberships: M, invitations: I) -> Self {
        Self {
            companies,
            memberships,
            invitations,
        }
    }

    /// # Errors
    ///
    /// - `InvitationNotFound` for an unknown token
    /// - `EmailMismatch` when the invitation was sent to another address
    /// - `AlreadyMember` when the user already belongs to the company
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "accept_company_invitation", skip_all, err)
    )]
    pub async fn execute(
        &self,
        token: &SecretString,
        user: &User,
    ) -> Result<CompanyMembership, CompanyError> {
        let invitation = self
            .invitations
            .find_by_token_hash(&hash_token(token.expose_secret()))
            .await?
            .ok_or(CompanyError::InvitationNotFound)?;

        if !invitation.is_for(&user.email) {
            return Err(CompanyError::EmailMismatch);
        }

        let company = self
            .companies
            .find_company(invitation.company_id)
            .await?
            .ok_or(CompanyError::CompanyNotFound)?;

        if company.is_owned_by(user.id)
            || self
                .memberships
                .find_membership(company.id, user.id)
                .await?
                .is_some()
        {
            return Err(CompanyError::AlreadyMember);
        }

        let membership = self
            .invitations
            .accept_invitation(invitation.id, user.id)
            .await?;

        dispatch(CompanyEvent::CompanyInvitationAccepted {
            company_id: membership.company_id,
            user_id: user.id,
            email: invitation.email,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"invitation accepted\", company_id={}, user_id={}, membership_id={}",
            membership.company_id,
            membership.user_id,
            membership.id
        );

        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companies::{Company, NewCompany, NewInvitation, NewMembership};
    use crate::MockDatabase;

    const TOKEN: &str = "invitation-token-0123456789";

    async fn setup() -> (MockDatabase, Company) {
        let db = MockDatabase::new();
        let owner = db.seed_user("Taylor", "taylor@example.com").unwrap();
        let company = db
            .create_company(NewCompany {
                user_id: owner.id,
                name: "Acme".to_owned(),
                personal_company: false,
            })
            .await
            .unwrap();
        db.create_invitation(NewInvitation {
            company_id: company.id,
            email: "adam@example.com".to_owned(),
            role: Some("editor".to_owned()),
            token_hash: hash_token(TOKEN),
        })
        .await
        .unwrap();
        (db, company)
    }

    fn action(db: &MockDatabase) -> AcceptCompanyInvitationAction<MockDatabase, MockDatabase, MockDatabase> {
        AcceptCompanyInvitationAction::new(db.clone(), db.clone(), db.clone())
    }

    #[tokio::test]
    async fn test_accept_success() {
        let (db, company) = setup().await;
        let adam = db.seed_user("Adam", "Adam@Example.com").unwrap();

        let membership = action(&db)
            .execute(&SecretString::new(TOKEN), &adam)
            .await
            .unwrap();

        assert_eq!(membership.company_id, company.id);
        assert_eq!(membership.user_id, adam.id);
        assert_eq!(membership.role.as_deref(), Some("editor"));
        assert_eq!(db.invitation_count().unwrap(), 0);
        assert_eq!(db.membership_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_accept_invalid_token() {
        let (db, _) = setup().await;
        let adam = db.seed_user("Adam", "adam@example.com").unwrap();

        assert_eq!(
            action(&db)
                .execute(&SecretString::new("wrong"), &adam)
                .await
                .unwrap_err(),
            CompanyError::InvitationNotFound
        );
    }

    #[tokio::test]
    async fn test_accept_email_mismatch() {
        let (db, _) = setup().await;
        let eve = db.seed_user("Eve", "eve@example.com").unwrap();

        assert_eq!(
            action(&db)
                .execute(&SecretString::new(TOKEN), &eve)
                .await
                .unwrap_err(),
            CompanyError::EmailMismatch
        );
        assert_eq!(db.invitation_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_accept_already_member_leaves_invitation() {
        let (db, company) = setup().await;
        let adam = db.seed_user("Adam", "adam@example.com").unwrap();
        db.add_member(NewMembership {
            company_id: company.id,
            user_id: adam.id,
            role: None,
        })
        .await
        .unwrap();

        assert_eq!(
            action(&db)
                .execute(&SecretString::new(TOKEN), &adam)
                .await
                .unwrap_err(),
            CompanyError::AlreadyMember
        );
        assert_eq!(db.invitation_count().unwrap(), 1);
        assert_eq!(db.membership_count().unwrap(), 1);
    }
}
