use chrono::Utc;

use super::find_owned_company;
use crate::companies::{CompanyInvitationRepository, CompanyRepository};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::CompanyError;

/// Deletes a pending invitation. Owner only.
pub struct CancelCompanyInvitationAction<C, I>
where
    C: CompanyRepository,
    I: CompanyInvitationRepository,
{
    companies: C,
    invitations: I,
}

impl<C: CompanyRepository, I: CompanyInvitationRepository> CancelCompanyInvitationAction<C, I> {
    pub fn new(companies: C, invitations: I) -> Self {
        Self {
            companies,
            invitations,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cancel_company_invitation", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        invitation_id: i64,
    ) -> Result<(), CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;

        let invitation = self
            .invitations
            .find_invitation(invitation_id)
            .await?
            .filter(|i| i.company_id == company.id)
            .ok_or(CompanyError::InvitationNotFound)?;

        self.invitations.delete_invitation(invitation.id).await?;

        dispatch(CompanyEvent::CompanyInvitationCancelled {
            company_id: company.id,
            invitation_id: invitation.id,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companies::{NewCompany, NewInvitation};
    use crate::MockDatabase;

    #[tokio::test]
    async fn test_cancel_invitation() {
        let db = MockDatabase::new();
        let owner = db.seed_user("Taylor", "taylor@example.com").unwrap();
        let other = db.seed_user("Adam", "adam@example.com").unwrap();
        let mut ids = Vec::new();
        for name in ["Acme", "Globex"] {
            ids.push(
                db.create_company(NewCompany {
                    user_id: owner.id,
                    name: name.to_owned(),
                    personal_company: false,
                })
                .await
                .unwrap()
                .id,
            );
        }
        let invitation = db
            .create_invitation(NewInvitation {
                company_id: ids[0],
                email: "new@example.com".to_owned(),
                role: None,
                token_hash: "hash".to_owned(),
            })
            .await
            .unwrap();
        let action = CancelCompanyInvitationAction::new(db.clone(), db.clone());

        assert_eq!(
            action.execute(&other, ids[0], invitation.id).await.unwrap_err(),
            CompanyError::Forbidden
        );
        // invitation belongs to another company
        assert_eq!(
            action.execute(&owner, ids[1], invitation.id).await.unwrap_err(),
            CompanyError::InvitationNotFound
        );

        action.execute(&owner, ids[0], invitation.id).await.unwrap();
        assert_eq!(db.invitation_count().unwrap(), 0);
    }
}
