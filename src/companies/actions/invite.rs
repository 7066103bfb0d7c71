use chrono::Utc;

use super::find_owned_company;
use crate::companies::{
    CompanyInvitation, CompanyInvitationRepository, CompanyMembershipRepository,
    CompanyRepository, NewInvitation, RoleRegistry,
};
use crate::crypto::{DEFAULT_TOKEN_LENGTH, generate_token, hash_token};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{User, UserRepository};
use crate::validators::{normalize_email, validate_email};
use crate::{CompanyError, SecretString};

/// Output from creating a company invitation.
#[derive(Debug)]
pub struct InviteCompanyEmployeeOutput {
    pub invitation: CompanyInvitation,
    /// The plain token to send to the invitee. Only its hash is stored.
    pub token: SecretString,
}

/// Invites an e-mail address to join a company with a role. Owner only.
///
/// Delivery of the token is left to a [`Listener`](crate::Listener) or the
/// caller.
pub struct InviteCompanyEmployeeAction<C, U, M, I>
where
    C: CompanyRepository,
    U: UserRepository,
    M: CompanyMembershipRepository,
    I: CompanyInvitationRepository,
{
    companies: C,
    users: U,
    memberships: M,
    invitations: I,
    roles: RoleRegistry,
    token_length: usize,
}

impl<C, U, M, I> InviteCompanyEmployeeAction<C, U, M, I>
where
    C: CompanyRepository,
    U: UserRepository,
    M: CompanyMembershipRepository,
    I: CompanyInvitationRepository,
{
    pub fn new(companies: C, users: U, memberships: M, invitations: I, roles: RoleRegistry) -> Self {
        Self {
            companies,
            users,
            memberships,
            invitations,
            roles,
            token_length: DEFAULT_TOKEN_LENGTH,
        }
    }

    #[must_use]
    pub fn token_length(mut self, token_length: usize) -> Self {
        self.token_length = token_length;
        self
    }

    /// # Errors
    ///
    /// - `CompanyNotFound` / `Forbidden` for a missing or foreign company
    /// - `Validation` / `InvalidRole` for bad input
    /// - `AlreadyMember` when the e-mail belongs to the owner or an employee
    /// - `AlreadyInvited` when an invitation for the e-mail is pending
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_company_employee", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        email: &str,
        role: Option<&str>,
    ) -> Result<InviteCompanyEmployeeOutput, CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;

        let email = normalize_email(email);
        validate_email(&email)?;
        let role = self.roles.validate(role)?;

        if let Some(existing) = self.users.find_user_by_email(&email).await? {
            if company.is_owned_by(existing.id)
                || self
                    .memberships
                    .find_membership(company.id, existing.id)
                    .await?
                    .is_some()
            {
                return Err(CompanyError::AlreadyMember);
            }
        }

        if self
            .invitations
            .find_by_company_and_email(company.id, &email)
            .await?
            .is_some()
        {
            return Err(CompanyError::AlreadyInvited);
        }

        let token = generate_token(self.token_length);

        let invitation = self
            .invitations
            .create_invitation(NewInvitation {
                company_id: company.id,
                email,
                role,
                token_hash: hash_token(&token),
            })
            .await?;

        dispatch(CompanyEvent::CompanyEmployeeInvited {
            company_id: company.id,
            invitation_id: invitation.id,
            email: invitation.email.clone(),
            role: invitation.role.clone(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"invitation created\", company_id={}, invitation_id={}, email=\"{}\"",
            invitation.company_id,
            invitation.id,
            invitation.email
        );

        Ok(InviteCompanyEmployeeOutput {
            invitation,
            token: SecretString::new(token),
        })
    }
}
