//! Route configuration for the company and account endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};

use super::handlers;
use crate::companies::{
    CompanyInvitationRepository, CompanyMembershipRepository, CompanyRepository, CompanyResolver,
    CurrentCompanyRepository,
};
use crate::crypto::Argon2Hasher;
use crate::{ApiTokenRepository, CompaniesConfig, UserRepository};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct CompaniesState<U, T, C, M, I, K> {
    pub user_repo: U,
    /// Bearer authentication and personal token management.
    pub token_repo: T,
    pub company_repo: C,
    pub membership_repo: M,
    pub invitation_repo: I,
    /// Writes the user's current company.
    pub current_repo: K,
    pub config: Arc<CompaniesConfig>,
    pub hasher: Argon2Hasher,
}

impl<U, T, C, M, I, K> CompaniesState<U, T, C, M, I, K> {
    pub fn new(
        user_repo: U,
        token_repo: T,
        company_repo: C,
        membership_repo: M,
        invitation_repo: I,
        current_repo: K,
        config: CompaniesConfig,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            company_repo,
            membership_repo,
            invitation_repo,
            current_repo,
            config: Arc::new(config),
            hasher: Argon2Hasher::default(),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = hasher;
        self
    }
}

impl<U, T, C, M, I, K> CompaniesState<U, T, C, M, I, K>
where
    C: CompanyRepository + Clone,
    M: CompanyMembershipRepository + Clone,
    K: CurrentCompanyRepository + Clone,
{
    pub fn resolver(&self) -> CompanyResolver<C, M, K> {
        CompanyResolver::new(
            self.company_repo.clone(),
            self.membership_repo.clone(),
            self.current_repo.clone(),
            self.config.roles.clone(),
        )
    }
}

/// Company, employee, invitation and current-company routes.
///
/// # Routes
///
/// - `POST /companies`, `GET /companies`
/// - `GET|PUT|DELETE /companies/{id}`
/// - `GET|POST /companies/{id}/employees`
/// - `PUT|DELETE /companies/{id}/employees/{user_id}`
/// - `GET /companies/{id}/invitations`
/// - `DELETE /companies/{id}/invitations/{invitation_id}`
/// - `POST /company-invitations/accept`
/// - `GET|PUT /current-company`
pub fn company_routes<U, T, C, M, I, K>() -> Router<CompaniesState<U, T, C, M, I, K>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/companies",
            post(handlers::create_company::<U, T, C, M, I, K>)
                .get(handlers::list_companies::<U, T, C, M, I, K>),
        )
        .route(
            "/companies/{id}",
            get(handlers::show_company::<U, T, C, M, I, K>)
                .put(handlers::update_company::<U, T, C, M, I, K>)
                .delete(handlers::delete_company::<U, T, C, M, I, K>),
        )
        .route(
            "/companies/{id}/employees",
            get(handlers::list_employees::<U, T, C, M, I, K>)
                .post(handlers::add_employee::<U, T, C, M, I, K>),
        )
        .route(
            "/companies/{id}/employees/{user_id}",
            put(handlers::update_employee_role::<U, T, C, M, I, K>)
                .delete(handlers::remove_employee::<U, T, C, M, I, K>),
        )
        .route(
            "/companies/{id}/invitations",
            get(handlers::list_invitations::<U, T, C, M, I, K>),
        )
        .route(
            "/companies/{id}/invitations/{invitation_id}",
            delete(handlers::cancel_invitation::<U, T, C, M, I, K>),
        )
        .route(
            "/company-invitations/accept",
            post(handlers::accept_invitation::<U, T, C, M, I, K>),
        )
        .route(
            "/current-company",
            get(handlers::current_company::<U, T, C, M, I, K>)
                .put(handlers::switch_company::<U, T, C, M, I, K>),
        )
}

/// Profile, password, account deletion and API token routes.
///
/// # Routes
///
/// - `GET|DELETE /user`
/// - `PUT /user/profile-information`
/// - `PUT /user/password`
/// - `GET|POST /user/api-tokens`
/// - `PUT|DELETE /user/api-tokens/{id}`
pub fn account_routes<U, T, C, M, I, K>() -> Router<CompaniesState<U, T, C, M, I, K>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/user",
            get(handlers::show_user::<U, T, C, M, I, K>)
                .delete(handlers::delete_user::<U, T, C, M, I, K>),
        )
        .route(
            "/user/profile-information",
            put(handlers::update_profile::<U, T, C, M, I, K>),
        )
        .route(
            "/user/password",
            put(handlers::update_password::<U, T, C, M, I, K>),
        )
        .route(
            "/user/api-tokens",
            get(handlers::list_api_tokens::<U, T, C, M, I, K>)
                .post(handlers::create_api_token::<U, T, C, M, I, K>),
        )
        .route(
            "/user/api-tokens/{id}",
            put(handlers::update_api_token::<U, T, C, M, I, K>)
                .delete(handlers::delete_api_token::<U, T, C, M, I, K>),
        )
}

/// Every route. All of them require a bearer API token carrying the
/// method's ability (`read`, `create`, `update` or `delete`).
pub fn routes<U, T, C, M, I, K>() -> Router<CompaniesState<U, T, C, M, I, K>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(company_routes())
        .merge(account_routes())
}
