//! HTTP handlers for the company and account endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::routes::CompaniesState;
use crate::actions::{
    CreateApiTokenAction, DeleteApiTokenAction, DeleteUserAction, ListApiTokensAction,
    UpdateApiTokenPermissionsAction, UpdatePasswordAction, UpdateProfileInformationAction,
};
use crate::api::{
    AcceptInvitationRequest, AddEmployeeRequest, ApiTokenCreatedResponse, ApiTokensResponse,
    Banner, BannerResponse, CompanyResponse, CreateApiTokenRequest, CreateCompanyRequest,
    CurrentCompanyResponse, DeleteUserRequest, EmployeeAddedResponse, EmployeesResponse,
    InvitationsResponse, SwitchCompanyRequest, UpdateApiTokenRequest, UpdateCompanyRequest,
    UpdateEmployeeRoleRequest, UpdatePasswordRequest, UpdateProfileRequest, UserResponse,
};
use crate::companies::{
    AcceptCompanyInvitationAction, AddCompanyEmployeeAction, CancelCompanyInvitationAction,
    Company, CompanyInvitationRepository, CompanyMembershipRepository, CompanyRepository,
    CompanyResolver, CreateCompanyAction, CurrentCompanyRepository, DeleteCompanyAction,
    InviteCompanyEmployeeAction, RemoveCompanyEmployeeAction, UpdateCompanyEmployeeRoleAction,
    UpdateCompanyNameAction,
};
use crate::{ApiTokenRepository, CompanyError, SecretString, User, UserRepository};

fn ensure_enabled(enabled: bool, feature: &'static str) -> Result<(), AppError> {
    if enabled {
        Ok(())
    } else {
        Err(AppError(CompanyError::FeatureDisabled(feature)))
    }
}

async fn describe_company<C, M, K>(
    resolver: &CompanyResolver<C, M, K>,
    user: &User,
    company: Company,
    is_current: bool,
) -> Result<CompanyResponse, CompanyError>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    K: CurrentCompanyRepository,
{
    let role = resolver.company_role(user, &company).await?;
    let permissions = role.as_ref().map(|r| r.permissions().to_vec()).unwrap_or_default();

    Ok(CompanyResponse {
        company,
        role: role.map(|r| r.key().to_owned()),
        permissions,
        is_current,
    })
}

/// Loads a company the user owns or is employed by.
async fn find_member_company<C, M, K>(
    resolver: &CompanyResolver<C, M, K>,
    companies: &C,
    user: &User,
    company_id: i64,
) -> Result<Company, CompanyError>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    K: CurrentCompanyRepository,
{
    let company = companies
        .find_company(company_id)
        .await?
        .ok_or(CompanyError::CompanyNotFound)?;

    if !resolver.belongs_to_company(user, &company).await? {
        return Err(CompanyError::Forbidden);
    }

    Ok(company)
}

/// POST /companies
pub async fn create_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("create")?;

    ensure_enabled(state.config.features.company_features, "company")?;

    let action = CreateCompanyAction::new(state.company_repo.clone(), state.current_repo.clone());
    let company = action.execute(auth.user(), &body.name).await?;

    let response = describe_company(&state.resolver(), auth.user(), company, true).await?;

    Ok((
        StatusCode::CREATED,
        Json(BannerResponse::new(response, "Company created.")),
    ))
}

/// GET /companies
pub async fn list_companies<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    let resolver = state.resolver();
    let user = auth.user();

    let companies = resolver.all_companies(user).await?;
    let mut response = Vec::with_capacity(companies.len());
    for company in companies {
        let is_current = user.is_current_company(company.id);
        response.push(describe_company(&resolver, user, company, is_current).await?);
    }

    Ok(Json(response))
}

/// GET /companies/{id}
pub async fn show_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    let resolver = state.resolver();
    let user = auth.user();

    let company = find_member_company(&resolver, &state.company_repo, user, company_id).await?;
    let is_current = user.is_current_company(company.id);

    Ok(Json(describe_company(&resolver, user, company, is_current).await?))
}

/// PUT /companies/{id}
pub async fn update_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
    Json(body): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    let action = UpdateCompanyNameAction::new(state.company_repo.clone());
    let company = action.execute(auth.user(), company_id, &body.name).await?;

    let is_current = auth.user().is_current_company(company.id);
    let response = describe_company(&state.resolver(), auth.user(), company, is_current).await?;

    Ok(Json(BannerResponse::new(response, "Company name updated.")))
}

/// DELETE /companies/{id}
pub async fn delete_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("delete")?;

    ensure_enabled(state.config.features.company_features, "company")?;

    DeleteCompanyAction::new(state.company_repo)
        .execute(auth.user(), company_id)
        .await?;

    Ok(Json(Banner::success("Company deleted.")))
}

/// GET /companies/{id}/employees
pub async fn list_employees<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    let resolver = state.resolver();
    let company =
        find_member_company(&resolver, &state.company_repo, auth.user(), company_id).await?;

    let owner = state.user_repo.find_user_by_id(company.user_id).await?;
    let employees = state.membership_repo.employees(company.id).await?;

    Ok(Json(EmployeesResponse {
        owner: owner.map(UserResponse::from),
        employees,
        available_roles: state.config.roles.roles().to_vec(),
    }))
}

/// POST /companies/{id}/employees
///
/// Sends an invitation when invitations are enabled, otherwise attaches the
/// existing user directly.
pub async fn add_employee<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
    Json(body): Json<AddEmployeeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("create")?;

    ensure_enabled(state.config.features.company_features, "company")?;

    let config = &state.config;

    let response = if config.features.sends_invitations {
        let output = InviteCompanyEmployeeAction::new(
            state.company_repo.clone(),
            state.user_repo.clone(),
            state.membership_repo.clone(),
            state.invitation_repo.clone(),
            config.roles.clone(),
        )
        .token_length(config.token_length)
        .execute(auth.user(), company_id, &body.email, body.role.as_deref())
        .await?;

        BannerResponse::new(
            EmployeeAddedResponse::Invited {
                invitation: output.invitation,
                token: output.token,
            },
            "Invitation sent.",
        )
    } else {
        let membership = AddCompanyEmployeeAction::new(
            state.company_repo.clone(),
            state.user_repo.clone(),
            state.membership_repo.clone(),
            config.roles.clone(),
        )
        .execute(auth.user(), company_id, &body.email, body.role.as_deref())
        .await?;

        BannerResponse::new(EmployeeAddedResponse::Added { membership }, "Employee added.")
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /companies/{id}/employees/{user_id}
pub async fn update_employee_role<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path((company_id, user_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateEmployeeRoleRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    let membership = UpdateCompanyEmployeeRoleAction::new(
        state.company_repo.clone(),
        state.membership_repo.clone(),
        state.config.roles.clone(),
    )
    .execute(auth.user(), company_id, user_id, &body.role)
    .await?;

    Ok(Json(BannerResponse::new(membership, "Role updated.")))
}

/// DELETE /companies/{id}/employees/{user_id}
///
/// Employees may remove themselves to leave a company.
pub async fn remove_employee<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path((company_id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("delete")?;

    RemoveCompanyEmployeeAction::new(state.company_repo, state.membership_repo)
        .execute(auth.user(), company_id, user_id)
        .await?;

    let message = if user_id == auth.user().id {
        "You have left the company."
    } else {
        "Employee removed."
    };

    Ok(Json(Banner::success(message)))
}

/// GET /companies/{id}/invitations
pub async fn list_invitations<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(company_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    let company = state
        .company_repo
        .find_company(company_id)
        .await?
        .ok_or(CompanyError::CompanyNotFound)?;

    if !company.is_owned_by(auth.user().id) {
        return Err(AppError(CompanyError::Forbidden));
    }

    let invitations = state.invitation_repo.invitations_for_company(company.id).await?;

    Ok(Json(InvitationsResponse { invitations }))
}

/// DELETE /companies/{id}/invitations/{invitation_id}
pub async fn cancel_invitation<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path((company_id, invitation_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("delete")?;

    CancelCompanyInvitationAction::new(state.company_repo, state.invitation_repo)
        .execute(auth.user(), company_id, invitation_id)
        .await?;

    Ok(Json(Banner::success("Invitation cancelled.")))
}

/// POST /company-invitations/accept
pub async fn accept_invitation<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: CompanyInvitationRepository + Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("create")?;

    let action = AcceptCompanyInvitationAction::new(
        state.company_repo.clone(),
        state.membership_repo.clone(),
        state.invitation_repo.clone(),
    );
    let membership = action
        .execute(&SecretString::new(body.token), auth.user())
        .await?;

    let company = state
        .company_repo
        .find_company(membership.company_id)
        .await?
        .ok_or(CompanyError::CompanyNotFound)?;

    let message = format!(
        "Great! You have accepted the invitation to join the {} company.",
        company.name
    );

    Ok(Json(BannerResponse::new(membership, message)))
}

/// GET /current-company
pub async fn current_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    let resolver = state.resolver();

    let company = match resolver.current_company(auth.user()).await? {
        Some(company) => Some(describe_company(&resolver, auth.user(), company, true).await?),
        None => None,
    };

    Ok(Json(CurrentCompanyResponse { company }))
}

/// PUT /current-company
pub async fn switch_company<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<SwitchCompanyRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: CurrentCompanyRepository + Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    let resolver = state.resolver();

    let company = resolver.switch_company(auth.user(), body.company_id).await?;
    let message = format!("Switched to {}.", company.name);
    let response = describe_company(&resolver, auth.user(), company, true).await?;

    Ok(Json(BannerResponse::new(response, message)))
}

/// GET /user
pub async fn show_user<U, T, C, M, I, K>(
    State(_state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    Ok(Json(UserResponse::from(auth.into_inner())))
}

/// PUT /user/profile-information
pub async fn update_profile<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    let user = UpdateProfileInformationAction::new(state.user_repo)
        .execute(auth.user(), &body.name, &body.email)
        .await?;

    Ok(Json(BannerResponse::new(UserResponse::from(user), "Saved.")))
}

/// PUT /user/password
pub async fn update_password<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    let action = UpdatePasswordAction::with_hasher(
        state.user_repo,
        state.config.password_policy.clone(),
        state.hasher,
    );

    action
        .execute(
            auth.user(),
            &SecretString::new(body.current_password),
            &SecretString::new(body.password),
            &SecretString::new(body.password_confirmation),
        )
        .await?;

    Ok(Json(Banner::success("Password updated.")))
}

/// DELETE /user
pub async fn delete_user<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<DeleteUserRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: CompanyRepository + Clone + Send + Sync + 'static,
    M: CompanyMembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("delete")?;

    ensure_enabled(state.config.features.account_deletion, "account deletion")?;

    let action = DeleteUserAction::with_hasher(state.user_repo, state.hasher);
    action
        .execute(auth.user(), &SecretString::new(body.password))
        .await?;

    Ok(Json(Banner::success("Account deleted.")))
}

/// GET /user/api-tokens
pub async fn list_api_tokens<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("read")?;

    ensure_enabled(state.config.features.api_features, "api")?;

    let tokens = ListApiTokensAction::new(state.token_repo)
        .execute(auth.user())
        .await?;

    Ok(Json(ApiTokensResponse {
        tokens,
        available_permissions: state.config.api_permissions.to_vec(),
        default_permissions: state.config.default_api_permissions.to_vec(),
    }))
}

/// POST /user/api-tokens
pub async fn create_api_token<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Json(body): Json<CreateApiTokenRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("create")?;

    ensure_enabled(state.config.features.api_features, "api")?;

    // a token never mints abilities it does not hold
    let requested = body
        .permissions
        .unwrap_or_else(|| state.config.default_api_permissions.to_vec());
    let permissions = auth.grantable(requested);

    let output = CreateApiTokenAction::with_config(state.token_repo.clone(), &state.config)
        .execute(auth.user(), &body.name, &permissions)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BannerResponse::new(
            ApiTokenCreatedResponse {
                token: output.token,
                plain_text_token: output.plain_text_token,
            },
            "API token created.",
        )),
    ))
}

/// PUT /user/api-tokens/{id}
pub async fn update_api_token<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(token_id): Path<i64>,
    Json(body): Json<UpdateApiTokenRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("update")?;

    ensure_enabled(state.config.features.api_features, "api")?;

    let permissions = auth.grantable(body.permissions);
    let token = UpdateApiTokenPermissionsAction::with_config(state.token_repo.clone(), &state.config)
        .execute(auth.user(), token_id, &permissions)
        .await?;

    Ok(Json(BannerResponse::new(token, "API token permissions updated.")))
}

/// DELETE /user/api-tokens/{id}
pub async fn delete_api_token<U, T, C, M, I, K>(
    State(state): State<CompaniesState<U, T, C, M, I, K>>,
    auth: AuthenticatedUser,
    Path(token_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    auth.authorize("delete")?;

    ensure_enabled(state.config.features.api_features, "api")?;

    DeleteApiTokenAction::new(state.token_repo)
        .execute(auth.user(), token_id)
        .await?;

    Ok(Json(Banner::success("API token deleted.")))
}
