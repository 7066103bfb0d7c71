use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::companies::{Company, CompanyEmployee, CompanyInvitation, CompanyMembership, Role};
use crate::{ApiToken, CompanyError, SecretString, User};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEmployeeRequest {
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
pub struct AcceptInvitationRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchCompanyRequest {
    pub company_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct DeleteUserRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateApiTokenRequest {
    pub name: String,
    /// Falls back to the configured default permissions.
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApiTokenRequest {
    pub permissions: Vec<String>,
}

// Response DTOs

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerStyle {
    Success,
    Danger,
}

/// Flash message shown after a mutation.
#[derive(Debug, Serialize)]
pub struct Banner {
    pub banner: String,
    pub banner_style: BannerStyle,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            banner: message.into(),
            banner_style: BannerStyle::Success,
        }
    }
}

/// A payload plus a success banner.
#[derive(Debug, Serialize)]
pub struct BannerResponse<T> {
    pub data: T,
    #[serde(flatten)]
    pub banner: Banner,
}

impl<T: Serialize> BannerResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            banner: Banner::success(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            current_company_id: user.current_company_id,
            created_at: user.created_at,
        }
    }
}

/// A company as seen by the requesting user.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    #[serde(flatten)]
    pub company: Company,
    /// `"owner"`, an employee's role key, or `None`.
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub is_current: bool,
}

#[derive(Debug, Serialize)]
pub struct CurrentCompanyResponse {
    pub company: Option<CompanyResponse>,
}

#[derive(Debug, Serialize)]
pub struct EmployeesResponse {
    pub owner: Option<UserResponse>,
    pub employees: Vec<CompanyEmployee>,
    pub available_roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct InvitationsResponse {
    pub invitations: Vec<CompanyInvitation>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmployeeAddedResponse {
    Invited {
        invitation: CompanyInvitation,
        /// Plain invitation token, for the host application to deliver.
        token: SecretString,
    },
    Added {
        membership: CompanyMembership,
    },
}

#[derive(Debug, Serialize)]
pub struct ApiTokensResponse {
    pub tokens: Vec<ApiToken>,
    pub available_permissions: Vec<String>,
    pub default_permissions: Vec<String>,
}

#[derive(Serialize)]
pub struct ApiTokenCreatedResponse {
    pub token: ApiToken,
    pub plain_text_token: SecretString,
}

impl std::fmt::Debug for ApiTokenCreatedResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTokenCreatedResponse")
            .field("token", &self.token)
            .field("plain_text_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub banner_style: BannerStyle,
}

impl From<CompanyError> for ErrorResponse {
    fn from(err: CompanyError) -> Self {
        let code = match &err {
            CompanyError::UserNotFound => "USER_NOT_FOUND",
            CompanyError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            CompanyError::CompanyNotFound => "COMPANY_NOT_FOUND",
            CompanyError::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            CompanyError::InvitationNotFound => "INVITATION_NOT_FOUND",
            CompanyError::ApiTokenNotFound => "API_TOKEN_NOT_FOUND",
            CompanyError::AlreadyMember => "ALREADY_MEMBER",
            CompanyError::AlreadyInvited => "ALREADY_INVITED",
            CompanyError::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            CompanyError::CannotDeletePersonalCompany => "CANNOT_DELETE_PERSONAL_COMPANY",
            CompanyError::EmailMismatch => "EMAIL_MISMATCH",
            CompanyError::InvalidRole(_) => "INVALID_ROLE",
            CompanyError::InvalidCredentials => "INVALID_CREDENTIALS",
            CompanyError::TokenInvalid => "TOKEN_INVALID",
            CompanyError::Forbidden => "FORBIDDEN",
            CompanyError::FeatureDisabled(_) => "FEATURE_DISABLED",
            CompanyError::PasswordHashError => "PASSWORD_HASH_ERROR",
            CompanyError::Validation(_) => "VALIDATION_ERROR",
            CompanyError::DatabaseError(_) => "DATABASE_ERROR",
            CompanyError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            error: err.to_string(),
            code: code.to_owned(),
            banner_style: BannerStyle::Danger,
        }
    }
}
