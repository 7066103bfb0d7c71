use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::CompanyError;
use crate::api::ErrorResponse;

/// Converts `CompanyError` into a danger-banner JSON response.
#[derive(Debug)]
pub struct AppError(pub CompanyError);

impl From<CompanyError> for AppError {
    fn from(err: CompanyError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CompanyError::Validation(_)
            | CompanyError::InvalidRole(_)
            | CompanyError::UserAlreadyExists
            | CompanyError::AlreadyMember
            | CompanyError::AlreadyInvited
            | CompanyError::CannotRemoveOwner
            | CompanyError::CannotDeletePersonalCompany
            | CompanyError::EmailMismatch
            | CompanyError::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            CompanyError::Forbidden => StatusCode::FORBIDDEN,
            CompanyError::TokenInvalid => StatusCode::UNAUTHORIZED,
            CompanyError::UserNotFound
            | CompanyError::CompanyNotFound
            | CompanyError::EmployeeNotFound
            | CompanyError::InvitationNotFound
            | CompanyError::ApiTokenNotFound
            | CompanyError::FeatureDisabled(_) => StatusCode::NOT_FOUND,
            CompanyError::DatabaseError(_)
            | CompanyError::PasswordHashError
            | CompanyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
