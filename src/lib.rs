//! Multi-tenant company membership for user accounts.
//!
//! Users own and belong to companies. Owners invite or add employees with a
//! role, every user has a non-deletable personal company, and the company a
//! user is currently working in is tracked on the user row.
//!
//! Storage is abstracted behind repository traits. Enable `mocks` for an
//! in-memory backend, `sqlx_sqlite` for `SQLite`, and `axum_api` for the HTTP
//! routes.

pub mod actions;
pub mod companies;
pub mod config;
pub mod crypto;
pub mod events;
pub mod repository;
pub mod validators;

mod secret;

#[cfg(any(test, feature = "mocks"))]
mod mocks;

#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

#[cfg(feature = "axum_api")]
pub mod api;

use std::fmt;

pub use config::{CompaniesConfig, Features};
pub use events::{Listener, dispatch, register_event_listeners};
pub use repository::{ApiToken, ApiTokenRepository, NewApiToken, User, UserRepository};
pub use secret::{PlainApiToken, SecretString};

#[cfg(any(test, feature = "mocks"))]
pub use mocks::MockDatabase;

#[derive(Debug, Clone, PartialEq)]
pub enum CompanyError {
    UserNotFound,
    UserAlreadyExists,
    CompanyNotFound,
    EmployeeNotFound,
    InvitationNotFound,
    ApiTokenNotFound,
    AlreadyMember,
    AlreadyInvited,
    CannotRemoveOwner,
    CannotDeletePersonalCompany,
    EmailMismatch,
    InvalidRole(String),
    InvalidCredentials,
    TokenInvalid,
    Forbidden,
    FeatureDisabled(&'static str),
    PasswordHashError,
    Validation(String),
    DatabaseError(String),
    Internal(String),
}

impl std::error::Error for CompanyError {}

impl fmt::Display for CompanyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => {
                write!(f, "We were unable to find a registered user with this email address")
            }
            Self::UserAlreadyExists => write!(f, "The email has already been taken"),
            Self::CompanyNotFound => write!(f, "Company not found"),
            Self::EmployeeNotFound => write!(f, "This user does not belong to the company"),
            Self::InvitationNotFound => write!(f, "Invitation not found"),
            Self::ApiTokenNotFound => write!(f, "API token not found"),
            Self::AlreadyMember => write!(f, "This user already belongs to the company"),
            Self::AlreadyInvited => {
                write!(f, "This user has already been invited to the company")
            }
            Self::CannotRemoveOwner => write!(f, "You may not remove the company owner"),
            Self::CannotDeletePersonalCompany => {
                write!(f, "You may not delete your personal company")
            }
            Self::EmailMismatch => {
                write!(f, "This invitation was sent to a different email address")
            }
            Self::InvalidRole(role) => write!(f, "The role \"{role}\" is not a valid role"),
            Self::InvalidCredentials => {
                write!(f, "The provided password does not match your current password")
            }
            Self::TokenInvalid => write!(f, "Invalid token"),
            Self::Forbidden => write!(f, "This action is unauthorized"),
            Self::FeatureDisabled(feature) => write!(f, "The {feature} feature is disabled"),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl From<validators::ValidationError> for CompanyError {
    fn from(err: validators::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
