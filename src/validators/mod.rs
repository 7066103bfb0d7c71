//! Input validation shared by the actions.
//!
//! Limits follow the usual form rules for these fields: names and e-mails
//! are required and capped at 255 characters, passwords follow a
//! configurable [`PasswordPolicy`].

pub mod email;
pub mod name;
pub mod password;

pub use email::{normalize_email, validate_email};
pub use name::{validate_company_name, validate_name, validate_token_name};
pub use password::PasswordPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    NameEmpty,
    NameTooLong,
    CompanyNameEmpty,
    CompanyNameTooLong,
    TokenNameEmpty,
    TokenNameTooLong,
    PasswordTooShort(usize),
    PasswordMissingUppercase,
    PasswordMissingNumeric,
    PasswordMissingSpecial,
    PasswordConfirmationMismatch,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 255 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::NameEmpty => write!(f, "Name cannot be empty"),
            Self::NameTooLong => write!(f, "Name is too long (max 255 characters)"),
            Self::CompanyNameEmpty => write!(f, "Company name cannot be empty"),
            Self::CompanyNameTooLong => {
                write!(f, "Company name is too long (max 255 characters)")
            }
            Self::TokenNameEmpty => write!(f, "Token name cannot be empty"),
            Self::TokenNameTooLong => write!(f, "Token name is too long (max 255 characters)"),
            Self::PasswordTooShort(min) => {
                write!(f, "The password must be at least {min} characters")
            }
            Self::PasswordMissingUppercase => {
                write!(f, "The password must contain at least one uppercase character")
            }
            Self::PasswordMissingNumeric => {
                write!(f, "The password must contain at least one number")
            }
            Self::PasswordMissingSpecial => {
                write!(f, "The password must contain at least one special character")
            }
            Self::PasswordConfirmationMismatch => {
                write!(f, "The password confirmation does not match")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
