use super::ValidationError;

const MAX_LENGTH: usize = 255;

fn check(value: &str, empty: ValidationError, too_long: ValidationError) -> Result<(), ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(empty);
    }

    if trimmed.chars().count() > MAX_LENGTH {
        return Err(too_long);
    }

    Ok(())
}

/// A user's display name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check(name, ValidationError::NameEmpty, ValidationError::NameTooLong)
}

pub fn validate_company_name(name: &str) -> Result<(), ValidationError> {
    check(
        name,
        ValidationError::CompanyNameEmpty,
        ValidationError::CompanyNameTooLong,
    )
}

pub fn validate_token_name(name: &str) -> Result<(), ValidationError> {
    check(
        name,
        ValidationError::TokenNameEmpty,
        ValidationError::TokenNameTooLong,
    )
}
