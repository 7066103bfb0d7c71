use super::ValidationError;

/// Password strength rules applied on registration and password updates.
///
/// ```
/// use companies::validators::PasswordPolicy;
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("password").is_ok());
///
/// let strict = PasswordPolicy::default().require_uppercase().require_numeric();
/// assert!(strict.validate("password").is_err());
/// assert!(strict.validate("Passw0rd").is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_numeric: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: false,
            require_numeric: false,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    #[must_use]
    pub fn require_uppercase(mut self) -> Self {
        self.require_uppercase = true;
        self
    }

    #[must_use]
    pub fn require_numeric(mut self) -> Self {
        self.require_numeric = true;
        self
    }

    #[must_use]
    pub fn require_special(mut self) -> Self {
        self.require_special = true;
        self
    }

    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.chars().count() < self.min_length {
            return Err(ValidationError::PasswordTooShort(self.min_length));
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err(ValidationError::PasswordMissingUppercase);
        }

        if self.require_numeric && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::PasswordMissingNumeric);
        }

        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(ValidationError::PasswordMissingSpecial);
        }

        Ok(())
    }

    /// Validates `password` and checks it against its confirmation field.
    pub fn validate_confirmed(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), ValidationError> {
        self.validate(password)?;

        if password != confirmation {
            return Err(ValidationError::PasswordConfirmationMismatch);
        }

        Ok(())
    }
}
