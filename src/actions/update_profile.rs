use crate::repository::{User, UserRepository};
use crate::validators::{normalize_email, validate_email, validate_name};
use crate::CompanyError;

pub struct UpdateProfileInformationAction<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UpdateProfileInformationAction<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Fails with [`CompanyError::UserAlreadyExists`] when another account
    /// uses `email`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_profile_information", skip_all, err)
    )]
    pub async fn execute(&self, user: &User, name: &str, email: &str) -> Result<User, CompanyError> {
        let name = name.trim();
        validate_name(name)?;
        let email = normalize_email(email);
        validate_email(&email)?;

        if let Some(existing) = self.users.find_user_by_email(&email).await? {
            if existing.id != user.id {
                return Err(CompanyError::UserAlreadyExists);
            }
        }

        let updated = self.users.update_profile(user.id, name, &email).await?;

        log::info!(
            target: "companies",
            "msg=\"profile updated\", user_id={}",
            user.id
        );

        Ok(updated)
    }
}
