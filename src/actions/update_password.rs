use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::repository::{User, UserRepository};
use crate::validators::PasswordPolicy;
use crate::{CompanyError, SecretString};

pub struct UpdatePasswordAction<U, H = Argon2Hasher>
where
    U: UserRepository,
{
    users: U,
    password_policy: PasswordPolicy,
    hasher: H,
}

impl<U: UserRepository> UpdatePasswordAction<U, Argon2Hasher> {
    pub fn new(users: U) -> Self {
        Self::with_hasher(users, PasswordPolicy::default(), Argon2Hasher::default())
    }

    pub fn with_policy(users: U, password_policy: PasswordPolicy) -> Self {
        Self::with_hasher(users, password_policy, Argon2Hasher::default())
    }
}

impl<U: UserRepository, H: PasswordHasher> UpdatePasswordAction<U, H> {
    pub fn with_hasher(users: U, password_policy: PasswordPolicy, hasher: H) -> Self {
        Self {
            users,
            password_policy,
            hasher,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        current_password: &SecretString,
        password: &SecretString,
        password_confirmation: &SecretString,
    ) -> Result<(), CompanyError> {
        let stored = self
            .users
            .find_user_by_id(user.id)
            .await?
            .ok_or(CompanyError::UserNotFound)?;

        if !self
            .hasher
            .verify(current_password.expose_secret(), &stored.hashed_password)?
        {
            return Err(CompanyError::InvalidCredentials);
        }

        self.password_policy.validate_confirmed(
            password.expose_secret(),
            password_confirmation.expose_secret(),
        )?;

        let hashed = self.hasher.hash(password.expose_secret())?;
        self.users.update_password(user.id, &hashed).await
    }
}
