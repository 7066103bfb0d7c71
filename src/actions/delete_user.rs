use chrono::Utc;

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{User, UserRepository};
use crate::{CompanyError, SecretString};

/// Deletes an account after confirming its password.
///
/// Every company the user owns is purged (the personal one included), their
/// memberships elsewhere are detached and their API tokens deleted. The
/// cascade is a single [`UserRepository::delete_user`] call, so a failure
/// leaves the account untouched.
pub struct DeleteUserAction<U: UserRepository, H = Argon2Hasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository> DeleteUserAction<U, Argon2Hasher> {
    pub fn new(users: U) -> Self {
        Self::with_hasher(users, Argon2Hasher::default())
    }
}

impl<U: UserRepository, H: PasswordHasher> DeleteUserAction<U, H> {
    pub fn with_hasher(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_user", skip_all, err)
    )]
    pub async fn execute(&self, user: &User, password: &SecretString) -> Result<(), CompanyError> {
        let stored = self
            .users
            .find_user_by_id(user.id)
            .await?
            .ok_or(CompanyError::UserNotFound)?;

        if !self
            .hasher
            .verify(password.expose_secret(), &stored.hashed_password)?
        {
            return Err(CompanyError::InvalidCredentials);
        }

        self.users.delete_user(user.id).await?;

        dispatch(CompanyEvent::UserDeleted {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"account deleted\", user_id={}",
            user.id
        );

        Ok(())
    }
}
