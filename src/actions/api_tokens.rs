use chrono::Utc;

use crate::companies::PermissionSet;
use crate::config::CompaniesConfig;
use crate::crypto::{generate_token, hash_token};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{ApiToken, ApiTokenRepository, NewApiToken, User, UserRepository};
use crate::validators::validate_token_name;
use crate::{CompanyError, PlainApiToken, SecretString};

/// Output from creating an API token.
#[derive(Debug)]
pub struct CreateApiTokenOutput {
    pub token: ApiToken,
    /// `"<id>|<secret>"`. Shown once; only the secret's hash is stored.
    pub plain_text_token: SecretString,
}

/// Issues a personal API token. Requested abilities outside the configured
/// API permissions are dropped.
pub struct CreateApiTokenAction<T: ApiTokenRepository> {
    tokens: T,
    api_permissions: PermissionSet,
    token_length: usize,
}

impl<T: ApiTokenRepository> CreateApiTokenAction<T> {
    pub fn new(tokens: T) -> Self {
        Self::with_config(tokens, &CompaniesConfig::default())
    }

    pub fn with_config(tokens: T, config: &CompaniesConfig) -> Self {
        Self {
            tokens,
            api_permissions: config.api_permissions.clone(),
            token_length: config.token_length,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_api_token", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        name: &str,
        permissions: &[String],
    ) -> Result<CreateApiTokenOutput, CompanyError> {
        validate_token_name(name)?;

        let abilities = permissions
            .iter()
            .cloned()
            .collect::<PermissionSet>()
            .intersect(&self.api_permissions)
            .to_vec();

        let secret = generate_token(self.token_length);

        let token = self
            .tokens
            .create_token(NewApiToken {
                user_id: user.id,
                name: name.trim().to_owned(),
                token_hash: hash_token(&secret),
                abilities,
            })
            .await?;

        dispatch(CompanyEvent::ApiTokenCreated {
            user_id: user.id,
            token_id: token.id,
            at: Utc::now(),
        })
        .await;

        let plain_text_token = SecretString::api_token(token.id, &secret);

        Ok(CreateApiTokenOutput {
            token,
            plain_text_token,
        })
    }
}

pub struct ListApiTokensAction<T: ApiTokenRepository> {
    tokens: T,
}

impl<T: ApiTokenRepository> ListApiTokensAction<T> {
    pub fn new(tokens: T) -> Self {
        Self { tokens }
    }

    /// The user's tokens ordered by name.
    pub async fn execute(&self, user: &User) -> Result<Vec<ApiToken>, CompanyError> {
        self.tokens.tokens_for_user(user.id).await
    }
}

pub struct UpdateApiTokenPermissionsAction<T: ApiTokenRepository> {
    tokens: T,
    api_permissions: PermissionSet,
}

impl<T: ApiTokenRepository> UpdateApiTokenPermissionsAction<T> {
    pub fn new(tokens: T) -> Self {
        Self::with_config(tokens, &CompaniesConfig::default())
    }

    pub fn with_config(tokens: T, config: &CompaniesConfig) -> Self {
        Self {
            tokens,
            api_permissions: config.api_permissions.clone(),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_api_token_permissions", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        token_id: i64,
        permissions: &[String],
    ) -> Result<ApiToken, CompanyError> {
        let token = self
            .tokens
            .find_user_token(user.id, token_id)
            .await?
            .ok_or(CompanyError::ApiTokenNotFound)?;

        let abilities = permissions
            .iter()
            .cloned()
            .collect::<PermissionSet>()
            .intersect(&self.api_permissions)
            .to_vec();

        self.tokens.update_abilities(token.id, &abilities).await
    }
}

pub struct DeleteApiTokenAction<T: ApiTokenRepository> {
    tokens: T,
}

impl<T: ApiTokenRepository> DeleteApiTokenAction<T> {
    pub fn new(tokens: T) -> Self {
        Self { tokens }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_api_token", skip_all, err)
    )]
    pub async fn execute(&self, user: &User, token_id: i64) -> Result<(), CompanyError> {
        let token = self
            .tokens
            .find_user_token(user.id, token_id)
            .await?
            .ok_or(CompanyError::ApiTokenNotFound)?;

        self.tokens.delete_token(token.id).await?;

        dispatch(CompanyEvent::ApiTokenDeleted {
            user_id: user.id,
            token_id: token.id,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}

/// Resolves a bearer token to its user and records its use.
pub struct AuthenticateApiTokenAction<U, T>
where
    U: UserRepository,
    T: ApiTokenRepository,
{
    users: U,
    tokens: T,
}

impl<U: UserRepository, T: ApiTokenRepository> AuthenticateApiTokenAction<U, T> {
    pub fn new(users: U, tokens: T) -> Self {
        Self { users, tokens }
    }

    /// Accepts `"<id>|<secret>"` or the bare secret.
    pub async fn execute(&self, plain_text: &str) -> Result<(User, ApiToken), CompanyError> {
        let presented = PlainApiToken::parse(plain_text)?;

        let token = self
            .tokens
            .find_token_by_hash(&hash_token(presented.secret))
            .await?
            .filter(|t| presented.matches_id(t.id))
            .ok_or(CompanyError::TokenInvalid)?;

        let user = self
            .users
            .find_user_by_id(token.user_id)
            .await?
            .ok_or(CompanyError::TokenInvalid)?;

        self.tokens.touch_last_used(token.id).await?;

        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockDatabase;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| (*p).to_owned()).collect()
    }

    #[tokio::test]
    async fn test_create_filters_permissions() {
        let db = MockDatabase::new();
        let user = db.seed_user("Taylor", "taylor@example.com").unwrap();

        let output = CreateApiTokenAction::new(db.clone())
            .execute(&user, "deploy", &perms(&["read", "bogus", "delete"]))
            .await
            .unwrap();

        assert_eq!(output.token.abilities, perms(&["delete", "read"]));
        let plain = output.plain_text_token.expose_secret();
        assert!(plain.starts_with(&format!("{}|", output.token.id)));
        assert_eq!(plain.len(), format!("{}|", output.token.id).len() + 40);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = MockDatabase::new();
        let user = db.seed_user("Taylor", "taylor@example.com").unwrap();
        let output = CreateApiTokenAction::new(db.clone())
            .execute(&user, "deploy", &perms(&["read"]))
            .await
            .unwrap();
        let auth = AuthenticateApiTokenAction::new(db.clone(), db.clone());

        let plain = output.plain_text_token.expose_secret();
        let (found, token) = auth.execute(plain).await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(token.can("read"));

        let (_, secret) = plain.split_once('|').unwrap();
        assert!(auth.execute(secret).await.is_ok());
        assert_eq!(
            auth.execute(&format!("999|{secret}")).await.unwrap_err(),
            CompanyError::TokenInvalid
        );
        assert_eq!(
            auth.execute("garbage").await.unwrap_err(),
            CompanyError::TokenInvalid
        );

        let touched = db.find_user_token(user.id, token.id).await.unwrap().unwrap();
        assert!(touched.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete_scoped_to_owner() {
        let db = MockDatabase::new();
        let user = db.seed_user("Taylor", "taylor@example.com").unwrap();
        let other = db.seed_user("Adam", "adam@example.com").unwrap();
        let token = CreateApiTokenAction::new(db.clone())
            .execute(&user, "deploy", &perms(&["read"]))
            .await
            .unwrap()
            .token;

        let update = UpdateApiTokenPermissionsAction::new(db.clone());
        assert_eq!(
            update
                .execute(&other, token.id, &perms(&["delete"]))
                .await
                .unwrap_err(),
            CompanyError::ApiTokenNotFound
        );
        let updated = update
            .execute(&user, token.id, &perms(&["create", "update", "admin"]))
            .await
            .unwrap();
        assert_eq!(updated.abilities, perms(&["create", "update"]));

        let delete = DeleteApiTokenAction::new(db.clone());
        assert_eq!(
            delete.execute(&other, token.id).await.unwrap_err(),
            CompanyError::ApiTokenNotFound
        );
        delete.execute(&user, token.id).await.unwrap();
        assert!(ListApiTokensAction::new(db.clone())
            .execute(&user)
            .await
            .unwrap()
            .is_empty());
    }
}
