use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::AppError;
use super::routes::CompaniesState;
use crate::actions::AuthenticateApiTokenAction;
use crate::{ApiToken, ApiTokenRepository, CompanyError, User, UserRepository};

/// Validates the bearer API token from the `Authorization` header and
/// loads its owner.
///
/// Handlers call [`authorize`](Self::authorize) with the ability their route
/// needs: `read`, `create`, `update` or `delete`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
    token: ApiToken,
}

impl AuthenticatedUser {
    pub fn into_inner(self) -> User {
        self.user
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// The token the request was authenticated with.
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Fails with [`CompanyError::Forbidden`] when the token lacks `ability`.
    pub fn authorize(&self, ability: &str) -> Result<(), AppError> {
        if self.token.can(ability) {
            Ok(())
        } else {
            log::warn!(
                target: "companies",
                "msg=\"token ability missing\", user_id={}, token_id={}, ability=\"{}\"",
                self.user.id,
                self.token.id,
                ability
            );
            Err(AppError(CompanyError::Forbidden))
        }
    }

    /// Keeps the requested abilities this token holds itself.
    pub fn grantable(&self, requested: Vec<String>) -> Vec<String> {
        requested
            .into_iter()
            .filter(|ability| self.token.can(ability))
            .collect()
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

impl<U, T, C, M, I, K> FromRequestParts<CompaniesState<U, T, C, M, I, K>> for AuthenticatedUser
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: ApiTokenRepository + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CompaniesState<U, T, C, M, I, K>,
    ) -> Result<Self, Self::Rejection> {
        let plain =
            extract_bearer_token(&parts.headers).ok_or(AppError(CompanyError::TokenInvalid))?;

        let action =
            AuthenticateApiTokenAction::new(state.user_repo.clone(), state.token_repo.clone());
        let (user, token) = action.execute(&plain).await?;

        Ok(AuthenticatedUser { user, token })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Utc;

    use super::*;

    fn authenticated(abilities: &[&str]) -> AuthenticatedUser {
        let now = Utc::now();
        AuthenticatedUser {
            user: User::mock(1, "Taylor", "taylor@example.com"),
            token: ApiToken {
                id: 1,
                user_id: 1,
                name: "ci".to_owned(),
                token_hash: String::new(),
                abilities: abilities.iter().map(|a| (*a).to_owned()).collect(),
                last_used_at: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_authorize_checks_token_abilities() {
        let auth = authenticated(&["read"]);
        assert!(auth.authorize("read").is_ok());
        assert_eq!(
            auth.authorize("create").unwrap_err().0,
            CompanyError::Forbidden
        );

        assert!(authenticated(&["*"]).authorize("delete").is_ok());
    }

    #[test]
    fn test_grantable_never_widens() {
        let requested = vec!["read".to_owned(), "create".to_owned(), "delete".to_owned()];

        assert_eq!(
            authenticated(&["read", "delete"]).grantable(requested.clone()),
            vec!["read".to_owned(), "delete".to_owned()]
        );
        assert_eq!(authenticated(&["*"]).grantable(requested.clone()), requested);
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer 1|secret"));
        assert_eq!(extract_bearer_token(&headers), Some("1|secret".to_owned()));
    }
}
