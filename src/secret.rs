//! Wrapper for passwords and plain API/invitation tokens.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::CompanyError;

/// Keeps passwords and freshly issued tokens out of `Debug`/`Display` output.
///
/// Serializing exposes the value, since a newly created API token or
/// invitation token has to reach the client exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The `"<id>|<secret>"` form an API token is handed out in.
    #[must_use]
    pub fn api_token(token_id: i64, secret: &str) -> Self {
        Self(format!("{token_id}|{secret}"))
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// A presented API token split into its optional id prefix and the secret
/// whose hash is stored.
#[derive(Debug, PartialEq, Eq)]
pub struct PlainApiToken<'a> {
    pub id: Option<i64>,
    pub secret: &'a str,
}

impl<'a> PlainApiToken<'a> {
    /// Accepts `"<id>|<secret>"` or the bare secret. A non-numeric id prefix
    /// is [`CompanyError::TokenInvalid`].
    pub fn parse(plain: &'a str) -> Result<Self, CompanyError> {
        match plain.split_once('|') {
            Some((id, secret)) => {
                let id = id.parse::<i64>().map_err(|_| CompanyError::TokenInvalid)?;
                Ok(Self {
                    id: Some(id),
                    secret,
                })
            }
            None => Ok(Self {
                id: None,
                secret: plain,
            }),
        }
    }

    /// True when the token row `token_id` may answer this presentation.
    pub fn matches_id(&self, token_id: i64) -> bool {
        self.id.is_none_or(|id| id == token_id)
    }
}
