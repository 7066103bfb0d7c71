use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CompanyError;

/// A personal access token. Only the SHA-256 hash of the plain token is
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub abilities: Vec<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiToken {
    /// True when the token was granted `*` or exactly `ability`.
    pub fn can(&self, ability: &str) -> bool {
        self.abilities.iter().any(|a| a == "*" || a == ability)
    }

    pub fn cant(&self, ability: &str) -> bool {
        !self.can(ability)
    }
}

#[derive(Debug, Clone)]
pub struct NewApiToken {
    pub user_id: i64,
    pub name: String,
    pub token_hash: String,
    pub abilities: Vec<String>,
}

#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    async fn create_token(&self, data: NewApiToken) -> Result<ApiToken, CompanyError>;
    async fn find_token_by_hash(&self, token_hash: &str)
    -> Result<Option<ApiToken>, CompanyError>;
    /// Looks a token up among `user_id`'s tokens only.
    async fn find_user_token(
        &self,
        user_id: i64,
        token_id: i64,
    ) -> Result<Option<ApiToken>, CompanyError>;
    async fn tokens_for_user(&self, user_id: i64) -> Result<Vec<ApiToken>, CompanyError>;
    async fn update_abilities(
        &self,
        token_id: i64,
        abilities: &[String],
    ) -> Result<ApiToken, CompanyError>;
    async fn touch_last_used(&self, token_id: i64) -> Result<(), CompanyError>;
    async fn delete_token(&self, token_id: i64) -> Result<(), CompanyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(abilities: &[&str]) -> ApiToken {
        let now = Utc::now();
        ApiToken {
            id: 1,
            user_id: 1,
            name: "ci".to_owned(),
            token_hash: "hash".to_owned(),
            abilities: abilities.iter().map(|a| (*a).to_owned()).collect(),
            last_used_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_can() {
        let t = token(&["read", "update"]);
        assert!(t.can("read"));
        assert!(t.cant("delete"));

        let wildcard = token(&["*"]);
        assert!(wildcard.can("delete"));

        assert!(token(&[]).cant("read"));
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let json = serde_json::to_string(&token(&["read"])).unwrap();
        assert!(!json.contains("token_hash"));
        assert!(json.contains("\"abilities\":[\"read\"]"));
    }
}
