use crate::config::toml_config::IdentityConfig;
use crate::domain::model::UserId;
use crate::domain::ports::IdentityResolver;
use crate::utils::error::{PublishError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves bearer tokens from a fixed table loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentity {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }

    pub fn from_config(identities: &[IdentityConfig]) -> Result<Self> {
        let mut resolver = Self::new();
        for (index, identity) in identities.iter().enumerate() {
            let user_id = identity.user_id.parse::<UserId>().map_err(|_| {
                PublishError::InvalidConfigValueError {
                    field: format!("identities[{}].user_id", index),
                    value: identity.user_id.clone(),
                    reason: "must be a UUID".to_string(),
                }
            })?;
            if resolver.tokens.insert(identity.token.clone(), user_id).is_some() {
                return Err(PublishError::ConfigError {
                    message: format!("identities[{}] reuses a token of an earlier entry", index),
                });
            }
        }
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenIdentity {
    async fn resolve(&self, credential: &str) -> Option<UserId> {
        let token = credential
            .strip_prefix("Bearer ")
            .unwrap_or(credential)
            .trim();
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_plain_and_bearer_tokens() {
        let user = UserId::new();
        let identity = StaticTokenIdentity::new().with_token("tok-alice", user);

        assert_eq!(identity.resolve("tok-alice").await, Some(user));
        assert_eq!(identity.resolve("Bearer tok-alice").await, Some(user));
        assert_eq!(identity.resolve("tok-bob").await, None);
    }

    #[test]
    fn test_from_config_rejects_bad_ids_and_duplicates() {
        let bad = vec![IdentityConfig {
            token: "t".to_string(),
            user_id: "nope".to_string(),
            name: None,
        }];
        assert!(matches!(
            StaticTokenIdentity::from_config(&bad),
            Err(PublishError::InvalidConfigValueError { .. })
        ));

        let id = UserId::new().to_string();
        let dup = vec![
            IdentityConfig {
                token: "t".to_string(),
                user_id: id.clone(),
                name: None,
            },
            IdentityConfig {
                token: "t".to_string(),
                user_id: id,
                name: Some("again".to_string()),
            },
        ];
        assert!(StaticTokenIdentity::from_config(&dup).is_err());
    }

    #[test]
    fn test_from_config_loads_every_identity() {
        let identities: Vec<IdentityConfig> = ["a", "b"]
            .iter()
            .map(|token| IdentityConfig {
                token: token.to_string(),
                user_id: UserId::new().to_string(),
                name: None,
            })
            .collect();
        let resolver = StaticTokenIdentity::from_config(&identities).unwrap();
        assert_eq!(resolver.len(), 2);
        assert!(!resolver.is_empty());
        assert!(StaticTokenIdentity::new().is_empty());
    }
}
