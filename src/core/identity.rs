use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Result, TravelError};

/// Resolves a bearer token to the id of the user it belongs to
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<String>;
}

/// Fixed token table, loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, String>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Parse comma separated `token:user` pairs. Blank input yields an empty table.
    pub fn parse(pairs: &str) -> Result<Self> {
        let mut tokens = Self::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (token, user) = pair
                .split_once(':')
                .map(|(token, user)| (token.trim(), user.trim()))
                .filter(|(token, user)| !token.is_empty() && !user.is_empty())
                .ok_or_else(|| {
                    TravelError::Config(format!("expected `token:user`, got `{pair}`"))
                })?;
            tokens = tokens.with_token(token, user);
        }
        Ok(tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokens {
    async fn verify_token(&self, token: &str) -> Result<String> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| TravelError::Unauthorized("unknown token".to_string()))
    }
}
