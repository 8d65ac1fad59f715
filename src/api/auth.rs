use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use super::constants::headers;
use super::error::Result;
use super::operations::request::HttpRequest;

/// Pluggable request authentication
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Decorate `request` with credentials for `security_context`.
    /// Returns `false` when the request can not be authenticated.
    async fn authenticate(&self, request: &mut HttpRequest, security_context: Option<&str>) -> Result<bool>;
}

/// Access token with optional expiry
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: Option<SystemTime>,
}

impl TokenInfo {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| SystemTime::now() >= at)
    }
}

/// Adds `Authorization: Bearer <token>` for a known security context.
/// Unknown contexts fall back to the environment variable of that name.
#[derive(Debug, Clone, Default)]
pub struct BearerAuthenticator {
    tokens: HashMap<String, TokenInfo>,
}

impl BearerAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, security_context: impl Into<String>, token: TokenInfo) -> Self {
        self.tokens.insert(security_context.into(), token);
        self
    }

    fn token_for(&self, security_context: &str) -> Option<String> {
        match self.tokens.get(security_context) {
            Some(token) if token.is_expired() => {
                log::warn!("Token for security context '{}' has expired", security_context);
                None
            }
            Some(token) => Some(token.access_token.clone()),
            None => std::env::var(security_context).ok().filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, request: &mut HttpRequest, security_context: Option<&str>) -> Result<bool> {
        let Some(security_context) = security_context else {
            log::debug!("No security context configured, can not add a bearer token");
            return Ok(false);
        };

        match self.token_for(security_context) {
            Some(token) => {
                request
                    .headers
                    .set(headers::AUTHORIZATION, format!("Bearer {}", token));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Authenticators by security type
#[derive(Clone, Default)]
pub struct AuthenticatorRegistry {
    authenticators: HashMap<String, Arc<dyn Authenticator>>,
}

impl AuthenticatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, security_type: impl Into<String>, authenticator: Arc<dyn Authenticator>) {
        self.authenticators.insert(security_type.into(), authenticator);
    }

    pub fn resolve(&self, security_type: &str) -> Option<Arc<dyn Authenticator>> {
        self.authenticators.get(security_type).cloned()
    }

    // List methods
    pub fn list_security_types(&self) -> Vec<&str> {
        self.authenticators.keys().map(|s| s.as_str()).collect()
    }
}
