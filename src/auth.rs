//! Authentication handling for the search client.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::credential::{AccessToken, TokenCredential, SEARCH_SCOPE};
use crate::error::Result;

/// Tokens are refreshed this long before they expire
pub(crate) const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;

/// Authentication configuration for API key authentication
#[derive(Clone)]
pub struct ApiKeyAuth {
    pub admin_key: String,
    pub query_key: Option<String>,
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("admin_key", &"<redacted>")
            .field("query_key", &self.query_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Authentication configuration enum
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// `api-key` header with an admin key, and optionally a query key for reads
    ApiKey(ApiKeyAuth),
    /// `Authorization: Bearer` header with tokens from a credential
    Token(Arc<dyn TokenCredential>),
}

/// Target for the request (index management or document reads)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Admin,
    Query,
}

/// Header carrying the credential for one request
#[derive(Clone, PartialEq, Eq)]
pub enum AuthHeader {
    ApiKey(String),
    Bearer(String),
}

impl AuthHeader {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api-key",
            Self::Bearer(_) => "Authorization",
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::ApiKey(key) => key.clone(),
            Self::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthHeader({}: <redacted>)", self.name())
    }
}

/// Authentication handler
#[derive(Debug, Clone)]
pub struct Auth {
    config: AuthConfig,
    cached_token: Arc<RwLock<Option<AccessToken>>>,
}

impl Auth {
    /// Create a new authentication handler
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Get the header to attach to a request for the specified target
    pub async fn get_header(&self, target: Target) -> Result<AuthHeader> {
        match &self.config {
            AuthConfig::ApiKey(config) => {
                let key = match target {
                    Target::Admin => &config.admin_key,
                    Target::Query => config.query_key.as_ref().unwrap_or(&config.admin_key),
                };
                Ok(AuthHeader::ApiKey(key.clone()))
            }
            AuthConfig::Token(credential) => {
                let token = self.get_token(credential.as_ref()).await?;
                Ok(AuthHeader::Bearer(token.token))
            }
        }
    }

    async fn get_token(&self, credential: &dyn TokenCredential) -> Result<AccessToken> {
        if let Some(token) = self.cached_token.read().await.as_ref() {
            if !token.expires_within(TOKEN_REFRESH_MARGIN_SECS) {
                return Ok(token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.expires_within(TOKEN_REFRESH_MARGIN_SECS) {
                return Ok(token.clone());
            }
        }

        let token = credential.get_token(&[SEARCH_SCOPE]).await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

impl ApiKeyAuth {
    /// Create a new API key authentication configuration
    pub fn new<S: Into<String>>(admin_key: S) -> Self {
        Self {
            admin_key: admin_key.into(),
            query_key: None,
        }
    }

    /// Set the query key used for document reads
    pub fn with_query_key<S: Into<String>>(mut self, key: S) -> Self {
        self.query_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticTokenCredential;
    use crate::error::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingCredential {
        calls: AtomicUsize,
        lifetime_secs: u64,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
            if scopes != [SEARCH_SCOPE] {
                return Err(SearchError::auth("unexpected scope"));
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(
                format!("token-{n}"),
                crate::utils::current_time_secs() + self.lifetime_secs,
            ))
        }
    }

    #[tokio::test]
    async fn test_api_key_targets() {
        let auth = Auth::new(AuthConfig::ApiKey(
            ApiKeyAuth::new("admin").with_query_key("query"),
        ));

        let admin = auth.get_header(Target::Admin).await.unwrap();
        let query = auth.get_header(Target::Query).await.unwrap();
        assert_eq!(admin, AuthHeader::ApiKey("admin".to_string()));
        assert_eq!(query, AuthHeader::ApiKey("query".to_string()));
        assert_eq!(admin.name(), "api-key");
    }

    #[tokio::test]
    async fn test_query_falls_back_to_admin_key() {
        let auth = Auth::new(AuthConfig::ApiKey(ApiKeyAuth::new("admin")));
        let header = auth.get_header(Target::Query).await.unwrap();
        assert_eq!(header.value(), "admin");
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let credential = StaticTokenCredential::new(AccessToken::new("abc", u64::MAX / 2));
        let auth = Auth::new(AuthConfig::Token(Arc::new(credential)));

        let header = auth.get_header(Target::Admin).await.unwrap();
        assert_eq!(header.name(), "Authorization");
        assert_eq!(header.value(), "Bearer abc");
    }

    #[tokio::test]
    async fn test_token_is_cached_until_near_expiry() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            lifetime_secs: 3600,
        });
        let auth = Auth::new(AuthConfig::Token(credential.clone()));

        auth.get_header(Target::Admin).await.unwrap();
        let second = auth.get_header(Target::Query).await.unwrap();
        assert_eq!(second.value(), "Bearer token-0");
        assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            lifetime_secs: 60,
        });
        let auth = Auth::new(AuthConfig::Token(credential.clone()));

        auth.get_header(Target::Admin).await.unwrap();
        let second = auth.get_header(Target::Admin).await.unwrap();
        assert_eq!(second.value(), "Bearer token-1");
        assert_eq!(credential.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_without_reported_expiry_is_reused() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            lifetime_secs: crate::credential::FALLBACK_LIFETIME_SECS,
        });
        let auth = Auth::new(AuthConfig::Token(credential.clone()));

        for _ in 0..3 {
            let header = auth.get_header(Target::Query).await.unwrap();
            assert_eq!(header.value(), "Bearer token-0");
        }
        assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_header_debug_is_redacted() {
        let header = AuthHeader::ApiKey("secret".to_string());
        assert_eq!(format!("{header:?}"), "AuthHeader(api-key: <redacted>)");
    }
}
