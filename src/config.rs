//! Service configuration from the environment.
//!
//! | variable                    | meaning                                   |
//! |-----------------------------|-------------------------------------------|
//! | `AZURE_SEARCH_ENDPOINT`     | service URL (required)                    |
//! | `AZURE_SEARCH_INDEX`        | index name, default `hotels-sample-index` |
//! | `AZURE_SEARCH_API_KEY`      | admin key; Entra ID is used when unset    |
//! | `AZURE_SEARCH_QUERY_KEY`    | query key for reads                       |
//! | `AZURE_SEARCH_API_VERSION`  | REST API version                          |

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::auth::{ApiKeyAuth, AuthConfig};
use crate::credential::{DefaultAzureCredential, TokenCredential};
use crate::error::{Result, SearchError};

pub const DEFAULT_INDEX_NAME: &str = "hotels-sample-index";
pub const DEFAULT_API_VERSION: &str = "2024-07-01";

pub const ENDPOINT_VAR: &str = "AZURE_SEARCH_ENDPOINT";
pub const INDEX_VAR: &str = "AZURE_SEARCH_INDEX";
pub const API_KEY_VAR: &str = "AZURE_SEARCH_API_KEY";
pub const QUERY_KEY_VAR: &str = "AZURE_SEARCH_QUERY_KEY";
pub const API_VERSION_VAR: &str = "AZURE_SEARCH_API_VERSION";

/// Configuration for SearchService
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    pub endpoint: String,
    pub index_name: String,
    pub api_version: String,
    pub auth: AuthConfig,
}

impl SearchServiceConfig {
    /// Entra ID authentication through [`DefaultAzureCredential`]
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth: AuthConfig::Token(Arc::new(DefaultAzureCredential::new())),
        }
    }

    /// Read the process environment, after loading `.env` from the working
    /// directory (or a parent) with values in the file taking precedence.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a specific `.env` file, falling back to the process environment
    /// for anything the file does not set.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            SearchError::config(format!("cannot read {}: {e}", path.display()))
        })?;

        let mut values = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                SearchError::config(format!("invalid entry in {}: {e}", path.display()))
            })?;
            values.insert(key, value);
        }

        Self::from_lookup(|key| values.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let endpoint = get(ENDPOINT_VAR)
            .ok_or_else(|| SearchError::config(format!("{ENDPOINT_VAR} is not set")))?;

        let auth = match get(API_KEY_VAR) {
            Some(admin_key) => {
                let mut api_key = ApiKeyAuth::new(admin_key);
                if let Some(query_key) = get(QUERY_KEY_VAR) {
                    api_key = api_key.with_query_key(query_key);
                }
                AuthConfig::ApiKey(api_key)
            }
            None => AuthConfig::Token(Arc::new(DefaultAzureCredential::from_lookup(&get))),
        };

        Ok(Self {
            endpoint,
            index_name: get(INDEX_VAR).unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            api_version: get(API_VERSION_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            auth,
        })
    }

    /// Set the index name
    pub fn with_index_name<S: Into<String>>(mut self, name: S) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set the REST API version
    pub fn with_api_version<S: Into<String>>(mut self, version: S) -> Self {
        self.api_version = version.into();
        self
    }

    /// Authenticate with an admin key
    pub fn with_api_key<S: Into<String>>(mut self, admin_key: S) -> Self {
        self.auth = AuthConfig::ApiKey(ApiKeyAuth::new(admin_key));
        self
    }

    /// Authenticate with tokens from `credential`
    pub fn with_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.auth = AuthConfig::Token(credential);
        self
    }

    /// Set the full authentication configuration
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }
}

/// Load `.env` into the process environment, overriding existing values.
/// A missing file is not an error.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    dotenvy::dotenv_override().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_endpoint_is_required() {
        let err = SearchServiceConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));
        assert!(err.to_string().contains(ENDPOINT_VAR));

        let blank = SearchServiceConfig::from_lookup(lookup_from(&[(ENDPOINT_VAR, "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SearchServiceConfig::from_lookup(lookup_from(&[(
            ENDPOINT_VAR,
            "https://demo.search.windows.net",
        )]))
        .unwrap();

        assert_eq!(config.endpoint, "https://demo.search.windows.net");
        assert_eq!(config.index_name, DEFAULT_INDEX_NAME);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert!(matches!(config.auth, AuthConfig::Token(_)));
    }

    #[test]
    fn test_api_keys_from_lookup() {
        let config = SearchServiceConfig::from_lookup(lookup_from(&[
            (ENDPOINT_VAR, "https://demo.search.windows.net"),
            (INDEX_VAR, "hotels-quickstart"),
            (API_KEY_VAR, "admin"),
            (QUERY_KEY_VAR, "query"),
            (API_VERSION_VAR, "2025-09-01"),
        ]))
        .unwrap();

        assert_eq!(config.index_name, "hotels-quickstart");
        assert_eq!(config.api_version, "2025-09-01");
        match config.auth {
            AuthConfig::ApiKey(keys) => {
                assert_eq!(keys.admin_key, "admin");
                assert_eq!(keys.query_key.as_deref(), Some("query"));
            }
            other => panic!("expected API key auth, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_client_secret_is_unset() {
        let base = [
            (ENDPOINT_VAR, "https://demo.search.windows.net"),
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
        ];

        let blank = [&base[..], &[("AZURE_CLIENT_SECRET", " ")][..]].concat();
        let config = SearchServiceConfig::from_lookup(lookup_from(&blank)).unwrap();
        assert!(!format!("{:?}", config.auth).contains("ClientSecretCredential"));

        let set = [&base[..], &[("AZURE_CLIENT_SECRET", "secret")][..]].concat();
        let config = SearchServiceConfig::from_lookup(lookup_from(&set)).unwrap();
        assert!(format!("{:?}", config.auth).contains("ClientSecretCredential"));
    }

    #[test]
    fn test_builder() {
        let config = SearchServiceConfig::new("https://demo.search.windows.net")
            .with_index_name("other")
            .with_api_version("2024-05-01-preview")
            .with_api_key("admin");

        assert_eq!(config.index_name, "other");
        assert_eq!(config.api_version, "2024-05-01-preview");
        assert!(matches!(config.auth, AuthConfig::ApiKey(_)));
    }
}
