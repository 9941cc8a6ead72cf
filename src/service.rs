//! Entry point for one search service.

use crate::auth::Auth;
use crate::client::SearchHttpClient;
use crate::config::SearchServiceConfig;
use crate::error::Result;
use crate::index::IndexNamespace;
use crate::search::SearchClient;

/// Connection to a search service
#[derive(Debug, Clone)]
pub struct SearchService {
    pub indexes: IndexNamespace,
    client: SearchHttpClient,
    index_name: String,
}

impl SearchService {
    /// Create a service handle; no request is made until an operation is called
    pub fn new(config: SearchServiceConfig) -> Result<Self> {
        let auth = Auth::new(config.auth);
        let client = SearchHttpClient::new(&config.endpoint, &config.api_version, auth)?;

        Ok(Self {
            indexes: IndexNamespace::new(client.clone()),
            client,
            index_name: config.index_name,
        })
    }

    /// Default index name from the configuration
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Query client for the configured index
    pub fn search_client(&self) -> SearchClient {
        self.search_client_for(&self.index_name)
    }

    /// Query client for another index on the same service
    pub fn search_client_for(&self, index_name: &str) -> SearchClient {
        SearchClient::new(self.client.clone(), index_name.to_string())
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint().as_str()
    }

    pub fn api_version(&self) -> &str {
        self.client.api_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    #[test]
    fn test_new_from_config() {
        let config = SearchServiceConfig::new("https://demo.search.windows.net")
            .with_index_name("hotels-quickstart")
            .with_api_key("admin");
        let service = SearchService::new(config).unwrap();

        assert_eq!(service.index_name(), "hotels-quickstart");
        assert_eq!(service.endpoint(), "https://demo.search.windows.net/");
        assert_eq!(service.api_version(), "2024-07-01");
        assert_eq!(service.search_client().index_name(), "hotels-quickstart");
        assert_eq!(service.search_client_for("other").index_name(), "other");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let bad_scheme = SearchService::new(
            SearchServiceConfig::new("ftp://demo.search.windows.net").with_api_key("admin"),
        );
        assert!(matches!(bad_scheme, Err(SearchError::Config { .. })));

        let not_a_url =
            SearchService::new(SearchServiceConfig::new("not a url").with_api_key("admin"));
        assert!(matches!(not_a_url, Err(SearchError::Url(_))));
    }
}
