//! HTTP client for search service REST operations.

use crate::auth::{Auth, Target};
use crate::error::{Result, SearchError};
use crate::utils::generate_uuid;
use reqwest::{Client as ReqwestClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Header used to correlate a request with service-side logs
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Client request configuration
#[derive(Debug)]
pub struct ClientRequest<T> {
    pub target: Target,
    pub method: Method,
    pub path: String,
    pub body: Option<T>,
    pub params: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
}

impl<T> ClientRequest<T> {
    fn with_method(method: Method, path: String, target: Target, body: Option<T>) -> Self {
        Self {
            target,
            method,
            path,
            body,
            params: BTreeMap::new(),
            headers: Vec::new(),
        }
    }

    /// Create a new GET request
    pub fn get(path: String, target: Target) -> Self {
        Self::with_method(Method::GET, path, target, None)
    }

    /// Create a new POST request
    pub fn post(path: String, target: Target, body: T) -> Self {
        Self::with_method(Method::POST, path, target, Some(body))
    }

    /// Create a new PUT request
    pub fn put(path: String, target: Target, body: T) -> Self {
        Self::with_method(Method::PUT, path, target, Some(body))
    }

    /// Create a new DELETE request
    pub fn delete(path: String, target: Target) -> Self {
        Self::with_method(Method::DELETE, path, target, None)
    }

    /// Add a single query parameter
    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a request header
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Whether a header was set on this request, ignoring case
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

/// HTTP client for the search service
#[derive(Debug, Clone)]
pub struct SearchHttpClient {
    client: Arc<ReqwestClient>,
    auth: Auth,
    endpoint: Url,
    api_version: String,
}

impl SearchHttpClient {
    /// Create a new client for `endpoint`, sending `api_version` with every call
    pub fn new(endpoint: &str, api_version: &str, auth: Auth) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SearchError::config(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }

        let client = ReqwestClient::builder()
            .user_agent(concat!("azsearch-client-rust/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            auth,
            endpoint,
            api_version: api_version.to_string(),
        })
    }

    /// Make a request and return the deserialized response
    pub async fn request<T, R>(&self, req: ClientRequest<T>) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let text = self.request_text(req).await?;
        serde_json::from_str::<R>(&text)
            .map_err(|e| SearchError::generic(format!("Failed to parse API response: {e}")))
    }

    /// Make a request and return the raw response body
    pub async fn request_text<T>(&self, req: ClientRequest<T>) -> Result<String>
    where
        T: Serialize,
    {
        let response = self.checked_response(req).await?;
        Ok(response.text().await?)
    }

    /// Make a request whose response body is not needed
    pub async fn execute<T>(&self, req: ClientRequest<T>) -> Result<()>
    where
        T: Serialize,
    {
        self.checked_response(req).await?;
        Ok(())
    }

    async fn checked_response<T>(&self, req: ClientRequest<T>) -> Result<Response>
    where
        T: Serialize,
    {
        let response = self.get_response(req).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::from_response(status, &text));
        }

        Ok(response)
    }

    /// Make a request and return the raw response
    pub async fn get_response<T>(&self, req: ClientRequest<T>) -> Result<Response>
    where
        T: Serialize,
    {
        let header = self.auth.get_header(req.target).await?;
        let url = self.endpoint.join(&req.path)?;
        let request_id = generate_uuid();

        debug!(
            method = %req.method,
            path = %req.path,
            request_id = %request_id,
            "sending search service request"
        );

        let accepts_json = !req.has_header("Accept");
        let mut request_builder = self
            .client
            .request(req.method, url)
            .header("Content-Type", "application/json")
            .header(CLIENT_REQUEST_ID_HEADER, request_id)
            .header(header.name(), header.value());
        if accepts_json {
            request_builder = request_builder.header("Accept", "application/json");
        }

        for (key, value) in &req.headers {
            request_builder = request_builder.header(key.as_str(), value.as_str());
        }

        let mut query_params = req.params;
        query_params.insert("api-version".to_string(), self.api_version.clone());
        request_builder = request_builder.query(&query_params);

        if let Some(body) = req.body {
            request_builder = request_builder.json(&body);
        }

        let response = request_builder.send().await?;
        debug!(status = response.status().as_u16(), "search service responded");
        Ok(response)
    }

    /// Service endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// REST API version sent with every request
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ApiKeyAuth, AuthConfig};

    fn auth() -> Auth {
        Auth::new(AuthConfig::ApiKey(ApiKeyAuth::new("key")))
    }

    #[test]
    fn test_request_builders() {
        let request = ClientRequest::<()>::get("/indexes".to_string(), Target::Admin)
            .with_param("$select", "name")
            .with_header("Prefer", "return=representation");

        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert_eq!(request.params.get("$select").map(String::as_str), Some("name"));
        assert_eq!(request.headers.len(), 1);
        assert!(request.has_header("prefer"));
        assert!(!request.has_header("Accept"));

        let put = ClientRequest::put("/indexes/a".to_string(), Target::Admin, 1u8);
        assert_eq!(put.method, Method::PUT);
        assert_eq!(put.body, Some(1));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err = SearchHttpClient::new("ftp://example.com", "2024-07-01", auth()).unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));

        let err = SearchHttpClient::new("not a url", "2024-07-01", auth()).unwrap_err();
        assert!(matches!(err, SearchError::Url(_)));
    }

    #[test]
    fn test_accepts_service_endpoint() {
        let client =
            SearchHttpClient::new("https://demo.search.windows.net", "2024-07-01", auth()).unwrap();
        assert_eq!(client.api_version(), "2024-07-01");
        assert_eq!(
            client.endpoint().join("/indexes/hotels").unwrap().as_str(),
            "https://demo.search.windows.net/indexes/hotels"
        );
    }
}
