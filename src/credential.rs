//! Bearer token providers for Microsoft Entra ID.
//!
//! The search service accepts tokens issued for [`SEARCH_SCOPE`]. The
//! [`DefaultAzureCredential`] chain tries, in order, a client secret taken
//! from the environment, a managed identity, and the Azure CLI.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::utils::current_time_secs;

/// Token scope for the search data and control planes
pub const SEARCH_SCOPE: &str = "https://search.azure.com/.default";

/// Default Entra ID authority
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifetime assumed for tokens whose expiry is not reported. Must stay well
/// above the cache refresh margin or such tokens are never reused.
pub(crate) const FALLBACK_LIFETIME_SECS: u64 = 1800;

/// An access token and its expiry as unix seconds
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: u64,
}

impl AccessToken {
    pub fn new<S: Into<String>>(token: S, expires_on: u64) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Whether the token expires within `margin_secs` from now
    pub fn expires_within(&self, margin_secs: u64) -> bool {
        self.expires_on <= current_time_secs() + margin_secs
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens
#[async_trait]
pub trait TokenCredential: fmt::Debug + Send + Sync {
    /// Obtain a token valid for the given scopes
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;
}

/// A pre-acquired token, handed out unchanged
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<NumberOrString>,
    #[serde(default)]
    expires_on: Option<NumberOrString>,
}

/// Managed identity endpoints report numbers as strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl OAuthTokenResponse {
    fn into_access_token(self) -> AccessToken {
        let now = current_time_secs();
        let expires_on = self
            .expires_on
            .as_ref()
            .and_then(NumberOrString::as_u64)
            .or_else(|| {
                self.expires_in
                    .as_ref()
                    .and_then(NumberOrString::as_u64)
                    .map(|secs| now + secs)
            })
            .unwrap_or(now + FALLBACK_LIFETIME_SECS);

        AccessToken::new(self.access_token, expires_on)
    }
}

async fn read_token_response(response: reqwest::Response, source: &str) -> Result<AccessToken> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        return Err(SearchError::auth(format!(
            "{source} token request failed with status {status}: {text}"
        )));
    }

    let parsed: OAuthTokenResponse = response.json().await?;
    Ok(parsed.into_access_token())
}

/// Service principal authentication with a client secret
#[derive(Clone)]
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    client: Arc<Client>,
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish()
    }
}

impl ClientSecretCredential {
    pub fn new<S: Into<String>>(tenant_id: S, client_id: S, client_secret: S) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            client: Arc::new(Client::new()),
        }
    }

    /// Use a different authority, e.g. a sovereign cloud
    pub fn with_authority_host<S: Into<String>>(mut self, authority_host: S) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Build from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`
    /// and optionally `AZURE_AUTHORITY_HOST`. Returns `None` unless all three
    /// required values are present.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tenant_id = lookup("AZURE_TENANT_ID")?;
        let client_id = lookup("AZURE_CLIENT_ID")?;
        let client_secret = lookup("AZURE_CLIENT_SECRET")?;

        let credential = Self::new(tenant_id, client_id, client_secret);
        Some(match lookup("AZURE_AUTHORITY_HOST") {
            Some(host) => credential.with_authority_host(host),
            None => credential,
        })
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let scope = scopes.join(" ");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        debug!(tenant = %self.tenant_id, "requesting token with client secret");
        let response = self.client.post(self.token_url()).form(&form).send().await?;
        read_token_response(response, "client secret").await
    }
}

/// Managed identity of the hosting Azure resource
#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    client_id: Option<String>,
    app_service: Option<(String, String)>,
    imds_endpoint: String,
    client: Arc<Client>,
}

impl ManagedIdentityCredential {
    /// System-assigned identity, or a user-assigned one when `client_id` is set
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client_id,
            app_service: None,
            imds_endpoint: IMDS_ENDPOINT.to_string(),
            client: Arc::new(Client::new()),
        }
    }

    /// Detect the App Service identity endpoint (`IDENTITY_ENDPOINT` and
    /// `IDENTITY_HEADER`), falling back to the instance metadata service.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credential = Self::new(lookup("AZURE_CLIENT_ID"));
        if let (Some(endpoint), Some(header)) =
            (lookup("IDENTITY_ENDPOINT"), lookup("IDENTITY_HEADER"))
        {
            credential.app_service = Some((endpoint, header));
        }
        credential
    }

    /// Override the instance metadata endpoint
    pub fn with_imds_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.imds_endpoint = endpoint.into();
        self
    }
}

fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let resource = scopes
            .first()
            .map(|s| scope_to_resource(s))
            .ok_or_else(|| SearchError::auth("managed identity requires one scope"))?;

        let mut query = vec![("resource", resource.to_string())];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.clone()));
        }

        let request = match &self.app_service {
            Some((endpoint, header)) => {
                query.push(("api-version", "2019-08-01".to_string()));
                self.client
                    .get(endpoint)
                    .header("X-IDENTITY-HEADER", header)
            }
            None => {
                query.push(("api-version", "2018-02-01".to_string()));
                self.client
                    .get(&self.imds_endpoint)
                    .header("Metadata", "true")
                    .timeout(IMDS_TIMEOUT)
            }
        };

        debug!(app_service = self.app_service.is_some(), "requesting managed identity token");
        let response = request.query(&query).send().await?;
        read_token_response(response, "managed identity").await
    }
}

/// Output of `az account get-access-token`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    #[serde(rename = "expires_on", default)]
    expires_on: Option<u64>,
}

/// Token from the signed-in Azure CLI user
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: "az".to_string(),
        }
    }

    /// Use another executable name or path for the CLI
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let resource = scopes
            .first()
            .map(|s| scope_to_resource(s))
            .ok_or_else(|| SearchError::auth("Azure CLI requires one scope"))?;

        let output = tokio::process::Command::new(&self.program)
            .args([
                "account",
                "get-access-token",
                "--output",
                "json",
                "--resource",
                resource,
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::auth(format!(
                "Azure CLI could not provide a token: {}",
                stderr.trim()
            )));
        }

        let parsed: CliTokenOutput = serde_json::from_slice(&output.stdout)?;
        let expires_on = parsed
            .expires_on
            .unwrap_or_else(|| current_time_secs() + FALLBACK_LIFETIME_SECS);
        Ok(AccessToken::new(parsed.access_token, expires_on))
    }
}

/// Tries each credential in turn and returns the first token obtained
#[derive(Debug, Clone)]
pub struct DefaultAzureCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl DefaultAzureCredential {
    /// Environment client secret (when configured), managed identity, Azure CLI
    pub fn new() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();
        if let Some(env_credential) = ClientSecretCredential::from_lookup(&lookup) {
            sources.push(Arc::new(env_credential));
        }
        sources.push(Arc::new(ManagedIdentityCredential::from_lookup(&lookup)));
        sources.push(Arc::new(AzureCliCredential::new()));
        Self { sources }
    }

    /// Chain made of exactly the given credentials
    pub fn with_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    warn!(credential = ?source, error = %e, "credential unavailable");
                    failures.push(e.to_string());
                }
            }
        }

        Err(SearchError::auth(format!(
            "no credential in the chain produced a token: [{}]",
            failures.join("; ")
        )))
    }
}
