//! Index lifecycle operations.

use serde::Deserialize;
use tracing::info;

use crate::auth::Target;
use crate::client::{ClientRequest, SearchHttpClient};
use crate::error::Result;
use crate::schema::SearchIndex;
use crate::types::IndexStatistics;

/// `{"value": [...]}` list envelope
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct IndexName {
    name: String,
}

/// Index management namespace
#[derive(Debug, Clone)]
pub struct IndexNamespace {
    client: SearchHttpClient,
}

impl IndexNamespace {
    pub(crate) fn new(client: SearchHttpClient) -> Self {
        Self { client }
    }

    /// Create the index, or replace its definition if it already exists.
    ///
    /// The definition is checked locally first; the accepted definition
    /// returned by the service is handed back.
    pub async fn create_or_update(&self, index: &SearchIndex) -> Result<SearchIndex> {
        index.validate()?;
        info!(index = %index.name, fields = index.fields.len(), "creating or updating index");

        let request = ClientRequest::put(
            format!("/indexes/{}", index.name),
            Target::Admin,
            index,
        )
        .with_header("Prefer", "return=representation");

        self.client.request(request).await
    }

    /// Fetch an index definition
    pub async fn get(&self, name: &str) -> Result<SearchIndex> {
        let request = ClientRequest::<()>::get(format!("/indexes/{name}"), Target::Admin);
        self.client.request(request).await
    }

    /// List all index definitions
    pub async fn list(&self) -> Result<Vec<SearchIndex>> {
        let request = ClientRequest::<()>::get("/indexes".to_string(), Target::Admin);
        let response: ListResponse<SearchIndex> = self.client.request(request).await?;
        Ok(response.value)
    }

    /// List index names only
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let request = ClientRequest::<()>::get("/indexes".to_string(), Target::Admin)
            .with_param("$select", "name");
        let response: ListResponse<IndexName> = self.client.request(request).await?;
        Ok(response.value.into_iter().map(|i| i.name).collect())
    }

    /// Delete an index and its documents
    pub async fn delete(&self, name: &str) -> Result<()> {
        info!(index = %name, "deleting index");
        let request = ClientRequest::<()>::delete(format!("/indexes/{name}"), Target::Admin);
        self.client.execute(request).await
    }

    /// Document count and storage usage of an index
    pub async fn statistics(&self, name: &str) -> Result<IndexStatistics> {
        let request = ClientRequest::<()>::get(format!("/indexes/{name}/stats"), Target::Admin);
        self.client.request(request).await
    }
}
