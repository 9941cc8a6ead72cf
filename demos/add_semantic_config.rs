//! Add the hotels semantic configuration to an existing index.

use anyhow::{bail, Context, Result};
use azsearch_client::hotels::hotel_semantic_configuration;
use azsearch_client::{SearchService, SearchServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SearchServiceConfig::from_env().context("loading search service configuration")?;
    let service = SearchService::new(config).context("creating search service client")?;
    let index_name = service.index_name().to_string();

    let names = service.indexes.list_names().await.context("listing indexes")?;
    println!("Indexes: {}", names.join(", "));
    if !names.contains(&index_name) {
        bail!("index '{index_name}' does not exist");
    }

    let mut index = service
        .indexes
        .get(&index_name)
        .await
        .with_context(|| format!("fetching index '{index_name}'"))?;

    if index.ensure_semantic_configuration(hotel_semantic_configuration()) {
        info!(index = %index_name, "added semantic configuration");
    } else {
        info!(index = %index_name, "semantic configuration already present");
    }

    let updated = service
        .indexes
        .create_or_update(&index)
        .await
        .with_context(|| format!("updating index '{index_name}'"))?;

    println!("{}", serde_json::to_string_pretty(&updated)?);
    Ok(())
}
