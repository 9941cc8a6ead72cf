//! # Azure AI Search Rust Client
//!
//! An async client for [Azure AI Search](https://learn.microsoft.com/azure/search/)
//! covering index management and document queries, including semantic
//! ranking with extractive captions and answers.
//!
//! Requests authenticate with an admin/query API key or with a Microsoft
//! Entra ID token from [`DefaultAzureCredential`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azsearch_client::hotels::{hotel_index, HotelSummary, SEMANTIC_CONFIG_NAME};
//! use azsearch_client::{QueryCaption, SearchOptions, SearchService, SearchServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SearchService::new(SearchServiceConfig::from_env()?)?;
//!
//!     let index = service
//!         .indexes
//!         .create_or_update(&hotel_index(service.index_name()))
//!         .await?;
//!     println!("{} updated", index.name);
//!
//!     let options = SearchOptions::semantic(SEMANTIC_CONFIG_NAME)
//!         .with_select(["HotelName", "Description"])
//!         .with_captions(QueryCaption::Extractive { highlight: true });
//!
//!     let mut results = service
//!         .search_client()
//!         .search::<HotelSummary>("walk to restaurants and shopping", options)
//!         .await?;
//!
//!     while let Some(result) = results.next_result().await? {
//!         println!("{:?}: {:?}", result.reranker_score, result.document.hotel_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod hotels;
pub mod index;
pub mod report;
pub mod schema;
pub mod search;
pub mod service;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::SearchServiceConfig;
pub use credential::{DefaultAzureCredential, TokenCredential};
pub use error::{Result, SearchError};
pub use index::IndexNamespace;
pub use schema::*;
pub use search::{SearchClient, SearchResults};
pub use service::SearchService;
pub use types::*;
