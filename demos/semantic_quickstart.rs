//! Hotels quickstart: create or update the index, then run a wildcard
//! listing, a keyword query and two semantic queries.
//!
//! Reads `AZURE_SEARCH_ENDPOINT` (and optionally `AZURE_SEARCH_API_KEY`,
//! `AZURE_SEARCH_INDEX`) from the environment or a `.env` file.

use anyhow::{Context, Result};
use azsearch_client::hotels::{hotel_index, HotelSummary, SEMANTIC_CONFIG_NAME};
use azsearch_client::report;
use azsearch_client::{QueryAnswer, QueryCaption, SearchOptions, SearchService, SearchServiceConfig};
use tracing_subscriber::EnvFilter;

const KEYWORD_QUERY: &str = "walk to restaurants and shopping";
const ANSWER_QUERY: &str = "what's a good hotel for people who like to read";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = SearchServiceConfig::from_env().context("loading search service configuration")?;
    let service = SearchService::new(config).context("creating search service client")?;

    let index = service
        .indexes
        .create_or_update(&hotel_index(service.index_name()))
        .await
        .context("creating or updating the hotels index")?;
    println!(" {} updated", index.name);

    let search = service.search_client();

    // Empty query: every document, uniform 1.0 score
    let options = SearchOptions::simple()
        .with_select(["HotelName", "Description"])
        .with_count(true);
    let mut results = search
        .search::<HotelSummary>("*", options)
        .await
        .context("running the wildcard query")?;

    print!("{}", report::total_count_line(results.count()));
    while let Some(result) = results.next_result().await? {
        print!("{}", report::keyword_result(&result));
    }

    // Keyword query, BM25 scored
    let options = SearchOptions::simple()
        .with_select(["HotelName", "HotelId", "Description"])
        .with_count(true);
    let mut results = search
        .search::<HotelSummary>(KEYWORD_QUERY, options)
        .await
        .context("running the keyword query")?;

    while let Some(result) = results.next_result().await? {
        print!("{}", report::keyword_result(&result));
    }

    // Same text, reranked semantically with captions
    let options = SearchOptions::semantic(SEMANTIC_CONFIG_NAME)
        .with_select(["HotelName", "Description", "Category"])
        .with_captions(QueryCaption::Extractive { highlight: true });
    let mut results = search
        .search::<HotelSummary>(KEYWORD_QUERY, options)
        .await
        .context("running the semantic query")?;

    while let Some(result) = results.next_result().await? {
        print!("{}", report::semantic_result(&result));
    }

    // Semantic query with extracted answers
    let options = SearchOptions::semantic(SEMANTIC_CONFIG_NAME)
        .with_select(["HotelName", "Description", "Category"])
        .with_captions(QueryCaption::Extractive { highlight: true })
        .with_answers(QueryAnswer::extractive());
    let mut results = search
        .search::<HotelSummary>(ANSWER_QUERY, options)
        .await
        .context("running the semantic answer query")?;

    for answer in results.answers().unwrap_or_default() {
        print!("{}", report::semantic_answer(answer));
    }
    while let Some(result) = results.next_result().await? {
        print!("{}", report::semantic_result(&result));
    }

    Ok(())
}
