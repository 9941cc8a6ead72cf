//! Document queries against one index.

use std::collections::{HashMap, VecDeque};

use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Target;
use crate::client::{ClientRequest, SearchHttpClient};
use crate::error::{Result, SearchError};
use crate::types::*;
use crate::utils::{current_time_millis, format_duration, join_names};

/// Query client bound to one index
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: SearchHttpClient,
    index_name: String,
}

impl SearchClient {
    pub(crate) fn new(client: SearchHttpClient, index_name: String) -> Self {
        Self { client, index_name }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Run a query and return a lazy sequence of results.
    ///
    /// The first page is fetched before returning; later pages are fetched
    /// while the sequence is consumed. Calling `search` again re-issues the
    /// query from the start.
    pub async fn search<T>(&self, search_text: &str, options: SearchOptions) -> Result<SearchResults<T>>
    where
        T: DeserializeOwned,
    {
        let mut body = options;
        body.search = Some(search_text.to_string());

        let start_time = current_time_millis();
        let page: SearchPage<T> = self.fetch_page(&body).await?;
        let elapsed_time = current_time_millis() - start_time;

        Ok(SearchResults::from_first_page(
            self.clone(),
            page,
            Elapsed {
                raw: elapsed_time,
                formatted: format_duration(elapsed_time),
            },
        ))
    }

    /// Fetch one page for a request body
    pub async fn fetch_page<T>(&self, body: &SearchOptions) -> Result<SearchPage<T>>
    where
        T: DeserializeOwned,
    {
        let request = ClientRequest::post(
            format!("/indexes/{}/docs/search", self.index_name),
            Target::Query,
            body,
        );

        let page: SearchPage<T> = self.client.request(request).await?;
        debug!(
            index = %self.index_name,
            results = page.results.len(),
            has_next = page.next_page_parameters.is_some(),
            "received search page"
        );
        Ok(page)
    }

    /// Suggestions from a suggester for partial input
    pub async fn suggest<T>(&self, options: &SuggestOptions) -> Result<Vec<SuggestResult<T>>>
    where
        T: DeserializeOwned,
    {
        if options.search.trim().is_empty() {
            return Err(SearchError::config("suggest requires non-empty search text"));
        }

        let request = ClientRequest::post(
            format!("/indexes/{}/docs/suggest", self.index_name),
            Target::Query,
            options,
        );

        let response: SuggestResponse<T> = self.client.request(request).await?;
        Ok(response.value)
    }

    /// Number of documents in the index
    pub async fn document_count(&self) -> Result<u64> {
        let request = ClientRequest::<()>::get(
            format!("/indexes/{}/docs/$count", self.index_name),
            Target::Query,
        )
        .with_header("Accept", "text/plain");

        let text = self.client.request_text(request).await?;
        text.trim_start_matches('\u{feff}')
            .trim()
            .parse()
            .map_err(|_| SearchError::generic(format!("unexpected document count '{text}'")))
    }

    /// Look up one document by key
    pub async fn get_document<T>(&self, key: &str, select: Option<&[&str]>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = ClientRequest::<()>::get(
            format!("/indexes/{}/docs/{}", self.index_name, encode_key(key)),
            Target::Query,
        );
        if let Some(fields) = select {
            request = request.with_param("$select", join_names(fields.iter()));
        }

        self.client.request(request).await
    }
}

/// Percent-encode a document key for use as a path segment
fn encode_key(key: &str) -> String {
    url::form_urlencoded::byte_serialize(key.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Lazily paged search results.
///
/// Query-level data (`count`, `answers`, `coverage`, `facets`) comes from the
/// first page.
#[derive(Debug)]
pub struct SearchResults<T> {
    client: SearchClient,
    count: Option<u64>,
    coverage: Option<f64>,
    facets: Option<HashMap<String, Vec<FacetResult>>>,
    answers: Option<Vec<AnswerResult>>,
    elapsed: Elapsed,
    buffer: VecDeque<SearchResult<T>>,
    next_page: Option<SearchOptions>,
    pages_fetched: usize,
}

impl<T> SearchResults<T>
where
    T: DeserializeOwned,
{
    fn from_first_page(client: SearchClient, page: SearchPage<T>, elapsed: Elapsed) -> Self {
        Self {
            client,
            count: page.count,
            coverage: page.coverage,
            facets: page.facets,
            answers: page.answers,
            elapsed,
            buffer: page.results.into(),
            next_page: page.next_page_parameters,
            pages_fetched: 1,
        }
    }

    /// Total matches, when the query asked for a count
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Extracted answers, when the query asked for them
    pub fn answers(&self) -> Option<&[AnswerResult]> {
        self.answers.as_deref()
    }

    pub fn coverage(&self) -> Option<f64> {
        self.coverage
    }

    pub fn facets(&self) -> Option<&HashMap<String, Vec<FacetResult>>> {
        self.facets.as_ref()
    }

    /// Round trip time of the first page
    pub fn elapsed(&self) -> &Elapsed {
        &self.elapsed
    }

    /// Pages requested so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Next result, fetching another page when the current one is used up
    pub async fn next_result(&mut self) -> Result<Option<SearchResult<T>>> {
        loop {
            if let Some(result) = self.buffer.pop_front() {
                return Ok(Some(result));
            }

            let Some(parameters) = self.next_page.take() else {
                return Ok(None);
            };

            let page: SearchPage<T> = self.client.fetch_page(&parameters).await?;
            self.pages_fetched += 1;
            self.buffer.extend(page.results);
            self.next_page = page.next_page_parameters;
        }
    }

    /// Drain every remaining result
    pub async fn collect_all(mut self) -> Result<Vec<SearchResult<T>>> {
        let mut all = Vec::with_capacity(self.buffer.len());
        while let Some(result) = self.next_result().await? {
            all.push(result);
        }
        Ok(all)
    }

    /// The remaining results as a stream
    pub fn into_stream(self) -> impl Stream<Item = Result<SearchResult<T>>> {
        stream::try_unfold(self, |mut results| async move {
            let next = results.next_result().await?;
            Ok::<_, SearchError>(next.map(|item| (item, results)))
        })
    }
}
