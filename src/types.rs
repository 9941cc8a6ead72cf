//! Query option and result types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SearchError};
use crate::utils::{join_names, split_names};

/// Type alias for generic object data
pub type AnyObject = serde_json::Value;

/// Query parser and ranking pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Simple query syntax, BM25 ranking
    Simple,
    /// Full Lucene query syntax, BM25 ranking
    Full,
    /// BM25 pre-ranking followed by semantic re-ranking
    Semantic,
}

/// Whether any or all terms must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Any,
    All,
}

/// Caption request, serialized as `extractive|highlight-true` and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueryCaption {
    None,
    Extractive { highlight: bool },
}

impl fmt::Display for QueryCaption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Extractive { highlight } => write!(f, "extractive|highlight-{highlight}"),
        }
    }
}

impl FromStr for QueryCaption {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, params) = split_option(s);
        match kind.as_str() {
            "none" => Ok(Self::None),
            "extractive" => {
                let mut highlight = true;
                for (key, value) in params {
                    match key.as_str() {
                        "highlight" => highlight = value.eq_ignore_ascii_case("true"),
                        other => {
                            return Err(SearchError::generic(format!(
                                "unknown caption parameter '{other}'"
                            )))
                        }
                    }
                }
                Ok(Self::Extractive { highlight })
            }
            other => Err(SearchError::generic(format!("unknown caption type '{other}'"))),
        }
    }
}

/// Answer request, serialized as `extractive|count-3,threshold-0.7` and friends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueryAnswer {
    None,
    Extractive {
        count: Option<u32>,
        threshold: Option<f64>,
    },
}

impl QueryAnswer {
    /// Extractive answers with service defaults
    pub fn extractive() -> Self {
        Self::Extractive {
            count: None,
            threshold: None,
        }
    }
}

impl fmt::Display for QueryAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Extractive { count, threshold } => {
                f.write_str("extractive")?;
                let mut params = Vec::new();
                if let Some(count) = count {
                    params.push(format!("count-{count}"));
                }
                if let Some(threshold) = threshold {
                    params.push(format!("threshold-{threshold}"));
                }
                if !params.is_empty() {
                    write!(f, "|{}", params.join(","))?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for QueryAnswer {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, params) = split_option(s);
        match kind.as_str() {
            "none" => Ok(Self::None),
            "extractive" => {
                let mut count = None;
                let mut threshold = None;
                for (key, value) in params {
                    match key.as_str() {
                        "count" => {
                            count = Some(value.parse().map_err(|_| {
                                SearchError::generic(format!("invalid answer count '{value}'"))
                            })?)
                        }
                        "threshold" => {
                            threshold = Some(value.parse().map_err(|_| {
                                SearchError::generic(format!("invalid answer threshold '{value}'"))
                            })?)
                        }
                        other => {
                            return Err(SearchError::generic(format!(
                                "unknown answer parameter '{other}'"
                            )))
                        }
                    }
                }
                Ok(Self::Extractive { count, threshold })
            }
            other => Err(SearchError::generic(format!("unknown answer type '{other}'"))),
        }
    }
}

/// Split `kind|key-value,key-value` into its parts
fn split_option(s: &str) -> (String, Vec<(String, String)>) {
    let mut parts = s.trim().splitn(2, '|');
    let kind = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let params = parts
        .next()
        .map(|rest| {
            rest.split(',')
                .filter_map(|pair| {
                    let (key, value) = pair.trim().split_once('-')?;
                    Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    (kind, params)
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = SearchError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    )*};
}

string_conversions!(QueryCaption, QueryAnswer);

fn serialize_names<S>(names: &Option<Vec<String>>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match names {
        Some(names) => serializer.serialize_str(&join_names(names)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_names<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| split_names(&v)))
}

/// Search request body for `POST /indexes/{name}/docs/search`.
///
/// The service returns the same shape as `@search.nextPageParameters`, so this
/// also deserializes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_names",
        deserialize_with = "deserialize_names"
    )]
    pub search_fields: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_names",
        deserialize_with = "deserialize_names"
    )]
    pub select: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(
        rename = "orderby",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_names",
        deserialize_with = "deserialize_names"
    )]
    pub order_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_names",
        deserialize_with = "deserialize_names"
    )]
    pub highlight: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<QueryCaption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<QueryAnswer>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simple-syntax keyword query
    pub fn simple() -> Self {
        Self::new().with_query_type(QueryType::Simple)
    }

    /// Semantic query using the named configuration
    pub fn semantic<S: Into<String>>(configuration: S) -> Self {
        Self::new()
            .with_query_type(QueryType::Semantic)
            .with_semantic_configuration(configuration)
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = Some(query_type);
        self
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }

    /// Restrict full-text search to these fields
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Fields to return in each result
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// OData filter expression
    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_order_by<I, S>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = Some(clauses.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_facets<I, S>(mut self, facets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets = Some(facets.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_highlight<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Ask for `@odata.count`
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_scoring_profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.scoring_profile = Some(profile.into());
        self
    }

    pub fn with_semantic_configuration<S: Into<String>>(mut self, name: S) -> Self {
        self.semantic_configuration = Some(name.into());
        self
    }

    pub fn with_captions(mut self, captions: QueryCaption) -> Self {
        self.captions = Some(captions);
        self
    }

    pub fn with_answers(mut self, answers: QueryAnswer) -> Self {
        self.answers = Some(answers);
        self
    }
}

/// Extractive caption of one result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionResult {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<String>,
}

impl CaptionResult {
    /// Highlighted text when present and non-empty, plain text otherwise
    pub fn preferred_text(&self) -> Option<&str> {
        prefer_highlights(self.highlights.as_deref(), self.text.as_deref())
    }
}

/// Extractive answer to the query as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Key of the document the answer was taken from
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<String>,
    /// Confidence of the answer
    #[serde(default)]
    pub score: Option<f64>,
}

impl AnswerResult {
    pub fn preferred_text(&self) -> Option<&str> {
        prefer_highlights(self.highlights.as_deref(), self.text.as_deref())
    }
}

fn prefer_highlights<'a>(highlights: Option<&'a str>, text: Option<&'a str>) -> Option<&'a str> {
    highlights
        .filter(|h| !h.trim().is_empty())
        .or_else(|| text.filter(|t| !t.trim().is_empty()))
}

/// One scored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult<T = AnyObject> {
    /// BM25 score, uniform 1.0 for wildcard queries
    #[serde(rename = "@search.score")]
    pub score: f64,
    #[serde(
        rename = "@search.rerankerScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reranker_score: Option<f64>,
    #[serde(
        rename = "@search.highlights",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub highlights: Option<HashMap<String, Vec<String>>>,
    #[serde(
        rename = "@search.captions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub captions: Option<Vec<CaptionResult>>,
    /// Projected document fields
    #[serde(flatten)]
    pub document: T,
}

impl<T> SearchResult<T> {
    /// Reranker score for semantic queries, plain score otherwise
    pub fn ranking_score(&self) -> f64 {
        self.reranker_score.unwrap_or(self.score)
    }

    /// First caption, the only one the service currently returns
    pub fn caption(&self) -> Option<&CaptionResult> {
        self.captions.as_ref().and_then(|c| c.first())
    }
}

/// Facet bucket; value or range bounds are kept as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetResult {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(flatten)]
    pub bounds: HashMap<String, AnyObject>,
}

/// One page of a search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T = AnyObject> {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(rename = "@search.coverage", default)]
    pub coverage: Option<f64>,
    #[serde(rename = "@search.facets", default)]
    pub facets: Option<HashMap<String, Vec<FacetResult>>>,
    #[serde(rename = "@search.answers", default)]
    pub answers: Option<Vec<AnswerResult>>,
    #[serde(rename = "value")]
    pub results: Vec<SearchResult<T>>,
    #[serde(rename = "@search.nextPageParameters", default)]
    pub next_page_parameters: Option<SearchOptions>,
}

/// Suggest request body for `POST /indexes/{name}/docs/suggest`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestOptions {
    pub search: String,
    pub suggester_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_names")]
    pub select: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
}

impl SuggestOptions {
    pub fn new<S: Into<String>>(search: S, suggester_name: S) -> Self {
        Self {
            search: search.into(),
            suggester_name: suggester_name.into(),
            fuzzy: None,
            filter: None,
            select: None,
            top: None,
            highlight_pre_tag: None,
            highlight_post_tag: None,
        }
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_highlight_tags<S: Into<String>>(mut self, pre: S, post: S) -> Self {
        self.highlight_pre_tag = Some(pre.into());
        self.highlight_post_tag = Some(post.into());
        self
    }
}

/// One suggestion
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestResult<T = AnyObject> {
    /// Matched text, with highlight tags when requested
    #[serde(rename = "@search.text")]
    pub text: String,
    #[serde(flatten)]
    pub document: T,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SuggestResponse<T> {
    pub value: Vec<SuggestResult<T>>,
}

/// Index usage reported by `GET /indexes/{name}/stats`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatistics {
    pub document_count: u64,
    pub storage_size: u64,
    #[serde(default)]
    pub vector_index_size: Option<u64>,
}

/// Elapsed time information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elapsed {
    pub raw: u64,
    pub formatted: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_type_serialization() {
        assert_eq!(serde_json::to_string(&QueryType::Semantic).unwrap(), "\"semantic\"");
        assert_eq!(serde_json::to_string(&QueryType::Simple).unwrap(), "\"simple\"");
    }

    #[test]
    fn test_caption_strings() {
        let caption = QueryCaption::Extractive { highlight: true };
        assert_eq!(caption.to_string(), "extractive|highlight-true");
        assert_eq!("extractive".parse::<QueryCaption>().unwrap(), caption);
        assert_eq!(
            "extractive|highlight-false".parse::<QueryCaption>().unwrap(),
            QueryCaption::Extractive { highlight: false }
        );
        assert_eq!("none".parse::<QueryCaption>().unwrap(), QueryCaption::None);
        assert!("abstractive".parse::<QueryCaption>().is_err());
    }

    #[test]
    fn test_answer_strings() {
        assert_eq!(QueryAnswer::extractive().to_string(), "extractive");

        let answer = QueryAnswer::Extractive {
            count: Some(3),
            threshold: Some(0.7),
        };
        assert_eq!(answer.to_string(), "extractive|count-3,threshold-0.7");
        assert_eq!(answer.to_string().parse::<QueryAnswer>().unwrap(), answer);
        assert!("extractive|count-x".parse::<QueryAnswer>().is_err());
    }

    #[test]
    fn test_search_options_body() {
        let options = SearchOptions::semantic("semantic-config")
            .with_select(["HotelName", "Description", "Category"])
            .with_captions(QueryCaption::Extractive { highlight: true })
            .with_answers(QueryAnswer::extractive())
            .with_count(true);

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "queryType": "semantic",
                "semanticConfiguration": "semantic-config",
                "select": "HotelName,Description,Category",
                "captions": "extractive|highlight-true",
                "answers": "extractive",
                "count": true
            })
        );
    }

    #[test]
    fn test_next_page_parameters_parse() {
        let options: SearchOptions = serde_json::from_value(json!({
            "search": "*",
            "queryType": "simple",
            "select": "HotelName,Description",
            "orderby": "Rating desc, HotelName",
            "count": true,
            "skip": 50,
            "top": 50
        }))
        .unwrap();

        assert_eq!(options.search.as_deref(), Some("*"));
        assert_eq!(
            options.select,
            Some(vec!["HotelName".to_string(), "Description".to_string()])
        );
        assert_eq!(
            options.order_by,
            Some(vec!["Rating desc".to_string(), "HotelName".to_string()])
        );
        assert_eq!(options.skip, Some(50));
    }

    #[test]
    fn test_result_flattens_document() {
        let result: SearchResult = serde_json::from_value(json!({
            "@search.score": 3.2,
            "@search.rerankerScore": 2.61,
            "@search.captions": [{"text": "plain", "highlights": "<em>bold</em>"}],
            "HotelName": "Old Century Hotel"
        }))
        .unwrap();

        assert_eq!(result.ranking_score(), 2.61);
        assert_eq!(result.caption().and_then(|c| c.preferred_text()), Some("<em>bold</em>"));
        assert_eq!(result.document["HotelName"], "Old Century Hotel");
        assert!(result.document.get("@search.score").is_none());
    }

    #[test]
    fn test_caption_falls_back_to_text() {
        let caption = CaptionResult {
            text: Some("plain text".to_string()),
            highlights: Some("".to_string()),
        };
        assert_eq!(caption.preferred_text(), Some("plain text"));

        let empty = CaptionResult {
            text: None,
            highlights: None,
        };
        assert_eq!(empty.preferred_text(), None);
    }

    #[test]
    fn test_plain_score_when_not_reranked() {
        let result: SearchResult = serde_json::from_value(json!({
            "@search.score": 1.0,
            "HotelName": "Stay-Kay City Hotel"
        }))
        .unwrap();
        assert_eq!(result.ranking_score(), 1.0);
        assert!(result.caption().is_none());
    }

    #[test]
    fn test_suggest_options_body() {
        let options = SuggestOptions::new("boutique", "sg")
            .with_select(["HotelName"])
            .with_top(5);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"search": "boutique", "suggesterName": "sg", "select": "HotelName", "top": 5})
        );
    }
}
