//! Index definition types.
//!
//! A [`SearchIndex`] is plain data: a name, a tree of [`SearchField`]
//! descriptors, suggesters, scoring profiles and semantic settings. It
//! serializes to the JSON accepted by `PUT /indexes/{name}` and deserializes
//! from the definitions the service returns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SearchError};

/// Data type of a field, serialized in its `Edm.*` form.
///
/// Types this crate has no variant for are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SearchFieldDataType {
    String,
    Int16,
    Int32,
    Int64,
    Single,
    Half,
    Double,
    Byte,
    SByte,
    Boolean,
    DateTimeOffset,
    GeographyPoint,
    Complex,
    Collection(Box<SearchFieldDataType>),
    Other(String),
}

impl SearchFieldDataType {
    /// `Collection(inner)`
    pub fn collection(inner: SearchFieldDataType) -> Self {
        Self::Collection(Box::new(inner))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Whether this is a complex type or a collection of one
    pub fn is_complex(&self) -> bool {
        match self {
            Self::Complex => true,
            Self::Collection(inner) => inner.is_complex(),
            _ => false,
        }
    }
}

impl fmt::Display for SearchFieldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("Edm.String"),
            Self::Int16 => f.write_str("Edm.Int16"),
            Self::Int32 => f.write_str("Edm.Int32"),
            Self::Int64 => f.write_str("Edm.Int64"),
            Self::Single => f.write_str("Edm.Single"),
            Self::Half => f.write_str("Edm.Half"),
            Self::Double => f.write_str("Edm.Double"),
            Self::Byte => f.write_str("Edm.Byte"),
            Self::SByte => f.write_str("Edm.SByte"),
            Self::Boolean => f.write_str("Edm.Boolean"),
            Self::DateTimeOffset => f.write_str("Edm.DateTimeOffset"),
            Self::GeographyPoint => f.write_str("Edm.GeographyPoint"),
            Self::Complex => f.write_str("Edm.ComplexType"),
            Self::Collection(inner) => write!(f, "Collection({inner})"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for SearchFieldDataType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SearchError::schema("field type must not be empty"));
        }
        if let Some(inner) = s
            .strip_prefix("Collection(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Ok(Self::collection(inner.parse()?));
        }

        Ok(match s {
            "Edm.String" => Self::String,
            "Edm.Int16" => Self::Int16,
            "Edm.Int32" => Self::Int32,
            "Edm.Int64" => Self::Int64,
            "Edm.Single" => Self::Single,
            "Edm.Half" => Self::Half,
            "Edm.Double" => Self::Double,
            "Edm.Byte" => Self::Byte,
            "Edm.SByte" => Self::SByte,
            "Edm.Boolean" => Self::Boolean,
            "Edm.DateTimeOffset" => Self::DateTimeOffset,
            "Edm.GeographyPoint" => Self::GeographyPoint,
            "Edm.ComplexType" => Self::Complex,
            other => Self::Other(other.to_string()),
        })
    }
}

impl TryFrom<String> for SearchFieldDataType {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SearchFieldDataType> for String {
    fn from(value: SearchFieldDataType) -> Self {
        value.to_string()
    }
}

/// Lexical analyzer applied to a searchable text field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LexicalAnalyzerName {
    StandardLucene,
    EnMicrosoft,
    EnLucene,
    FrMicrosoft,
    FrLucene,
    Keyword,
    Other(String),
}

impl LexicalAnalyzerName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StandardLucene => "standard.lucene",
            Self::EnMicrosoft => "en.microsoft",
            Self::EnLucene => "en.lucene",
            Self::FrMicrosoft => "fr.microsoft",
            Self::FrLucene => "fr.lucene",
            Self::Keyword => "keyword",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for LexicalAnalyzerName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "standard.lucene" => Self::StandardLucene,
            "en.microsoft" => Self::EnMicrosoft,
            "en.lucene" => Self::EnLucene,
            "fr.microsoft" => Self::FrMicrosoft,
            "fr.lucene" => Self::FrLucene,
            "keyword" => Self::Keyword,
            _ => Self::Other(value),
        }
    }
}

impl From<LexicalAnalyzerName> for String {
    fn from(value: LexicalAnalyzerName) -> Self {
        value.as_str().to_string()
    }
}

/// One field descriptor.
///
/// Capability flags are `None` on complex fields, which carry only their
/// sub-fields. Properties without a typed counterpart here (`searchAnalyzer`,
/// `synonymMaps`, `dimensions`, ...) are kept in `extra` and sent back
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: SearchFieldDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facetable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrievable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<LexicalAnalyzerName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SearchField>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compares the typed properties; `extra` holds service defaults that a
/// locally built field never sets
impl PartialEq for SearchField {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.key == other.key
            && self.searchable == other.searchable
            && self.filterable == other.filterable
            && self.sortable == other.sortable
            && self.facetable == other.facetable
            && self.retrievable == other.retrievable
            && self.analyzer == other.analyzer
            && self.fields == other.fields
    }
}

impl SearchField {
    fn primitive<S: Into<String>>(name: S, data_type: SearchFieldDataType, searchable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            key: Some(false),
            searchable: Some(searchable),
            filterable: Some(false),
            sortable: Some(false),
            facetable: Some(false),
            retrievable: Some(true),
            analyzer: None,
            fields: None,
            extra: Map::new(),
        }
    }

    /// Non-searchable field of any primitive type
    pub fn simple<S: Into<String>>(name: S, data_type: SearchFieldDataType) -> Self {
        Self::primitive(name, data_type, false)
    }

    /// Full-text searchable string field
    pub fn searchable<S: Into<String>>(name: S) -> Self {
        Self::primitive(name, SearchFieldDataType::String, true)
    }

    /// Full-text searchable string collection
    pub fn searchable_collection<S: Into<String>>(name: S) -> Self {
        Self::primitive(
            name,
            SearchFieldDataType::collection(SearchFieldDataType::String),
            true,
        )
    }

    /// Complex field with nested sub-fields
    pub fn complex<S: Into<String>>(name: S, fields: Vec<SearchField>) -> Self {
        Self::complex_of(name, SearchFieldDataType::Complex, fields)
    }

    /// Collection of complex values
    pub fn complex_collection<S: Into<String>>(name: S, fields: Vec<SearchField>) -> Self {
        Self::complex_of(
            name,
            SearchFieldDataType::collection(SearchFieldDataType::Complex),
            fields,
        )
    }

    fn complex_of<S: Into<String>>(
        name: S,
        data_type: SearchFieldDataType,
        fields: Vec<SearchField>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            key: None,
            searchable: None,
            filterable: None,
            sortable: None,
            facetable: None,
            retrievable: None,
            analyzer: None,
            fields: Some(fields),
            extra: Map::new(),
        }
    }

    /// Mark as the document key; keys are filterable
    pub fn key(mut self) -> Self {
        self.key = Some(true);
        self.filterable = Some(true);
        self
    }

    pub fn searchable_flag(mut self, value: bool) -> Self {
        self.searchable = Some(value);
        self
    }

    pub fn filterable(mut self, value: bool) -> Self {
        self.filterable = Some(value);
        self
    }

    pub fn sortable(mut self, value: bool) -> Self {
        self.sortable = Some(value);
        self
    }

    pub fn facetable(mut self, value: bool) -> Self {
        self.facetable = Some(value);
        self
    }

    pub fn retrievable(mut self, value: bool) -> Self {
        self.retrievable = Some(value);
        self
    }

    pub fn analyzer(mut self, analyzer: LexicalAnalyzerName) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn is_key(&self) -> bool {
        self.key == Some(true)
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable == Some(true)
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable == Some(true)
    }

    pub fn is_complex(&self) -> bool {
        self.data_type.is_complex()
    }

    /// Sub-fields of a complex field, empty otherwise
    pub fn sub_fields(&self) -> &[SearchField] {
        self.fields.as_deref().unwrap_or(&[])
    }
}

/// Autocomplete and suggestion source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggester {
    pub name: String,
    pub search_mode: String,
    pub source_fields: Vec<String>,
}

impl Suggester {
    /// Suggester using the only mode the service offers, `analyzingInfixMatching`
    pub fn new<S: Into<String>>(name: S, source_fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            search_mode: "analyzingInfixMatching".to_string(),
            source_fields,
        }
    }
}

/// Per-field weights of a scoring profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWeights {
    pub weights: HashMap<String, f64>,
}

/// Custom relevance boosting; scoring `functions` and
/// `functionAggregation` pass through in `extra`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextWeights>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScoringProfile {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            text: None,
            extra: Map::new(),
        }
    }

    pub fn with_text_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.text = Some(TextWeights { weights });
        self
    }
}

impl PartialEq for ScoringProfile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.text == other.text
    }
}

/// Reference to a field by name inside a semantic configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticField {
    pub field_name: String,
}

impl SemanticField {
    pub fn new<S: Into<String>>(field_name: S) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

/// Fields given to the semantic ranker as title, content and keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticPrioritizedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_field: Option<SemanticField>,
    #[serde(default)]
    pub prioritized_content_fields: Vec<SemanticField>,
    #[serde(default)]
    pub prioritized_keywords_fields: Vec<SemanticField>,
}

impl SemanticPrioritizedFields {
    /// All field names referenced, title first
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.title_field
            .iter()
            .chain(self.prioritized_content_fields.iter())
            .chain(self.prioritized_keywords_fields.iter())
            .map(|f| f.field_name.as_str())
    }
}

/// Named semantic ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticConfiguration {
    pub name: String,
    pub prioritized_fields: SemanticPrioritizedFields,
}

impl SemanticConfiguration {
    pub fn new<S: Into<String>>(name: S, prioritized_fields: SemanticPrioritizedFields) -> Self {
        Self {
            name: name.into(),
            prioritized_fields,
        }
    }
}

/// Semantic settings of an index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<String>,
    #[serde(default)]
    pub configurations: Vec<SemanticConfiguration>,
}

/// Index definition.
///
/// Index-level settings without a typed field here (`corsOptions`,
/// `analyzers`, `tokenizers`, `similarity`, `encryptionKey`, `vectorSearch`,
/// ...) are kept in `extra`, so a fetched definition can be modified and
/// sent back without losing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SearchField>,
    #[serde(default)]
    pub suggesters: Vec<Suggester>,
    #[serde(default)]
    pub scoring_profiles: Vec<ScoringProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scoring_profile: Option<String>,
    #[serde(rename = "semantic", default, skip_serializing_if = "Option::is_none")]
    pub semantic_search: Option<SemanticSearch>,
    /// Version tag assigned by the service
    #[serde(rename = "@odata.etag", default, skip_serializing)]
    pub etag: Option<String>,
    #[serde(rename = "@odata.context", default, skip_serializing)]
    pub odata_context: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Definitions are equal when the typed properties match; the etag and the
/// passthrough `extra` settings are not compared
impl PartialEq for SearchIndex {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields == other.fields
            && self.suggesters == other.suggesters
            && self.scoring_profiles == other.scoring_profiles
            && self.default_scoring_profile == other.default_scoring_profile
            && self.semantic_search == other.semantic_search
    }
}

impl SearchIndex {
    pub fn new<S: Into<String>>(name: S, fields: Vec<SearchField>) -> Self {
        Self {
            name: name.into(),
            fields,
            suggesters: Vec::new(),
            scoring_profiles: Vec::new(),
            default_scoring_profile: None,
            semantic_search: None,
            etag: None,
            odata_context: None,
            extra: Map::new(),
        }
    }

    pub fn with_suggester(mut self, suggester: Suggester) -> Self {
        self.suggesters.push(suggester);
        self
    }

    pub fn with_scoring_profiles(mut self, profiles: Vec<ScoringProfile>) -> Self {
        self.scoring_profiles = profiles;
        self
    }

    pub fn with_semantic_search(mut self, semantic_search: SemanticSearch) -> Self {
        self.semantic_search = Some(semantic_search);
        self
    }

    /// The key field, if exactly one is declared at the top level
    pub fn key_field(&self) -> Option<&SearchField> {
        let mut keys = self.fields.iter().filter(|f| f.is_key());
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key),
            _ => None,
        }
    }

    /// Look up a field by path, using `/` between nesting levels
    pub fn field(&self, path: &str) -> Option<&SearchField> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut current = self.fields.iter().find(|f| f.name == first)?;
        for segment in segments {
            current = current.sub_fields().iter().find(|f| f.name == segment)?;
        }
        Some(current)
    }

    /// Add `config` unless a configuration with the same name exists, and make
    /// it the default. Returns whether it was added.
    pub fn ensure_semantic_configuration(&mut self, config: SemanticConfiguration) -> bool {
        let semantic = self.semantic_search.get_or_insert_with(SemanticSearch::default);
        let name = config.name.clone();

        let added = if semantic.configurations.iter().any(|c| c.name == name) {
            false
        } else {
            semantic.configurations.push(config);
            true
        };

        semantic.default_configuration = Some(name);
        added
    }

    /// Check the structural rules the service would otherwise reject.
    ///
    /// Analyzer choice and suggester source paths are left to the service.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SearchError::schema("index name must not be empty"));
        }

        let keys: Vec<&SearchField> = self.fields.iter().filter(|f| f.is_key()).collect();
        match keys.as_slice() {
            [key] => {
                if key.data_type != SearchFieldDataType::String {
                    return Err(SearchError::schema(format!(
                        "key field '{}' must be Edm.String, found {}",
                        key.name, key.data_type
                    )));
                }
                if key.is_searchable() {
                    return Err(SearchError::schema(format!(
                        "key field '{}' must not be searchable",
                        key.name
                    )));
                }
            }
            [] => return Err(SearchError::schema("index has no key field")),
            many => {
                let names: Vec<&str> = many.iter().map(|f| f.name.as_str()).collect();
                return Err(SearchError::schema(format!(
                    "index declares {} key fields: {}",
                    many.len(),
                    names.join(", ")
                )));
            }
        }

        validate_fields(&self.fields, "", true)?;

        if let Some(semantic) = &self.semantic_search {
            for config in &semantic.configurations {
                for name in config.prioritized_fields.field_names() {
                    if self.field(name).is_none() {
                        return Err(SearchError::schema(format!(
                            "semantic configuration '{}' references unknown field '{}'",
                            config.name, name
                        )));
                    }
                }
            }
            if let Some(default) = &semantic.default_configuration {
                if !semantic.configurations.iter().any(|c| &c.name == default) {
                    return Err(SearchError::schema(format!(
                        "default semantic configuration '{default}' is not defined"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn validate_fields(fields: &[SearchField], parent: &str, top_level: bool) -> Result<()> {
    let mut seen = HashSet::new();

    for field in fields {
        let path = if parent.is_empty() {
            field.name.clone()
        } else {
            format!("{parent}/{}", field.name)
        };

        if field.name.trim().is_empty() {
            return Err(SearchError::schema(format!("empty field name under '{parent}'")));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SearchError::schema(format!("duplicate field '{path}'")));
        }
        if !top_level && field.is_key() {
            return Err(SearchError::schema(format!(
                "nested field '{path}' cannot be a key"
            )));
        }

        if field.is_complex() {
            let flags = [
                field.key,
                field.searchable,
                field.filterable,
                field.sortable,
                field.facetable,
                field.retrievable,
            ];
            if flags.iter().any(Option::is_some) || field.analyzer.is_some() {
                return Err(SearchError::schema(format!(
                    "complex field '{path}' cannot carry capability flags"
                )));
            }
            if field.sub_fields().is_empty() {
                return Err(SearchError::schema(format!(
                    "complex field '{path}' has no sub-fields"
                )));
            }
            validate_fields(field.sub_fields(), &path, false)?;
            continue;
        }

        if field.fields.is_some() {
            return Err(SearchError::schema(format!(
                "field '{path}' of type {} cannot have sub-fields",
                field.data_type
            )));
        }
        if field.data_type.is_collection() && field.is_sortable() {
            return Err(SearchError::schema(format!(
                "collection field '{path}' cannot be sortable"
            )));
        }
        if field.analyzer.is_some() && !field.is_searchable() {
            return Err(SearchError::schema(format!(
                "analyzer set on non-searchable field '{path}'"
            )));
        }
    }

    Ok(())
}
