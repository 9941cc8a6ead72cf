//! The hotels sample index: schema table and document types.

use serde::{Deserialize, Serialize};

use crate::schema::{
    LexicalAnalyzerName::{EnMicrosoft, FrMicrosoft},
    SearchField, SearchFieldDataType as Edm, SearchIndex, SemanticConfiguration, SemanticField,
    SemanticPrioritizedFields, SemanticSearch, Suggester,
};

pub const SEMANTIC_CONFIG_NAME: &str = "semantic-config";
pub const SUGGESTER_NAME: &str = "sg";

/// Fields the `sg` suggester draws from
pub const SUGGESTER_SOURCE_FIELDS: [&str; 4] =
    ["Rooms/Tags", "Rooms/Type", "Address/City", "Address/Country"];

/// Field list of the hotels index
pub fn hotel_fields() -> Vec<SearchField> {
    vec![
        SearchField::simple("HotelId", Edm::String)
            .key()
            .facetable(true)
            .filterable(true)
            .sortable(false),
        SearchField::searchable("HotelName").analyzer(EnMicrosoft),
        SearchField::searchable("Description").analyzer(EnMicrosoft),
        SearchField::searchable("Description_fr").analyzer(FrMicrosoft),
        SearchField::searchable("Category")
            .facetable(true)
            .filterable(true)
            .analyzer(EnMicrosoft),
        SearchField::searchable_collection("Tags")
            .facetable(true)
            .filterable(true)
            .analyzer(EnMicrosoft),
        SearchField::simple("ParkingIncluded", Edm::Boolean)
            .facetable(true)
            .filterable(true),
        SearchField::simple("LastRenovationDate", Edm::DateTimeOffset).sortable(true),
        SearchField::simple("Rating", Edm::Double)
            .facetable(true)
            .filterable(true)
            .sortable(true),
        SearchField::complex(
            "Address",
            vec![
                SearchField::searchable("StreetAddress").analyzer(EnMicrosoft),
                address_part("City"),
                address_part("StateProvince"),
                address_part("PostalCode"),
                address_part("Country"),
            ],
        ),
        SearchField::simple("Location", Edm::GeographyPoint)
            .filterable(true)
            .sortable(true),
        SearchField::complex_collection(
            "Rooms",
            vec![
                SearchField::searchable("Description").analyzer(EnMicrosoft),
                SearchField::searchable("Description_fr").analyzer(FrMicrosoft),
                SearchField::searchable("Type")
                    .analyzer(EnMicrosoft)
                    .facetable(true)
                    .filterable(true),
                SearchField::simple("BaseRate", Edm::Double)
                    .facetable(true)
                    .filterable(true),
                SearchField::searchable("BedOptions")
                    .analyzer(EnMicrosoft)
                    .facetable(true)
                    .filterable(true),
                SearchField::simple("SleepsCount", Edm::Int64)
                    .facetable(true)
                    .filterable(true),
                SearchField::simple("SmokingAllowed", Edm::Boolean)
                    .facetable(true)
                    .filterable(true),
                SearchField::searchable_collection("Tags")
                    .analyzer(EnMicrosoft)
                    .facetable(true)
                    .filterable(true),
            ],
        ),
        // Internal bookkeeping from the data source, hidden from queries
        SearchField::simple("id", Edm::String).retrievable(false),
        SearchField::simple("rid", Edm::String).retrievable(false),
    ]
}

fn address_part(name: &str) -> SearchField {
    SearchField::searchable(name)
        .facetable(true)
        .filterable(true)
        .analyzer(EnMicrosoft)
}

/// Title `HotelName`, keywords `Category`, content `Description`
pub fn hotel_semantic_configuration() -> SemanticConfiguration {
    SemanticConfiguration::new(
        SEMANTIC_CONFIG_NAME,
        SemanticPrioritizedFields {
            title_field: Some(SemanticField::new("HotelName")),
            prioritized_content_fields: vec![SemanticField::new("Description")],
            prioritized_keywords_fields: vec![SemanticField::new("Category")],
        },
    )
}

/// Complete definition of the hotels index under `name`
pub fn hotel_index<S: Into<String>>(name: S) -> SearchIndex {
    SearchIndex::new(name, hotel_fields())
        .with_suggester(Suggester::new(
            SUGGESTER_NAME,
            SUGGESTER_SOURCE_FIELDS.iter().map(|f| f.to_string()).collect(),
        ))
        .with_scoring_profiles(Vec::new())
        .with_semantic_search(SemanticSearch {
            default_configuration: None,
            configurations: vec![hotel_semantic_configuration()],
        })
}

/// GeoJSON point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    /// Longitude, latitude
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Room {
    pub description: Option<String>,
    #[serde(rename = "Description_fr")]
    pub description_fr: Option<String>,
    #[serde(rename = "Type")]
    pub room_type: Option<String>,
    pub base_rate: Option<f64>,
    pub bed_options: Option<String>,
    pub sleeps_count: Option<i64>,
    pub smoking_allowed: Option<bool>,
    pub tags: Vec<String>,
}

/// Full hotel document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Hotel {
    pub hotel_id: String,
    pub hotel_name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "Description_fr")]
    pub description_fr: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub parking_included: Option<bool>,
    /// ISO 8601 date-time offset
    pub last_renovation_date: Option<String>,
    pub rating: Option<f64>,
    pub address: Option<Address>,
    pub location: Option<GeoPoint>,
    pub rooms: Vec<Room>,
}

/// Projection used by the quickstart queries; absent fields stay `None`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HotelSummary {
    pub hotel_id: Option<String>,
    pub hotel_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}
