use serde::{Deserialize, Serialize};

/// A restaurant as returned by the remote search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub location: Location,
    pub rating: f64,
    pub price_range: String,
    /// Human-readable estimate, e.g. `"25-35 min"`.
    pub delivery_time: String,
    /// Subtotal required before checkout is allowed.
    #[serde(default)]
    pub minimum_order: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default = "default_open")]
    pub is_open: bool,
}

fn default_open() -> bool {
    true
}

/// Street location of a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Response of `GET /cities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
}

/// Response of `GET /cuisines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuisinesResponse {
    pub cuisines: Vec<String>,
}

/// Response of `GET /search/intelligent`.
///
/// `parsed` is the remote service's interpretation of the query (dish,
/// budget, time constraints...). Its shape is not part of the contract, so it
/// is carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelligentSearchResult {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub suggested_items: Vec<super::MenuItem>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub parsed: serde_json::Value,
}
