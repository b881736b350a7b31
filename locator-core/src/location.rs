use serde::{Deserialize, Deserializer, Serialize};

/// A locality as returned by the postcode lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct Location {
    pub id: i64,
    /// Locality name, e.g. `MELBOURNE`.
    pub location: String,
    #[serde(deserialize_with = "postcode_from_number_or_string")]
    pub postcode: u32,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Delivery category, e.g. `Delivery Area` or `Post Office Boxes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Outcome of an address verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ValidationResult {
    pub fn valid(message: impl Into<String>, location: Location) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            location: None,
        }
    }
}

/// `{lat, lon}` pair in the shape the index stores as a geo point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A location chosen from search results, with derived coordinates.
///
/// `coordinates` is present exactly when both latitude and longitude are.
/// Construct through [`SelectedLocation::from`]; any `coordinates` value
/// in incoming JSON is ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Location", into = "SelectedLocationDoc")]
pub struct SelectedLocation {
    pub location: Location,
    pub coordinates: Option<GeoPoint>,
}

impl From<Location> for SelectedLocation {
    fn from(location: Location) -> Self {
        let coordinates = match (location.latitude, location.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };
        Self {
            location,
            coordinates,
        }
    }
}

#[derive(Serialize)]
struct SelectedLocationDoc {
    #[serde(flatten)]
    location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<GeoPoint>,
}

impl From<SelectedLocation> for SelectedLocationDoc {
    fn from(selected: SelectedLocation) -> Self {
        Self {
            location: selected.location,
            coordinates: selected.coordinates,
        }
    }
}

fn postcode_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid postcode: {s}"))),
    }
}
