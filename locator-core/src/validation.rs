//! Request schemas shared by the REST and GraphQL surfaces.
//!
//! Raw requests keep every field as a string so that a bad value becomes a
//! structured [`FieldError`] instead of a deserialization failure.

use crate::error::{FieldError, LocatorError};
use crate::state::AustralianState;
use serde::Deserialize;

const MAX_TEXT_LEN: usize = 100;

/// Unvalidated verification form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyAddressRequest {
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub suburb: String,
    #[serde(default)]
    pub state: String,
}

/// A verification form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyAddress {
    pub postcode: String,
    pub suburb: String,
    pub state: AustralianState,
}

impl VerifyAddressRequest {
    pub fn validate(&self) -> Result<VerifyAddress, LocatorError> {
        let mut errors = Vec::new();

        let postcode = self.postcode.trim();
        if postcode.chars().count() != 4 {
            errors.push(FieldError::new("postcode", "Postcode must be 4 digits"));
        } else if !postcode.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("postcode", "Postcode must contain only numbers"));
        }

        let suburb = self.suburb.trim();
        if suburb.is_empty() {
            errors.push(FieldError::new("suburb", "Suburb is required"));
        } else if suburb.chars().count() > MAX_TEXT_LEN {
            errors.push(FieldError::new("suburb", "Suburb name is too long"));
        }

        let state = self.state.parse::<AustralianState>().ok();
        if state.is_none() {
            errors.push(FieldError::new("state", "Please select a valid Australian state"));
        }

        match state {
            Some(state) if errors.is_empty() => Ok(VerifyAddress {
                postcode: postcode.to_string(),
                suburb: suburb.to_string(),
                state,
            }),
            _ => Err(LocatorError::Validation(errors)),
        }
    }
}

/// Unvalidated location search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchLocationsRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// A search that passed validation. An empty category means "any".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLocations {
    pub query: String,
    pub category: Option<String>,
}

impl SearchLocationsRequest {
    pub fn validate(&self) -> Result<SearchLocations, LocatorError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(LocatorError::field("query", "Search query is required"));
        }
        if query.chars().count() > MAX_TEXT_LEN {
            return Err(LocatorError::field("query", "Search query is too long"));
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(SearchLocations {
            query: query.to_string(),
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify(postcode: &str, suburb: &str, state: &str) -> VerifyAddressRequest {
        VerifyAddressRequest {
            postcode: postcode.into(),
            suburb: suburb.into(),
            state: state.into(),
        }
    }

    fn fields(err: LocatorError) -> Vec<String> {
        err.field_errors().iter().map(|e| e.field.clone()).collect()
    }

    #[test]
    fn accepts_valid_form() {
        let ok = verify("3000", " Melbourne ", "VIC").validate().unwrap();
        assert_eq!(ok.postcode, "3000");
        assert_eq!(ok.suburb, "Melbourne");
        assert_eq!(ok.state, AustralianState::Vic);
    }

    #[test]
    fn lowercase_state_code_is_rejected() {
        let err = verify("3000", "Melbourne", "vic").validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "state");
        assert_eq!(err.field_errors()[0].message, "Please select a valid Australian state");
    }

    #[test]
    fn rejects_short_and_non_numeric_postcodes() {
        let err = verify("300", "Melbourne", "VIC").validate().unwrap_err();
        assert_eq!(err.field_errors()[0].message, "Postcode must be 4 digits");

        let err = verify("30a0", "Melbourne", "VIC").validate().unwrap_err();
        assert_eq!(err.field_errors()[0].message, "Postcode must contain only numbers");
    }

    #[test]
    fn collects_every_bad_field() {
        let err = verify("", "", "XX").validate().unwrap_err();
        assert_eq!(fields(err), vec!["postcode", "suburb", "state"]);
    }

    #[test]
    fn rejects_overlong_suburb() {
        let err = verify("3000", &"a".repeat(101), "VIC").validate().unwrap_err();
        assert_eq!(err.field_errors()[0].message, "Suburb name is too long");
    }

    #[test]
    fn search_requires_query() {
        let req = SearchLocationsRequest {
            query: "   ".into(),
            category: None,
        };
        assert_eq!(fields(req.validate().unwrap_err()), vec!["query"]);
    }

    #[test]
    fn search_rejects_overlong_query() {
        let req = SearchLocationsRequest {
            query: "q".repeat(101),
            category: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn search_treats_empty_category_as_none() {
        let req = SearchLocationsRequest {
            query: "melbourne".into(),
            category: Some("".into()),
        };
        assert_eq!(req.validate().unwrap().category, None);

        let req = SearchLocationsRequest {
            query: "melbourne".into(),
            category: Some("Delivery Area".into()),
        };
        assert_eq!(req.validate().unwrap().category.as_deref(), Some("Delivery Area"));
    }
}
