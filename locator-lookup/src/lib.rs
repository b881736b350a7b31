pub mod client;
pub mod error;
pub mod lookup;

pub use client::{AusPostClient, LocalitySource};
pub use error::LookupError;
pub use lookup::{AddressLookup, SearchOutcome, DEFAULT_SEARCH_LIMIT};
