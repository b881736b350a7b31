pub mod backend;
pub mod elasticsearch;
pub mod error;
pub mod filter;
pub mod memory;
pub mod service;
pub mod store;

pub use backend::IndexBackend;
pub use elasticsearch::ElasticsearchIndex;
pub use error::StoreError;
pub use filter::{CountCriteria, LogFilter, LogPage, LogStatistics};
pub use memory::MemoryIndex;
pub use service::{ListOptions, LogListing, LogService, RequestContext, StatisticsReport};
pub use store::LogStore;
