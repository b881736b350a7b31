pub mod error;
pub mod graphql;
pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, AppState};
