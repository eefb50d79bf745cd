//! HTTP surface for ingestion and search.
//!
//! Only compiled with the `http-server` feature.

pub mod schema;
pub mod server;

pub use schema::{MAX_MATCH_COUNT, MIN_CLIENT_ID_LEN, SearchRequest, SearchResponse};
pub use server::{AppState, router, serve};
