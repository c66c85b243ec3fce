//! End-to-end search: classify, look up, resolve, enrich.

mod service;

pub use service::{LocationService, SearchResponse};
