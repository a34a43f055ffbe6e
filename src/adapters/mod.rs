// Adapters layer: concrete implementations for external systems (http, rendering).

pub mod http;
pub mod render;

pub use http::HttpDocumentSource;
