use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use crate::core::engine::DeedEngine;
use crate::core::Pipeline;

pub fn create_router<P: Pipeline + 'static>(engine: Arc<DeedEngine<P>>) -> Router {
    Router::new()
        .route("/", get(index).post(submit_form::<P>))
        .route("/api/boundary", get(get_boundary::<P>))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(engine)
}
