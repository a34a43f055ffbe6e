use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;

use super::models::*;
use crate::adapters::render::{render_message_page, render_page};
use crate::core::engine::DeedEngine;
use crate::core::{Pipeline, PlotReport};
use crate::utils::error::FailureReason;

pub async fn index() -> Html<String> {
    Html(render_page("", None))
}

pub async fn submit_form<P: Pipeline + 'static>(
    State(engine): State<Arc<DeedEngine<P>>>,
    Form(form): Form<DeedForm>,
) -> Response {
    let title_deed = form.title_deed.trim().to_string();
    if title_deed.is_empty() {
        return Html(render_page("", None)).into_response();
    }

    match engine.resolve(&title_deed).await {
        Ok(outcome) => Html(render_page(&title_deed, Some(&outcome))).into_response(),
        Err(e) => {
            tracing::error!(
                "❌ Lookup for '{}' failed: {} (Category: {:?})",
                title_deed,
                e,
                e.category()
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_message_page(&title_deed, &e.user_friendly_message())),
            )
                .into_response()
        }
    }
}

pub async fn get_boundary<P: Pipeline + 'static>(
    State(engine): State<Arc<DeedEngine<P>>>,
    Query(req): Query<BoundaryQuery>,
) -> Result<Json<PlotReport>, (StatusCode, Json<ErrorResponse>)> {
    if req.title_deed.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing title_deed parameter".to_string(),
                reason: None,
            }),
        ));
    }

    match engine.run(&req.title_deed).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            let reason = e.failure_reason();
            let status = match reason {
                Some(FailureReason::ServerUnreachable) => StatusCode::BAD_GATEWAY,
                Some(FailureReason::NoCoordinates) => StatusCode::NOT_FOUND,
                Some(FailureReason::InvalidTitleDeed) => StatusCode::UNPROCESSABLE_ENTITY,
                None => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!("Boundary request for '{}' failed: {}", req.title_deed, e);

            Err((
                status,
                Json(ErrorResponse {
                    error: e.user_friendly_message(),
                    reason,
                }),
            ))
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
