#![cfg(feature = "server")]

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::*;
use deed_plot::api::create_router;
use httpmock::prelude::*;
use std::sync::Arc;
use tower::ServiceExt;

fn router(server: &MockServer) -> axum::Router {
    create_router(Arc::new(engine_for(server)))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_shows_form() {
    let server = MockServer::start();
    let response = router(&server)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form method=\"post\""));
    assert!(!html.contains("id=\"map\""));
}

#[tokio::test]
async fn test_form_submission_renders_map() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path(CERTIFICATE_PATH);
        then.status(200).body(certificate_page(&reference_rows()));
    });

    let response = router(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title_deed=AK%2F1234%2F05"))
                .unwrap(),
        )
        .await
        .unwrap();

    page.assert();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("status ok"));
    assert!(html.contains("id=\"map\""));
    assert!(html.contains("value=\"AK/1234/05\""));
}

#[tokio::test]
async fn test_form_submission_shows_failure_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en-us/certificate/999");
        then.status(503);
    });

    let response = router(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title_deed=999"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("There is a problem reaching the land registry server"));
    assert!(!html.contains("id=\"map\""));
}

#[tokio::test]
async fn test_form_submission_with_out_of_range_row_shows_reason() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en-us/certificate/far");
        then.status(200)
            .body(certificate_page(&[("99999999999.0", "5.0")]));
    });

    let response = router(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title_deed=far"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No valid coordinates were found for this title deed."));
}

#[tokio::test]
async fn test_blank_form_submission_does_not_fetch() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let response = router(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title_deed=+++"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    any.assert_hits(0);
}

#[tokio::test]
async fn test_api_boundary_returns_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(CERTIFICATE_PATH);
        then.status(200).body(certificate_page(&reference_rows()));
    });

    let response = router(&server)
        .oneshot(
            Request::builder()
                .uri("/api/boundary?title_deed=AK%2F1234%2F05")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["title_deed"], "AK/1234/05");
    assert_eq!(json["raw_point_count"], 3);
    assert_eq!(json["ring"]["points"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_api_boundary_error_statuses() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en-us/certificate/down");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/en-us/certificate/empty");
        then.status(200).body(certificate_page(&[]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/en-us/certificate/bogus");
        then.status(200).body("<html><p>Not found</p></html>");
    });

    let cases = [
        ("down", StatusCode::BAD_GATEWAY, "server_unreachable"),
        ("empty", StatusCode::NOT_FOUND, "no_coordinates"),
        ("bogus", StatusCode::UNPROCESSABLE_ENTITY, "invalid_title_deed"),
    ];

    for (deed, status, reason) in cases {
        let response = router(&server)
            .oneshot(
                Request::builder()
                    .uri(format!("/api/boundary?title_deed={}", deed))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), status, "deed {}", deed);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["reason"], reason);
    }
}

#[tokio::test]
async fn test_api_boundary_requires_title_deed() {
    let server = MockServer::start();
    let response = router(&server)
        .oneshot(
            Request::builder()
                .uri("/api/boundary?title_deed=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start();
    let response = router(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}
