use crate::utils::error::FailureReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct DeedForm {
    #[serde(default)]
    pub title_deed: String,
}

#[derive(Debug, Deserialize)]
pub struct BoundaryQuery {
    pub title_deed: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
