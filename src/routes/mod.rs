use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod recommendations;
pub mod top_tracks;
pub mod user;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
