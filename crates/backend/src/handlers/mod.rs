use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub mod a001_category;
pub mod a002_product;
pub mod a003_review;
pub mod permission;

pub type ApiError = (StatusCode, Json<Value>);

/// Ошибка в формате `{"detail": "..."}`.
pub fn api_error(status: StatusCode, detail: &str) -> ApiError {
    (status, Json(json!({ "detail": detail })))
}

pub fn internal_error(err: anyhow::Error) -> ApiError {
    tracing::error!("Internal error: {:#}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
