//! HTTP-facing error type. Subsystem errors (`RunError`, `ModelError`,
//! `StoreError`) are degraded before they reach a handler; only lookups and
//! input validation surface as non-2xx responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),
  #[error("{0}")]
  InvalidInput(String),
}

#[derive(Serialize)]
struct ErrorBody {
  error: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorBody { error: self.to_string() })).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn not_found_is_404_with_json_body() {
    let res = ApiError::NotFound("Pattern not found".into()).into_response();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let v: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(v["error"], "Pattern not found");
  }

  #[test]
  fn invalid_input_is_400() {
    let res = ApiError::InvalidInput("No code provided".into()).into_response();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }
}
