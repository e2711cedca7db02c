//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};
use order_store::StoreError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),

    /// One or more request fields failed validation.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Validation failed", "details": details }),
            ),
            ApiError::Domain(err) => {
                let (status, message) = domain_error_to_response(err);
                (status, serde_json::json!({ "error": message }))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Order(order_err) => match order_err {
            OrderError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            OrderError::IllegalTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
            OrderError::CodeGenerationExhausted { .. } => {
                tracing::error!(error = %err, "tracking code space exhausted");
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
        },
        DomainError::Store(StoreError::StatusConflict { .. })
        | DomainError::Store(StoreError::DuplicateCode { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Store(_) => {
            tracing::error!(error = %err, "order store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use common::{OrderId, OrderStatus};

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_order_errors_map_to_status_codes() {
        assert_eq!(
            status_of(DomainError::from(OrderError::NotFound(OrderId::new())).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                DomainError::from(OrderError::IllegalTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Completed,
                })
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                DomainError::from(OrderError::CodeGenerationExhausted { attempts: 10 }).into()
            ),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_errors_map_to_status_codes() {
        assert_eq!(
            status_of(
                DomainError::from(StoreError::StatusConflict {
                    order_id: OrderId::new(),
                    expected: OrderStatus::Pending,
                    actual: OrderStatus::Verification,
                })
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::from(StoreError::InvalidRow("bad".to_string())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        assert_eq!(
            status_of(ApiError::Validation(vec!["name is required".to_string()])),
            StatusCode::BAD_REQUEST
        );
    }
}
