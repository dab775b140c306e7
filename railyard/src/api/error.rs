//! Gateway error responses.
//!
//! Library errors map onto HTTP status codes with a `{"detail": ...}` body.

use crate::arrival::ArrivalError;
use crate::catalog::CatalogError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// An error response: status code plus human-readable detail.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            detail: detail.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "Internal server error.".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateName(_) => Self::conflict(err.to_string()),
            CatalogError::NegativeDuration(_) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: err.to_string(),
            },
            other => {
                error!(error = %other, "Catalog failure while serving a request");
                Self::internal()
            }
        }
    }
}

impl From<ArrivalError> for ApiError {
    fn from(err: ArrivalError) -> Self {
        match err {
            ArrivalError::StationNotFound(_) | ArrivalError::LocomotiveNotFound(_) => {
                Self::not_found(err.to_string())
            }
            ArrivalError::Conflict { .. } => Self::conflict(err.to_string()),
            ArrivalError::QueueUnavailable => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: err.to_string(),
            },
            ArrivalError::Catalog(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let api_err: ApiError = ArrivalError::StationNotFound(1000).into();
        assert_eq!(api_err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_mapping() {
        let api_err: ApiError = ArrivalError::Conflict {
            locomotive: "Locomotive 0".into(),
            station: "Station 0".into(),
        }
        .into();
        assert_eq!(api_err.status(), StatusCode::CONFLICT);

        let api_err: ApiError = CatalogError::DuplicateName("Warsaw East".into()).into();
        assert_eq!(api_err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_negative_duration_mapping() {
        let api_err: ApiError = CatalogError::NegativeDuration("arrival_duration").into();
        assert_eq!(api_err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api_err.detail,
            "Duration arrival_duration must be non-negative."
        );
    }

    #[test]
    fn test_queue_unavailable_mapping() {
        let api_err: ApiError = ArrivalError::QueueUnavailable.into();
        assert_eq!(api_err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_hides_detail() {
        let api_err = ApiError::internal();
        assert_eq!(api_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.detail, "Internal server error.");
    }
}
