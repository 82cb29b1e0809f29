//! API error responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cpamm_quote_domain::{ErrorKind, QuoteError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind, e.g. `POOL_NOT_FOUND`.
    pub kind: String,
    pub message: String,
}

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A quoting operation failed.
    #[error(transparent)]
    Quote(#[from] QuoteError),
    /// The request could not be parsed.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Quote(e) => match e.kind() {
                ErrorKind::PoolNotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidPath | ErrorKind::InvalidAmounts | ErrorKind::MinimumNotMet => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::InsufficientLiquidity | ErrorKind::ZeroLiquidity => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::ContractError => StatusCode::BAD_GATEWAY,
                ErrorKind::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Quote(e) => e.kind().as_str(),
            Self::BadRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed upstream");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            kind: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
