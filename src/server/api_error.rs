//! Error taxonomy of the HTTP layer and its mapping to responses.

use crate::catalog_store::{EntityKind, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ApiError {
    /// A path parameter that must be an integer was not one, or did not fit.
    #[error("invalid {param}: '{value}' {problem}")]
    Validation {
        param: &'static str,
        value: String,
        problem: &'static str,
    },
    /// The lookup ran and matched nothing.
    #[error("{0} not found")]
    NotFound(EntityKind),
    /// The data access layer failed.
    #[error("{0}")]
    DataAccess(#[from] StoreError),
    /// No route matches the request's method and path.
    #[error("route not found")]
    RouteNotFound,
    /// The request ran past the configured timeout and was aborted.
    #[error("request timed out")]
    Timeout,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::DataAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!("Request failed: {}", message);
        } else {
            debug!("Request rejected ({}): {}", status.as_u16(), message);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Parse an integer path parameter, rejecting anything else before it can
/// reach the data access layer.
pub fn parse_int_param<T>(param: &'static str, raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseIntError>,
{
    raw.parse::<T>().map_err(|err| ApiError::Validation {
        param,
        value: raw.to_string(),
        problem: match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => "is out of range",
            _ => "is not an integer",
        },
    })
}
