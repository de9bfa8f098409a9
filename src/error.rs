//! Gateway error types and the JSON error envelope

use crate::aggregator::AggregatorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Errors that fail a search request
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("The query parameter is required")]
    MissingQuery,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error(transparent)]
    Aggregator(#[from] AggregatorError),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Aggregator(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error title used in the envelope's `error` field
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingQuery => "Missing required parameter: query",
            Self::Validation(_) => "Invalid request",
            Self::Unauthorized => "Unauthorized",
            Self::Aggregator(_) | Self::Internal(_) => "Internal server error",
        }
    }

    /// Build the envelope, with elapsed seconds for failures after work began
    pub fn envelope(&self, response_time: Option<f64>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.title().to_string(),
            message: self.to_string(),
            response_time,
        }
    }

    /// Attach elapsed time to the error response
    pub fn with_elapsed(self, response_time: f64) -> TimedError {
        TimedError {
            error: self,
            response_time: Some(response_time),
        }
    }
}

/// Error body returned on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// An error together with the time spent before it occurred
#[derive(Debug)]
pub struct TimedError {
    pub error: GatewayError,
    pub response_time: Option<f64>,
}

impl From<GatewayError> for TimedError {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            response_time: None,
        }
    }
}

impl IntoResponse for TimedError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!("Search failed: {}", self.error);
        }
        (status, Json(self.error.envelope(self.response_time))).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        TimedError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_envelope() {
        let err = GatewayError::MissingQuery;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let envelope = err.envelope(None);
        assert_eq!(envelope.error, "Missing required parameter: query");
        assert_eq!(envelope.message, "The query parameter is required");

        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("response_time").is_none());
    }

    #[test]
    fn test_aggregator_error_is_500_with_time() {
        let err = GatewayError::from(AggregatorError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let timed = err.with_elapsed(0.25);
        let envelope = timed.error.envelope(timed.response_time);
        assert_eq!(envelope.error, "Internal server error");
        assert!(envelope.message.contains("502"));
        assert_eq!(envelope.response_time, Some(0.25));
    }
}
