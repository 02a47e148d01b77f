use crate::config::ConfigError;
use crate::engine::{RecalcError, WeightUpdateError};
use crate::ingest::IngestError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Ingest(IngestError),
    Weights(WeightUpdateError),
    Recalc(RecalcError),
    Store(StoreError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Ingest(err) => write!(f, "ingestion error: {}", err),
            AppError::Weights(err) => write!(f, "weight update error: {}", err),
            AppError::Recalc(err) => write!(f, "recalculation error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Ingest(err) => Some(err),
            AppError::Weights(err) => Some(err),
            AppError::Recalc(err) => Some(err),
            AppError::Store(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Batch rejections carry their full per-row payload to the caller;
        // everything else collapses to an error string.
        if let AppError::Ingest(IngestError::Rejected(rejection)) = &self {
            let body = Json(json!({
                "success": false,
                "message": rejection.message,
                "errors": rejection.errors,
                "valid_rows": rejection.valid_rows,
                "total_rows": rejection.total_rows,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = match &self {
            AppError::Ingest(_) | AppError::Weights(WeightUpdateError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Weights(_)
            | AppError::Recalc(_)
            | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<WeightUpdateError> for AppError {
    fn from(value: WeightUpdateError) -> Self {
        Self::Weights(value)
    }
}

impl From<RecalcError> for AppError {
    fn from(value: RecalcError) -> Self {
        Self::Recalc(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
