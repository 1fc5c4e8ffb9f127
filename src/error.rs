//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generation-time failures. Always fatal: a bad declaration is a build
/// defect, never a runtime-recoverable condition.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("entity {entity}: {shape} has no persisted fields")]
    EmptyShape { entity: String, shape: String },
    #[error("entity {entity}: column '{column}' mapped by more than one {shape} field")]
    DuplicateColumn {
        entity: String,
        shape: String,
        column: String,
    },
    #[error("entity {entity}: field '{field}' has unknown type '{ty}'")]
    UnknownType {
        entity: String,
        field: String,
        ty: String,
    },
    #[error("entity {entity}: primary key '{field}' is not a persisted entity field")]
    MissingPrimaryKey { entity: String, field: String },
    #[error("declaration load: {0}")]
    Load(String),
}

/// Runtime error taxonomy. Backend-native codes are translated into this
/// exactly once, in the `From<sqlx::Error>` impl below; upper layers never
/// inspect backend codes directly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("canceled: {0}")]
    Canceled(&'static str),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Error::NotFound("row".into()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                Error::Conflict(db.message().to_string())
            }
            _ => Error::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Unsupported(_) => (StatusCode::NOT_IMPLEMENTED, "not_implemented"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Error::Canceled(_) => (StatusCode::GATEWAY_TIMEOUT, "canceled"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        // Server faults keep their detail in logs only.
        let message = match &self {
            Error::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal error".to_string()
            }
            Error::Canceled(op) => {
                tracing::error!(operation = %op, "operation canceled");
                "operation canceled".to_string()
            }
            _ => self.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
