use axum::{
    extract::rejection::{JsonDataError, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::form::SubmitError;
use crate::schema::{ValidationError, FIELDS};
use crate::store::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Request the extractor could not read at all (bad syntax, wrong
    /// content type).
    #[error("Rejected request: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => AppError::Validation(e),
            SubmitError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => AppError::Validation(body_field_error(&err)),
            other => AppError::Rejected {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(ValidationError::new("query", rejection.body_text()))
    }
}

/// Names the form field a body failed to deserialize on, when the serde
/// path points at one.
fn body_field_error(err: &JsonDataError) -> ValidationError {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(e) = cause.downcast_ref::<serde_path_to_error::Error<serde_json::Error>>() {
            let path = e.path().to_string();
            let field = FIELDS
                .iter()
                .copied()
                .find(|f| *f == path)
                .unwrap_or("body");
            return ValidationError::new(field, e.inner().to_string());
        }
        source = cause.source();
    }
    ValidationError::new("body", err.body_text())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, field) = match &self {
            AppError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.message.clone(),
                Some(e.field),
            ),
            AppError::Persistence(e) => {
                tracing::error!(error = %e, "Log store error");
                let status = match e {
                    PersistenceError::Connection(_) | PersistenceError::Authentication(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    PersistenceError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, "Could not reach the health log store".into(), None)
            }
            AppError::Rejected { status, message } => (*status, message.clone(), None),
        };

        let mut error = json!({
            "message": message,
            "code": status.as_u16(),
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
