use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::store::StoreError;

/// Field name → list of human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error type returned by every handler and extractor.
///
/// The Display impl is only logged; the client sees the body built in
/// [`IntoResponse`], which never carries internal details.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("json error: {0}")]
    Json(#[from] JsonRejection),
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("permission denied")]
    PermissionDenied,
    #[error("not found")]
    NotFound,
    #[error("{field} already taken")]
    Conflict { field: &'static str, message: String },
    #[error("store error: {0}")]
    Store(StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(..) | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::Json(rejection) => match rejection {
                JsonRejection::MissingJsonContentType(..) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::AuthenticationRequired | Self::InvalidToken(..) | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(..) | Self::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(fields) => json!(fields),
            Self::Conflict { field, message } => {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!([message]));
                Value::Object(body)
            }
            Self::Json(rejection) => json!({ "detail": rejection.body_text() }),
            Self::AuthenticationRequired => {
                json!({ "detail": "Authentication credentials were not provided." })
            }
            Self::InvalidToken(..) => json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid",
            }),
            Self::InvalidCredentials => {
                json!({ "detail": "No active account found with the given credentials" })
            }
            Self::PermissionDenied => {
                json!({ "detail": "You do not have permission to perform this action." })
            }
            Self::NotFound => json!({ "detail": "Not found." }),
            Self::Store(..) | Self::Internal(..) => json!({ "detail": "Internal server error." }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if let Self::InvalidToken(reason) = &self {
            warn!(%reason, "token rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { field } => Self::Conflict {
                field,
                message: format!("A user with that {field} already exists."),
            },
            other => Self::Store(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self::Validation(fields)
    }
}

// `/blogs/abc/` is an unknown resource, not a malformed request.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound
    }
}
