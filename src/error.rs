//! Application error taxonomy and HTTP rendering.
//!
//! Every public operation surfaces one of these kinds; handlers convert them
//! into a structured JSON body via [`IntoResponse`]. Database uniqueness
//! violations are translated into the matching domain conflict by
//! [`map_sqlx_error`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Structured application error.
///
/// Each variant carries a human-readable message plus machine-readable
/// details. The variant set mirrors the failure kinds of the link registry,
/// lifecycle coordinator, and referral workflow.
#[derive(Debug)]
pub enum AppError {
    /// Malformed input (bad URL, invalid alias, bad day delta).
    Validation { message: String, details: Value },
    /// Missing link, request, or account.
    NotFound { message: String, details: Value },
    /// Short id already taken on create/rename/approve.
    AliasConflict { message: String, details: Value },
    /// Another link of the same owner already targets that URL.
    TargetConflict { message: String, details: Value },
    /// Requester already has a pending referral request for the link.
    DuplicatePending { message: String, details: Value },
    /// Missing or invalid credential (token or password).
    Unauthorized { message: String, details: Value },
    /// Authenticated but not the resource owner.
    Forbidden { message: String, details: Value },
    /// A multi-row cascade failed and was rolled back completely.
    TransactionAborted { message: String, details: Value },
    /// Unexpected infrastructure failure.
    Internal { message: String, details: Value },
}

macro_rules! ctor {
    ($name:ident, $variant:ident) => {
        pub fn $name(message: impl Into<String>, details: Value) -> Self {
            Self::$variant {
                message: message.into(),
                details,
            }
        }
    };
}

impl AppError {
    ctor!(bad_request, Validation);
    ctor!(not_found, NotFound);
    ctor!(alias_conflict, AliasConflict);
    ctor!(target_conflict, TargetConflict);
    ctor!(duplicate_pending, DuplicatePending);
    ctor!(unauthorized, Unauthorized);
    ctor!(forbidden, Forbidden);
    ctor!(transaction_aborted, TransactionAborted);
    ctor!(internal, Internal);

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::AliasConflict { .. } => "alias_conflict",
            AppError::TargetConflict { .. } => "target_conflict",
            AppError::DuplicatePending { .. } => "duplicate_pending",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Forbidden { .. } => "forbidden",
            AppError::TransactionAborted { .. } => "transaction_aborted",
            AppError::Internal { .. } => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AliasConflict { .. }
            | AppError::TargetConflict { .. }
            | AppError::DuplicatePending { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::TransactionAborted { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_parts(self) -> (StatusCode, &'static str, String, Value) {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::AliasConflict { message, details }
            | AppError::TargetConflict { message, details }
            | AppError::DuplicatePending { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Forbidden { message, details }
            | AppError::TransactionAborted { message, details }
            | AppError::Internal { message, details } => (message, details),
        };
        (status, code, message, details)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::AliasConflict { message, .. }
            | AppError::TargetConflict { message, .. }
            | AppError::DuplicatePending { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::TransactionAborted { message, .. }
            | AppError::Internal { message, .. } => message,
        };
        write!(f, "{}: {}", self.code(), message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.into_parts();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code, %message, "request failed");
        }

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(&e).unwrap_or_else(|_| json!({})),
        )
    }
}

/// Translates database errors into domain errors.
///
/// Unique-constraint violations map onto the conflict kind owned by the
/// violated index; everything else is an internal error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("links_short_id_key") => AppError::alias_conflict(
                    "Short id already in use",
                    json!({ "constraint": "links_short_id_key" }),
                ),
                Some("links_owner_target_key") => AppError::target_conflict(
                    "Owner already has a link for this target URL",
                    json!({ "constraint": "links_owner_target_key" }),
                ),
                Some("referral_requests_pending_key") => AppError::duplicate_pending(
                    "A pending referral request already exists for this link",
                    json!({ "constraint": "referral_requests_pending_key" }),
                ),
                constraint => {
                    AppError::internal("Unique constraint violation", json!({ "constraint": constraint }))
                }
            };
        }
    }

    tracing::error!(error = %e, "database error");
    AppError::internal("Database error", json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::alias_conflict("taken", json!({}));
        assert_eq!(err.code(), "alias_conflict");

        let err = AppError::duplicate_pending("dup", json!({}));
        assert_eq!(err.code(), "duplicate_pending");

        let err = AppError::transaction_aborted("rolled back", json!({}));
        assert_eq!(err.code(), "transaction_aborted");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::target_conflict("x", json!({})).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::forbidden("x", json!({})).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = AppError::not_found("Short link not found", json!({ "short_id": "abc" }));
        let rendered = err.to_string();
        assert!(rendered.contains("not_found"));
        assert!(rendered.contains("Short link not found"));
    }

    #[test]
    fn test_row_not_found_maps_to_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
