//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use printdesk_core::reconcile::ReconcileError;
use printdesk_shared::AppError;
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod ledger;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(clients::routes())
        .merge(orders::routes())
        .merge(payments::routes())
        .merge(ledger::routes())
        .merge(products::routes())
        .merge(expenses::routes())
        .merge(dashboard::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Builds a JSON error body in the shape every endpoint uses.
pub(crate) fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

/// Maps a reconciliation error onto its HTTP response.
///
/// The status comes from the error itself so the mapping cannot drift per
/// endpoint; retryable conflicts additionally tell the client to try again.
pub(crate) fn reconcile_error_response(err: &ReconcileError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "reconciliation failure");
    }
    let mut body = json!({
        "error": err.error_code(),
        "message": err.to_string(),
    });
    if err.is_retryable() {
        body["retryable"] = json!(true);
    }
    (status, Json(body)).into_response()
}

/// Maps a shared application error onto the standard JSON error shape.
///
/// Server-side failures are logged here and answered with an opaque message;
/// client errors carry the error's own message.
pub(crate) fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
        return error_response(status, err.error_code(), "An internal error occurred");
    }
    error_response(status, err.error_code(), &err.to_string())
}

/// Maps an unexpected database error onto a 500 without leaking details.
pub(crate) fn internal_error(err: &dyn std::fmt::Display) -> Response {
    app_error_response(&AppError::Internal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_response_status_mapping() {
        assert_eq!(
            app_error_response(&AppError::Validation("bad value".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            app_error_response(&AppError::Forbidden("staff".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            internal_error(&"boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
