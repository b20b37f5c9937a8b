//! Login endpoint issuing JWT access tokens.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_response, internal_error};
use printdesk_core::auth::verify_password;
use printdesk_db::UserRepository;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password, verified against the stored hash.
    pub password: String,
}

/// Authenticated user info returned with the token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role name.
    pub role: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: &'static str,
    /// The authenticated user.
    pub user: UserInfo,
}

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login - Authenticate a user and return an access token.
///
/// Unknown email and wrong password return the same response, so the endpoint
/// does not reveal which emails exist.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!(email = %payload.email, "login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => return internal_error(&e),
    };

    if !user.is_active {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "account_disabled",
            "This account has been disabled",
        );
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "failed login attempt");
            return invalid_credentials();
        }
        Err(e) => return internal_error(&e),
    }

    let role: printdesk_core::auth::UserRole = user.role.clone().into();
    let token = match state
        .jwt_service
        .generate_access_token(user.id, &role.to_string())
    {
        Ok(token) => token,
        Err(e) => return internal_error(&e),
    };

    info!(user_id = %user.id, "user logged in");
    Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: role.to_string(),
        },
    })
    .into_response()
}

fn invalid_credentials() -> axum::response::Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "Invalid email or password",
    )
}
