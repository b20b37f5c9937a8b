//! User management endpoints (admin) and the current-user lookup.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::routes::auth::UserInfo;
use crate::routes::{app_error_response, error_response, internal_error};
use printdesk_shared::AppError;
use printdesk_core::auth::{UserRole, hash_password};
use printdesk_db::repositories::user::{CreateUserInput, UserError};
use printdesk_db::UserRepository;
use printdesk_shared::types::id::UserId;

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email, unique.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role name (`admin`, `manager`, `staff`).
    pub role: String,
    /// Initial password.
    pub password: String,
}

/// Creates user management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(me))
}

/// GET /users/me - The authenticated user's profile.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Response {
    let repo = UserRepository::new((*state.db).clone());
    match repo.get_user(UserId::from_uuid(auth.user_id())).await {
        Ok(user) => Json(user_info(user)).into_response(),
        Err(UserError::NotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            "user_not_found",
            "User no longer exists",
        ),
        Err(e) => internal_error(&e),
    }
}

/// GET /users - List all users. Admin only.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> Response {
    if !auth.is_admin() {
        return admin_only();
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.list_users().await {
        Ok(users) => {
            let users: Vec<UserInfo> = users.into_iter().map(user_info).collect();
            Json(users).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// POST /users - Create a user. Admin only.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Response {
    if !auth.is_admin() {
        return admin_only();
    }

    let Ok(role) = UserRole::from_str(&payload.role) else {
        return app_error_response(&AppError::Validation(format!(
            "Unknown role: {}",
            payload.role
        )));
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => return internal_error(&e),
    };

    let repo = UserRepository::new((*state.db).clone());
    match repo
        .create_user(CreateUserInput {
            email: payload.email,
            full_name: payload.full_name,
            role,
            password_hash,
        })
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user_info(user))).into_response(),
        Err(UserError::EmailTaken(email)) => error_response(
            StatusCode::CONFLICT,
            "email_taken",
            &format!("Email already registered: {email}"),
        ),
        Err(e) => internal_error(&e),
    }
}

fn user_info(user: printdesk_db::entities::users::Model) -> UserInfo {
    let role: UserRole = user.role.into();
    UserInfo {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role: role.to_string(),
    }
}

fn admin_only() -> Response {
    error_response(
        StatusCode::FORBIDDEN,
        "forbidden",
        "This action requires the admin role",
    )
}
