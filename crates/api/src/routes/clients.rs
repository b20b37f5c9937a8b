//! Client endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::routes::{app_error_response, error_response, internal_error};
use printdesk_shared::AppError;
use printdesk_db::ClientRepository;
use printdesk_db::entities::{clients, sea_orm_active_enums::ClientType};
use printdesk_db::repositories::client::{
    ClientError, ClientFilter, CreateClientInput, UpdateClientInput,
};
use printdesk_shared::types::id::ClientId;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};

/// Client as returned to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    /// Client ID.
    pub id: Uuid,
    /// Client name.
    pub name: String,
    /// "School" or "Dealer".
    pub client_type: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Carried-forward balance (debit-positive).
    pub opening_balance: Decimal,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

impl From<clients::Model> for ClientResponse {
    fn from(model: clients::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            client_type: client_type_label(&model.client_type).to_string(),
            phone: model.phone,
            email: model.email,
            address: model.address,
            opening_balance: model.opening_balance,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Request body for creating a client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    /// Client name.
    pub name: String,
    /// "School" or "Dealer".
    pub client_type: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Carried-forward balance; defaults to zero.
    pub opening_balance: Option<Decimal>,
}

/// Request body for updating a client.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub client_type: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// Corrected opening balance.
    pub opening_balance: Option<Decimal>,
}

/// Query parameters for listing clients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    /// Filter by type.
    pub client_type: Option<String>,
    /// Substring match on the name.
    pub search: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Creates client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// GET /clients - List clients alphabetically.
async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Response {
    let client_type = match query.client_type.as_deref() {
        Some(raw) => match parse_client_type(raw) {
            Some(client_type) => Some(client_type),
            None => return invalid_client_type(raw),
        },
        None => None,
    };

    let repo = ClientRepository::new((*state.db).clone());
    let filter = ClientFilter {
        client_type,
        search: query.search,
    };

    match repo.list_clients(filter, &query.page).await {
        Ok(page) => {
            let page = PageResponse {
                data: page
                    .data
                    .into_iter()
                    .map(ClientResponse::from)
                    .collect::<Vec<_>>(),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            };
            Json(page).into_response()
        }
        Err(e) => client_error_response(&e),
    }
}

/// GET /clients/{id} - Fetch one client.
async fn get_client(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ClientRepository::new((*state.db).clone());
    match repo.get_client(ClientId::from_uuid(id)).await {
        Ok(client) => Json(ClientResponse::from(client)).into_response(),
        Err(e) => client_error_response(&e),
    }
}

/// POST /clients - Create a client.
async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Response {
    let Some(client_type) = parse_client_type(&payload.client_type) else {
        return invalid_client_type(&payload.client_type);
    };

    let repo = ClientRepository::new((*state.db).clone());
    let input = CreateClientInput {
        name: payload.name,
        client_type,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        opening_balance: payload.opening_balance.unwrap_or_default(),
    };

    match repo.create_client(input).await {
        Ok(client) => (StatusCode::CREATED, Json(ClientResponse::from(client))).into_response(),
        Err(e) => client_error_response(&e),
    }
}

/// PUT /clients/{id} - Update a client.
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> Response {
    let client_type = match payload.client_type.as_deref() {
        Some(raw) => match parse_client_type(raw) {
            Some(client_type) => Some(client_type),
            None => return invalid_client_type(raw),
        },
        None => None,
    };

    let repo = ClientRepository::new((*state.db).clone());
    let input = UpdateClientInput {
        name: payload.name,
        client_type,
        phone: payload.phone.map(Some),
        email: payload.email.map(Some),
        address: payload.address.map(Some),
        opening_balance: payload.opening_balance,
    };

    match repo.update_client(ClientId::from_uuid(id), input).await {
        Ok(client) => Json(ClientResponse::from(client)).into_response(),
        Err(e) => client_error_response(&e),
    }
}

/// DELETE /clients/{id} - Delete a client. Admin only; refused while orders
/// or payments still reference the client.
async fn delete_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if !auth.is_admin() {
        return error_response(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Deleting clients requires the admin role",
        );
    }

    let repo = ClientRepository::new((*state.db).clone());
    match repo.delete_client(ClientId::from_uuid(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => client_error_response(&e),
    }
}

fn parse_client_type(raw: &str) -> Option<ClientType> {
    match raw.to_lowercase().as_str() {
        "school" => Some(ClientType::School),
        "dealer" => Some(ClientType::Dealer),
        _ => None,
    }
}

const fn client_type_label(client_type: &ClientType) -> &'static str {
    match client_type {
        ClientType::School => "School",
        ClientType::Dealer => "Dealer",
    }
}

fn invalid_client_type(raw: &str) -> Response {
    app_error_response(&AppError::Validation(format!("Unknown client type: {raw}")))
}

fn client_error_response(err: &ClientError) -> Response {
    match err {
        ClientError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "client_not_found", &err.to_string())
        }
        ClientError::HasOrders(_) | ClientError::HasPayments(_) => {
            error_response(StatusCode::CONFLICT, "client_in_use", &err.to_string())
        }
        ClientError::Database(_) => internal_error(err),
    }
}
