//! Client repository for client database operations.

use chrono::{DateTime, Utc};
use printdesk_shared::types::id::ClientId;
use printdesk_shared::types::money::round_money;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{clients, orders, payments, sea_orm_active_enums::ClientType};

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found.
    #[error("Client not found: {0}")]
    NotFound(Uuid),

    /// Client still has orders on the books.
    #[error("Client {0} has orders on the books")]
    HasOrders(Uuid),

    /// Client still has payments on the books.
    #[error("Client {0} has payments on the books")]
    HasPayments(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    /// Client name.
    pub name: String,
    /// School or dealer.
    pub client_type: ClientType,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Balance carried forward from before the system (debit-positive).
    pub opening_balance: Decimal,
}

/// Input for updating a client.
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub client_type: Option<ClientType>,
    /// New phone.
    pub phone: Option<Option<String>>,
    /// New email.
    pub email: Option<Option<String>>,
    /// New address.
    pub address: Option<Option<String>>,
    /// Corrected opening balance.
    pub opening_balance: Option<Decimal>,
}

/// Filter options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Filter by type.
    pub client_type: Option<ClientType>,
    /// Substring match on the name.
    pub search: Option<String>,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `Database` on insert failure.
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<clients::Model, ClientError> {
        let now: DateTime<Utc> = Utc::now();
        let client = clients::ActiveModel {
            id: Set(ClientId::new().into_inner()),
            name: Set(input.name),
            client_type: Set(input.client_type),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            opening_balance: Set(round_money(input.opening_balance)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(client.insert(&self.db).await?)
    }

    /// Fetches one client.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist.
    pub async fn get_client(&self, client_id: ClientId) -> Result<clients::Model, ClientError> {
        let id = client_id.into_inner();
        clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(id))
    }

    /// Lists clients alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_clients(
        &self,
        filter: ClientFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<clients::Model>, ClientError> {
        let mut query = clients::Entity::find();
        if let Some(client_type) = filter.client_type {
            query = query.filter(clients::Column::ClientType.eq(client_type));
        }
        if let Some(search) = &filter.search {
            query = query.filter(clients::Column::Name.contains(search));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(clients::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Updates a client.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist.
    pub async fn update_client(
        &self,
        client_id: ClientId,
        input: UpdateClientInput,
    ) -> Result<clients::Model, ClientError> {
        let client = self.get_client(client_id).await?;

        let mut active: clients::ActiveModel = client.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(client_type) = input.client_type {
            active.client_type = Set(client_type);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(opening_balance) = input.opening_balance {
            active.opening_balance = Set(round_money(opening_balance));
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a client.
    ///
    /// Refused while orders or payments reference the client; the books must
    /// not lose the counterparty of recorded money movements. Role
    /// enforcement (admin only) happens at the API layer.
    ///
    /// # Errors
    ///
    /// Returns `HasOrders` / `HasPayments` while referenced, `NotFound`
    /// otherwise.
    pub async fn delete_client(&self, client_id: ClientId) -> Result<(), ClientError> {
        let id = client_id.into_inner();

        let order_count = orders::Entity::find()
            .filter(orders::Column::ClientId.eq(id))
            .count(&self.db)
            .await?;
        if order_count > 0 {
            return Err(ClientError::HasOrders(id));
        }

        let payment_count = payments::Entity::find()
            .filter(payments::Column::ClientId.eq(id))
            .count(&self.db)
            .await?;
        if payment_count > 0 {
            return Err(ClientError::HasPayments(id));
        }

        let result = clients::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ClientError::NotFound(id));
        }

        tracing::info!(client_id = %id, "client deleted");
        Ok(())
    }
}
