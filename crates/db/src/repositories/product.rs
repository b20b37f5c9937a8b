//! Product catalog repository.

use chrono::{DateTime, Utc};
use printdesk_shared::types::id::ProductId;
use printdesk_shared::types::money::round_money;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::products;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Product not found.
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Optional category.
    pub category: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Pricing unit label.
    pub unit: String,
}

/// Input for updating a product.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<Option<String>>,
    /// New unit price.
    pub unit_price: Option<Decimal>,
    /// New unit label.
    pub unit: Option<String>,
    /// Activate or retire the product.
    pub is_active: Option<bool>,
}

/// Filter options for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Filter by category.
    pub category: Option<String>,
    /// Only active products.
    pub active_only: bool,
}

/// Product repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns `Database` on insert failure.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, ProductError> {
        let now: DateTime<Utc> = Utc::now();
        let product = products::ActiveModel {
            id: Set(ProductId::new().into_inner()),
            name: Set(input.name),
            category: Set(input.category),
            unit_price: Set(round_money(input.unit_price)),
            unit: Set(input.unit),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(product.insert(&self.db).await?)
    }

    /// Fetches one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub async fn get_product(&self, product_id: ProductId) -> Result<products::Model, ProductError> {
        let id = product_id.into_inner();
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Lists products alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<products::Model>, ProductError> {
        let mut query = products::Entity::find();
        if let Some(category) = &filter.category {
            query = query.filter(products::Column::Category.eq(category));
        }
        if filter.active_only {
            query = query.filter(products::Column::IsActive.eq(true));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(products::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Updates a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub async fn update_product(
        &self,
        product_id: ProductId,
        input: UpdateProductInput,
    ) -> Result<products::Model, ProductError> {
        let product = self.get_product(product_id).await?;

        let mut active: products::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(unit_price) = input.unit_price {
            active.unit_price = Set(round_money(unit_price));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a product. Orders copy item data at entry, so this never
    /// dangles a reference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), ProductError> {
        let id = product_id.into_inner();
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }
}
