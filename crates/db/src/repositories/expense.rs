//! Expense repository for shop running costs.

use chrono::{DateTime, Utc};
use printdesk_core::reconcile::PaymentMode;
use printdesk_shared::types::id::ExpenseId;
use printdesk_shared::types::money::round_money;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::expenses;

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Expense amount must be positive.
    #[error("Expense amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense category (toner, paper, rent, ...).
    pub category: String,
    /// Amount spent.
    pub amount: Decimal,
    /// What it was for.
    pub description: Option<String>,
    /// How it was paid.
    pub payment_method: PaymentMode,
    /// Optional receipt/bill reference.
    pub reference_number: Option<String>,
    /// Date of the expense.
    pub expense_date: DateTime<Utc>,
}

/// Input for updating an expense.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New category.
    pub category: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New payment method.
    pub payment_method: Option<PaymentMode>,
    /// New reference number.
    pub reference_number: Option<Option<String>>,
    /// New expense date.
    pub expense_date: Option<DateTime<Utc>>,
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Filter by category.
    pub category: Option<String>,
    /// Expenses on or after this date.
    pub date_from: Option<DateTime<Utc>>,
    /// Expenses on or before this date.
    pub date_to: Option<DateTime<Utc>>,
}

/// Expense repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount.
    pub async fn create_expense(
        &self,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let amount = round_money(input.amount);
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::InvalidAmount(input.amount));
        }

        let now: DateTime<Utc> = Utc::now();
        let expense = expenses::ActiveModel {
            id: Set(ExpenseId::new().into_inner()),
            category: Set(input.category),
            amount: Set(amount),
            description: Set(input.description),
            payment_method: Set(input.payment_method.into()),
            reference_number: Set(input.reference_number),
            expense_date: Set(input.expense_date.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(expense.insert(&self.db).await?)
    }

    /// Fetches one expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist.
    pub async fn get_expense(&self, expense_id: ExpenseId) -> Result<expenses::Model, ExpenseError> {
        let id = expense_id.into_inner();
        expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))
    }

    /// Lists expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_expenses(
        &self,
        filter: ExpenseFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<expenses::Model>, ExpenseError> {
        let mut query = expenses::Entity::find();
        if let Some(category) = &filter.category {
            query = query.filter(expenses::Column::Category.eq(category));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(expenses::Column::ExpenseDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Updates an expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidAmount`.
    pub async fn update_expense(
        &self,
        expense_id: ExpenseId,
        input: UpdateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let expense = self.get_expense(expense_id).await?;

        let new_amount = match input.amount {
            Some(amount) => {
                let rounded = round_money(amount);
                if rounded <= Decimal::ZERO {
                    return Err(ExpenseError::InvalidAmount(amount));
                }
                Some(rounded)
            }
            None => None,
        };

        let mut active: expenses::ActiveModel = expense.into();
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(amount) = new_amount {
            active.amount = Set(amount);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(method) = input.payment_method {
            active.payment_method = Set(method.into());
        }
        if let Some(reference) = input.reference_number {
            active.reference_number = Set(reference);
        }
        if let Some(date) = input.expense_date {
            active.expense_date = Set(date.into());
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes an expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist.
    pub async fn delete_expense(&self, expense_id: ExpenseId) -> Result<(), ExpenseError> {
        let id = expense_id.into_inner();
        let result = expenses::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound(id));
        }
        Ok(())
    }
}
