//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod client;
pub mod dashboard;
pub mod expense;
pub mod ledger;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use client::{ClientError, ClientFilter, ClientRepository, CreateClientInput, UpdateClientInput};
pub use dashboard::{DashboardRepository, DashboardStats};
pub use expense::{
    CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository, UpdateExpenseInput,
};
pub use ledger::{ClientStatement, LedgerError, LedgerRepository};
pub use order::{
    CreateOrderInput, CreateOrderItemInput, OrderError, OrderFilter, OrderRepository,
    OrderWithItems, UpdateOrderInput,
};
pub use payment::{
    CreatePaymentInput, PaymentFilter, PaymentRepository, PaymentWithOrder, UpdatePaymentInput,
};
pub use product::{
    CreateProductInput, ProductError, ProductFilter, ProductRepository, UpdateProductInput,
};
pub use user::{CreateUserInput, UserError, UserRepository};
