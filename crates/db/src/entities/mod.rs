//! `SeaORM` entity definitions.

pub mod clients;
pub mod expenses;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sea_orm_active_enums;
pub mod users;
