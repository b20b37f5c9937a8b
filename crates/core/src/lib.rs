//! Core business logic for Printdesk.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `reconcile` - Order/payment reconciliation engine
//! - `statement` - Client ledger statement builder
//! - `auth` - Password hashing

pub mod auth;
pub mod reconcile;
pub mod statement;
