//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the budget and invoice ledgers
//! - Repository abstractions for data access
//! - Advisory locking for ledger aggregates
//! - Database migrations

pub mod entities;
pub mod locks;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BudgetRepository, Caller, CategoryRepository, DashboardRepository, DepartmentRepository,
    InvoiceRepository, UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
