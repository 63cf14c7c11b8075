//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Repositories own every query; balance checks for transfers and
//! reimbursement approvals run inside the same database transaction as the
//! write, behind an exclusive row lock on the debited account.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, ContactRepository, LookupRepository, OrganizationRepository,
    ReimbursementRepository, TransactionRepository, UserRepository,
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
