//! Account repository for fund ledger database operations.
//!
//! Balances are derived, never stored: an account's balance is the sum of
//! its transactions' signed `amount_cents`. `account_balance` is the single
//! place that sum is computed, and the posting flows call it on the same
//! database transaction that performs their writes.

use sea_orm::sea_query::{Alias, Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use chrono::Utc;

use crate::entities::{accounts, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists in the organization.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Account code (must be unique within the organization).
    pub code: String,
    /// Account description (display name).
    pub description: String,
    /// Account type ID.
    pub type_id: Uuid,
    /// Optional linked user.
    pub user_id: Option<Uuid>,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account code.
    pub code: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Account type ID.
    pub type_id: Option<Uuid>,
    /// Linked user (outer `None` = leave unchanged, `Some(None)` = unlink).
    pub user_id: Option<Option<Uuid>>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Account with its derived balance.
#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    /// The account record.
    pub account: accounts::Model,
    /// Sum of the account's transaction amounts, in cents.
    pub balance_cents: i64,
}

/// Account repository for CRUD operations and balance reads.
#[derive(Debug)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a unique code within the organization.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateCode` if the code is taken.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(input.organization_id))
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(input.organization_id),
            code: Set(input.code),
            description: Set(input.description),
            type_id: Set(input.type_id),
            user_id: Set(input.user_id),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Lists an organization's accounts with their derived balances.
    pub async fn list_accounts(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<AccountWithBalance>, AccountError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let sums: Vec<(Uuid, Option<i64>)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::AccountId)
            .column_as(
                Expr::col(transactions::Column::AmountCents)
                    .sum()
                    .cast_as(Alias::new("bigint")),
                "total",
            )
            .filter(transactions::Column::OrganizationId.eq(organization_id))
            .group_by(transactions::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let balances: HashMap<Uuid, i64> = sums
            .into_iter()
            .map(|(account_id, total)| (account_id, total.unwrap_or(0)))
            .collect();

        Ok(accounts
            .into_iter()
            .map(|account| {
                let balance_cents = balances.get(&account.id).copied().unwrap_or(0);
                AccountWithBalance {
                    account,
                    balance_cents,
                }
            })
            .collect())
    }

    /// Gets an account with its derived balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist in
    /// the organization.
    pub async fn get_account(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> Result<AccountWithBalance, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let balance_cents = account_balance(&self.db, account_id).await?;

        Ok(AccountWithBalance {
            account,
            balance_cents,
        })
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist and
    /// `AccountError::DuplicateCode` if a code change collides.
    pub async fn update_account(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        if let Some(code) = &input.code {
            if *code != account.code {
                let taken = accounts::Entity::find()
                    .filter(accounts::Column::OrganizationId.eq(organization_id))
                    .filter(accounts::Column::Code.eq(code))
                    .one(&self.db)
                    .await?;
                if taken.is_some() {
                    return Err(AccountError::DuplicateCode(code.clone()));
                }
            }
        }

        let mut active: accounts::ActiveModel = account.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(type_id) = input.type_id {
            active.type_id = Set(type_id);
        }
        if let Some(user_id) = input.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}

/// Computes an account's balance: the sum of its transactions' signed
/// amounts, 0 for an account with no transactions.
///
/// Works on any connection so the posting flows can call it inside the
/// database transaction that holds the account's row lock.
pub async fn account_balance<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<i64, DbErr> {
    let total: Option<Option<i64>> = transactions::Entity::find()
        .select_only()
        .column_as(
            Expr::col(transactions::Column::AmountCents)
                .sum()
                .cast_as(Alias::new("bigint")),
            "total",
        )
        .filter(transactions::Column::AccountId.eq(account_id))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Loads an org's account inside a transaction and takes an exclusive row
/// lock on it, serializing concurrent balance-checked postings against the
/// same account.
pub async fn lock_account<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    account_id: Uuid,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::OrganizationId.eq(organization_id))
        .lock_exclusive()
        .one(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn total_row(total: Option<i64>) -> BTreeMap<&'static str, sea_orm::Value> {
        let mut row = BTreeMap::new();
        row.insert("total", total.into());
        row
    }

    #[tokio::test]
    async fn test_account_balance_sums_transactions() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![total_row(Some(7500))]])
            .into_connection();

        let balance = account_balance(&db, Uuid::new_v4()).await.unwrap();
        assert_eq!(balance, 7500);
    }

    #[tokio::test]
    async fn test_account_balance_empty_account_is_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![total_row(None)]])
            .into_connection();

        let balance = account_balance(&db, Uuid::new_v4()).await.unwrap();
        assert_eq!(balance, 0);
    }
}
