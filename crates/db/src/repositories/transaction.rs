//! Transaction repository: the ledger posting engine.
//!
//! Three entry points, each one atomic multi-row write:
//! - `create_posting` - expense/income entry: one transaction + its items
//! - `create_transfer` - paired debit/credit postings across two accounts
//! - (reimbursement approval posting lives in the reimbursement repository)
//!
//! Transfers check the source balance behind an exclusive row lock inside
//! the same database transaction as the write, so two concurrent transfers
//! against one account cannot both pass the check and overdraw it.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::posting::{
    self, ItemInput, PostingDraft, PostingError, PostingOutcome, TransferInput, TransferRefs,
};

use crate::entities::{accounts, receipts, transaction_items, transactions};

use super::account::{account_balance, lock_account};
use super::lookup::{
    find_category_by_name, find_item_type_by_name, find_method_by_name, item_types_visible_to,
    well_known,
};

/// Input for a simple posting (expense or income entry).
///
/// The caller never labels the posting as expense or income: item type
/// directions alone decide every sign and the total.
#[derive(Debug, Clone)]
pub struct CreatePostingInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Account the posting belongs to.
    pub account_id: Uuid,
    /// Posting date.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: Option<String>,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Optional contact association.
    pub contact_id: Option<Uuid>,
    /// Pre-existing receipt rows to associate with the transaction.
    pub receipt_ids: Vec<Uuid>,
    /// Raw line items; signs are derived from item type directions.
    pub items: Vec<ItemInput>,
    /// User who entered the posting.
    pub created_by: Uuid,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by contact.
    pub contact_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Transaction with its items.
#[derive(Debug, Clone)]
pub struct TransactionWithItems {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// The transaction's items.
    pub items: Vec<transaction_items::Model>,
}

/// The two postings a committed transfer produced.
#[derive(Debug, Clone)]
pub struct TransferRecord {
    /// Negative posting on the source account.
    pub outgoing: TransactionWithItems,
    /// Positive posting on the destination account.
    pub incoming: TransactionWithItems,
}

/// Transaction repository for posting and reads.
#[derive(Debug)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

fn db_err(e: DbErr) -> PostingError {
    PostingError::Database(e.to_string())
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates one transaction with its nested items atomically.
    ///
    /// Signed item amounts and the transaction total are computed from the
    /// item types visible to the organization. Pre-existing receipts are
    /// associated in the same unit.
    ///
    /// # Errors
    ///
    /// Returns validation errors from item generation (unknown type,
    /// negative amount), `AccountNotFound`, or `Database` errors.
    pub async fn create_posting(
        &self,
        input: CreatePostingInput,
    ) -> Result<TransactionWithItems, PostingError> {
        let account = accounts::Entity::find_by_id(input.account_id)
            .filter(accounts::Column::OrganizationId.eq(input.organization_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::AccountNotFound(input.account_id))?;

        let visible_types = item_types_visible_to(&self.db, input.organization_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| posting::ItemTypeRef {
                id: row.id,
                name: row.name,
                direction: row.direction.into(),
            })
            .collect::<Vec<_>>();

        let generated = posting::generate_items(&input.items, &visible_types)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let now = Utc::now().into();
        let transaction_id = Uuid::new_v4();
        let transaction = transactions::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(input.organization_id),
            account_id: Set(account.id),
            amount_cents: Set(generated.total_cents),
            date: Set(input.date),
            description: Set(input.description.clone()),
            category_id: Set(input.category_id),
            contact_id: Set(input.contact_id),
            reimbursement_request_id: Set(None),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut items = Vec::with_capacity(generated.items.len());
        for item in &generated.items {
            let inserted = transaction_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                type_id: Set(item.type_id),
                method_id: Set(item.method_id),
                amount_cents: Set(item.amount_cents),
                description: Set(item.description.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            items.push(inserted);
        }

        if !input.receipt_ids.is_empty() {
            receipts::Entity::update_many()
                .col_expr(receipts::Column::TransactionId, Expr::value(transaction_id))
                .filter(receipts::Column::Id.is_in(input.receipt_ids.clone()))
                .filter(receipts::Column::OrganizationId.eq(input.organization_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        Ok(TransactionWithItems { transaction, items })
    }

    /// Transfers funds between two accounts of the organization.
    ///
    /// Creates exactly two transactions in one all-or-nothing unit: a
    /// negative posting on the source (`internal-transfer-loss`,
    /// `Transfer_Out`) and a positive posting on the destination
    /// (`internal-transfer-gain`, `Transfer_In`), same magnitude and date.
    /// The source balance is checked behind an exclusive row lock inside
    /// the same unit; an insufficient balance is returned as a soft
    /// outcome with nothing written.
    ///
    /// # Errors
    ///
    /// Returns `SameAccount`/`NonPositiveTransferAmount` validation errors,
    /// `AccountNotFound` for either side, `MissingReference` if the
    /// transfer reference rows are absent, or `Database` errors.
    pub async fn create_transfer(
        &self,
        organization_id: Uuid,
        input: TransferInput,
        created_by: Uuid,
    ) -> Result<PostingOutcome<TransferRecord>, PostingError> {
        posting::validate_transfer(&input)?;

        let refs = self.resolve_transfer_refs(organization_id).await?;
        let plan = posting::plan_transfer(&input, &refs)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        // Only the source needs a lock: its balance is the one being spent.
        // Locking the destination too would invite deadlocks between
        // opposite-direction transfers.
        lock_account(&txn, organization_id, input.from_account_id)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::AccountNotFound(input.from_account_id))?;

        accounts::Entity::find_by_id(input.to_account_id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::AccountNotFound(input.to_account_id))?;

        let balance = account_balance(&txn, input.from_account_id)
            .await
            .map_err(db_err)?;

        if let Some(short) = posting::check_funds(balance, input.amount_cents) {
            // Nothing was written; release the lock and report softly.
            txn.rollback().await.map_err(db_err)?;
            return Ok(PostingOutcome::InsufficientFunds(short));
        }

        let outgoing =
            insert_draft(&txn, organization_id, &plan.outgoing, plan.date, created_by).await?;
        let incoming =
            insert_draft(&txn, organization_id, &plan.incoming, plan.date, created_by).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(PostingOutcome::Completed(TransferRecord {
            outgoing,
            incoming,
        }))
    }

    /// Resolves the reference rows a transfer posting needs.
    async fn resolve_transfer_refs(
        &self,
        organization_id: Uuid,
    ) -> Result<TransferRefs, PostingError> {
        let out_type = find_item_type_by_name(&self.db, organization_id, well_known::TRANSFER_OUT)
            .await
            .map_err(db_err)?
            .ok_or_else(|| PostingError::MissingReference(well_known::TRANSFER_OUT.to_string()))?;
        let in_type = find_item_type_by_name(&self.db, organization_id, well_known::TRANSFER_IN)
            .await
            .map_err(db_err)?
            .ok_or_else(|| PostingError::MissingReference(well_known::TRANSFER_IN.to_string()))?;
        let method = find_method_by_name(&self.db, organization_id, well_known::METHOD_TRANSFER)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                PostingError::MissingReference(well_known::METHOD_TRANSFER.to_string())
            })?;
        let loss_category =
            find_category_by_name(&self.db, organization_id, well_known::CATEGORY_TRANSFER_LOSS)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    PostingError::MissingReference(well_known::CATEGORY_TRANSFER_LOSS.to_string())
                })?;
        let gain_category =
            find_category_by_name(&self.db, organization_id, well_known::CATEGORY_TRANSFER_GAIN)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    PostingError::MissingReference(well_known::CATEGORY_TRANSFER_GAIN.to_string())
                })?;

        Ok(TransferRefs {
            out_type_id: out_type.id,
            in_type_id: in_type.id,
            method_id: method.id,
            loss_category_id: loss_category.id,
            gain_category_id: gain_category.id,
        })
    }

    /// Lists transactions with optional filters, newest first.
    pub async fn list_transactions(
        &self,
        organization_id: Uuid,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, PostingError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id));

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(contact_id) = filter.contact_id {
            query = query.filter(transactions::Column::ContactId.eq(contact_id));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::Date.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::Date.lte(date_to));
        }

        query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets a transaction with its items.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::TransactionNotFound` if it does not exist in
    /// the organization.
    pub async fn get_transaction(
        &self,
        organization_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<TransactionWithItems, PostingError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::TransactionNotFound(transaction_id))?;

        let items = transaction_items::Entity::find()
            .filter(transaction_items::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(TransactionWithItems { transaction, items })
    }
}

/// Inserts one planned posting (transaction + single item) on a connection.
///
/// Used for both sides of a transfer; callers are responsible for wrapping
/// the two inserts in one database transaction.
pub(crate) async fn insert_draft<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    draft: &PostingDraft,
    date: NaiveDate,
    created_by: Uuid,
) -> Result<TransactionWithItems, PostingError> {
    let now = Utc::now().into();
    let transaction_id = Uuid::new_v4();

    let transaction = transactions::ActiveModel {
        id: Set(transaction_id),
        organization_id: Set(organization_id),
        account_id: Set(draft.account_id),
        amount_cents: Set(draft.amount_cents),
        date: Set(date),
        description: Set(draft.description.clone()),
        category_id: Set(Some(draft.category_id)),
        contact_id: Set(None),
        reimbursement_request_id: Set(None),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(db_err)?;

    let item = transaction_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        transaction_id: Set(transaction_id),
        type_id: Set(draft.item.type_id),
        method_id: Set(draft.item.method_id),
        amount_cents: Set(draft.item.amount_cents),
        description: Set(draft.item.description.clone()),
        created_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(db_err)?;

    Ok(TransactionWithItems {
        transaction,
        items: vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::ItemDirection;
    use crate::entities::{
        accounts, transaction_categories, transaction_item_methods, transaction_item_types,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn account_row(organization_id: Uuid, account_id: Uuid, code: &str) -> accounts::Model {
        accounts::Model {
            id: account_id,
            organization_id,
            code: code.to_string(),
            description: format!("{code} fund"),
            type_id: Uuid::new_v4(),
            user_id: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn item_type_row(name: &str, direction: ItemDirection) -> transaction_item_types::Model {
        transaction_item_types::Model {
            id: Uuid::new_v4(),
            organization_id: None,
            name: name.to_string(),
            direction,
            created_at: Utc::now().into(),
        }
    }

    fn method_row(name: &str) -> transaction_item_methods::Model {
        transaction_item_methods::Model {
            id: Uuid::new_v4(),
            organization_id: None,
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn category_row(name: &str) -> transaction_categories::Model {
        transaction_categories::Model {
            id: Uuid::new_v4(),
            organization_id: None,
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn balance_row(total: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        let mut row = BTreeMap::new();
        row.insert("total", Some(total).into());
        row
    }

    fn transfer_input(amount_cents: i64) -> TransferInput {
        TransferInput {
            from_account_id: Uuid::new_v4(),
            to_account_id: Uuid::new_v4(),
            amount_cents,
            date: chrono::NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_transfer_same_account_rejected_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = TransactionRepository::new(db);

        let mut input = transfer_input(1000);
        input.to_account_id = input.from_account_id;

        let result = repo
            .create_transfer(Uuid::new_v4(), input, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(PostingError::SameAccount)));
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_writes_nothing() {
        let org = Uuid::new_v4();
        let input = transfer_input(10000);

        // Source holds 5000 < 10000 requested: the repository must return
        // the soft outcome after the in-transaction balance read. No insert
        // results are queued, so any attempted write would error.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item_type_row(
                well_known::TRANSFER_OUT,
                ItemDirection::Out,
            )]])
            .append_query_results([vec![item_type_row(
                well_known::TRANSFER_IN,
                ItemDirection::In,
            )]])
            .append_query_results([vec![method_row(well_known::METHOD_TRANSFER)]])
            .append_query_results([vec![category_row(well_known::CATEGORY_TRANSFER_LOSS)]])
            .append_query_results([vec![category_row(well_known::CATEGORY_TRANSFER_GAIN)]])
            .append_query_results([vec![account_row(org, input.from_account_id, "GEN")]])
            .append_query_results([vec![account_row(org, input.to_account_id, "BLD")]])
            .append_query_results([vec![balance_row(5000)]])
            .into_connection();

        let repo = TransactionRepository::new(db);
        let outcome = repo
            .create_transfer(org, input, Uuid::new_v4())
            .await
            .unwrap();

        let PostingOutcome::InsufficientFunds(short) = outcome else {
            panic!("expected insufficient funds outcome");
        };
        assert_eq!(short.available_cents, 5000);
        assert_eq!(short.requested_cents, 10000);
    }

    #[tokio::test]
    async fn test_posting_unknown_item_type_rejected_before_write() {
        let org = Uuid::new_v4();
        let account_id = Uuid::new_v4();

        // The visible types do not contain the payload's type id; the
        // generator must reject before the repository opens a transaction.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account_row(org, account_id, "GEN")]])
            .append_query_results([vec![item_type_row("Donation_In", ItemDirection::In)]])
            .into_connection();

        let repo = TransactionRepository::new(db);
        let stale_type = Uuid::new_v4();
        let input = CreatePostingInput {
            organization_id: org,
            account_id,
            date: chrono::NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            description: None,
            category_id: None,
            contact_id: None,
            receipt_ids: vec![],
            items: vec![ItemInput {
                type_id: stale_type,
                method_id: Uuid::new_v4(),
                amount_cents: 100,
                description: None,
            }],
            created_by: Uuid::new_v4(),
        };

        let result = repo.create_posting(input).await;
        assert!(matches!(
            result,
            Err(PostingError::UnknownItemType(id)) if id == stale_type
        ));
    }
}
