//! Reimbursement request repository.
//!
//! Executes the transitions the core state machine validates. Approval is
//! the only transition with a ledger effect: it inserts one negative
//! transaction (single `Other_Outgoing` item) and flips the request status
//! in the same database transaction, behind an exclusive lock on the
//! debited account. An insufficient balance writes nothing and leaves the
//! request pending.
//!
//! Reopening a decided request is status-only and deliberately leaves any
//! previously posted offsetting transaction in place.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::posting::{InsufficientFunds, PostingOutcome};
use bursar_core::reimbursement::{
    ApprovalPosting, ReimbursementError, ReimbursementService, RequestAction, RequestStatus,
    TransitionContext, reference_tag,
};

use crate::entities::{
    receipts, reimbursement_requests, sea_orm_active_enums::ReimbursementStatus,
    transaction_items, transactions,
};

use super::account::{account_balance, lock_account};
use super::lookup::{find_item_type_by_name, find_method_by_name, well_known};
use super::transaction::TransactionWithItems;

/// Input for creating a reimbursement request.
#[derive(Debug, Clone)]
pub struct CreateRequestInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// The requester.
    pub user_id: Uuid,
    /// Suggested account to draw from (may be chosen at approval instead).
    pub account_id: Option<Uuid>,
    /// Requested magnitude in cents (must be positive).
    pub amount_cents: i64,
    /// What the money was spent on.
    pub purpose: Option<String>,
    /// Pre-existing receipt rows to attach.
    pub receipt_ids: Vec<Uuid>,
}

/// A request with its attached receipts.
#[derive(Debug, Clone)]
pub struct RequestWithReceipts {
    /// The request record.
    pub request: reimbursement_requests::Model,
    /// Attached receipts.
    pub receipts: Vec<receipts::Model>,
}

/// What a committed transition wrote.
#[derive(Debug, Clone)]
pub struct TransitionApplied {
    /// The updated request.
    pub request: reimbursement_requests::Model,
    /// The offsetting posting, present only for approvals.
    pub posting: Option<TransactionWithItems>,
}

/// Reimbursement request repository.
#[derive(Debug)]
pub struct ReimbursementRepository {
    db: DatabaseConnection,
}

fn db_err(e: DbErr) -> ReimbursementError {
    ReimbursementError::Database(e.to_string())
}

impl ReimbursementRepository {
    /// Creates a new reimbursement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending request and attaches its receipts.
    ///
    /// # Errors
    ///
    /// Returns `ReimbursementError::NonPositiveAmount` for a zero or
    /// negative amount.
    pub async fn create_request(
        &self,
        input: CreateRequestInput,
    ) -> Result<RequestWithReceipts, ReimbursementError> {
        if input.amount_cents <= 0 {
            return Err(ReimbursementError::NonPositiveAmount(input.amount_cents));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let now = Utc::now().into();
        let request_id = Uuid::new_v4();
        let request = reimbursement_requests::ActiveModel {
            id: Set(request_id),
            organization_id: Set(input.organization_id),
            user_id: Set(input.user_id),
            account_id: Set(input.account_id),
            amount_cents: Set(input.amount_cents),
            purpose: Set(input.purpose.clone()),
            status: Set(ReimbursementStatus::Pending),
            approver_note: Set(None),
            decided_by: Set(None),
            decided_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        if !input.receipt_ids.is_empty() {
            receipts::Entity::update_many()
                .col_expr(
                    receipts::Column::ReimbursementRequestId,
                    sea_orm::sea_query::Expr::value(request_id),
                )
                .filter(receipts::Column::Id.is_in(input.receipt_ids.clone()))
                .filter(receipts::Column::OrganizationId.eq(input.organization_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        let attached = self.receipts_for(request_id).await?;
        Ok(RequestWithReceipts {
            request,
            receipts: attached,
        })
    }

    /// Lists an organization's requests, optionally filtered by status,
    /// newest first.
    pub async fn list_requests(
        &self,
        organization_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<reimbursement_requests::Model>, ReimbursementError> {
        let mut query = reimbursement_requests::Entity::find()
            .filter(reimbursement_requests::Column::OrganizationId.eq(organization_id));

        if let Some(status) = status {
            query = query
                .filter(reimbursement_requests::Column::Status.eq(ReimbursementStatus::from(status)));
        }

        query
            .order_by_desc(reimbursement_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets a request with its receipts.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` if it does not exist in the organization.
    pub async fn get_request(
        &self,
        organization_id: Uuid,
        request_id: Uuid,
    ) -> Result<RequestWithReceipts, ReimbursementError> {
        let request = self.find_request(organization_id, request_id).await?;
        let attached = self.receipts_for(request_id).await?;

        Ok(RequestWithReceipts {
            request,
            receipts: attached,
        })
    }

    /// Applies a status transition; the target status IS the action.
    ///
    /// For `approved`, the offsetting posting and the status update commit
    /// in one unit or not at all, and an insufficient balance yields a soft
    /// outcome with the request left pending. All other targets are
    /// status-only updates.
    ///
    /// # Errors
    ///
    /// Returns the core validation errors (illegal transition, missing
    /// approval fields), `RequestNotFound`/`AccountNotFound`, or `Database`.
    pub async fn transition(
        &self,
        organization_id: Uuid,
        request_id: Uuid,
        target: RequestStatus,
        actor: Uuid,
        ctx: TransitionContext,
    ) -> Result<PostingOutcome<TransitionApplied>, ReimbursementError> {
        let request = self.find_request(organization_id, request_id).await?;
        let current = RequestStatus::from(request.status);

        let action = ReimbursementService::apply(current, target, actor, ctx)?;

        match action {
            RequestAction::Approve {
                posting,
                approved_by,
                approved_at,
            } => {
                self.apply_approval(request, posting, approved_by, approved_at)
                    .await
            }
            RequestAction::Reject { rejected_by, note } => {
                let updated = self
                    .update_status(request, RequestStatus::Rejected, Some(rejected_by), note)
                    .await?;
                Ok(PostingOutcome::Completed(TransitionApplied {
                    request: updated,
                    posting: None,
                }))
            }
            RequestAction::Void { voided_by, note } => {
                let updated = self
                    .update_status(request, RequestStatus::Void, Some(voided_by), note)
                    .await?;
                Ok(PostingOutcome::Completed(TransitionApplied {
                    request: updated,
                    posting: None,
                }))
            }
            RequestAction::Reopen { .. } => {
                // Status-only: any offsetting transaction from a previous
                // approval stays on the ledger.
                let updated = self
                    .update_status(request, RequestStatus::Pending, None, None)
                    .await?;
                Ok(PostingOutcome::Completed(TransitionApplied {
                    request: updated,
                    posting: None,
                }))
            }
        }
    }

    /// Finds the transaction a request spawned on approval, if any.
    ///
    /// Uses the typed `reimbursement_request_id` link on transactions.
    pub async fn spawned_transaction(
        &self,
        organization_id: Uuid,
        request_id: Uuid,
    ) -> Result<Option<transactions::Model>, ReimbursementError> {
        transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id))
            .filter(transactions::Column::ReimbursementRequestId.eq(request_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Executes the approval unit: balance check behind an account lock,
    /// then the offsetting posting and the status flip, all-or-nothing.
    async fn apply_approval(
        &self,
        request: reimbursement_requests::Model,
        posting: ApprovalPosting,
        approved_by: Uuid,
        approved_at: chrono::DateTime<Utc>,
    ) -> Result<PostingOutcome<TransitionApplied>, ReimbursementError> {
        let organization_id = request.organization_id;

        let item_type =
            find_item_type_by_name(&self.db, organization_id, well_known::OTHER_OUTGOING)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    ReimbursementError::Database(format!(
                        "missing reference item type {}",
                        well_known::OTHER_OUTGOING
                    ))
                })?;
        let method = find_method_by_name(&self.db, organization_id, well_known::METHOD_OTHER)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                ReimbursementError::Database(format!(
                    "missing reference method {}",
                    well_known::METHOD_OTHER
                ))
            })?;

        let txn = self.db.begin().await.map_err(db_err)?;

        lock_account(&txn, organization_id, posting.account_id)
            .await
            .map_err(db_err)?
            .ok_or(ReimbursementError::AccountNotFound(posting.account_id))?;

        let balance = account_balance(&txn, posting.account_id)
            .await
            .map_err(db_err)?;

        if balance < posting.amount_cents {
            // No writes: the request stays pending and the caller renders
            // the shortfall inline.
            txn.rollback().await.map_err(db_err)?;
            return Ok(PostingOutcome::InsufficientFunds(InsufficientFunds {
                available_cents: balance,
                requested_cents: posting.amount_cents,
            }));
        }

        let now = Utc::now().into();
        let transaction_id = Uuid::new_v4();
        let transaction = transactions::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(organization_id),
            account_id: Set(posting.account_id),
            amount_cents: Set(posting.ledger_amount_cents),
            date: Set(approved_at.date_naive()),
            description: Set(posting.note.clone()),
            category_id: Set(Some(posting.category_id)),
            contact_id: Set(None),
            reimbursement_request_id: Set(Some(request.id)),
            created_by: Set(approved_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let item = transaction_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            type_id: Set(item_type.id),
            method_id: Set(method.id),
            amount_cents: Set(posting.ledger_amount_cents),
            description: Set(Some(reference_tag(request.id))),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut active: reimbursement_requests::ActiveModel = request.into();
        active.status = Set(ReimbursementStatus::Approved);
        active.account_id = Set(Some(posting.account_id));
        active.approver_note = Set(posting.note.clone());
        active.decided_by = Set(Some(approved_by));
        active.decided_at = Set(Some(approved_at.into()));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(PostingOutcome::Completed(TransitionApplied {
            request: updated,
            posting: Some(TransactionWithItems {
                transaction,
                items: vec![item],
            }),
        }))
    }

    /// Applies a status-only transition.
    async fn update_status(
        &self,
        request: reimbursement_requests::Model,
        status: RequestStatus,
        decided_by: Option<Uuid>,
        note: Option<String>,
    ) -> Result<reimbursement_requests::Model, ReimbursementError> {
        let now = Utc::now();
        let mut active: reimbursement_requests::ActiveModel = request.into();
        active.status = Set(status.into());
        active.decided_by = Set(decided_by);
        active.decided_at = Set(decided_by.map(|_| now.into()));
        if let Some(note) = note {
            active.approver_note = Set(Some(note));
        }
        active.updated_at = Set(now.into());

        active.update(&self.db).await.map_err(db_err)
    }

    async fn find_request(
        &self,
        organization_id: Uuid,
        request_id: Uuid,
    ) -> Result<reimbursement_requests::Model, ReimbursementError> {
        reimbursement_requests::Entity::find_by_id(request_id)
            .filter(reimbursement_requests::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReimbursementError::RequestNotFound(request_id))
    }

    async fn receipts_for(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<receipts::Model>, ReimbursementError> {
        receipts::Entity::find()
            .filter(receipts::Column::ReimbursementRequestId.eq(request_id))
            .order_by_asc(receipts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::accounts;
    use crate::entities::sea_orm_active_enums::ItemDirection;
    use crate::entities::{transaction_item_methods, transaction_item_types};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn pending_request(organization_id: Uuid, amount_cents: i64) -> reimbursement_requests::Model {
        reimbursement_requests::Model {
            id: Uuid::new_v4(),
            organization_id,
            user_id: Uuid::new_v4(),
            account_id: None,
            amount_cents,
            purpose: Some("conference travel".to_string()),
            status: ReimbursementStatus::Pending,
            approver_note: None,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn account_row(organization_id: Uuid, account_id: Uuid) -> accounts::Model {
        accounts::Model {
            id: account_id,
            organization_id,
            code: "GEN".to_string(),
            description: "General fund".to_string(),
            type_id: Uuid::new_v4(),
            user_id: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn item_type_row(name: &str) -> transaction_item_types::Model {
        transaction_item_types::Model {
            id: Uuid::new_v4(),
            organization_id: None,
            name: name.to_string(),
            direction: ItemDirection::Out,
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

    fn balance_row(total: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        let mut row = BTreeMap::new();
        row.insert("total", Some(total).into());
        row
    }

    fn approval_ctx(account_id: Uuid, amount_cents: i64) -> TransitionContext {
        TransitionContext {
            approval: Some(bursar_core::reimbursement::ApproveInput {
                amount_cents,
                account_id: Some(account_id),
                category_id: Some(Uuid::new_v4()),
                note: Some("approved with thanks".to_string()),
            }),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_approval_insufficient_funds_writes_nothing() {
        let org = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let request = pending_request(org, 3001);

        // Balance 3000 < requested 3001: the repository must return the
        // soft outcome before attempting any insert. The mock has no
        // further results queued, so an attempted write would error.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request.clone()]])
            .append_query_results([vec![item_type_row(well_known::OTHER_OUTGOING)]])
            .append_query_results([vec![method_row(well_known::METHOD_OTHER)]])
            .append_query_results([vec![account_row(org, account_id)]])
            .append_query_results([vec![balance_row(3000)]])
            .into_connection();

        let repo = ReimbursementRepository::new(db);
        let outcome = repo
            .transition(
                org,
                request.id,
                RequestStatus::Approved,
                Uuid::new_v4(),
                approval_ctx(account_id, 3001),
            )
            .await
            .unwrap();

        let PostingOutcome::InsufficientFunds(short) = outcome else {
            panic!("expected insufficient funds outcome");
        };
        assert_eq!(short.available_cents, 3000);
        assert_eq!(short.requested_cents, 3001);
    }

    #[tokio::test]
    async fn test_reject_is_status_only() {
        let org = Uuid::new_v4();
        let request = pending_request(org, 5000);
        let mut rejected = request.clone();
        rejected.status = ReimbursementStatus::Rejected;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request.clone()]])
            .append_query_results([vec![rejected]])
            .into_connection();

        let repo = ReimbursementRepository::new(db);
        let outcome = repo
            .transition(
                org,
                request.id,
                RequestStatus::Rejected,
                Uuid::new_v4(),
                TransitionContext {
                    approval: None,
                    note: Some("no receipt attached".to_string()),
                },
            )
            .await
            .unwrap();

        let PostingOutcome::Completed(applied) = outcome else {
            panic!("expected completed transition");
        };
        assert!(applied.posting.is_none());
        assert_eq!(applied.request.status, ReimbursementStatus::Rejected);
    }

    #[tokio::test]
    async fn test_reopen_is_status_only_and_leaves_ledger_alone() {
        let org = Uuid::new_v4();
        let mut request = pending_request(org, 5000);
        request.status = ReimbursementStatus::Approved;
        let mut reopened = request.clone();
        reopened.status = ReimbursementStatus::Pending;

        // Exactly two queries: load + status update. A reversal of the
        // offsetting transaction would need further queries and fail here,
        // pinning the observed non-reversal behavior.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request.clone()]])
            .append_query_results([vec![reopened]])
            .into_connection();

        let repo = ReimbursementRepository::new(db);
        let outcome = repo
            .transition(
                org,
                request.id,
                RequestStatus::Pending,
                Uuid::new_v4(),
                TransitionContext::default(),
            )
            .await
            .unwrap();

        let PostingOutcome::Completed(applied) = outcome else {
            panic!("expected completed transition");
        };
        assert!(applied.posting.is_none());
        assert_eq!(applied.request.status, ReimbursementStatus::Pending);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected_before_any_query_beyond_load() {
        let org = Uuid::new_v4();
        let mut request = pending_request(org, 5000);
        request.status = ReimbursementStatus::Approved;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request.clone()]])
            .into_connection();

        let repo = ReimbursementRepository::new(db);
        let result = repo
            .transition(
                org,
                request.id,
                RequestStatus::Rejected,
                Uuid::new_v4(),
                TransitionContext::default(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ReimbursementError::InvalidTransition { .. })
        ));
    }
}
