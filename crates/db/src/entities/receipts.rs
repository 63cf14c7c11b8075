//! `SeaORM` Entity for the receipts table.
//!
//! Rows are created by the external upload flow; this system only
//! associates them with reimbursement requests and transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub reimbursement_request_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    /// Object-store key; presigned URLs are issued elsewhere.
    pub object_key: String,
    pub filename: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reimbursement_requests::Entity",
        from = "Column::ReimbursementRequestId",
        to = "super::reimbursement_requests::Column::Id"
    )]
    ReimbursementRequests,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
}

impl Related<super::reimbursement_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReimbursementRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
