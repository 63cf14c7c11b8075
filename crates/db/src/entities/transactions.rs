//! `SeaORM` Entity for the transactions (ledger postings) table.
//!
//! `amount_cents` is signed and always equals the sum of the child items'
//! signed amounts. `reimbursement_request_id` is the typed link back to the
//! request an approval posting offsets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub account_id: Uuid,
    pub amount_cents: i64,
    pub date: Date,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub reimbursement_request_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::transaction_categories::Entity",
        from = "Column::CategoryId",
        to = "super::transaction_categories::Column::Id"
    )]
    TransactionCategories,
    #[sea_orm(
        belongs_to = "super::contacts::Entity",
        from = "Column::ContactId",
        to = "super::contacts::Column::Id"
    )]
    Contacts,
    #[sea_orm(
        belongs_to = "super::reimbursement_requests::Entity",
        from = "Column::ReimbursementRequestId",
        to = "super::reimbursement_requests::Column::Id"
    )]
    ReimbursementRequests,
    #[sea_orm(has_many = "super::transaction_items::Entity")]
    TransactionItems,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::transaction_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItems.def()
    }
}

impl Related<super::transaction_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionCategories.def()
    }
}

impl Related<super::contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl Related<super::reimbursement_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReimbursementRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
