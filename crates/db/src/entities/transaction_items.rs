//! `SeaORM` Entity for the transaction_items table.
//!
//! Items are owned exclusively by their transaction: created together,
//! deleted together (ON DELETE CASCADE).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub type_id: Uuid,
    pub method_id: Uuid,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::transaction_item_types::Entity",
        from = "Column::TypeId",
        to = "super::transaction_item_types::Column::Id"
    )]
    TransactionItemTypes,
    #[sea_orm(
        belongs_to = "super::transaction_item_methods::Entity",
        from = "Column::MethodId",
        to = "super::transaction_item_methods::Column::Id"
    )]
    TransactionItemMethods,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::transaction_item_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItemTypes.def()
    }
}

impl Related<super::transaction_item_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItemMethods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
