//! `SeaORM` entity definitions.

pub mod accounts;
pub mod account_types;
pub mod contacts;
pub mod engagements;
pub mod organization_users;
pub mod organizations;
pub mod receipts;
pub mod reimbursement_requests;
pub mod sea_orm_active_enums;
pub mod transaction_categories;
pub mod transaction_item_methods;
pub mod transaction_item_types;
pub mod transaction_items;
pub mod transactions;
pub mod users;
