//! Ledger posting logic.
//!
//! A posting is one durably written `Transaction` with its nested items.
//! This module computes signed item amounts from the org's item-type
//! directions, validates transfers, and plans the paired debit/credit
//! postings a transfer produces. Persistence stays in `bursar-db`.

pub mod error;
pub mod generator;
pub mod transfer;
pub mod types;

pub use error::PostingError;
pub use generator::generate_items;
pub use transfer::{check_funds, plan_transfer, validate_transfer};
pub use types::{
    Direction, GeneratedItems, InsufficientFunds, ItemInput, ItemTypeRef, PostingDraft,
    PostingOutcome, SignedItem, TransferInput, TransferPlan, TransferRefs,
};
