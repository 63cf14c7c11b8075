//! Core business logic for Bursar.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here; repositories in `bursar-db` orchestrate this logic inside database
//! transactions.
//!
//! # Modules
//!
//! - `posting` - Signed transaction-item generation and transfer planning
//! - `reimbursement` - Reimbursement request state machine

pub mod posting;
pub mod reimbursement;
