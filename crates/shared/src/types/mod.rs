//! Shared value types.

pub mod money;

pub use money::{MoneyError, format_cents, parse_dollars};
