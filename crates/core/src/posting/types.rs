//! Posting domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bursar_shared::types::format_cents;

/// Direction of a transaction-item type.
///
/// Direction is the sole source of truth for the sign of an item amount:
/// raw user-entered amounts are always non-negative, and the item type's
/// direction decides whether they add to or subtract from the transaction
/// total. The caller's intent label (expense page vs income page) never
/// influences the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Amounts of this type add to the total.
    In,
    /// Amounts of this type subtract from the total.
    Out,
}

impl Direction {
    /// Returns the sign multiplier for this direction.
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::In => 1,
            Self::Out => -1,
        }
    }

    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Parses a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }
}

/// A transaction-item type visible to an organization.
///
/// Loaded from reference data (org-specific rows plus global defaults) and
/// passed into the generator; the generator itself never touches storage.
#[derive(Debug, Clone)]
pub struct ItemTypeRef {
    /// The item type ID.
    pub id: Uuid,
    /// The item type name (e.g. `Transfer_Out`).
    pub name: String,
    /// Whether amounts of this type count in or out.
    pub direction: Direction,
}

/// One raw line item as entered in a posting form.
///
/// `amount_cents` is the user-entered magnitude and must be non-negative;
/// the sign is derived from the item type's direction.
#[derive(Debug, Clone)]
pub struct ItemInput {
    /// The item type classifying this line.
    pub type_id: Uuid,
    /// The item method (cash, check, transfer, ...).
    pub method_id: Uuid,
    /// Raw entered amount in cents (non-negative).
    pub amount_cents: i64,
    /// Optional line description.
    pub description: Option<String>,
}

/// A line item with its signed amount resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedItem {
    /// The item type classifying this line.
    pub type_id: Uuid,
    /// The item method.
    pub method_id: Uuid,
    /// Signed amount in cents: raw amount × direction sign.
    pub amount_cents: i64,
    /// Optional line description.
    pub description: Option<String>,
}

/// Result of item generation: the signed items and their aggregate total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedItems {
    /// Sum of all signed item amounts; becomes the transaction amount.
    pub total_cents: i64,
    /// The signed items, in input order.
    pub items: Vec<SignedItem>,
}

/// Input for an inter-account transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Account the funds leave.
    pub from_account_id: Uuid,
    /// Account the funds enter.
    pub to_account_id: Uuid,
    /// Transfer magnitude in cents (must be positive).
    pub amount_cents: i64,
    /// Posting date for both sides.
    pub date: NaiveDate,
    /// Optional description applied to both postings.
    pub description: Option<String>,
}

/// Resolved reference rows a transfer posting needs.
///
/// The repository resolves these from the org's visible reference data
/// (`Transfer_Out`/`Transfer_In` item types, the transfer method, and the
/// internal-transfer categories) before planning the postings.
#[derive(Debug, Clone, Copy)]
pub struct TransferRefs {
    /// Item type for the outgoing side (`Transfer_Out`, direction out).
    pub out_type_id: Uuid,
    /// Item type for the incoming side (`Transfer_In`, direction in).
    pub in_type_id: Uuid,
    /// Item method for both sides.
    pub method_id: Uuid,
    /// Category for the outgoing posting (`internal-transfer-loss`).
    pub loss_category_id: Uuid,
    /// Category for the incoming posting (`internal-transfer-gain`).
    pub gain_category_id: Uuid,
}

/// One planned posting: a transaction with a single item, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingDraft {
    /// Account the posting belongs to.
    pub account_id: Uuid,
    /// Signed transaction amount in cents.
    pub amount_cents: i64,
    /// Transaction category.
    pub category_id: Uuid,
    /// Transaction description.
    pub description: Option<String>,
    /// The posting's single item.
    pub item: SignedItem,
}

/// The paired postings a transfer produces.
///
/// Both drafts carry the same magnitude; the repository persists them in one
/// all-or-nothing database transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Negative posting on the source account.
    pub outgoing: PostingDraft,
    /// Positive posting on the destination account.
    pub incoming: PostingDraft,
    /// Posting date for both sides.
    pub date: NaiveDate,
}

/// Structured insufficient-funds rejection.
///
/// A business-rule outcome, not an error: the operation wrote nothing and
/// the caller renders `user_message()` inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsufficientFunds {
    /// The account's balance at the time of the check.
    pub available_cents: i64,
    /// The amount the operation asked for.
    pub requested_cents: i64,
}

impl InsufficientFunds {
    /// Returns the user-facing message for this rejection.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!(
            "Insufficient funds: the account holds {} but {} was requested",
            format_cents(self.available_cents),
            format_cents(self.requested_cents)
        )
    }
}

/// Outcome of a balance-checked posting operation.
#[derive(Debug, Clone)]
pub enum PostingOutcome<T> {
    /// The operation committed; `T` describes what was written.
    Completed(T),
    /// The balance check failed; nothing was written.
    InsufficientFunds(InsufficientFunds),
}

impl<T> PostingOutcome<T> {
    /// Returns true if the operation committed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::In.sign(), 1);
        assert_eq!(Direction::Out.sign(), -1);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("in"), Some(Direction::In));
        assert_eq!(Direction::parse("OUT"), Some(Direction::Out));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_insufficient_funds_message() {
        let rejection = InsufficientFunds {
            available_cents: 5000,
            requested_cents: 10000,
        };
        assert_eq!(
            rejection.user_message(),
            "Insufficient funds: the account holds $50.00 but $100.00 was requested"
        );
    }

    #[test]
    fn test_outcome_is_completed() {
        let done: PostingOutcome<()> = PostingOutcome::Completed(());
        assert!(done.is_completed());

        let rejected: PostingOutcome<()> = PostingOutcome::InsufficientFunds(InsufficientFunds {
            available_cents: 0,
            requested_cents: 1,
        });
        assert!(!rejected.is_completed());
    }
}
