//! Reimbursement domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reimbursement request status.
///
/// Valid transitions:
/// - Pending → Approved (creates the offsetting posting)
/// - Pending → Rejected
/// - Pending → Void
/// - Approved/Rejected/Void → Pending (reopen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for an approver's decision.
    Pending,
    /// Approved; an offsetting transaction was posted.
    Approved,
    /// Declined by an approver.
    Rejected,
    /// Withdrawn/voided without a decision.
    Void,
}

impl RequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    /// Returns true for decided states that can be reopened.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Void)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds the human-readable reference written into the offsetting item's
/// description. Display only: the typed link back to the request is the
/// `reimbursement_request_id` column, never this string.
#[must_use]
pub fn reference_tag(request_id: Uuid) -> String {
    format!("Reimbursement ID: {request_id}")
}

/// Approver-supplied fields for the approved transition.
///
/// `account_id` and `category_id` are required for approval only; the
/// request itself may be created without them. That cross-field rule lives
/// in the service, not the schema.
#[derive(Debug, Clone)]
pub struct ApproveInput {
    /// Amount to reimburse in cents (must be positive).
    pub amount_cents: i64,
    /// Account to draw the reimbursement from.
    pub account_id: Option<Uuid>,
    /// Category for the offsetting transaction.
    pub category_id: Option<Uuid>,
    /// Approver's note, written into the offsetting item description.
    pub note: Option<String>,
}

/// The planned ledger effect of an approval: one negative transaction with
/// a single item against the reimbursing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPosting {
    /// Account the reimbursement is drawn from.
    pub account_id: Uuid,
    /// Category for the offsetting transaction.
    pub category_id: Uuid,
    /// Requested magnitude in cents (positive).
    pub amount_cents: i64,
    /// Signed transaction amount (always `-amount_cents`).
    pub ledger_amount_cents: i64,
    /// Approver's note.
    pub note: Option<String>,
}

/// Extra inputs accompanying a transition request.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    /// Approval fields; required when the target status is approved.
    pub approval: Option<ApproveInput>,
    /// Note recorded for reject/void/reopen transitions.
    pub note: Option<String>,
}

/// A validated state transition with audit data.
///
/// Produced by `ReimbursementService`; the repository executes it and the
/// API layer notifies the requester afterwards.
#[derive(Debug, Clone)]
pub enum RequestAction {
    /// Approve a pending request and post the offsetting transaction.
    Approve {
        /// The planned ledger effect.
        posting: ApprovalPosting,
        /// The approving user.
        approved_by: Uuid,
        /// When the approval was decided.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending request. Status-only; no ledger effect.
    Reject {
        /// The rejecting user.
        rejected_by: Uuid,
        /// Optional note for the requester.
        note: Option<String>,
    },
    /// Void a pending request. Status-only; no ledger effect.
    Void {
        /// The voiding user.
        voided_by: Uuid,
        /// Optional note for the requester.
        note: Option<String>,
    },
    /// Reopen a decided request back to pending.
    ///
    /// Does NOT reverse a previously posted offsetting transaction; an
    /// approved-then-reopened request leaves its ledger entry in place.
    Reopen {
        /// The reopening user.
        reopened_by: Uuid,
    },
}

impl RequestAction {
    /// Returns the status this action transitions the request into.
    #[must_use]
    pub const fn new_status(&self) -> RequestStatus {
        match self {
            Self::Approve { .. } => RequestStatus::Approved,
            Self::Reject { .. } => RequestStatus::Rejected,
            Self::Void { .. } => RequestStatus::Void,
            Self::Reopen { .. } => RequestStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Void,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::parse("VOID"), Some(RequestStatus::Void));
        assert_eq!(RequestStatus::parse("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Void.is_terminal());
    }

    #[test]
    fn test_reference_tag() {
        let id = Uuid::nil();
        assert_eq!(
            reference_tag(id),
            "Reimbursement ID: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_action_new_status() {
        let reopen = RequestAction::Reopen {
            reopened_by: Uuid::new_v4(),
        };
        assert_eq!(reopen.new_status(), RequestStatus::Pending);

        let reject = RequestAction::Reject {
            rejected_by: Uuid::new_v4(),
            note: None,
        };
        assert_eq!(reject.new_status(), RequestStatus::Rejected);
    }
}
