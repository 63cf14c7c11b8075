//! Reimbursement request state machine.
//!
//! Requests are created pending; an approver moves them to approved,
//! rejected, or void, and any of those terminal states can be reopened back
//! to pending. Approval is the only transition with a ledger effect: it
//! plans one negative offsetting posting against the reimbursing account.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReimbursementError;
pub use service::ReimbursementService;
pub use types::{
    ApprovalPosting, ApproveInput, RequestAction, RequestStatus, TransitionContext, reference_tag,
};
