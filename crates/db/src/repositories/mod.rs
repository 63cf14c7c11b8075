//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod account;
pub mod contact;
pub mod lookup;
pub mod organization;
pub mod reimbursement;
pub mod transaction;
pub mod user;

pub use account::{
    AccountError, AccountRepository, AccountWithBalance, CreateAccountInput, UpdateAccountInput,
};
pub use contact::{ContactError, ContactRepository, CreateContactInput, CreateEngagementInput};
pub use lookup::{LookupRepository, well_known};
pub use organization::{MemberRecord, OrganizationRepository};
pub use reimbursement::{
    CreateRequestInput, ReimbursementRepository, RequestWithReceipts, TransitionApplied,
};
pub use transaction::{
    CreatePostingInput, TransactionFilter, TransactionRepository, TransactionWithItems,
    TransferRecord,
};
pub use user::UserRepository;
