//! Inter-account transfer planning.
//!
//! A transfer is a paired posting: a negative transaction on the source
//! account and a positive transaction on the destination, same magnitude and
//! date. Planning is pure; the repository checks the source balance and
//! persists both sides in one all-or-nothing unit.

use super::error::PostingError;
use super::types::{
    Direction, InsufficientFunds, PostingDraft, SignedItem, TransferInput, TransferPlan,
    TransferRefs,
};

/// Validates a transfer request before any balance check or write.
///
/// # Errors
///
/// - `PostingError::SameAccount` if source and destination are the same
/// - `PostingError::NonPositiveTransferAmount` if the amount is zero or
///   negative
pub fn validate_transfer(input: &TransferInput) -> Result<(), PostingError> {
    if input.from_account_id == input.to_account_id {
        return Err(PostingError::SameAccount);
    }
    if input.amount_cents <= 0 {
        return Err(PostingError::NonPositiveTransferAmount(input.amount_cents));
    }
    Ok(())
}

/// Checks whether the source account can fund the transfer.
///
/// Returns the structured insufficient-funds rejection when it cannot; the
/// caller converts this into a soft, user-facing outcome rather than an
/// error. The balance passed in must be read inside the same database
/// transaction that performs the write.
#[must_use]
pub fn check_funds(available_cents: i64, requested_cents: i64) -> Option<InsufficientFunds> {
    if requested_cents > available_cents {
        Some(InsufficientFunds {
            available_cents,
            requested_cents,
        })
    } else {
        None
    }
}

/// Plans the paired postings for a validated transfer.
///
/// The outgoing draft carries `-amount` with the `Transfer_Out` item type
/// and the internal-transfer-loss category; the incoming draft carries
/// `+amount` with `Transfer_In` and internal-transfer-gain.
///
/// # Errors
///
/// Returns the same validation errors as [`validate_transfer`].
pub fn plan_transfer(
    input: &TransferInput,
    refs: &TransferRefs,
) -> Result<TransferPlan, PostingError> {
    validate_transfer(input)?;

    let outgoing_amount = input
        .amount_cents
        .checked_mul(Direction::Out.sign())
        .ok_or(PostingError::AmountOverflow)?;

    let outgoing = PostingDraft {
        account_id: input.from_account_id,
        amount_cents: outgoing_amount,
        category_id: refs.loss_category_id,
        description: input.description.clone(),
        item: SignedItem {
            type_id: refs.out_type_id,
            method_id: refs.method_id,
            amount_cents: outgoing_amount,
            description: input.description.clone(),
        },
    };

    let incoming = PostingDraft {
        account_id: input.to_account_id,
        amount_cents: input.amount_cents,
        category_id: refs.gain_category_id,
        description: input.description.clone(),
        item: SignedItem {
            type_id: refs.in_type_id,
            method_id: refs.method_id,
            amount_cents: input.amount_cents,
            description: input.description.clone(),
        },
    };

    Ok(TransferPlan {
        outgoing,
        incoming,
        date: input.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn refs() -> TransferRefs {
        TransferRefs {
            out_type_id: Uuid::new_v4(),
            in_type_id: Uuid::new_v4(),
            method_id: Uuid::new_v4(),
            loss_category_id: Uuid::new_v4(),
            gain_category_id: Uuid::new_v4(),
        }
    }

    fn input(amount_cents: i64) -> TransferInput {
        TransferInput {
            from_account_id: Uuid::new_v4(),
            to_account_id: Uuid::new_v4(),
            amount_cents,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            description: Some("spring retreat float".to_string()),
        }
    }

    #[test]
    fn test_same_account_rejected() {
        let mut transfer = input(1000);
        transfer.to_account_id = transfer.from_account_id;

        assert!(matches!(
            validate_transfer(&transfer),
            Err(PostingError::SameAccount)
        ));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(matches!(
            validate_transfer(&input(0)),
            Err(PostingError::NonPositiveTransferAmount(0))
        ));
        assert!(matches!(
            validate_transfer(&input(-500)),
            Err(PostingError::NonPositiveTransferAmount(-500))
        ));
    }

    #[test]
    fn test_check_funds_insufficient() {
        let rejection = check_funds(5000, 10000).unwrap();
        assert_eq!(rejection.available_cents, 5000);
        assert_eq!(rejection.requested_cents, 10000);
    }

    #[test]
    fn test_check_funds_exact_balance_allowed() {
        assert!(check_funds(3000, 3000).is_none());
        assert!(check_funds(3000, 3001).is_some());
    }

    #[test]
    fn test_plan_builds_paired_postings() {
        let transfer = input(10000);
        let r = refs();
        let plan = plan_transfer(&transfer, &r).unwrap();

        assert_eq!(plan.outgoing.account_id, transfer.from_account_id);
        assert_eq!(plan.outgoing.amount_cents, -10000);
        assert_eq!(plan.outgoing.category_id, r.loss_category_id);
        assert_eq!(plan.outgoing.item.type_id, r.out_type_id);
        assert_eq!(plan.outgoing.item.amount_cents, -10000);

        assert_eq!(plan.incoming.account_id, transfer.to_account_id);
        assert_eq!(plan.incoming.amount_cents, 10000);
        assert_eq!(plan.incoming.category_id, r.gain_category_id);
        assert_eq!(plan.incoming.item.type_id, r.in_type_id);
        assert_eq!(plan.incoming.item.amount_cents, 10000);

        assert_eq!(plan.date, transfer.date);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any positive amount, the planned sides are symmetric: the
        /// outgoing amount is exactly the negation of the incoming amount.
        #[test]
        fn prop_plan_symmetry(amount in 1i64..1_000_000_000) {
            let plan = plan_transfer(&input(amount), &refs()).unwrap();

            prop_assert_eq!(plan.outgoing.amount_cents, -plan.incoming.amount_cents);
            prop_assert_eq!(plan.incoming.amount_cents, amount);
            prop_assert_eq!(
                plan.outgoing.amount_cents + plan.incoming.amount_cents,
                0
            );
        }

        /// Funding is allowed iff the requested amount fits the balance.
        #[test]
        fn prop_check_funds(
            available in 0i64..1_000_000,
            requested in 1i64..1_000_000,
        ) {
            let rejection = check_funds(available, requested);
            if requested > available {
                prop_assert!(rejection.is_some());
            } else {
                prop_assert!(rejection.is_none());
            }
        }
    }
}
