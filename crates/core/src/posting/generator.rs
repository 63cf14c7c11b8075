//! Transaction-item generation.
//!
//! Given raw form line items and the item types visible to the org, this
//! resolves each line's signed amount and the aggregate transaction total.
//! The expense and income entry screens both call this with no notion of
//! intent: the item type's direction alone governs the sign.

use super::error::PostingError;
use super::types::{GeneratedItems, ItemInput, ItemTypeRef, SignedItem};

/// Computes signed item amounts and the transaction total.
///
/// For each input item the type is looked up by `type_id` among the visible
/// types; the signed amount is `amount_cents * (+1 for in, -1 for out)` and
/// the total is the sum of all signed amounts. An empty input yields total 0
/// and an empty item list; whether an empty posting is acceptable is the
/// caller's decision.
///
/// # Errors
///
/// - `PostingError::UnknownItemType` if an item references a type that is
///   not visible to the organization (tampered or stale payload)
/// - `PostingError::NegativeItemAmount` if a raw amount is negative
/// - `PostingError::AmountOverflow` if signing or summing overflows
pub fn generate_items(
    items: &[ItemInput],
    visible_types: &[ItemTypeRef],
) -> Result<GeneratedItems, PostingError> {
    let mut signed = Vec::with_capacity(items.len());
    let mut total_cents: i64 = 0;

    for item in items {
        if item.amount_cents < 0 {
            return Err(PostingError::NegativeItemAmount(item.amount_cents));
        }

        let item_type = visible_types
            .iter()
            .find(|t| t.id == item.type_id)
            .ok_or(PostingError::UnknownItemType(item.type_id))?;

        let amount_cents = item
            .amount_cents
            .checked_mul(item_type.direction.sign())
            .ok_or(PostingError::AmountOverflow)?;

        total_cents = total_cents
            .checked_add(amount_cents)
            .ok_or(PostingError::AmountOverflow)?;

        signed.push(SignedItem {
            type_id: item.type_id,
            method_id: item.method_id,
            amount_cents,
            description: item.description.clone(),
        });
    }

    Ok(GeneratedItems {
        total_cents,
        items: signed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::types::Direction;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn item_type(direction: Direction) -> ItemTypeRef {
        ItemTypeRef {
            id: Uuid::new_v4(),
            name: match direction {
                Direction::In => "Donation".to_string(),
                Direction::Out => "Fee".to_string(),
            },
            direction,
        }
    }

    fn raw_item(type_id: Uuid, amount_cents: i64) -> ItemInput {
        ItemInput {
            type_id,
            method_id: Uuid::new_v4(),
            amount_cents,
            description: None,
        }
    }

    #[test]
    fn test_in_item_keeps_sign() {
        let donation = item_type(Direction::In);
        let result = generate_items(&[raw_item(donation.id, 5000)], &[donation]).unwrap();

        assert_eq!(result.total_cents, 5000);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].amount_cents, 5000);
    }

    #[test]
    fn test_out_item_negates() {
        let fee = item_type(Direction::Out);
        let result = generate_items(&[raw_item(fee.id, 200)], &[fee]).unwrap();

        assert_eq!(result.total_cents, -200);
        assert_eq!(result.items[0].amount_cents, -200);
    }

    #[test]
    fn test_mixed_items_total() {
        let donation = item_type(Direction::In);
        let fee = item_type(Direction::Out);
        let items = vec![raw_item(donation.id, 10000), raw_item(fee.id, 2500)];

        let result =
            generate_items(&items, &[donation.clone(), fee.clone()]).unwrap();

        assert_eq!(result.total_cents, 7500);
        assert_eq!(result.items[0].amount_cents, 10000);
        assert_eq!(result.items[1].amount_cents, -2500);
    }

    #[test]
    fn test_empty_items_total_zero() {
        let result = generate_items(&[], &[item_type(Direction::In)]).unwrap();
        assert_eq!(result.total_cents, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let donation = item_type(Direction::In);
        let stale_type_id = Uuid::new_v4();

        let result = generate_items(&[raw_item(stale_type_id, 100)], &[donation]);

        assert!(matches!(
            result,
            Err(PostingError::UnknownItemType(id)) if id == stale_type_id
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let donation = item_type(Direction::In);
        let result = generate_items(&[raw_item(donation.id, -1)], &[donation]);

        assert!(matches!(result, Err(PostingError::NegativeItemAmount(-1))));
    }

    #[test]
    fn test_overflow_rejected() {
        let donation = item_type(Direction::In);
        let items = vec![
            raw_item(donation.id, i64::MAX),
            raw_item(donation.id, i64::MAX),
        ];

        let result = generate_items(&items, &[donation]);
        assert!(matches!(result, Err(PostingError::AmountOverflow)));
    }

    #[test]
    fn test_preserves_descriptions_and_methods() {
        let donation = item_type(Direction::In);
        let method_id = Uuid::new_v4();
        let items = vec![ItemInput {
            type_id: donation.id,
            method_id,
            amount_cents: 42,
            description: Some("pledge drive".to_string()),
        }];

        let result = generate_items(&items, &[donation]).unwrap();
        assert_eq!(result.items[0].method_id, method_id);
        assert_eq!(
            result.items[0].description.as_deref(),
            Some("pledge drive")
        );
    }

    // ========================================================================
    // Property tests: sign and total invariants
    // ========================================================================

    /// Strategy for generating raw non-negative amounts.
    fn amount_strategy() -> impl Strategy<Value = i64> {
        0i64..10_000_000
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::In), Just(Direction::Out)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any raw amount and direction, the generated item's sign
        /// matches the direction: non-negative for in, non-positive for out.
        #[test]
        fn prop_sign_follows_direction(
            amount in amount_strategy(),
            direction in direction_strategy(),
        ) {
            let t = item_type(direction);
            let result = generate_items(&[raw_item(t.id, amount)], &[t]).unwrap();

            let signed = result.items[0].amount_cents;
            match direction {
                Direction::In => prop_assert_eq!(signed, amount),
                Direction::Out => prop_assert_eq!(signed, -amount),
            }
        }

        /// For any generated set, the total equals the sum of the signed
        /// item amounts.
        #[test]
        fn prop_total_is_sum_of_signed_items(
            specs in prop::collection::vec(
                (amount_strategy(), direction_strategy()),
                0..20,
            ),
        ) {
            let types: Vec<ItemTypeRef> =
                specs.iter().map(|&(_, d)| item_type(d)).collect();
            let items: Vec<ItemInput> = specs
                .iter()
                .zip(&types)
                .map(|(&(amount, _), t)| raw_item(t.id, amount))
                .collect();

            let result = generate_items(&items, &types).unwrap();

            let expected: i64 = result.items.iter().map(|i| i.amount_cents).sum();
            prop_assert_eq!(result.total_cents, expected);
            prop_assert_eq!(result.items.len(), items.len());
        }

        /// The magnitude of every signed amount equals the raw input amount.
        #[test]
        fn prop_magnitude_preserved(
            amount in amount_strategy(),
            direction in direction_strategy(),
        ) {
            let t = item_type(direction);
            let result = generate_items(&[raw_item(t.id, amount)], &[t]).unwrap();
            prop_assert_eq!(result.items[0].amount_cents.abs(), amount);
        }
    }
}
