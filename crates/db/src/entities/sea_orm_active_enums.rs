//! Database enum types.

use bursar_core::posting::Direction;
use bursar_core::reimbursement::RequestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_direction")]
#[serde(rename_all = "lowercase")]
pub enum ItemDirection {
    /// Amounts count toward the transaction total.
    #[sea_orm(string_value = "in")]
    In,
    /// Amounts count against the transaction total.
    #[sea_orm(string_value = "out")]
    Out,
}

impl From<ItemDirection> for Direction {
    fn from(value: ItemDirection) -> Self {
        match value {
            ItemDirection::In => Self::In,
            ItemDirection::Out => Self::Out,
        }
    }
}

impl From<Direction> for ItemDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::In => Self::In,
            Direction::Out => Self::Out,
        }
    }
}

/// Reimbursement request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "reimbursement_status"
)]
#[serde(rename_all = "lowercase")]
pub enum ReimbursementStatus {
    /// Waiting for an approver's decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved; an offsetting transaction was posted.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined by an approver.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Withdrawn without a decision.
    #[sea_orm(string_value = "void")]
    Void,
}

impl From<ReimbursementStatus> for RequestStatus {
    fn from(value: ReimbursementStatus) -> Self {
        match value {
            ReimbursementStatus::Pending => Self::Pending,
            ReimbursementStatus::Approved => Self::Approved,
            ReimbursementStatus::Rejected => Self::Rejected,
            ReimbursementStatus::Void => Self::Void,
        }
    }
}

impl From<RequestStatus> for ReimbursementStatus {
    fn from(value: RequestStatus) -> Self {
        match value {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
            RequestStatus::Void => Self::Void,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(Direction::from(ItemDirection::In), Direction::In);
        assert_eq!(Direction::from(ItemDirection::Out), Direction::Out);
        assert_eq!(ItemDirection::from(Direction::In), ItemDirection::In);
        assert_eq!(ItemDirection::from(Direction::Out), ItemDirection::Out);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReimbursementStatus::Pending,
            ReimbursementStatus::Approved,
            ReimbursementStatus::Rejected,
            ReimbursementStatus::Void,
        ] {
            assert_eq!(ReimbursementStatus::from(RequestStatus::from(status)), status);
        }
    }
}
