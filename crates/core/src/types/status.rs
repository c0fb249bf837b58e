//! Status enums for orders and payments.
//!
//! [`OrderStatus`] carries the lifecycle graph itself: the happy path is
//! strictly forward one step at a time, the exceptional states are
//! reachable from any non-terminal state, and terminal states admit no
//! further movement. The engine in [`crate::order`] consults this graph
//! for every transition.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Happy path: `pending → confirmed → processing → packed → shipped →
/// delivered`. `cancelled`, `returned` and `refunded` are side-exits from
/// any non-terminal state; `returned` may still move to `refunded`.
/// `delivered`, `cancelled` and `refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

impl OrderStatus {
    /// Whether no further transitions are permitted from this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }

    /// The next status on the happy path, if any.
    #[must_use]
    pub const fn next_forward(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Processing),
            Self::Processing => Some(Self::Packed),
            Self::Packed => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Whether a transition from `self` to `target` is structurally valid.
    ///
    /// Does not distinguish *why* a transition is invalid; the order
    /// engine reports terminal orders separately from bad edges.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() || target == *self {
            return false;
        }
        if *self == Self::Returned {
            return target == Self::Refunded;
        }
        self.next_forward() == Some(target)
            || matches!(target, Self::Cancelled | Self::Returned | Self::Refunded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "packed" => Ok(Self::Packed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "returned" => Ok(Self::Returned),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status, tracked separately from order status.
///
/// Set by the payment-gateway callback collaborator; the order engine only
/// exposes a query surface plus an audited manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Card,
    Netbanking,
    Wallet,
    Cod,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upi => "upi",
            Self::Card => "card",
            Self::Netbanking => "netbanking",
            Self::Wallet => "wallet",
            Self::Cod => "cod",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            "netbanking" => Ok(Self::Netbanking),
            "wallet" => Ok(Self::Wallet),
            "cod" => Ok(Self::Cod),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_step_by_step() {
        use OrderStatus::{Confirmed, Delivered, Packed, Pending, Processing, Shipped};
        let chain = [Pending, Confirmed, Processing, Packed, Shipped, Delivered];
        for (from, to) in chain.iter().zip(chain.iter().skip(1)) {
            assert!(from.can_transition_to(*to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn test_no_skipping_forward() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_no_moving_backward() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Packed));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_side_exits_from_non_terminal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Packed,
            OrderStatus::Shipped,
        ] {
            assert!(status.can_transition_to(OrderStatus::Cancelled));
            assert!(status.can_transition_to(OrderStatus::Returned));
            assert!(status.can_transition_to(OrderStatus::Refunded));
        }
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert!(terminal.is_terminal());
            for target in [
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Cancelled,
                OrderStatus::Refunded,
            ] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_returned_only_refunds() {
        assert!(OrderStatus::Returned.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Returned.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Returned.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Returned.is_terminal());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Packed).unwrap(),
            "\"packed\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"netbanking\"").unwrap(),
            PaymentMethod::Netbanking
        );
    }

    #[test]
    fn test_from_str_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Returned,
            OrderStatus::Delivered,
        ] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("sideways".parse::<OrderStatus>().is_err());
    }
}
