//! Status enums shared by the client and its front ends.

use serde::{Deserialize, Serialize};

/// Authentication status exposed by the session holder.
///
/// `Pending` is the initial state until a prior session has been looked up
/// or a credential exchange has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Pending,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    /// Whether requests that need a credential may be issued.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// How an order is paid, as reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    /// Any value the client does not know about.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Delivery progress of an order, derived from the remote paid/delivered flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    AwaitingPayment,
    Processing,
    Delivered,
}

impl FulfillmentStatus {
    /// Derive the status from the remote `isPaid` / `isDelivered` flags.
    ///
    /// Cash orders are paid on delivery, so an unpaid cash order that has not
    /// been delivered yet is still `Processing`.
    #[must_use]
    pub const fn from_flags(method: PaymentMethod, is_paid: bool, is_delivered: bool) -> Self {
        if is_delivered {
            Self::Delivered
        } else if is_paid || matches!(method, PaymentMethod::Cash) {
            Self::Processing
        } else {
            Self::AwaitingPayment
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPayment => write!(f, "awaiting payment"),
            Self::Processing => write!(f, "processing"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_default_is_pending() {
        assert_eq!(SessionStatus::default(), SessionStatus::Pending);
        assert!(!SessionStatus::Pending.is_authenticated());
        assert!(SessionStatus::Authenticated.is_authenticated());
    }

    #[test]
    fn test_payment_method_unknown_value() {
        let method: PaymentMethod = serde_json::from_str("\"wallet\"").unwrap();
        assert_eq!(method, PaymentMethod::Other);
        let method: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(method, PaymentMethod::Card);
    }

    #[test]
    fn test_fulfillment_from_flags() {
        assert_eq!(
            FulfillmentStatus::from_flags(PaymentMethod::Cash, false, false),
            FulfillmentStatus::Processing
        );
        assert_eq!(
            FulfillmentStatus::from_flags(PaymentMethod::Card, false, false),
            FulfillmentStatus::AwaitingPayment
        );
        assert_eq!(
            FulfillmentStatus::from_flags(PaymentMethod::Card, true, true),
            FulfillmentStatus::Delivered
        );
    }
}
