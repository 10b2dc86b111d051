//! # Billing Events
//!
//! Lifecycle events a gateway publishes through the [`Dispatcher`].
//! Every well-known event has its own variant with typed fields;
//! anything else travels as [`Event::Custom`] with a JSON payload.
//!
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

use crate::order::Order;
use crate::refund::Refund;
use crate::subscription::{FailedPayment, Rebill, Subscription};
use std::fmt;

/// Name listeners subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    OrderCompleted,
    OrderFailed,
    OrderRefunded,
    OrderPartiallyRefunded,
    SubscriptionActivated,
    SubscriptionFailed,
    SubscriptionCancelled,
    SubscriptionRebilled,
    SubscriptionPaymentFailed,
    /// Free-form name outside the well-known set
    Custom(String),
}

impl EventName {
    pub fn as_str(&self) -> &str {
        match self {
            EventName::OrderCompleted => "on_order_completed",
            EventName::OrderFailed => "on_order_failed",
            EventName::OrderRefunded => "on_order_refunded",
            EventName::OrderPartiallyRefunded => "on_order_partially_refunded",
            EventName::SubscriptionActivated => "on_subscription_activated",
            EventName::SubscriptionFailed => "on_subscription_failed",
            EventName::SubscriptionCancelled => "on_subscription_cancelled",
            EventName::SubscriptionRebilled => "on_subscription_rebilled",
            EventName::SubscriptionPaymentFailed => "on_subscription_payment_failed",
            EventName::Custom(name) => name,
        }
    }

    /// All names except [`EventName::Custom`]
    pub fn well_known() -> [EventName; 9] {
        [
            EventName::OrderCompleted,
            EventName::OrderFailed,
            EventName::OrderRefunded,
            EventName::OrderPartiallyRefunded,
            EventName::SubscriptionActivated,
            EventName::SubscriptionFailed,
            EventName::SubscriptionCancelled,
            EventName::SubscriptionRebilled,
            EventName::SubscriptionPaymentFailed,
        ]
    }
}

impl EventName {
    /// Well-known variant for a custom name that spells one, otherwise unchanged
    pub fn canonical(self) -> Self {
        match self {
            EventName::Custom(name) => EventName::from(name.as_str()),
            known => known,
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName::well_known()
            .into_iter()
            .find(|known| known.as_str() == name)
            .unwrap_or_else(|| EventName::Custom(name.to_string()))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published billing lifecycle event
#[derive(Debug, Clone)]
pub enum Event {
    OrderCompleted {
        order: Order,
    },
    OrderFailed {
        order: Order,
    },
    OrderRefunded {
        order: Order,
        refund: Refund,
    },
    OrderPartiallyRefunded {
        order: Order,
        refund: Refund,
    },
    SubscriptionActivated {
        subscription: Subscription,
    },
    SubscriptionFailed {
        subscription: Subscription,
    },
    SubscriptionCancelled {
        subscription: Subscription,
    },
    SubscriptionRebilled {
        subscription: Subscription,
        rebill: Rebill,
    },
    SubscriptionPaymentFailed {
        subscription: Subscription,
        failed_payment: FailedPayment,
    },
    Custom {
        name: String,
        payload: serde_json::Value,
    },
}

impl Event {
    /// Name the event is dispatched under
    pub fn name(&self) -> EventName {
        match self {
            Event::OrderCompleted { .. } => EventName::OrderCompleted,
            Event::OrderFailed { .. } => EventName::OrderFailed,
            Event::OrderRefunded { .. } => EventName::OrderRefunded,
            Event::OrderPartiallyRefunded { .. } => EventName::OrderPartiallyRefunded,
            Event::SubscriptionActivated { .. } => EventName::SubscriptionActivated,
            Event::SubscriptionFailed { .. } => EventName::SubscriptionFailed,
            Event::SubscriptionCancelled { .. } => EventName::SubscriptionCancelled,
            Event::SubscriptionRebilled { .. } => EventName::SubscriptionRebilled,
            Event::SubscriptionPaymentFailed { .. } => EventName::SubscriptionPaymentFailed,
            Event::Custom { name, .. } => EventName::from(name.as_str()),
        }
    }

    /// Order or subscription reference the event is about
    pub fn reference(&self) -> Option<&str> {
        match self {
            Event::OrderCompleted { order }
            | Event::OrderFailed { order }
            | Event::OrderRefunded { order, .. }
            | Event::OrderPartiallyRefunded { order, .. } => Some(order.reference()),
            Event::SubscriptionActivated { subscription }
            | Event::SubscriptionFailed { subscription }
            | Event::SubscriptionCancelled { subscription }
            | Event::SubscriptionRebilled { subscription, .. }
            | Event::SubscriptionPaymentFailed { subscription, .. } => {
                Some(subscription.order().reference())
            }
            Event::Custom { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_round_trip() {
        for name in EventName::well_known() {
            assert_eq!(EventName::from(name.as_str()), name);
        }
    }

    #[test]
    fn test_unknown_name_is_custom() {
        assert_eq!(
            EventName::from("on_invoice_sent"),
            EventName::Custom("on_invoice_sent".to_string())
        );
        assert_eq!(EventName::OrderRefunded.to_string(), "on_order_refunded");
    }

    #[test]
    fn test_custom_event() {
        let event = Event::Custom {
            name: "on_invoice_sent".to_string(),
            payload: json!({"invoice": "INV-1"}),
        };
        assert_eq!(event.name().as_str(), "on_invoice_sent");
        assert!(event.reference().is_none());
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(
            EventName::Custom("on_order_completed".to_string()).canonical(),
            EventName::OrderCompleted
        );
        assert_eq!(
            EventName::Custom("on_invoice_sent".to_string()).canonical(),
            EventName::Custom("on_invoice_sent".to_string())
        );
        assert_eq!(EventName::OrderFailed.canonical(), EventName::OrderFailed);
    }

    #[test]
    fn test_custom_event_with_well_known_name() {
        let event = Event::Custom {
            name: "on_order_failed".to_string(),
            payload: json!(null),
        };
        assert_eq!(event.name(), EventName::OrderFailed);
    }
}
