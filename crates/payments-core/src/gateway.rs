//! # Gateway Capability
//!
//! The surface every concrete gateway exposes to the application: lookups
//! of previously seen orders, refunds and subscriptions, plus `trigger_*`
//! methods that record a value object and then publish the matching event.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Gateway (trait)                        │
//! │  ├── name() / dispatcher() / ledger() / handle()            │
//! │  ├── order_by_reference() / refund_by_id() / ...            │
//! │  └── trigger_order_completed() / trigger_order_refunded()...│
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │  OffsiteGateway   │
//!                  └───────────────────┘
//! ```
//!
//! Concrete gateways live behind an `Arc` and hand out a `Weak` handle to
//! themselves; refunds and subscription events keep that handle to resolve
//! the order or subscription they belong to.

use crate::dispatcher::Dispatcher;
use crate::error::{PaymentError, PaymentResult};
use crate::event::Event;
use crate::order::{items_total, Order, OrderItem};
use crate::refund::Refund;
use crate::subscription::{FailedPayment, Rebill, Subscription};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::info;

/// Lookup tables for everything a gateway has seen, keyed by gateway id
#[derive(Debug, Default)]
pub struct Ledger {
    orders: RwLock<HashMap<String, Order>>,
    refunds: RwLock<HashMap<String, Refund>>,
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an order, replacing any earlier one with the same reference
    pub fn record_order(&self, order: Order) {
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.reference().to_string(), order);
    }

    pub fn order(&self, reference: &str) -> PaymentResult<Order> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned()
            .ok_or_else(|| PaymentError::OrderNotFound {
                reference: reference.to_string(),
            })
    }

    pub fn record_refund(&self, refund: Refund) {
        self.refunds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(refund.refund_id().to_string(), refund);
    }

    pub fn refund(&self, refund_id: &str) -> PaymentResult<Refund> {
        self.refunds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(refund_id)
            .cloned()
            .ok_or_else(|| PaymentError::RefundNotFound {
                refund_id: refund_id.to_string(),
            })
    }

    /// Refunds recorded against the order with `reference`
    pub fn refund_count_for(&self, reference: &str) -> usize {
        self.refunds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|refund| refund.reference() == reference)
            .count()
    }

    pub fn record_subscription(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription.order().reference().to_string(), subscription);
    }

    pub fn subscription(&self, reference: &str) -> PaymentResult<Subscription> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned()
            .ok_or_else(|| PaymentError::SubscriptionNotFound {
                reference: reference.to_string(),
            })
    }
}

/// A payment gateway the application receives billing events from.
///
/// Implementors provide the four accessors; lookups and triggers come for
/// free. Trigger methods record state before publishing, so listeners can
/// already resolve refunds back to their orders.
pub trait Gateway: Send + Sync {
    /// Gateway name (for logging and customer reference mapping)
    fn name(&self) -> &str;

    fn dispatcher(&self) -> &Arc<Dispatcher>;

    fn ledger(&self) -> &Ledger;

    /// Weak handle to this gateway, stored in refunds and subscription events
    fn handle(&self) -> Weak<dyn Gateway>;

    fn order_by_reference(&self, reference: &str) -> PaymentResult<Order> {
        self.ledger().order(reference)
    }

    fn refund_by_id(&self, refund_id: &str) -> PaymentResult<Refund> {
        self.ledger().refund(refund_id)
    }

    fn subscription_by_reference(&self, reference: &str) -> PaymentResult<Subscription> {
        self.ledger().subscription(reference)
    }

    /// Order was paid
    fn trigger_order_completed(&self, order: Order) -> PaymentResult<()>
    where
        Self: Sized,
    {
        info!("[{}] Order #{} completed", self.name(), order.reference());
        self.ledger().record_order(order.clone());
        self.dispatcher()
            .publish(self, &Event::OrderCompleted { order })
    }

    /// Order payment failed
    fn trigger_order_failed(&self, order: Order) -> PaymentResult<()>
    where
        Self: Sized,
    {
        info!("[{}] Order #{} failed", self.name(), order.reference());
        self.ledger().record_order(order.clone());
        self.dispatcher().publish(self, &Event::OrderFailed { order })
    }

    /// Whole order was refunded. The refund id is `<reference>-X`.
    fn trigger_order_refunded(
        &self,
        order: Order,
        timestamp: Option<DateTime<Utc>>,
    ) -> PaymentResult<Refund>
    where
        Self: Sized,
    {
        self.ledger().record_order(order.clone());

        let refund_id = format!("{}-X", order.reference());
        let refund = Refund::new(
            &refund_id,
            order.reference(),
            timestamp.unwrap_or_else(Utc::now),
            order.total(),
        )?;
        refund.set_gateway(self.handle())?;
        self.ledger().record_refund(refund.clone());

        info!(
            "[{}] Order #{} refunded in full ({})",
            self.name(),
            order.reference(),
            refund.total()
        );

        self.dispatcher().publish(
            self,
            &Event::OrderRefunded {
                order,
                refund: refund.clone(),
            },
        )?;
        Ok(refund)
    }

    /// Some items of the order were refunded.
    ///
    /// The refund total is the sum of `items` and must stay below the order
    /// total. Refund ids are `<reference>-P1`, `<reference>-P2`, ...
    fn trigger_order_partially_refunded(
        &self,
        order: Order,
        items: Vec<OrderItem>,
        timestamp: Option<DateTime<Utc>>,
    ) -> PaymentResult<Refund>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return Err(PaymentError::validation(
                "items",
                "Partial refund needs at least one item",
            ));
        }

        let total = items_total(&items);
        if total >= order.total() {
            return Err(PaymentError::validation(
                "items",
                format!(
                    "Partial refund of {} is not less than order total {}",
                    total,
                    order.total()
                ),
            ));
        }

        self.ledger().record_order(order.clone());

        let sequence = self.ledger().refund_count_for(order.reference()) + 1;
        let refund_id = format!("{}-P{}", order.reference(), sequence);
        let refund = Refund::new(
            &refund_id,
            order.reference(),
            timestamp.unwrap_or_else(Utc::now),
            total,
        )?
        .with_items(items);
        refund.set_gateway(self.handle())?;
        self.ledger().record_refund(refund.clone());

        info!(
            "[{}] Order #{} partially refunded ({} of {})",
            self.name(),
            order.reference(),
            total,
            order.total()
        );

        self.dispatcher().publish(
            self,
            &Event::OrderPartiallyRefunded {
                order,
                refund: refund.clone(),
            },
        )?;
        Ok(refund)
    }

    fn trigger_subscription_activated(&self, subscription: Subscription) -> PaymentResult<()>
    where
        Self: Sized,
    {
        info!(
            "[{}] Subscription #{} activated ({})",
            self.name(),
            subscription.order().reference(),
            subscription.period()
        );
        self.ledger().record_subscription(subscription.clone());
        self.dispatcher()
            .publish(self, &Event::SubscriptionActivated { subscription })
    }

    fn trigger_subscription_failed(&self, subscription: Subscription) -> PaymentResult<()>
    where
        Self: Sized,
    {
        info!(
            "[{}] Subscription #{} failed",
            self.name(),
            subscription.order().reference()
        );
        self.ledger().record_subscription(subscription.clone());
        self.dispatcher()
            .publish(self, &Event::SubscriptionFailed { subscription })
    }

    fn trigger_subscription_cancelled(&self, subscription: Subscription) -> PaymentResult<()>
    where
        Self: Sized,
    {
        info!(
            "[{}] Subscription #{} cancelled",
            self.name(),
            subscription.order().reference()
        );
        self.ledger().record_subscription(subscription.clone());
        self.dispatcher()
            .publish(self, &Event::SubscriptionCancelled { subscription })
    }

    /// Recurring charge for a subscription this gateway already knows
    fn trigger_subscription_rebilled(&self, rebill: Rebill) -> PaymentResult<()>
    where
        Self: Sized,
    {
        rebill.set_gateway(self.handle())?;
        let subscription = self.subscription_by_reference(rebill.subscription_reference())?;

        info!(
            "[{}] Subscription #{} rebilled",
            self.name(),
            rebill.subscription_reference()
        );

        self.dispatcher().publish(
            self,
            &Event::SubscriptionRebilled {
                subscription,
                rebill,
            },
        )
    }

    /// Declined recurring charge for a subscription this gateway already knows
    fn trigger_subscription_payment_failed(
        &self,
        failed_payment: FailedPayment,
    ) -> PaymentResult<()>
    where
        Self: Sized,
    {
        failed_payment.set_gateway(self.handle())?;
        let subscription =
            self.subscription_by_reference(failed_payment.subscription_reference())?;

        info!(
            "[{}] Payment for subscription #{} failed",
            self.name(),
            failed_payment.subscription_reference()
        );

        self.dispatcher().publish(
            self,
            &Event::SubscriptionPaymentFailed {
                subscription,
                failed_payment,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{BasicCustomer, Customer};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn order(reference: &str) -> Order {
        let customer: Arc<dyn Customer> =
            Arc::new(BasicCustomer::new("John Doe", "john@example.com"));
        Order::new(
            customer,
            reference,
            Utc.with_ymd_and_hms(2015, 10, 15, 0, 0, 0).unwrap(),
            "USD",
            dec!(1200),
            vec![OrderItem::new("Expensive product", 1, dec!(1200)).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_ledger_lookups() {
        let ledger = Ledger::new();
        ledger.record_order(order("2015-01"));

        assert_eq!(ledger.order("2015-01").unwrap().reference(), "2015-01");
        assert!(ledger.order("2015-02").unwrap_err().is_not_found());
        assert!(matches!(
            ledger.refund("2015-01-X"),
            Err(PaymentError::RefundNotFound { .. })
        ));
        assert!(matches!(
            ledger.subscription("2015-01"),
            Err(PaymentError::SubscriptionNotFound { .. })
        ));
    }

    #[test]
    fn test_ledger_counts_refunds_per_order() {
        let ledger = Ledger::new();
        let timestamp = Utc::now();
        ledger.record_refund(Refund::new("A-P1", "A", timestamp, dec!(1)).unwrap());
        ledger.record_refund(Refund::new("A-P2", "A", timestamp, dec!(1)).unwrap());
        ledger.record_refund(Refund::new("B-X", "B", timestamp, dec!(1)).unwrap());

        assert_eq!(ledger.refund_count_for("A"), 2);
        assert_eq!(ledger.refund_count_for("B"), 1);
        assert_eq!(ledger.refund_count_for("C"), 0);
    }
}
