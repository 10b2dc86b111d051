//! # Offsite Redirect Gateway
//!
//! The customer is sent to the provider's hosted checkout page and the
//! provider reports back with notifications. Everything the gateway learns
//! is recorded in its ledger and announced through the shared dispatcher.

use crate::config::OffsiteConfig;
use crate::notification::Notification;
use chrono::{DateTime, Utc};
use payments_core::{
    items_total, Dispatcher, FailedPayment, Gateway, Ledger, Order, OrderItem, PaymentError,
    PaymentResult, Rebill,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument};

/// Description of the synthetic item used for amount-only partial refunds
pub const PARTIAL_REFUND_DESCRIPTION: &str = "Partial refund";

/// How a refund notification relates to its order
#[derive(Debug, Clone, PartialEq)]
pub enum RefundKind {
    Full,
    Partial(Vec<OrderItem>),
}

impl RefundKind {
    /// Classify a refund of `order` from the optional total and items the
    /// provider reported.
    ///
    /// Items summing to the order total are a full refund. When both a total
    /// and items are reported they must agree.
    pub fn classify(
        order: &Order,
        total: Option<Decimal>,
        items: Option<Vec<OrderItem>>,
    ) -> PaymentResult<Self> {
        if let Some(total) = total {
            if total <= Decimal::ZERO {
                return Err(PaymentError::validation(
                    "total",
                    "Refund total must be positive",
                ));
            }
            if total > order.total() {
                return Err(PaymentError::validation(
                    "total",
                    format!("Refund of {} exceeds order total {}", total, order.total()),
                ));
            }
        }

        match items.filter(|items| !items.is_empty()) {
            Some(items) => {
                let sum = items_total(&items);
                if let Some(total) = total {
                    if total != sum {
                        return Err(PaymentError::validation(
                            "total",
                            format!("Refund total {} differs from item sum {}", total, sum),
                        ));
                    }
                }
                if sum > order.total() {
                    return Err(PaymentError::validation(
                        "items",
                        format!("Refunded items of {} exceed order total {}", sum, order.total()),
                    ));
                }

                if sum == order.total() {
                    Ok(RefundKind::Full)
                } else {
                    Ok(RefundKind::Partial(items))
                }
            }
            None => match total {
                Some(total) if total < order.total() => Ok(RefundKind::Partial(vec![
                    OrderItem::new(PARTIAL_REFUND_DESCRIPTION, 1, total)?,
                ])),
                _ => Ok(RefundKind::Full),
            },
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, RefundKind::Partial(_))
    }
}

/// Offsite redirect gateway
pub struct OffsiteGateway {
    config: OffsiteConfig,
    me: Weak<OffsiteGateway>,
    dispatcher: Arc<Dispatcher>,
    ledger: Ledger,
}

impl OffsiteGateway {
    /// Create a new gateway publishing to `dispatcher`
    pub fn new(config: OffsiteConfig, dispatcher: Arc<Dispatcher>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            config,
            me: me.clone(),
            dispatcher,
            ledger: Ledger::new(),
        })
    }

    /// Create from environment variables
    pub fn from_env(dispatcher: Arc<Dispatcher>) -> PaymentResult<Arc<Self>> {
        let config = OffsiteConfig::from_env()?;
        Ok(Self::new(config, dispatcher))
    }

    pub fn config(&self) -> &OffsiteConfig {
        &self.config
    }

    /// Hosted checkout URL the customer is redirected to for `order`
    pub fn redirect_url(&self, order: &Order) -> String {
        let separator = if self.config.checkout_url.contains('?') {
            '&'
        } else {
            '?'
        };

        format!(
            "{}{}reference={}&amount={}&currency={}",
            self.config.checkout_url,
            separator,
            encode_component(order.reference()),
            order.total(),
            order.currency()
        )
    }

    /// Parse a raw notification body and process it
    pub fn process_slice(&self, payload: &[u8]) -> PaymentResult<()> {
        let notification = Notification::from_slice(payload)?;
        self.process(notification)
    }

    /// Turn a provider notification into value objects and trigger the
    /// matching event
    #[instrument(
        skip(self, notification),
        fields(gateway = %self.config.name, kind = notification.kind())
    )]
    pub fn process(&self, notification: Notification) -> PaymentResult<()> {
        let currency = self.config.default_currency.as_str();

        match notification {
            Notification::OrderCompleted { order } => {
                self.trigger_order_completed(order.into_order(currency)?)
            }
            Notification::OrderFailed { order } => {
                self.trigger_order_failed(order.into_order(currency)?)
            }
            Notification::OrderRefunded {
                reference,
                total,
                items,
                timestamp,
            } => self.process_refund(&reference, total, items, timestamp),
            Notification::SubscriptionActivated { subscription } => {
                self.trigger_subscription_activated(subscription.into_subscription(currency)?)
            }
            Notification::SubscriptionFailed { subscription } => {
                self.trigger_subscription_failed(subscription.into_subscription(currency)?)
            }
            Notification::SubscriptionCancelled { reference } => {
                let subscription = self.subscription_by_reference(&reference)?;
                self.trigger_subscription_cancelled(subscription)
            }
            Notification::Rebill {
                reference,
                timestamp,
                next_billing_timestamp,
            } => {
                if let Some(next_billing) = next_billing_timestamp {
                    let mut subscription = self.subscription_by_reference(&reference)?;
                    subscription.set_next_billing_timestamp(next_billing);
                    debug!("Subscription #{} next billing pinned to {}", reference, next_billing);
                    self.ledger.record_subscription(subscription);
                }

                let rebill = Rebill::new(&reference, timestamp.unwrap_or_else(Utc::now))?;
                self.trigger_subscription_rebilled(rebill)
            }
            Notification::PaymentFailed {
                reference,
                timestamp,
            } => {
                let failed_payment =
                    FailedPayment::new(&reference, timestamp.unwrap_or_else(Utc::now))?;
                self.trigger_subscription_payment_failed(failed_payment)
            }
        }
    }

    fn process_refund(
        &self,
        reference: &str,
        total: Option<Decimal>,
        items: Option<Vec<OrderItem>>,
        timestamp: Option<DateTime<Utc>>,
    ) -> PaymentResult<()> {
        let order = self.order_by_reference(reference)?;
        let kind = RefundKind::classify(&order, total, items)?;

        info!(
            "[{}] Refund notification for order #{} (partial: {})",
            self.config.name,
            reference,
            kind.is_partial()
        );

        match kind {
            RefundKind::Full => self.trigger_order_refunded(order, timestamp)?,
            RefundKind::Partial(items) => {
                self.trigger_order_partially_refunded(order, items, timestamp)?
            }
        };
        Ok(())
    }
}

impl Gateway for OffsiteGateway {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn handle(&self) -> Weak<dyn Gateway> {
        self.me.clone()
    }
}

impl std::fmt::Debug for OffsiteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsiteGateway")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Percent-encode everything outside the URL unreserved set
fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
