//! # Offsite Notifications
//!
//! Callbacks the offsite provider sends after the customer returns from
//! the hosted checkout page, or when something happens to a subscription.
//!
//! Notifications are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "order_refunded", "reference": "2015-01", "total": "200.00"}
//! ```

use chrono::{DateTime, Utc};
use payments_core::{
    Address, BasicCustomer, BillingPeriod, Customer, Order, OrderItem, PaymentError,
    PaymentResult, Subscription,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Customer details as sent by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organisation_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl CustomerData {
    pub fn into_customer(self) -> Arc<dyn Customer> {
        let mut customer = BasicCustomer::new(self.name, self.email);
        if let Some(organisation_name) = self.organisation_name {
            customer = customer.with_organisation_name(organisation_name);
        }
        if let Some(phone_number) = self.phone_number {
            customer = customer.with_phone_number(phone_number);
        }
        if let Some(address) = self.address {
            customer = customer.with_address(address);
        }
        Arc::new(customer)
    }
}

/// Order details as sent by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct OrderData {
    pub reference: String,
    pub customer: CustomerData,
    /// Defaults to the time the notification is processed
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Defaults to the gateway's configured currency
    #[serde(default)]
    pub currency: Option<String>,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
}

impl OrderData {
    pub fn into_order(self, default_currency: &str) -> PaymentResult<Order> {
        let currency = self.currency.unwrap_or_else(|| default_currency.to_string());
        Order::new(
            self.customer.into_customer(),
            &self.reference,
            self.timestamp.unwrap_or_else(Utc::now),
            &currency,
            self.total,
            self.items,
        )
    }
}

/// Subscription details as sent by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionData {
    pub period: BillingPeriod,
    pub order: OrderData,
    /// Processor-reported next billing date, pins the subscription
    #[serde(default)]
    pub next_billing_timestamp: Option<DateTime<Utc>>,
}

impl SubscriptionData {
    pub fn into_subscription(self, default_currency: &str) -> PaymentResult<Subscription> {
        let order = self.order.into_order(default_currency)?;
        let mut subscription = Subscription::from_order(order, self.period);
        if let Some(next_billing) = self.next_billing_timestamp {
            subscription.set_next_billing_timestamp(next_billing);
        }
        Ok(subscription)
    }
}

/// A parsed provider notification
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    OrderCompleted {
        order: OrderData,
    },
    OrderFailed {
        order: OrderData,
    },
    /// Refund of an order the gateway already knows.
    /// Without `total` and `items` the whole order was refunded.
    OrderRefunded {
        reference: String,
        #[serde(default)]
        total: Option<Decimal>,
        #[serde(default)]
        items: Option<Vec<OrderItem>>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    SubscriptionActivated {
        subscription: SubscriptionData,
    },
    SubscriptionFailed {
        subscription: SubscriptionData,
    },
    SubscriptionCancelled {
        reference: String,
    },
    Rebill {
        reference: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
        #[serde(default)]
        next_billing_timestamp: Option<DateTime<Utc>>,
    },
    PaymentFailed {
        reference: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
}

impl Notification {
    /// Parse a raw notification body
    pub fn from_slice(payload: &[u8]) -> PaymentResult<Self> {
        serde_json::from_slice(payload).map_err(|e| {
            PaymentError::NotificationParse(format!("Failed to parse notification: {}", e))
        })
    }

    /// Notification type as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::OrderCompleted { .. } => "order_completed",
            Notification::OrderFailed { .. } => "order_failed",
            Notification::OrderRefunded { .. } => "order_refunded",
            Notification::SubscriptionActivated { .. } => "subscription_activated",
            Notification::SubscriptionFailed { .. } => "subscription_failed",
            Notification::SubscriptionCancelled { .. } => "subscription_cancelled",
            Notification::Rebill { .. } => "rebill",
            Notification::PaymentFailed { .. } => "payment_failed",
        }
    }
}
