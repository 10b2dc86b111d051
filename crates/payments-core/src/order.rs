//! # Order Types
//!
//! Orders and order items as reported by a payment gateway.
//! Both are validated on construction and immutable afterwards.

use crate::customer::Customer;
use crate::error::{PaymentError, PaymentResult};
use crate::money::{ensure_positive_total, required, CurrencyCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A line item in an order or refund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderItemData")]
pub struct OrderItem {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl OrderItem {
    /// Create a line item; quantity must be positive and price non-negative
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> PaymentResult<Self> {
        if quantity == 0 {
            return Err(PaymentError::validation(
                "quantity",
                "Quantity must be at least 1",
            ));
        }
        if unit_price < Decimal::ZERO {
            return Err(PaymentError::validation(
                "unit_price",
                "Unit price can't be negative",
            ));
        }

        Ok(Self {
            description: description.into(),
            quantity,
            unit_price,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity times unit price
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Deserialize)]
struct OrderItemData {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl TryFrom<OrderItemData> for OrderItem {
    type Error = PaymentError;

    fn try_from(data: OrderItemData) -> Result<Self, Self::Error> {
        OrderItem::new(data.description, data.quantity, data.unit_price)
    }
}

/// Sum of line totals
pub fn items_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::total).sum()
}

/// Shape shared by one-off orders and subscriptions
pub trait CommonOrder {
    fn customer(&self) -> &Arc<dyn Customer>;

    /// Gateway's order reference (order ID)
    fn reference(&self) -> &str;

    /// When the order was made
    fn timestamp(&self) -> DateTime<Utc>;

    fn currency(&self) -> &CurrencyCode;

    fn total(&self) -> Decimal;

    fn items(&self) -> &[OrderItem];

    /// Sum of the item line totals; not required to match [`CommonOrder::total`]
    fn items_total(&self) -> Decimal {
        items_total(self.items())
    }
}

/// A completed (or failed) order reported by a gateway
#[derive(Debug, Clone)]
pub struct Order {
    customer: Arc<dyn Customer>,
    reference: String,
    timestamp: DateTime<Utc>,
    currency: CurrencyCode,
    total: Decimal,
    items: Vec<OrderItem>,
}

impl Order {
    /// Validate and build an order.
    ///
    /// Fails on the first violated precondition: customer without a
    /// reference, blank order reference, blank currency, non-positive total
    /// or an empty item list.
    pub fn new(
        customer: Arc<dyn Customer>,
        reference: &str,
        timestamp: DateTime<Utc>,
        currency: &str,
        total: Decimal,
        items: Vec<OrderItem>,
    ) -> PaymentResult<Self> {
        validate_customer(customer.as_ref())?;
        let reference = required("reference", reference, "Order # is required")?;
        let currency = CurrencyCode::new(currency)?;
        let total = ensure_positive_total(total)?;

        if items.is_empty() {
            return Err(PaymentError::validation(
                "items",
                "Order needs at least one item",
            ));
        }

        let sum = items_total(&items);
        if sum != total {
            debug!(
                "Order #{} total {} differs from item sum {}",
                reference, total, sum
            );
        }

        Ok(Self {
            customer,
            reference,
            timestamp,
            currency,
            total,
            items,
        })
    }

    pub fn customer(&self) -> &Arc<dyn Customer> {
        &self.customer
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

impl CommonOrder for Order {
    fn customer(&self) -> &Arc<dyn Customer> {
        &self.customer
    }

    fn reference(&self) -> &str {
        &self.reference
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    fn total(&self) -> Decimal {
        self.total
    }

    fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

fn validate_customer(customer: &dyn Customer) -> PaymentResult<()> {
    if customer.our_reference().trim().is_empty() {
        return Err(PaymentError::validation(
            "customer",
            "Customer reference is required",
        ));
    }
    Ok(())
}
