//! # Refunds
//!
//! A refund points back at the order it refunds by reference. The order
//! itself is resolved through the gateway that recorded both, which is
//! attached after construction as a weak back-reference.

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::Gateway;
use crate::money::{ensure_positive_total, required};
use crate::order::{Order, OrderItem};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, OnceLock, Weak};

/// Full or partial refund of an order
#[derive(Debug, Clone)]
pub struct Refund {
    refund_id: String,
    reference: String,
    timestamp: DateTime<Utc>,
    total: Decimal,
    items: Option<Vec<OrderItem>>,
    our_identifier: String,
    gateway: OnceLock<Weak<dyn Gateway>>,
}

impl Refund {
    /// Validate and build a refund of the order with `reference`
    pub fn new(
        refund_id: &str,
        reference: &str,
        timestamp: DateTime<Utc>,
        total: Decimal,
    ) -> PaymentResult<Self> {
        let refund_id = required("refund_id", refund_id, "Refund # is required")?;
        let reference = required("reference", reference, "Order # is required")?;
        let total = ensure_positive_total(total)?;

        Ok(Self {
            refund_id,
            reference,
            timestamp,
            total,
            items: None,
            our_identifier: String::new(),
            gateway: OnceLock::new(),
        })
    }

    /// Builder: items refunded, when the refund was made by line item
    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = Some(items);
        self
    }

    /// Builder: our internal identifier for this refund
    pub fn with_our_identifier(mut self, value: impl AsRef<str>) -> Self {
        self.our_identifier = value.as_ref().trim().to_string();
        self
    }

    /// Attach the gateway this refund belongs to. Can only happen once.
    pub fn set_gateway(&self, gateway: Weak<dyn Gateway>) -> PaymentResult<()> {
        self.gateway
            .set(gateway)
            .map_err(|_| PaymentError::GatewayAlreadySet)
    }

    /// The owning gateway, if it was set and is still alive
    pub fn gateway(&self) -> PaymentResult<Arc<dyn Gateway>> {
        self.gateway
            .get()
            .and_then(Weak::upgrade)
            .ok_or(PaymentError::GatewayNotSet)
    }

    pub fn refund_id(&self) -> &str {
        &self.refund_id
    }

    /// Reference of the refunded order
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Resolve the refunded order through the owning gateway
    pub fn order(&self) -> PaymentResult<Order> {
        self.gateway()?.order_by_reference(&self.reference)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Refunded line items; `None` for whole-order refunds
    pub fn items(&self) -> Option<&[OrderItem]> {
        self.items.as_deref()
    }

    /// Our internal identifier, empty when not known
    pub fn our_identifier(&self) -> &str {
        &self.our_identifier
    }

    /// True when less than the order total was refunded
    pub fn is_partial(&self) -> PaymentResult<bool> {
        Ok(self.total < self.order()?.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_refund_fields() {
        let item = OrderItem::new("Expensive product", 1, dec!(1000)).unwrap();
        let refund = Refund::new("2015-01-X", "2015-01", timestamp(), dec!(1000))
            .unwrap()
            .with_items(vec![item.clone()])
            .with_our_identifier("  RF-1 ");

        assert_eq!(refund.refund_id(), "2015-01-X");
        assert_eq!(refund.reference(), "2015-01");
        assert_eq!(refund.total(), dec!(1000));
        assert_eq!(refund.items(), Some(&[item][..]));
        assert_eq!(refund.our_identifier(), "RF-1");
    }

    #[test]
    fn test_whole_order_refund_has_no_items() {
        let refund = Refund::new("2015-01-X", "2015-01", timestamp(), dec!(1200)).unwrap();
        assert!(refund.items().is_none());
        assert_eq!(refund.our_identifier(), "");
    }

    #[test]
    fn test_refund_validation() {
        assert!(matches!(
            Refund::new("", "2015-01", timestamp(), dec!(10)),
            Err(PaymentError::Validation { field: "refund_id", .. })
        ));
        assert!(matches!(
            Refund::new("R-1", " ", timestamp(), dec!(10)),
            Err(PaymentError::Validation { field: "reference", .. })
        ));
        assert!(matches!(
            Refund::new("R-1", "2015-01", timestamp(), Decimal::ZERO),
            Err(PaymentError::Validation { field: "total", .. })
        ));
    }

    #[test]
    fn test_unresolved_gateway() {
        let refund = Refund::new("2015-01-X", "2015-01", timestamp(), dec!(1200)).unwrap();

        assert!(matches!(refund.order(), Err(PaymentError::GatewayNotSet)));
        assert!(matches!(refund.is_partial(), Err(PaymentError::GatewayNotSet)));
    }
}
