mod common;

use common::{customer, timestamp};
use payments_core::{Order, OrderItem, PaymentError, Refund};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn item() -> OrderItem {
    OrderItem::new("Expensive product", 1, Decimal::new(1000, 0)).unwrap()
}

proptest! {
    #[test]
    fn non_positive_order_totals_rejected(cents in i64::MIN / 2..=0i64) {
        let total = Decimal::new(cents, 2);
        let result = Order::new(customer(), "2015-01", timestamp(), "USD", total, vec![item()]);
        let rejected_total = matches!(result, Err(PaymentError::Validation { field: "total", .. }));
        prop_assert!(rejected_total);
    }

    #[test]
    fn non_positive_refund_totals_rejected(cents in i64::MIN / 2..=0i64) {
        let total = Decimal::new(cents, 2);
        let result = Refund::new("2015-01-X", "2015-01", timestamp(), total);
        let rejected_total = matches!(result, Err(PaymentError::Validation { field: "total", .. }));
        prop_assert!(rejected_total);
    }

    #[test]
    fn valid_orders_keep_their_arguments(
        cents in 1i64..10_000_000,
        quantities in prop::collection::vec(1u32..50, 1..6),
    ) {
        let total = Decimal::new(cents, 2);
        let items: Vec<OrderItem> = quantities
            .iter()
            .map(|&quantity| OrderItem::new("Widget", quantity, Decimal::new(199, 2)).unwrap())
            .collect();

        let order =
            Order::new(customer(), "2015-01", timestamp(), "USD", total, items.clone()).unwrap();

        prop_assert_eq!(order.total(), total);
        prop_assert_eq!(order.items(), items.as_slice());
    }

    #[test]
    fn is_partial_iff_refund_below_order_total(
        order_cents in 2i64..1_000_000,
        refund_cents in 1i64..1_000_000,
    ) {
        use common::TestGateway;
        use payments_core::{Dispatcher, Gateway};
        use std::sync::Arc;

        let order_total = Decimal::new(order_cents, 2);
        let refund_total = Decimal::new(refund_cents, 2);
        let gateway = TestGateway::new("offsite", Arc::new(Dispatcher::new()));
        let order =
            Order::new(customer(), "2015-01", timestamp(), "USD", order_total, vec![item()])
                .unwrap();
        gateway.ledger().record_order(order);

        let refund = Refund::new("2015-01-R", "2015-01", timestamp(), refund_total).unwrap();
        refund.set_gateway(gateway.handle()).unwrap();

        prop_assert_eq!(refund.is_partial().unwrap(), refund_total < order_total);
    }
}
