//! Shared fixtures for payments-core integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use payments_core::{
    BasicCustomer, BillingPeriod, Customer, Dispatcher, Gateway, Ledger, Order, OrderItem,
    Subscription,
};
use rust_decimal_macros::dec;
use std::sync::{Arc, Weak};

/// Minimal gateway that keeps everything in its ledger
pub struct TestGateway {
    name: String,
    me: Weak<TestGateway>,
    dispatcher: Arc<Dispatcher>,
    ledger: Ledger,
}

impl TestGateway {
    pub fn new(name: &str, dispatcher: Arc<Dispatcher>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            name: name.to_string(),
            me: me.clone(),
            dispatcher,
            ledger: Ledger::new(),
        })
    }
}

impl Gateway for TestGateway {
    fn name(&self) -> &str {
        &self.name
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

pub fn customer() -> Arc<dyn Customer> {
    Arc::new(BasicCustomer::new("John Doe", "john@example.com"))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 10, 15, 0, 0, 0).unwrap()
}

pub fn order() -> Order {
    Order::new(
        customer(),
        "2015-01",
        timestamp(),
        "USD",
        dec!(1200),
        vec![
            OrderItem::new("Expensive product", 1, dec!(1000)).unwrap(),
            OrderItem::new("Not so expensive product", 2, dec!(100)).unwrap(),
        ],
    )
    .unwrap()
}

pub fn subscription() -> Subscription {
    Subscription::new(
        customer(),
        "2015-01",
        timestamp(),
        BillingPeriod::Monthly,
        "USD",
        dec!(25),
        vec![OrderItem::new("Monthly SaaS cost", 1, dec!(25)).unwrap()],
    )
    .unwrap()
}
