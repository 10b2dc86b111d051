//! # Subscriptions
//!
//! Recurring orders and the events that happen to them between
//! activation and cancellation (rebills, failed payments).
//!
//! ## Next billing date
//!
//! A subscription starts in the automatic state: the next billing date is
//! derived on every read as the subscription timestamp plus one period.
//! Once a date is set explicitly the subscription is pinned to it for good.
//!
//! Month and year arithmetic is calendar based. When the target month is
//! shorter than the source day, the date is clamped to the last day of the
//! target month: Jan 31 + 1 month = Feb 28 (Feb 29 in leap years), and
//! Feb 29 + 1 year = Feb 28. Time of day is kept.

use crate::customer::Customer;
use crate::error::{PaymentError, PaymentResult};
use crate::gateway::Gateway;
use crate::money::{required, CurrencyCode};
use crate::order::{CommonOrder, Order, OrderItem};
use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, Weak};

/// How often a subscription is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Weekly => "weekly",
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
        }
    }

    /// Move `from` forward by one period; `None` when out of range
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            BillingPeriod::Weekly => from.checked_add_signed(Duration::weeks(1)),
            BillingPeriod::Monthly => from.checked_add_months(Months::new(1)),
            BillingPeriod::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the next billing date comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextBilling {
    /// Timestamp plus one period, computed on read
    Automatic,
    /// Explicitly set, returned verbatim
    Pinned(DateTime<Utc>),
}

/// An order that bills again every period
#[derive(Debug, Clone)]
pub struct Subscription {
    order: Order,
    period: BillingPeriod,
    next_billing: NextBilling,
}

impl Subscription {
    /// Validate and build a subscription (same rules as [`Order::new`])
    pub fn new(
        customer: Arc<dyn Customer>,
        reference: &str,
        timestamp: DateTime<Utc>,
        period: BillingPeriod,
        currency: &str,
        total: Decimal,
        items: Vec<OrderItem>,
    ) -> PaymentResult<Self> {
        let order = Order::new(customer, reference, timestamp, currency, total, items)?;
        Ok(Self::from_order(order, period))
    }

    /// Turn an already validated order into a subscription
    pub fn from_order(order: Order, period: BillingPeriod) -> Self {
        Self {
            order,
            period,
            next_billing: NextBilling::Automatic,
        }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn next_billing(&self) -> NextBilling {
        self.next_billing
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self.next_billing, NextBilling::Pinned(_))
    }

    /// Next billing date, pinned or derived from the period
    pub fn next_billing_timestamp(&self) -> PaymentResult<DateTime<Utc>> {
        match self.next_billing {
            NextBilling::Pinned(timestamp) => Ok(timestamp),
            NextBilling::Automatic => self
                .period
                .advance(self.order.timestamp())
                .ok_or_else(|| {
                    PaymentError::Internal(format!(
                        "next {} billing date of subscription #{} is out of range",
                        self.period,
                        self.order.reference()
                    ))
                }),
        }
    }

    /// Pin the next billing date, e.g. to the date reported by the processor
    pub fn set_next_billing_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.next_billing = NextBilling::Pinned(timestamp);
    }
}

impl CommonOrder for Subscription {
    fn customer(&self) -> &Arc<dyn Customer> {
        self.order.customer()
    }

    fn reference(&self) -> &str {
        self.order.reference()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.order.timestamp()
    }

    fn currency(&self) -> &CurrencyCode {
        self.order.currency()
    }

    fn total(&self) -> Decimal {
        self.order.total()
    }

    fn items(&self) -> &[OrderItem] {
        self.order.items()
    }
}

/// Something that happened to a subscription at a point in time
#[derive(Debug, Clone)]
pub struct SubscriptionEvent {
    subscription_reference: String,
    timestamp: DateTime<Utc>,
    gateway: OnceLock<Weak<dyn Gateway>>,
}

impl SubscriptionEvent {
    pub fn new(subscription_reference: &str, timestamp: DateTime<Utc>) -> PaymentResult<Self> {
        let subscription_reference = required(
            "subscription_reference",
            subscription_reference,
            "Subscription # is required",
        )?;

        Ok(Self {
            subscription_reference,
            timestamp,
            gateway: OnceLock::new(),
        })
    }

    pub fn subscription_reference(&self) -> &str {
        &self.subscription_reference
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Attach the gateway this event belongs to. Can only happen once.
    pub fn set_gateway(&self, gateway: Weak<dyn Gateway>) -> PaymentResult<()> {
        self.gateway
            .set(gateway)
            .map_err(|_| PaymentError::GatewayAlreadySet)
    }

    pub fn gateway(&self) -> PaymentResult<Arc<dyn Gateway>> {
        self.gateway
            .get()
            .and_then(Weak::upgrade)
            .ok_or(PaymentError::GatewayNotSet)
    }

    /// Resolve the subscription through the owning gateway
    pub fn subscription(&self) -> PaymentResult<Subscription> {
        self.gateway()?
            .subscription_by_reference(&self.subscription_reference)
    }
}

macro_rules! subscription_event {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(SubscriptionEvent);

        impl $name {
            pub fn new(
                subscription_reference: &str,
                timestamp: DateTime<Utc>,
            ) -> PaymentResult<Self> {
                SubscriptionEvent::new(subscription_reference, timestamp).map(Self)
            }
        }

        impl std::ops::Deref for $name {
            type Target = SubscriptionEvent;

            fn deref(&self) -> &SubscriptionEvent {
                &self.0
            }
        }
    };
}

subscription_event!(
    /// A recurring charge attempt for a subscription
    Rebill
);

subscription_event!(
    /// A recurring charge that the processor declined
    FailedPayment
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::BasicCustomer;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn subscription(period: BillingPeriod) -> Subscription {
        Subscription::new(
            Arc::new(BasicCustomer::new("John Doe", "john@example.com")),
            "123",
            date(2015, 10, 15),
            period,
            "USD",
            dec!(25),
            vec![OrderItem::new("SaaS", 1, dec!(25)).unwrap()],
        )
        .unwrap()
    }

    fn ymd(timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.date_naive()
    }

    #[test]
    fn test_next_billing_for_monthly_subscription() {
        let next = subscription(BillingPeriod::Monthly).next_billing_timestamp().unwrap();
        assert_eq!(next.format("%Y-%m-%d").to_string(), "2015-11-15");
    }

    #[test]
    fn test_next_billing_for_yearly_subscription() {
        let next = subscription(BillingPeriod::Yearly).next_billing_timestamp().unwrap();
        assert_eq!(next.format("%Y-%m-%d").to_string(), "2016-10-15");
    }

    #[test]
    fn test_next_billing_for_weekly_subscription() {
        let next = subscription(BillingPeriod::Weekly).next_billing_timestamp().unwrap();
        assert_eq!(next, date(2015, 10, 22));
    }

    #[test]
    fn test_next_billing_can_be_set() {
        let mut monthly = subscription(BillingPeriod::Monthly);
        monthly.set_next_billing_timestamp(date(2015, 11, 11));
        assert_eq!(monthly.next_billing_timestamp().unwrap(), date(2015, 11, 11));
        assert!(monthly.is_pinned());

        let mut yearly = subscription(BillingPeriod::Yearly);
        yearly.set_next_billing_timestamp(date(2015, 12, 13));
        assert_eq!(yearly.next_billing_timestamp().unwrap(), date(2015, 12, 13));
        assert_eq!(yearly.next_billing(), NextBilling::Pinned(date(2015, 12, 13)));
    }

    #[test]
    fn test_month_end_is_clamped() {
        let period = BillingPeriod::Monthly;
        assert_eq!(
            ymd(period.advance(date(2015, 1, 31)).unwrap()),
            NaiveDate::from_ymd_opt(2015, 2, 28).unwrap()
        );
        assert_eq!(
            ymd(period.advance(date(2016, 1, 31)).unwrap()),
            NaiveDate::from_ymd_opt(2016, 2, 29).unwrap()
        );
        assert_eq!(
            ymd(period.advance(date(2015, 12, 31)).unwrap()),
            NaiveDate::from_ymd_opt(2016, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_leap_day_yearly() {
        let next = BillingPeriod::Yearly.advance(date(2016, 2, 29)).unwrap();
        assert_eq!(ymd(next), NaiveDate::from_ymd_opt(2017, 2, 28).unwrap());
    }

    #[test]
    fn test_time_of_day_kept() {
        let start = Utc.with_ymd_and_hms(2015, 10, 15, 13, 45, 10).unwrap();
        let next = BillingPeriod::Monthly.advance(start).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2015, 11, 15, 13, 45, 10).unwrap());
    }

    #[test]
    fn test_subscription_shares_order_shape() {
        let subscription = subscription(BillingPeriod::Monthly);
        assert_eq!(CommonOrder::reference(&subscription), "123");
        assert_eq!(CommonOrder::total(&subscription), dec!(25));
        assert_eq!(subscription.items_total(), dec!(25));
        assert_eq!(subscription.period(), BillingPeriod::Monthly);
    }

    #[test]
    fn test_subscription_validation() {
        let err = Subscription::new(
            Arc::new(BasicCustomer::new("John Doe", "john@example.com")),
            "123",
            date(2015, 10, 15),
            BillingPeriod::Monthly,
            "USD",
            Decimal::ZERO,
            vec![OrderItem::new("SaaS", 1, dec!(25)).unwrap()],
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rebill_requires_reference() {
        let err = Rebill::new("", date(2015, 11, 15)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid subscription_reference: Subscription # is required"
        );

        let rebill = Rebill::new("123", date(2015, 11, 15)).unwrap();
        assert_eq!(rebill.subscription_reference(), "123");
        assert!(matches!(rebill.subscription(), Err(PaymentError::GatewayNotSet)));
    }

    #[test]
    fn test_period_serde() {
        assert_eq!(serde_json::to_string(&BillingPeriod::Yearly).unwrap(), "\"yearly\"");
        let period: BillingPeriod = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(period, BillingPeriod::Monthly);
    }
}
