//! # payments-core
//!
//! Core billing types for wiring payment gateways into an application.
//!
//! This crate provides:
//! - `Order`, `OrderItem`, `Refund` and `Subscription` value objects,
//!   validated on construction
//! - `Rebill` and `FailedPayment` subscription events
//! - `Customer` capability trait and the `BasicCustomer` implementation
//! - `Gateway` capability trait with lookups and `trigger_*` methods
//! - `Dispatcher`, a synchronous publish/subscribe hub for billing `Event`s
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use payments_core::{Dispatcher, Event, EventName, Gateway};
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! dispatcher.listen(EventName::OrderRefunded, |gateway, event| {
//!     if let Event::OrderRefunded { order, refund } = event {
//!         println!("{} refunded {} on {}", order.reference(), refund.total(), gateway.name());
//!     }
//!     Ok(())
//! });
//!
//! // A concrete gateway records the order and publishes the event
//! gateway.trigger_order_refunded(order, None)?;
//! ```

pub mod customer;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod gateway;
pub mod money;
pub mod order;
pub mod payment_method;
pub mod refund;
pub mod subscription;

// Re-exports for convenience
pub use customer::{Address, BasicCustomer, Customer};
pub use dispatcher::{Dispatcher, Listener};
pub use error::{ErrorKind, PaymentError, PaymentResult};
pub use event::{Event, EventName};
pub use gateway::{Gateway, Ledger};
pub use money::CurrencyCode;
pub use order::{items_total, CommonOrder, Order, OrderItem};
pub use payment_method::{PaymentMethod, PaymentMethodDetails};
pub use refund::Refund;
pub use subscription::{
    BillingPeriod, FailedPayment, NextBilling, Rebill, Subscription, SubscriptionEvent,
};
