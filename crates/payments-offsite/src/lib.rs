//! # payments-offsite
//!
//! Offsite redirect gateway for payments-rs.
//!
//! The customer is redirected to the provider's hosted checkout page; the
//! provider later reports the outcome with JSON notifications which the
//! gateway turns into orders, refunds and subscriptions before publishing
//! the matching events.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use payments_core::{Dispatcher, EventName};
//! use payments_offsite::{register_logging_listeners, OffsiteGateway};
//! use std::sync::Arc;
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! register_logging_listeners(&dispatcher);
//! dispatcher.listen(EventName::OrderCompleted, |_, event| {
//!     // Fulfil the order
//!     Ok(())
//! });
//!
//! let gateway = OffsiteGateway::from_env(dispatcher)?;
//!
//! // Send the customer to gateway.redirect_url(&order), then later:
//! gateway.process_slice(notification_body)?;
//! ```

pub mod config;
pub mod gateway;
pub mod listeners;
pub mod notification;

// Re-exports
pub use config::OffsiteConfig;
pub use gateway::{OffsiteGateway, RefundKind, PARTIAL_REFUND_DESCRIPTION};
pub use listeners::register_logging_listeners;
pub use notification::{CustomerData, Notification, OrderData, SubscriptionData};
