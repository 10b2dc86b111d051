//! # Payment Error Types
//!
//! Typed error handling for the billing core.
//! All fallible operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all billing operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A value object was constructed from invalid data
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No order with this reference has been seen by the gateway
    #[error("Order #{reference} not found")]
    OrderNotFound { reference: String },

    /// No refund with this id has been seen by the gateway
    #[error("Refund #{refund_id} not found")]
    RefundNotFound { refund_id: String },

    /// No subscription with this reference has been seen by the gateway
    #[error("Subscription #{reference} not found")]
    SubscriptionNotFound { reference: String },

    /// Back-reference to the owning gateway was never set, or the gateway is gone
    #[error("Gateway is not set")]
    GatewayNotSet,

    /// Back-reference to the owning gateway can only be set once
    #[error("Gateway is already set")]
    GatewayAlreadySet,

    /// Capability exists on the interface but has no real backing
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// A listener rejected an event; remaining listeners were skipped
    #[error("Listener for {event} failed: {message}")]
    Listener { event: String, message: String },

    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider notification could not be parsed
    #[error("Notification parse error: {0}")]
    NotificationParse(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad classification of [`PaymentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unsupported,
    Configuration,
    Listener,
    Internal,
}

impl PaymentError {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PaymentError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the error class
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::Validation { .. } | PaymentError::NotificationParse(_) => {
                ErrorKind::Validation
            }
            PaymentError::OrderNotFound { .. }
            | PaymentError::RefundNotFound { .. }
            | PaymentError::SubscriptionNotFound { .. } => ErrorKind::NotFound,
            PaymentError::NotSupported(_) => ErrorKind::Unsupported,
            PaymentError::Configuration(_) => ErrorKind::Configuration,
            PaymentError::Listener { .. } => ErrorKind::Listener,
            PaymentError::GatewayNotSet
            | PaymentError::GatewayAlreadySet
            | PaymentError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true for unknown-id lookups
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns true for construction-time validation failures
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result type alias for billing operations
pub type PaymentResult<T> = Result<T, PaymentError>;
