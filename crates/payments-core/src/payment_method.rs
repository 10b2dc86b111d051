//! # Payment Methods
//!
//! Stored payment instruments a customer can be charged through.
//! Each kind carries its own explicit details instead of loose arguments.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Details of a payment method, per kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentMethodDetails {
    /// Credit or debit card
    Card {
        brand: String,
        holder_name: String,
        last4: String,
        exp_month: u8,
        exp_year: u16,
    },
    /// Direct debit from a bank account
    BankAccount {
        bank_name: String,
        account_holder: String,
        last4: String,
    },
}

impl PaymentMethodDetails {
    /// Check the fields a gateway would reject outright
    pub fn validate(&self) -> PaymentResult<()> {
        match self {
            PaymentMethodDetails::Card {
                last4, exp_month, ..
            } => {
                validate_last4(last4)?;
                if !(1..=12).contains(exp_month) {
                    return Err(PaymentError::validation(
                        "exp_month",
                        format!("{} is not a valid month", exp_month),
                    ));
                }
                Ok(())
            }
            PaymentMethodDetails::BankAccount { last4, .. } => validate_last4(last4),
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethodDetails::Card { .. })
    }

    /// Short human-readable label, e.g. "visa ending in 4242"
    pub fn label(&self) -> String {
        match self {
            PaymentMethodDetails::Card { brand, last4, .. } => {
                format!("{} ending in {}", brand, last4)
            }
            PaymentMethodDetails::BankAccount {
                bank_name, last4, ..
            } => format!("{} account ending in {}", bank_name, last4),
        }
    }
}

fn validate_last4(last4: &str) -> PaymentResult<()> {
    if last4.len() != 4 || !last4.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PaymentError::validation(
            "last4",
            "Expected exactly four digits",
        ));
    }
    Ok(())
}

/// A payment method known to a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Gateway's reference for this payment method
    pub reference: String,

    pub details: PaymentMethodDetails,

    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethod {
    pub fn new(reference: impl Into<String>, details: PaymentMethodDetails) -> PaymentResult<Self> {
        details.validate()?;
        Ok(Self {
            reference: reference.into(),
            details,
            is_default: false,
        })
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}
