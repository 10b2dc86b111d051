//! # Money Types
//!
//! Currency codes and amount checks shared by orders, refunds and items.
//! Amounts are `rust_decimal::Decimal` so totals compare exactly.

use crate::error::{PaymentError, PaymentResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ISO 4217-style currency code ("USD", "EUR", ...)
///
/// Trimmed and upper-cased on construction. Any non-empty code is accepted;
/// which codes a gateway actually settles in is the gateway's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> PaymentResult<Self> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(PaymentError::validation("currency", "Currency is required"));
        }
        Ok(Self(code.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject zero and negative totals
pub(crate) fn ensure_positive_total(total: Decimal) -> PaymentResult<Decimal> {
    if total <= Decimal::ZERO {
        return Err(PaymentError::validation(
            "total",
            "Empty or credit orders are not supported",
        ));
    }
    Ok(total)
}

/// Trim `value`, rejecting it when nothing is left
pub(crate) fn required(field: &'static str, value: &str, message: &str) -> PaymentResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PaymentError::validation(field, message));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_normalized() {
        let code = CurrencyCode::new(" usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code.to_string(), "USD");
        assert_eq!("eur".parse::<CurrencyCode>().unwrap().as_str(), "EUR");
    }

    #[test]
    fn test_empty_currency_rejected() {
        let err = CurrencyCode::new("   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_currency_serde() {
        let code: CurrencyCode = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(code.as_str(), "GBP");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"GBP\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"\"").is_err());
    }

    #[test]
    fn test_positive_total() {
        assert_eq!(ensure_positive_total(dec!(0.01)).unwrap(), dec!(0.01));
        assert!(ensure_positive_total(Decimal::ZERO).is_err());
        assert!(ensure_positive_total(dec!(-5)).is_err());
    }
}
