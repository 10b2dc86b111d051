//! # Customer Capability
//!
//! How an application's user entity plugs into a gateway: references,
//! contact details and payment-method management.

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::Gateway;
use crate::payment_method::{PaymentMethod, PaymentMethodDetails};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    pub city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    pub postal_code: String,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,
}

impl Address {
    pub fn new(
        line1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            line1: line1.into(),
            line2: None,
            city: city.into(),
            region: None,
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    pub fn with_line2(mut self, line2: impl Into<String>) -> Self {
        self.line2 = Some(line2.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// A customer as seen by payment gateways.
///
/// Implemented by whatever user entity the application already has.
/// Payment-method management is an extension point: implementations
/// without a real backing return nothing and refuse to add methods.
pub trait Customer: Send + Sync + fmt::Debug {
    /// Customer's reference in the given gateway
    fn reference(&self, gateway: &dyn Gateway) -> String;

    /// Our internal customer reference (customer ID or code)
    fn our_reference(&self) -> String;

    /// Organisation name (company, non-profit, ...)
    fn organisation_name(&self) -> &str;

    fn address(&self) -> Option<&Address>;

    fn phone_number(&self) -> &str;

    fn default_payment_method(&self, gateway: &dyn Gateway) -> Option<PaymentMethod>;

    fn list_payment_methods(&self, gateway: &dyn Gateway) -> Vec<PaymentMethod>;

    fn add_payment_method(
        &self,
        gateway: &dyn Gateway,
        set_as_default: bool,
        details: PaymentMethodDetails,
    ) -> PaymentResult<PaymentMethod>;
}

/// Customer identified by name and email, with no stored payment methods.
///
/// The email doubles as both the gateway and the internal reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicCustomer {
    name: String,
    email: String,
    organisation_name: String,
    address: Option<Address>,
    phone_number: String,
}

impl BasicCustomer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            organisation_name: String::new(),
            address: None,
            phone_number: String::new(),
        }
    }

    pub fn with_organisation_name(mut self, value: impl AsRef<str>) -> Self {
        self.organisation_name = value.as_ref().trim().to_string();
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_phone_number(mut self, value: impl AsRef<str>) -> Self {
        self.phone_number = value.as_ref().trim().to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Customer for BasicCustomer {
    fn reference(&self, _gateway: &dyn Gateway) -> String {
        self.email.clone()
    }

    fn our_reference(&self) -> String {
        self.email.clone()
    }

    fn organisation_name(&self) -> &str {
        &self.organisation_name
    }

    fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    fn phone_number(&self) -> &str {
        &self.phone_number
    }

    fn default_payment_method(&self, _gateway: &dyn Gateway) -> Option<PaymentMethod> {
        None
    }

    fn list_payment_methods(&self, _gateway: &dyn Gateway) -> Vec<PaymentMethod> {
        Vec::new()
    }

    fn add_payment_method(
        &self,
        _gateway: &dyn Gateway,
        _set_as_default: bool,
        _details: PaymentMethodDetails,
    ) -> PaymentResult<PaymentMethod> {
        Err(PaymentError::NotSupported(
            "adding payment methods is not implemented for basic customers".to_string(),
        ))
    }
}
