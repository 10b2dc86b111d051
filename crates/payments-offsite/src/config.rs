//! # Offsite Gateway Configuration
//!
//! Loaded from environment variables (a `.env` file is honoured) or from a
//! TOML file.

use payments_core::{CurrencyCode, PaymentError, PaymentResult};
use serde::Deserialize;
use std::env;
use std::path::Path;

const DEFAULT_NAME: &str = "offsite";
const DEFAULT_CURRENCY: &str = "USD";

/// Offsite redirect gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OffsiteConfig {
    /// Gateway name used in logs and events
    #[serde(default = "default_name")]
    pub name: String,

    /// Provider's hosted checkout page customers are redirected to
    pub checkout_url: String,

    /// Currency assumed when a notification does not carry one
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl OffsiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `OFFSITE_CHECKOUT_URL`
    ///
    /// Optional:
    /// - `OFFSITE_GATEWAY_NAME` (default `offsite`)
    /// - `OFFSITE_DEFAULT_CURRENCY` (default `USD`)
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let checkout_url = env::var("OFFSITE_CHECKOUT_URL").map_err(|_| {
            PaymentError::Configuration("OFFSITE_CHECKOUT_URL not set".to_string())
        })?;

        let config = Self {
            name: env::var("OFFSITE_GATEWAY_NAME").unwrap_or_else(|_| default_name()),
            checkout_url,
            default_currency: env::var("OFFSITE_DEFAULT_CURRENCY")
                .unwrap_or_else(|_| default_currency()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PaymentError::Configuration(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> PaymentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Create config with explicit values (for testing)
    pub fn new(name: impl Into<String>, checkout_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checkout_url: checkout_url.into(),
            default_currency: default_currency(),
        }
    }

    /// Builder: set the fallback currency
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn validate(&self) -> PaymentResult<()> {
        if self.name.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "Gateway name must not be empty".to_string(),
            ));
        }

        if !self.checkout_url.starts_with("https://") && !self.checkout_url.starts_with("http://") {
            return Err(PaymentError::Configuration(
                "OFFSITE_CHECKOUT_URL must start with http:// or https://".to_string(),
            ));
        }

        CurrencyCode::new(&self.default_currency).map_err(|_| {
            PaymentError::Configuration("Default currency must not be empty".to_string())
        })?;

        Ok(())
    }

    /// Check if the checkout page is served over TLS
    pub fn is_secure(&self) -> bool {
        self.checkout_url.starts_with("https://")
    }
}
