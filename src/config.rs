//! Checkout configuration, read from environment variables or deserialized.

use crate::domain::identity::IdentityLookupRequest;
use crate::domain::srci::{DpaTransactionOptions, SrcInitParams, TransactionAmount};
use crate::error::{CtpError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which SDK endpoints to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    #[default]
    Live,
}

impl Environment {
    /// `"test"` in any casing selects the sandbox endpoints, anything else is live.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("test") {
            Environment::Test
        } else {
            Environment::Live
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub environment: Environment,
    /// How long a network SDK script may take to load.
    #[serde(with = "duration_millis")]
    pub script_timeout: Duration,
    pub locale: String,
    /// Digital payment application registered with the networks.
    pub dpa_id: String,
    pub dpa_name: String,
    pub transaction_amount: Option<TransactionAmount>,
    /// Identifier used for the lookup when the shopper is not recognized.
    pub shopper_identity: Option<IdentityLookupRequest>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            locale: "en_US".to_string(),
            dpa_id: String::new(),
            dpa_name: String::new(),
            transaction_amount: None,
            shopper_identity: None,
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from `CTP_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CheckoutConfig::from_env`], reading variables through `var`.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(environment) = var("CTP_ENVIRONMENT") {
            config.environment = Environment::parse(&environment);
        }
        if let Some(timeout) = var("CTP_SCRIPT_TIMEOUT_MS") {
            let millis = timeout.parse::<u64>().map_err(|e| {
                CtpError::Configuration(format!("CTP_SCRIPT_TIMEOUT_MS '{}': {}", timeout, e))
            })?;
            config.script_timeout = Duration::from_millis(millis);
        }
        if let Some(locale) = var("CTP_LOCALE") {
            config.locale = locale;
        }
        if let Some(dpa_id) = var("CTP_DPA_ID") {
            config.dpa_id = dpa_id;
        }
        if let Some(dpa_name) = var("CTP_DPA_NAME") {
            config.dpa_name = dpa_name;
        }

        Ok(config)
    }

    /// Parameters passed to every network's `init`.
    pub fn init_params(&self, srci_transaction_id: impl Into<String>) -> SrcInitParams {
        SrcInitParams {
            srci_transaction_id: srci_transaction_id.into(),
            srci_dpa_id: self.dpa_id.clone(),
            dpa_transaction_options: DpaTransactionOptions {
                dpa_locale: self.locale.clone(),
                dpa_name: self.dpa_name.clone(),
                transaction_amount: self.transaction_amount.clone(),
            },
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer, ser};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).map_err(ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
