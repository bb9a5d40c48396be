//! SRCi request and response shapes exchanged with a network SDK.
//!
//! These mirror the JSON objects the "Click to Pay" SDKs accept and return,
//! hence the camelCase serde renames.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque error raised by a remote SDK.
///
/// SDKs report a machine readable `reason` and a free-form `message`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{reason}: {message}")]
pub struct SdkFailure {
    pub reason: String,
    pub message: String,
}

impl SdkFailure {
    pub fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new("NETWORK_ERROR", message)
    }
}

pub type SdkResult<T> = std::result::Result<T, SdkFailure>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrcInitParams {
    pub srci_transaction_id: String,
    pub srci_dpa_id: String,
    pub dpa_transaction_options: DpaTransactionOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpaTransactionOptions {
    pub dpa_locale: String,
    pub dpa_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<TransactionAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAmount {
    #[serde(with = "rust_decimal::serde::str")]
    pub transaction_amount: Decimal,
    pub transaction_currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsRecognizedResponse {
    pub recognized: bool,
    #[serde(default)]
    pub id_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLookupResponse {
    pub consumer_present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateIdentityValidationResponse {
    /// Where the one-time code was sent, masked for display.
    pub masked_validation_channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteIdentityValidationResponse {
    pub id_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalCardData {
    pub art_uri: String,
    #[serde(default)]
    pub descriptor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedCard {
    pub src_digital_card_id: String,
    pub pan_last_four: String,
    pub digital_card_data: DigitalCardData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    #[serde(default)]
    pub masked_cards: Vec<MaskedCard>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrcProfile {
    #[serde(default)]
    pub profiles: Vec<ProfileEntry>,
    pub src_correlation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrcCheckoutParams {
    pub src_correlation_id: String,
    pub src_digital_card_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub dcf_action_code: String,
    #[serde(default)]
    pub checkout_response: Option<String>,
}
