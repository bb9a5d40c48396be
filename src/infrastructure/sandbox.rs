use crate::domain::identity::ConsumerIdentity;
use crate::domain::ports::RemoteSdk;
use crate::domain::srci::{
    CheckoutResponse, CompleteIdentityValidationResponse, IdentityLookupResponse,
    InitiateIdentityValidationResponse, IsRecognizedResponse, MaskedCard, ProfileEntry, SdkFailure,
    SdkResult, SrcCheckoutParams, SrcInitParams, SrcProfile,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

pub const SANDBOX_OTP: &str = "123456";
pub const SANDBOX_ID_TOKEN: &str = "sandbox-id-token";
pub const SANDBOX_CORRELATION_ID: &str = "sandbox-correlation-id";

/// A scripted card network SDK.
///
/// Answers SRCi calls from fixed data: a set of known consumers, an expected
/// one-time code and the cards of the profile. Individual operations can be
/// made to fail or to wait for a signal, which lets tests exercise error
/// paths and late responses.
#[derive(Default)]
pub struct SandboxSdk {
    recognized_tokens: Option<Vec<String>>,
    consumers: HashSet<String>,
    otp: Option<String>,
    cards: Vec<MaskedCard>,
    failures: HashMap<&'static str, SdkFailure>,
    gates: HashMap<&'static str, Arc<Notify>>,
    calls: Mutex<Vec<&'static str>>,
}

impl SandboxSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shopper is recognized by cookie and gets these id tokens.
    pub fn recognized(mut self, id_tokens: Vec<String>) -> Self {
        self.recognized_tokens = Some(id_tokens);
        self
    }

    /// Registers an identity value (email or phone) known to the network.
    pub fn with_consumer(mut self, identity_value: impl Into<String>) -> Self {
        self.consumers.insert(identity_value.into());
        self
    }

    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }

    pub fn with_cards(mut self, cards: Vec<MaskedCard>) -> Self {
        self.cards = cards;
        self
    }

    /// Makes `operation` (SRCi name, e.g. `"checkout"`) fail with `failure`.
    pub fn failing(mut self, operation: &'static str, failure: SdkFailure) -> Self {
        self.failures.insert(operation, failure);
        self
    }

    /// Makes `operation` wait until the returned [`Notify`] is signalled.
    pub fn gated(&mut self, operation: &'static str) -> Arc<Notify> {
        self.gates.entry(operation).or_default().clone()
    }

    /// SRCi operations received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn enter(&self, operation: &'static str) -> SdkResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(operation);

        if let Some(gate) = self.gates.get(operation) {
            gate.notified().await;
        }
        match self.failures.get(operation) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteSdk for SandboxSdk {
    async fn init(&self, _params: &SrcInitParams) -> SdkResult<()> {
        self.enter("init").await
    }

    async fn is_recognized(&self) -> SdkResult<IsRecognizedResponse> {
        self.enter("isRecognized").await?;
        Ok(match &self.recognized_tokens {
            Some(tokens) => IsRecognizedResponse {
                recognized: true,
                id_tokens: tokens.clone(),
            },
            None => IsRecognizedResponse::default(),
        })
    }

    async fn identity_lookup(
        &self,
        consumer_identity: &ConsumerIdentity,
    ) -> SdkResult<IdentityLookupResponse> {
        self.enter("identityLookup").await?;
        Ok(IdentityLookupResponse {
            consumer_present: self.consumers.contains(&consumer_identity.identity_value),
        })
    }

    async fn initiate_identity_validation(&self) -> SdkResult<InitiateIdentityValidationResponse> {
        self.enter("initiateIdentityValidation").await?;
        Ok(InitiateIdentityValidationResponse {
            masked_validation_channel: "s*****@example.com".to_string(),
        })
    }

    async fn complete_identity_validation(
        &self,
        validation_data: &str,
    ) -> SdkResult<CompleteIdentityValidationResponse> {
        self.enter("completeIdentityValidation").await?;
        let expected = self.otp.as_deref().unwrap_or(SANDBOX_OTP);
        if validation_data != expected {
            return Err(SdkFailure::new("CODE_INVALID", "one-time code does not match"));
        }
        Ok(CompleteIdentityValidationResponse {
            id_token: SANDBOX_ID_TOKEN.to_string(),
        })
    }

    async fn get_src_profile(&self, id_tokens: &[String]) -> SdkResult<SrcProfile> {
        self.enter("getSrcProfile").await?;
        if id_tokens.is_empty() {
            return Err(SdkFailure::new("INVALID_PARAMETER", "idTokens is empty"));
        }
        Ok(SrcProfile {
            profiles: vec![ProfileEntry {
                masked_cards: self.cards.clone(),
            }],
            src_correlation_id: SANDBOX_CORRELATION_ID.to_string(),
        })
    }

    async fn checkout(&self, params: &SrcCheckoutParams) -> SdkResult<CheckoutResponse> {
        self.enter("checkout").await?;
        let known = self
            .cards
            .iter()
            .any(|card| card.src_digital_card_id == params.src_digital_card_id);
        if !known {
            return Err(SdkFailure::new(
                "CARD_NOT_FOUND",
                format!("unknown card {}", params.src_digital_card_id),
            ));
        }
        Ok(CheckoutResponse {
            dcf_action_code: "COMPLETE".to_string(),
            checkout_response: Some(format!(
                "{}:{}",
                params.src_correlation_id, params.src_digital_card_id
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::srci::DigitalCardData;

    fn card(id: &str) -> MaskedCard {
        MaskedCard {
            src_digital_card_id: id.to_string(),
            pan_last_four: "4242".to_string(),
            digital_card_data: DigitalCardData {
                art_uri: "https://art".to_string(),
                descriptor_name: None,
            },
        }
    }

    #[tokio::test]
    async fn test_otp_validation() {
        let sdk = SandboxSdk::new().with_otp("999999");
        assert!(sdk.complete_identity_validation("123456").await.is_err());
        let response = sdk.complete_identity_validation("999999").await.unwrap();
        assert_eq!(response.id_token, SANDBOX_ID_TOKEN);
    }

    #[tokio::test]
    async fn test_checkout_unknown_card() {
        let sdk = SandboxSdk::new().with_cards(vec![card("abc123")]);
        let params = SrcCheckoutParams {
            src_correlation_id: "c".into(),
            src_digital_card_id: "nope".into(),
        };
        let err = sdk.checkout(&params).await.unwrap_err();
        assert_eq!(err.reason, "CARD_NOT_FOUND");
        assert_eq!(sdk.calls(), vec!["checkout"]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let sdk = SandboxSdk::new().failing("isRecognized", SdkFailure::network("offline"));
        assert_eq!(
            sdk.is_recognized().await.unwrap_err(),
            SdkFailure::network("offline")
        );
    }
}
