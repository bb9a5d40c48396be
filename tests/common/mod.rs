#![allow(dead_code)]

use async_trait::async_trait;
use ctp_srci::application::initiator::SchemeInitiator;
use ctp_srci::application::schemes::SchemeDescriptor;
use ctp_srci::domain::identity::IdentityLookupRequest;
use ctp_srci::domain::ports::{RemoteSdkRef, SrcInitiator, SrcInitiatorRef};
use ctp_srci::domain::srci::{
    CheckoutResponse, CompleteIdentityValidationResponse, DigitalCardData, IdentityLookupResponse,
    InitiateIdentityValidationResponse, IsRecognizedResponse, MaskedCard, SrcCheckoutParams,
    SrcInitParams, SrcProfile,
};
use ctp_srci::error::Result;
use ctp_srci::infrastructure::in_memory::{InMemoryEnvironment, InMemoryScriptLoader};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn masked_card(id: &str, last_four: &str) -> MaskedCard {
    MaskedCard {
        src_digital_card_id: id.to_string(),
        pan_last_four: last_four.to_string(),
        digital_card_data: DigitalCardData {
            art_uri: format!("https://art.example/{}.png", id),
            descriptor_name: None,
        },
    }
}

/// A page with an in-memory document and global namespace.
pub struct Page {
    pub environment: InMemoryEnvironment,
    pub loader: InMemoryScriptLoader,
}

impl Page {
    pub fn new() -> Self {
        let environment = InMemoryEnvironment::new();
        let loader = InMemoryScriptLoader::new(environment.clone());
        Self {
            environment,
            loader,
        }
    }

    /// Registers `sdk` as what the network's test script publishes.
    pub fn serve(&self, descriptor: SchemeDescriptor, sdk: RemoteSdkRef) {
        self.loader
            .publish_on_load(descriptor.test_url, descriptor.global_binding, sdk);
    }

    pub fn initiator(&self, descriptor: SchemeDescriptor) -> SchemeInitiator {
        SchemeInitiator::new(
            descriptor,
            descriptor.test_url,
            Arc::new(self.environment.clone()),
            Arc::new(self.loader.clone()),
            Duration::from_secs(1),
        )
        .unwrap()
    }
}

/// Delegating adapter that counts how often its script is removed.
pub struct CountingInitiator {
    inner: SrcInitiatorRef,
    removals: AtomicUsize,
}

impl CountingInitiator {
    pub fn new(inner: SrcInitiatorRef) -> Self {
        Self {
            inner,
            removals: AtomicUsize::new(0),
        }
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SrcInitiator for CountingInitiator {
    fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    async fn load_sdk_script(&self) -> Result<()> {
        self.inner.load_sdk_script().await
    }

    fn remove_sdk_script(&self) {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_sdk_script();
    }

    async fn init(&self, params: &SrcInitParams) -> Result<()> {
        self.inner.init(params).await
    }

    async fn is_recognized(&self) -> Result<IsRecognizedResponse> {
        self.inner.is_recognized().await
    }

    async fn identity_lookup(
        &self,
        request: &IdentityLookupRequest,
    ) -> Result<IdentityLookupResponse> {
        self.inner.identity_lookup(request).await
    }

    async fn initiate_identity_validation(&self) -> Result<InitiateIdentityValidationResponse> {
        self.inner.initiate_identity_validation().await
    }

    async fn complete_identity_validation(
        &self,
        otp: &str,
    ) -> Result<CompleteIdentityValidationResponse> {
        self.inner.complete_identity_validation(otp).await
    }

    async fn get_src_profile(&self, id_tokens: &[String]) -> Result<SrcProfile> {
        self.inner.get_src_profile(id_tokens).await
    }

    async fn checkout(&self, params: &SrcCheckoutParams) -> Result<CheckoutResponse> {
        self.inner.checkout(params).await
    }
}
