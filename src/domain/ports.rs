use super::identity::{ConsumerIdentity, IdentityLookupRequest};
use super::srci::{
    CheckoutResponse, CompleteIdentityValidationResponse, IdentityLookupResponse,
    InitiateIdentityValidationResponse, IsRecognizedResponse, SdkResult, SrcCheckoutParams,
    SrcInitParams, SrcProfile,
};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Injects and removes external `<script>` resources.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Resolves once the script at `url` has loaded.
    async fn inject(&self, url: &str) -> Result<()>;
    fn remove(&self, url: &str);
}

/// Read access to the global namespace where SDKs publish themselves.
pub trait SdkEnvironment: Send + Sync {
    fn get(&self, binding: &str) -> Option<RemoteSdkRef>;
}

/// The card network SDK object, as exposed on the global namespace.
#[async_trait]
pub trait RemoteSdk: Send + Sync {
    async fn init(&self, params: &SrcInitParams) -> SdkResult<()>;
    async fn is_recognized(&self) -> SdkResult<IsRecognizedResponse>;
    async fn identity_lookup(
        &self,
        consumer_identity: &ConsumerIdentity,
    ) -> SdkResult<IdentityLookupResponse>;
    async fn initiate_identity_validation(&self) -> SdkResult<InitiateIdentityValidationResponse>;
    async fn complete_identity_validation(
        &self,
        validation_data: &str,
    ) -> SdkResult<CompleteIdentityValidationResponse>;
    async fn get_src_profile(&self, id_tokens: &[String]) -> SdkResult<SrcProfile>;
    async fn checkout(&self, params: &SrcCheckoutParams) -> SdkResult<CheckoutResponse>;
}

/// SRCi operations every card network adapter supports.
///
/// Protocol failures surface as [`crate::error::CtpError::Srci`], whatever the
/// network, so callers can swap adapters freely.
#[async_trait]
pub trait SrcInitiator: Send + Sync {
    fn scheme(&self) -> &str;

    async fn load_sdk_script(&self) -> Result<()>;
    /// No-op when the script was never loaded.
    fn remove_sdk_script(&self);

    async fn init(&self, params: &SrcInitParams) -> Result<()>;
    async fn is_recognized(&self) -> Result<IsRecognizedResponse>;
    async fn identity_lookup(&self, request: &IdentityLookupRequest)
    -> Result<IdentityLookupResponse>;
    async fn initiate_identity_validation(&self) -> Result<InitiateIdentityValidationResponse>;
    async fn complete_identity_validation(
        &self,
        otp: &str,
    ) -> Result<CompleteIdentityValidationResponse>;
    async fn get_src_profile(&self, id_tokens: &[String]) -> Result<SrcProfile>;
    async fn checkout(&self, params: &SrcCheckoutParams) -> Result<CheckoutResponse>;
}

pub type RemoteSdkRef = Arc<dyn RemoteSdk>;
pub type ScriptLoaderRef = Arc<dyn ScriptLoader>;
pub type SdkEnvironmentRef = Arc<dyn SdkEnvironment>;
pub type SrcInitiatorRef = Arc<dyn SrcInitiator>;
