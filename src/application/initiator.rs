use crate::application::schemes::SchemeDescriptor;
use crate::application::script::Script;
use crate::config::CheckoutConfig;
use crate::domain::identity::{ConsumerIdentity, IdentityLookupRequest};
use crate::domain::ports::{RemoteSdkRef, ScriptLoaderRef, SdkEnvironmentRef, SrcInitiator};
use crate::domain::srci::{
    CheckoutResponse, CompleteIdentityValidationResponse, IdentityLookupResponse,
    InitiateIdentityValidationResponse, IsRecognizedResponse, SdkFailure, SrcCheckoutParams,
    SrcInitParams, SrcProfile,
};
use crate::error::{CtpError, Result, SrciError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// SRCi adapter for one card network.
///
/// Network differences live in the [`SchemeDescriptor`]; this type only
/// translates calls and normalizes failures into [`SrciError`].
///
/// The remote handle is present exactly between a successful
/// [`SrcInitiator::load_sdk_script`] and the next
/// [`SrcInitiator::remove_sdk_script`].
pub struct SchemeInitiator {
    descriptor: SchemeDescriptor,
    environment: SdkEnvironmentRef,
    script: Script,
    remote: RwLock<Option<RemoteSdkRef>>,
    initialized: AtomicBool,
}

impl SchemeInitiator {
    /// Creates an adapter loading its SDK from `sdk_url`.
    ///
    /// Fails with [`CtpError::Configuration`] when the URL is empty or not http(s).
    pub fn new(
        descriptor: SchemeDescriptor,
        sdk_url: &str,
        environment: SdkEnvironmentRef,
        loader: ScriptLoaderRef,
        script_timeout: Duration,
    ) -> Result<Self> {
        let sdk_url = sdk_url.trim();
        if sdk_url.is_empty() {
            return Err(CtpError::Configuration(format!(
                "missing SDK URL for scheme '{}'",
                descriptor.scheme
            )));
        }
        if !(sdk_url.starts_with("https://") || sdk_url.starts_with("http://")) {
            return Err(CtpError::Configuration(format!(
                "invalid SDK URL for scheme '{}': {}",
                descriptor.scheme, sdk_url
            )));
        }

        Ok(Self {
            descriptor,
            environment,
            script: Script::new(sdk_url, loader, script_timeout),
            remote: RwLock::new(None),
            initialized: AtomicBool::new(false),
        })
    }

    /// Creates an adapter for the endpoint matching `config.environment`.
    pub fn from_config(
        descriptor: SchemeDescriptor,
        config: &CheckoutConfig,
        environment: SdkEnvironmentRef,
        loader: ScriptLoaderRef,
    ) -> Result<Self> {
        Self::new(
            descriptor,
            descriptor.sdk_url(config.environment),
            environment,
            loader,
            config.script_timeout,
        )
    }

    pub fn sdk_url(&self) -> &str {
        self.script.url()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle().is_some()
    }

    fn handle(&self) -> Option<RemoteSdkRef> {
        self.remote
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn bind(&self, sdk: RemoteSdkRef) {
        *self.remote.write().unwrap_or_else(PoisonError::into_inner) = Some(sdk);
    }

    fn not_initialized(&self) -> CtpError {
        CtpError::NotInitialized {
            scheme: self.descriptor.scheme.to_string(),
        }
    }

    /// The remote handle, once the script is loaded and `init` succeeded.
    fn ready(&self) -> Result<RemoteSdkRef> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(self.not_initialized());
        }
        self.handle().ok_or_else(|| self.not_initialized())
    }

    fn wrap(&self, operation: &'static str) -> impl FnOnce(SdkFailure) -> CtpError + '_ {
        move |failure| SrciError::new(self.descriptor.scheme, operation, failure).into()
    }
}

#[async_trait]
impl SrcInitiator for SchemeInitiator {
    fn scheme(&self) -> &str {
        self.descriptor.scheme
    }

    async fn load_sdk_script(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }

        // The embedding page may have loaded the SDK already.
        if let Some(sdk) = self.environment.get(self.descriptor.global_binding) {
            tracing::debug!(scheme = %self.descriptor.scheme, "SDK already present, skipping script");
            self.bind(sdk);
            return Ok(());
        }

        self.script.load().await?;

        // Checked under the handle lock so a concurrent teardown either sees
        // the bound handle or stops the bind.
        let mut remote = self.remote.write().unwrap_or_else(PoisonError::into_inner);
        if self.script.is_removed() {
            return Err(CtpError::ScriptLoad {
                url: self.script.url().to_string(),
                reason: "removed while loading".to_string(),
            });
        }
        let sdk = self
            .environment
            .get(self.descriptor.global_binding)
            .ok_or_else(|| CtpError::SdkUnavailable {
                scheme: self.descriptor.scheme.to_string(),
            })?;
        tracing::debug!(scheme = %self.descriptor.scheme, url = %self.script.url(), "SDK script loaded");
        *remote = Some(sdk);
        Ok(())
    }

    fn remove_sdk_script(&self) {
        self.script.remove();
        self.remote
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.initialized.store(false, Ordering::Release);
    }

    async fn init(&self, params: &SrcInitParams) -> Result<()> {
        let sdk = self.handle().ok_or_else(|| self.not_initialized())?;
        sdk.init(params).await?;

        let remote = self.remote.read().unwrap_or_else(PoisonError::into_inner);
        if remote.is_none() {
            return Err(self.not_initialized());
        }
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    async fn is_recognized(&self) -> Result<IsRecognizedResponse> {
        let sdk = self.ready()?;
        Ok(sdk.is_recognized().await?)
    }

    async fn identity_lookup(
        &self,
        request: &IdentityLookupRequest,
    ) -> Result<IdentityLookupResponse> {
        let sdk = self.ready()?;
        let identity_type = self
            .descriptor
            .identity_tag(request.identity_type)
            .ok_or_else(|| {
                CtpError::UnsupportedIdentityType(format!(
                    "{} (scheme '{}')",
                    request.identity_type, self.descriptor.scheme
                ))
            })?;

        let consumer_identity = ConsumerIdentity {
            identity_value: request.value.clone(),
            identity_type: identity_type.to_string(),
        };
        sdk.identity_lookup(&consumer_identity)
            .await
            .map_err(self.wrap("identityLookup"))
    }

    async fn initiate_identity_validation(&self) -> Result<InitiateIdentityValidationResponse> {
        let sdk = self.ready()?;
        sdk.initiate_identity_validation()
            .await
            .map_err(self.wrap("initiateIdentityValidation"))
    }

    async fn complete_identity_validation(
        &self,
        otp: &str,
    ) -> Result<CompleteIdentityValidationResponse> {
        let sdk = self.ready()?;
        sdk.complete_identity_validation(otp)
            .await
            .map_err(self.wrap("completeIdentityValidation"))
    }

    async fn get_src_profile(&self, id_tokens: &[String]) -> Result<SrcProfile> {
        let sdk = self.ready()?;
        sdk.get_src_profile(id_tokens).await.map_err(|failure| {
            tracing::error!(scheme = %self.descriptor.scheme, error = %failure, "getSrcProfile failed");
            self.wrap("getSrcProfile")(failure)
        })
    }

    async fn checkout(&self, params: &SrcCheckoutParams) -> Result<CheckoutResponse> {
        let sdk = self.ready()?;
        sdk.checkout(params).await.map_err(|failure| {
            tracing::error!(scheme = %self.descriptor.scheme, error = %failure, "checkout failed");
            self.wrap("checkout")(failure)
        })
    }
}
