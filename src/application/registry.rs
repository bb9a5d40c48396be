use crate::application::initiator::SchemeInitiator;
use crate::application::schemes::descriptor_for;
use crate::config::CheckoutConfig;
use crate::domain::ports::{ScriptLoaderRef, SdkEnvironmentRef, SrcInitiatorRef};
use crate::error::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Builds the adapters for the card networks a shopper can pay with.
pub struct InitiatorRegistry {
    config: CheckoutConfig,
    environment: SdkEnvironmentRef,
    loader: ScriptLoaderRef,
}

impl InitiatorRegistry {
    pub fn new(
        config: CheckoutConfig,
        environment: SdkEnvironmentRef,
        loader: ScriptLoaderRef,
    ) -> Self {
        Self {
            config,
            environment,
            loader,
        }
    }

    /// Creates exactly one adapter per distinct supported network, in the
    /// order they are first listed. Networks without Click to Pay support are
    /// skipped.
    pub fn create<S: AsRef<str>>(&self, schemes: &[S]) -> Result<Vec<SrcInitiatorRef>> {
        let mut seen = HashSet::new();
        let mut initiators: Vec<SrcInitiatorRef> = Vec::new();

        for scheme in schemes.iter().map(|scheme| scheme.as_ref()) {
            if !seen.insert(scheme) {
                continue;
            }
            let Some(descriptor) = descriptor_for(scheme) else {
                tracing::warn!(scheme = %scheme, "No Click to Pay support for scheme, skipping");
                continue;
            };
            let initiator = SchemeInitiator::from_config(
                descriptor,
                &self.config,
                self.environment.clone(),
                self.loader.clone(),
            )?;
            initiators.push(Arc::new(initiator));
        }

        Ok(initiators)
    }
}
