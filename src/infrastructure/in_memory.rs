use crate::domain::ports::{RemoteSdkRef, ScriptLoader, SdkEnvironment};
use crate::error::{CtpError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// An in-memory stand-in for the browser's global namespace.
///
/// Uses `Arc<RwLock<HashMap<String, RemoteSdkRef>>>` so clones share the same
/// bindings, the way every script on a page shares one `window`.
#[derive(Default, Clone)]
pub struct InMemoryEnvironment {
    bindings: Arc<RwLock<HashMap<String, RemoteSdkRef>>>,
}

impl InMemoryEnvironment {
    /// Creates a new, empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `sdk` under `binding`, as an embedding page pre-loading an SDK would.
    pub fn install(&self, binding: impl Into<String>, sdk: RemoteSdkRef) {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.insert(binding.into(), sdk);
    }

    pub fn uninstall(&self, binding: &str) {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.remove(binding);
    }
}

impl SdkEnvironment for InMemoryEnvironment {
    fn get(&self, binding: &str) -> Option<RemoteSdkRef> {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        bindings.get(binding).cloned()
    }
}

#[derive(Default)]
struct LoaderState {
    /// What each URL publishes on the environment once loaded.
    published: HashMap<String, (String, RemoteSdkRef)>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    attached: Vec<String>,
    removals: HashMap<String, usize>,
}

/// An in-memory document: "loading" a script publishes the SDK registered for
/// its URL on the shared [`InMemoryEnvironment`].
///
/// Unregistered URLs load fine but publish nothing.
#[derive(Clone)]
pub struct InMemoryScriptLoader {
    environment: InMemoryEnvironment,
    state: Arc<RwLock<LoaderState>>,
}

impl InMemoryScriptLoader {
    pub fn new(environment: InMemoryEnvironment) -> Self {
        Self {
            environment,
            state: Arc::new(RwLock::new(LoaderState::default())),
        }
    }

    pub fn environment(&self) -> &InMemoryEnvironment {
        &self.environment
    }

    /// Registers the SDK that `url` publishes under `binding` when loaded.
    pub fn publish_on_load(&self, url: impl Into<String>, binding: impl Into<String>, sdk: RemoteSdkRef) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.published.insert(url.into(), (binding.into(), sdk));
    }

    /// Makes every load of `url` fail, like a 404 or a parse error.
    pub fn fail_url(&self, url: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.failing.insert(url.into());
    }

    pub fn delay_url(&self, url: impl Into<String>, delay: Duration) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.delays.insert(url.into(), delay);
    }

    /// URLs currently attached to the document, in injection order.
    pub fn attached(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.attached.clone()
    }

    pub fn removal_count(&self, url: &str) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.removals.get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ScriptLoader for InMemoryScriptLoader {
    async fn inject(&self, url: &str) -> Result<()> {
        let delay = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.attached.push(url.to_string());
            state.delays.get(url).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let published = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.failing.contains(url) {
                return Err(CtpError::ScriptLoad {
                    url: url.to_string(),
                    reason: "error event".to_string(),
                });
            }
            state.published.get(url).cloned()
        };

        if let Some((binding, sdk)) = published {
            self.environment.install(binding, sdk);
        }
        Ok(())
    }

    fn remove(&self, url: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = state.attached.iter().position(|attached| attached == url) {
            state.attached.remove(index);
        }
        *state.removals.entry(url.to_string()).or_insert(0) += 1;
    }
}
