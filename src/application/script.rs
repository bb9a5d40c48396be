use crate::domain::ports::ScriptLoaderRef;
use crate::error::{CtpError, Result};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptStatus {
    Detached,
    /// Handed to the loader, whether or not it finished loading.
    Attached,
    Removed,
}

/// One external script owned by a single adapter.
///
/// `remove` is idempotent: removing a script that was never attached, or was
/// already removed, does nothing.
pub struct Script {
    url: String,
    loader: ScriptLoaderRef,
    timeout: Duration,
    status: Mutex<ScriptStatus>,
}

impl Script {
    pub fn new(url: impl Into<String>, loader: ScriptLoaderRef, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            loader,
            timeout,
            status: Mutex::new(ScriptStatus::Detached),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Injects the script and waits for it to load, at most `timeout`.
    pub async fn load(&self) -> Result<()> {
        {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            if *status != ScriptStatus::Detached {
                return Err(CtpError::InvariantViolation(format!(
                    "script {} loaded twice",
                    self.url
                )));
            }
            *status = ScriptStatus::Attached;
        }

        match tokio::time::timeout(self.timeout, self.loader.inject(&self.url)).await {
            Ok(Ok(())) if self.is_removed() => Err(CtpError::ScriptLoad {
                url: self.url.clone(),
                reason: "removed while loading".to_string(),
            }),
            Ok(result) => result,
            Err(_) => Err(CtpError::ScriptLoad {
                url: self.url.clone(),
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        }
    }

    pub fn is_removed(&self) -> bool {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) == ScriptStatus::Removed
    }

    pub fn remove(&self) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status == ScriptStatus::Attached {
            self.loader.remove(&self.url);
            *status = ScriptStatus::Removed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{InMemoryEnvironment, InMemoryScriptLoader};
    use std::sync::Arc;

    const URL: &str = "https://sdk.example/sdk.js";

    fn loader() -> Arc<InMemoryScriptLoader> {
        Arc::new(InMemoryScriptLoader::new(InMemoryEnvironment::new()))
    }

    #[tokio::test]
    async fn test_load_and_remove() {
        let loader = loader();
        let script = Script::new(URL, loader.clone(), Duration::from_secs(1));

        script.load().await.unwrap();
        assert_eq!(loader.attached(), vec![URL.to_string()]);

        script.remove();
        script.remove();
        assert!(loader.attached().is_empty());
        assert_eq!(loader.removal_count(URL), 1);
    }

    #[tokio::test]
    async fn test_remove_before_load_is_noop() {
        let loader = loader();
        let script = Script::new(URL, loader.clone(), Duration::from_secs(1));

        script.remove();
        assert_eq!(loader.removal_count(URL), 0);
    }

    #[tokio::test]
    async fn test_failed_load() {
        let loader = loader();
        loader.fail_url(URL);
        let script = Script::new(URL, loader.clone(), Duration::from_secs(1));

        let err = script.load().await.unwrap_err();
        assert!(matches!(err, CtpError::ScriptLoad { .. }));

        // The element still has to be cleaned up.
        script.remove();
        assert_eq!(loader.removal_count(URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout() {
        let loader = loader();
        loader.delay_url(URL, Duration::from_secs(30));
        let script = Script::new(URL, loader.clone(), Duration::from_millis(100));

        let err = script.load().await.unwrap_err();
        assert!(matches!(err, CtpError::ScriptLoad { reason, .. } if reason.contains("timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_while_loading() {
        let loader = loader();
        loader.delay_url(URL, Duration::from_millis(500));
        let script = Arc::new(Script::new(URL, loader.clone(), Duration::from_secs(1)));

        let loading = script.clone();
        let handle = tokio::spawn(async move { loading.load().await });
        while loader.attached().is_empty() {
            tokio::task::yield_now().await;
        }
        script.remove();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, CtpError::ScriptLoad { reason, .. } if reason.contains("removed")));
        assert!(script.is_removed());
        assert_eq!(loader.removal_count(URL), 1);
    }

    #[tokio::test]
    async fn test_second_load_rejected() {
        let loader = loader();
        let script = Script::new(URL, loader.clone(), Duration::from_secs(1));

        script.load().await.unwrap();
        assert!(script.load().await.is_err());
        assert_eq!(loader.attached().len(), 1);
    }
}
