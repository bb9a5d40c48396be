use crate::domain::srci::SdkFailure;
use thiserror::Error;

/// Failure of a remote SRCi call, normalized across card networks.
///
/// Carries the network that produced it and the SRCi operation that was
/// running, so the orchestration layer never has to inspect per-network
/// error shapes.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{scheme}] {operation} failed: {source}")]
pub struct SrciError {
    pub scheme: String,
    pub operation: &'static str,
    #[source]
    pub source: SdkFailure,
}

impl SrciError {
    pub fn new(scheme: impl Into<String>, operation: &'static str, source: SdkFailure) -> Self {
        Self {
            scheme: scheme.into(),
            operation,
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum CtpError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to load script {url}: {reason}")]
    ScriptLoad { url: String, reason: String },
    #[error("SDK for scheme '{scheme}' is not available after loading")]
    SdkUnavailable { scheme: String },
    #[error("Scheme '{scheme}' used before init")]
    NotInitialized { scheme: String },
    #[error(transparent)]
    Srci(#[from] SrciError),
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkFailure),
    #[error("Unsupported identity type: {0}")]
    UnsupportedIdentityType(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Invalid card record: {0}")]
    InvalidCard(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CtpError {
    /// Errors that mean the network cannot be offered and the shopper should
    /// fall back to manual card entry.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CtpError::ScriptLoad { .. } | CtpError::SdkUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srci_error_keeps_cause_and_scheme() {
        let err = SrciError::new("mc", "initiateIdentityValidation", SdkFailure::network("timeout"));
        let wrapped: CtpError = err.clone().into();

        assert_eq!(err.scheme, "mc");
        assert_eq!(
            wrapped.to_string(),
            "[mc] initiateIdentityValidation failed: NETWORK_ERROR: timeout"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "NETWORK_ERROR: timeout");
    }

    #[test]
    fn test_unavailable_classification() {
        let load = CtpError::ScriptLoad {
            url: "https://x".into(),
            reason: "404".into(),
        };
        assert!(load.is_unavailable());
        assert!(CtpError::SdkUnavailable { scheme: "visa".into() }.is_unavailable());
        assert!(!CtpError::InvariantViolation("x".into()).is_unavailable());
    }
}
