// src/error.rs

use std::fmt;
use thiserror::Error;

/// The external call that failed during a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    Simulate,
    Submit,
    Receipt,
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStage::Simulate => write!(f, "market simulation"),
            ChainStage::Submit => write!(f, "transaction submission"),
            ChainStage::Receipt => write!(f, "receipt confirmation"),
        }
    }
}

/// Every way a token launch can fail. All of them are terminal for the
/// invocation and are turned into a chat message by the action handler.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("unable to extract a token name from the request")]
    ExtractionFailure,
    #[error("missing or invalid configuration: {}", .0.join(", "))]
    ConfigurationMissing(Vec<String>),
    #[error("invalid market parameters: {0}")]
    ValidationFailure(String),
    #[error("{stage} failed: {source:#}")]
    ChainCallFailure {
        stage: ChainStage,
        #[source]
        source: anyhow::Error,
    },
    #[error("metadata upload failed: {0:#}")]
    StorageFailure(#[source] anyhow::Error),
    #[error("failed to record application: {0:#}")]
    PersistenceFailure(#[source] anyhow::Error),
}

impl ActionError {
    pub fn chain(stage: ChainStage, source: anyhow::Error) -> Self {
        ActionError::ChainCallFailure { stage, source }
    }

    /// Text shown to the chat user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ActionError::ExtractionFailure => "❌ Unable to extract token parameters from your request. \
                 Please provide details like name, symbol, and supply."
                .to_string(),
            ActionError::ConfigurationMissing(_) => {
                "⚠️ Missing environment variables. Please check the configuration.".to_string()
            }
            other => format!("❌ Failed to deploy token: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn chain_failure_keeps_nested_cause() {
        let err = ActionError::chain(ChainStage::Simulate, anyhow!("execution reverted"));
        assert_eq!(
            err.to_string(),
            "market simulation failed: execution reverted"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn configuration_message_lists_keys() {
        let err = ActionError::ConfigurationMissing(vec![
            "EVM_PRIVATE_KEY".to_string(),
            "WMONAD_ADDRESS".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing or invalid configuration: EVM_PRIVATE_KEY, WMONAD_ADDRESS"
        );
        assert!(err.user_message().starts_with("⚠️"));
    }

    #[test]
    fn storage_failure_is_reported_as_deploy_failure() {
        let err = ActionError::StorageFailure(anyhow!("bucket not found"));
        assert_eq!(
            err.user_message(),
            "❌ Failed to deploy token: metadata upload failed: bucket not found"
        );
    }
}
