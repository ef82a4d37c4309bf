// src/action.rs

//! The `CREATE_TOKEN` chat action as seen by an agent host: a cheap
//! `validate` that only checks whether a token name can be read from the
//! message, and a `handle` that runs the launch and reports through a
//! callback.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::deployer::TokenDeployer;
use crate::error::ActionError;
use crate::token::extract;

pub const ACTION_NAME: &str = "CREATE_TOKEN";
pub const ACTION_SIMILES: &[&str] = &["DEPLOY_TOKEN", "CREATE_ERC20"];
pub const ACTION_DESCRIPTION: &str = "Create and deploy a new ERC-20 token with TokenMill";

/// A user message and the reply the agent gives when it picks this action.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActionExample {
    pub user: &'static str,
    pub agent: &'static str,
}

pub const ACTION_EXAMPLES: &[ActionExample] = &[
    ActionExample {
        user: "Can you create an ERC-20 token for me called 'DenverCoin' with symbol 'DEN' and total supply of 1,000,000?",
        agent: "I'll create that token for you right away!",
    },
    ActionExample {
        user: "Help me deploy a new token with 18 decimals, name 'MyAwesomeToken', symbol 'MAT' and 10 million total supply",
        agent: "Starting your token deployment now!",
    },
];

/// Text payload delivered to the host callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReply {
    pub text: String,
}

impl ActionReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

pub struct CreateTokenAction {
    deployer: Option<Arc<TokenDeployer>>,
    config_problems: Vec<String>,
}

impl CreateTokenAction {
    pub fn new(deployer: Arc<TokenDeployer>) -> Self {
        Self {
            deployer: Some(deployer),
            config_problems: Vec::new(),
        }
    }

    /// An action that could not be configured at startup. Every invocation
    /// reports the configuration problem instead of deploying.
    pub fn unconfigured(err: ActionError) -> Self {
        let config_problems = match err {
            ActionError::ConfigurationMissing(keys) => keys,
            other => vec![other.to_string()],
        };
        Self {
            deployer: None,
            config_problems,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.deployer.is_some()
    }

    /// True only when a token name can be extracted from `text`.
    pub fn validate(&self, text: &str) -> bool {
        extract(text).is_some()
    }

    /// Runs the launch for `text`. The callback receives progress messages
    /// and always at least one final message. Returns whether the token was
    /// launched.
    pub async fn handle<F>(&self, text: &str, mut callback: F) -> bool
    where
        F: FnMut(ActionReply) + Send,
    {
        let Some(params) = extract(text) else {
            callback(ActionReply::new(ActionError::ExtractionFailure.user_message()));
            return false;
        };

        let Some(deployer) = self.deployer.as_ref() else {
            let err = ActionError::ConfigurationMissing(self.config_problems.clone());
            warn!("{} invoked without configuration: {}", ACTION_NAME, err);
            callback(ActionReply::new(err.user_message()));
            return false;
        };

        callback(ActionReply::new(
            "🚀 Starting token creation process with TokenMill...",
        ));
        callback(ActionReply::new(format!(
            "📝 Preparing token with name: {}, symbol: {}, supply: {}",
            params.name, params.symbol, params.total_supply
        )));
        callback(ActionReply::new("🔄 Deploying token to blockchain..."));

        match deployer.launch(&params).await {
            Ok(report) => {
                info!(
                    "Launched {} at {:?}",
                    params.symbol, report.deployment.token_address
                );
                callback(ActionReply::new(report.message()));
                true
            }
            Err(e) => {
                error!("Token Deployment Error: {}", e);
                callback(ActionReply::new(e.user_message()));
                false
            }
        }
    }
}
