// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

pub mod action;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod deployer;
pub mod error;
pub mod mcp;
pub mod storage;
pub mod token;
pub mod utils;

pub use action::CreateTokenAction;
pub use deployer::TokenDeployer;
pub use error::ActionError;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// The `CREATE_TOKEN` action, configured or not
    pub action: Arc<CreateTokenAction>,
}
