// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use ethers::types::Address;
use secrecy::SecretString;
use url::Url;

use crate::error::ActionError;

pub const DEFAULT_RPC_URL: &str = "https://testnet-rpc.monad.xyz/";
pub const DEFAULT_CHAIN_ID: u64 = 10143;
pub const DEFAULT_MINI_APP_BASE_URL: &str = "https://tokenmill.xyz/tokens";

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Blockchain settings (Monad testnet unless overridden)
    pub rpc_url: String,
    pub chain_id: u64,

    // Deployment settings
    pub private_key: Option<SecretString>,
    pub factory_address: Option<String>,
    pub quote_token_address: Option<String>,
    pub proxy_address: Option<String>,

    // Receipt polling
    pub receipt_poll_interval_ms: u64,
    pub receipt_max_polls: u32,

    // Object storage and application table
    pub supabase_url: Option<String>,
    pub supabase_key: Option<SecretString>,
    pub supabase_bucket: Option<String>,

    // Link handed back to the user after a launch
    pub mini_app_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            private_key: None,
            factory_address: None,
            quote_token_address: None,
            proxy_address: None,
            receipt_poll_interval_ms: 1000,
            receipt_max_polls: 120,
            supabase_url: None,
            supabase_key: None,
            supabase_bucket: None,
            mini_app_base_url: DEFAULT_MINI_APP_BASE_URL.to_string(),
        }
    }
}

/// Validated settings the deployer needs before it can touch the chain.
#[derive(Clone, Debug)]
pub struct DeploySettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: SecretString,
    pub factory: Address,
    pub quote_token: Address,
    /// Contract the mini-app calls for swaps; the factory when not configured.
    pub proxy: Address,
    pub receipt_poll_interval: Duration,
    pub receipt_max_polls: u32,
    pub mini_app_base_url: String,
}

/// Validated Supabase settings for metadata uploads and application rows.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub url: String,
    pub api_key: SecretString,
    pub bucket: String,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_address(raw: &Option<String>, key: &str, problems: &mut Vec<String>) -> Option<Address> {
    match raw {
        None => {
            problems.push(key.to_string());
            None
        }
        Some(value) => match Address::from_str(value.trim()) {
            Ok(addr) => Some(addr),
            Err(_) => {
                problems.push(format!("{} (not an address)", key));
                None
            }
        },
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let rpc_url = non_empty("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Url::parse(&rpc_url).context("RPC_URL must be a valid URL")?;

        let supabase_url = non_empty("SUPABASE_URL");
        if let Some(url) = &supabase_url {
            Url::parse(url).context("SUPABASE_URL must be a valid URL")?;
        }

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            rpc_url,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
                .parse()
                .context("CHAIN_ID must be a valid number")?,

            private_key: non_empty("EVM_PRIVATE_KEY").map(SecretString::new),
            factory_address: non_empty("TM_FACTORY_ADDRESS"),
            quote_token_address: non_empty("WMONAD_ADDRESS"),
            proxy_address: non_empty("TM_PROXY_ADDRESS"),

            receipt_poll_interval_ms: env::var("RECEIPT_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("RECEIPT_POLL_INTERVAL_MS must be a valid number")?,
            receipt_max_polls: env::var("RECEIPT_MAX_POLLS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("RECEIPT_MAX_POLLS must be a valid number")?,

            supabase_url,
            supabase_key: non_empty("SUPABASE_KEY").map(SecretString::new),
            supabase_bucket: non_empty("SUPABASE_BUCKET"),

            mini_app_base_url: non_empty("MINI_APP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MINI_APP_BASE_URL.to_string()),
        })
    }

    /// Checks the signing key, factory and quote token once, at startup.
    pub fn deploy_settings(&self) -> Result<DeploySettings, ActionError> {
        let mut problems = Vec::new();

        let private_key = match &self.private_key {
            Some(key) => Some(key.clone()),
            None => {
                problems.push("EVM_PRIVATE_KEY".to_string());
                None
            }
        };
        let factory = parse_address(&self.factory_address, "TM_FACTORY_ADDRESS", &mut problems);
        let quote_token = parse_address(&self.quote_token_address, "WMONAD_ADDRESS", &mut problems);
        let proxy = match &self.proxy_address {
            Some(_) => parse_address(&self.proxy_address, "TM_PROXY_ADDRESS", &mut problems),
            None => factory,
        };

        match (private_key, factory, quote_token, proxy) {
            (Some(private_key), Some(factory), Some(quote_token), Some(proxy)) if problems.is_empty() => {
                Ok(DeploySettings {
                    rpc_url: self.rpc_url.clone(),
                    chain_id: self.chain_id,
                    private_key,
                    factory,
                    quote_token,
                    proxy,
                    receipt_poll_interval: Duration::from_millis(self.receipt_poll_interval_ms),
                    receipt_max_polls: self.receipt_max_polls,
                    mini_app_base_url: self.mini_app_base_url.trim_end_matches('/').to_string(),
                })
            }
            _ => Err(ActionError::ConfigurationMissing(problems)),
        }
    }

    /// Checks the Supabase URL, key and bucket once, at startup.
    pub fn storage_settings(&self) -> Result<StorageSettings, ActionError> {
        let mut problems = Vec::new();
        if self.supabase_url.is_none() {
            problems.push("SUPABASE_URL".to_string());
        }
        if self.supabase_key.is_none() {
            problems.push("SUPABASE_KEY".to_string());
        }
        if self.supabase_bucket.is_none() {
            problems.push("SUPABASE_BUCKET".to_string());
        }

        match (&self.supabase_url, &self.supabase_key, &self.supabase_bucket) {
            (Some(url), Some(api_key), Some(bucket)) => Ok(StorageSettings {
                url: url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                bucket: bucket.clone(),
            }),
            _ => Err(ActionError::ConfigurationMissing(problems)),
        }
    }
}
