// src/deployer.rs

//! Runs one token launch end to end: factory dry run, real submission,
//! receipt wait, swap document upload and application record.
//!
//! Every step is awaited in order. The first failure stops the launch; steps
//! already done (including an on-chain deployment) are not undone.

use std::sync::Arc;

use chrono::Utc;
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::blockchain::{DeploymentResult, FactoryClient, MarketParameters, ReceiptSummary};
use crate::config::DeploySettings;
use crate::error::{ActionError, ChainStage};
use crate::storage::{ApplicationRecord, ApplicationStore, ObjectStore};
use crate::token::{extract, metadata, TokenParameters};

pub const METADATA_CONTENT_TYPE: &str = "application/json";

/// Everything a successful launch produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReport {
    pub parameters: TokenParameters,
    pub deployment: DeploymentResult,
    pub tx_hash: H256,
    pub metadata_url: String,
    pub mini_app_url: String,
}

impl LaunchReport {
    /// Chat message announcing the launch.
    pub fn message(&self) -> String {
        format!(
            "✅ Token deployed successfully!\n\n\
             📋 Token Details:\n\
             - Name: {}\n\
             - Symbol: {}\n\
             - Contract: {}\n\
             - Market: {}\n\
             - Transaction: {:?}\n\n\
             You can now interact with your token using the mini-app at: {}\n\
             Swap metadata: {}",
            self.parameters.name,
            self.parameters.symbol,
            to_checksum(&self.deployment.token_address, None),
            to_checksum(&self.deployment.market_address, None),
            self.tx_hash,
            self.mini_app_url,
            self.metadata_url
        )
    }
}

/// Object path of the swap document: derived from the last six hex digits
/// of the token address.
pub fn metadata_path(token_address: Address) -> String {
    let hex = hex::encode(token_address.as_bytes());
    format!("tokens/swap_{}.json", &hex[hex.len() - 6..])
}

pub struct TokenDeployer {
    settings: DeploySettings,
    bucket: String,
    chain: Arc<dyn FactoryClient>,
    objects: Arc<dyn ObjectStore>,
    applications: Arc<dyn ApplicationStore>,
}

impl TokenDeployer {
    pub fn new(
        settings: DeploySettings,
        bucket: impl Into<String>,
        chain: Arc<dyn FactoryClient>,
        objects: Arc<dyn ObjectStore>,
        applications: Arc<dyn ApplicationStore>,
    ) -> Self {
        Self {
            settings,
            bucket: bucket.into(),
            chain,
            objects,
            applications,
        }
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    /// Deploys token and market through the configured factory and returns
    /// the addresses reported by the dry run.
    pub async fn deploy(&self, params: &TokenParameters) -> Result<DeploymentResult, ActionError> {
        self.deploy_confirmed(params)
            .await
            .map(|(deployment, _)| deployment)
    }

    async fn deploy_confirmed(
        &self,
        params: &TokenParameters,
    ) -> Result<(DeploymentResult, ReceiptSummary), ActionError> {
        let market = MarketParameters::from_token(params, self.settings.quote_token)?;
        info!(
            "Deploying {} ({}) through factory {:?}",
            market.name, market.symbol, self.settings.factory
        );

        let prepared = self
            .chain
            .simulate_create_market(self.settings.factory, &market)
            .await
            .map_err(|e| ActionError::chain(ChainStage::Simulate, e))?;
        info!(
            "Simulation predicts token {:?} and market {:?}",
            prepared.expected.token_address, prepared.expected.market_address
        );

        let tx_hash = self
            .chain
            .submit(prepared.request)
            .await
            .map_err(|e| ActionError::chain(ChainStage::Submit, e))?;

        let receipt = self
            .chain
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| ActionError::chain(ChainStage::Receipt, e))?;

        // The receipt's logs are not compared against the dry run.
        Ok((prepared.expected, receipt))
    }

    async fn swap_deadline(&self) -> U256 {
        let from_chain = match self.chain.latest_block_timestamp().await {
            Ok(ts) => metadata::swap_deadline(ts).or_else(|| {
                warn!("Latest block timestamp {} is out of range", ts);
                None
            }),
            Err(e) => {
                warn!("Latest block lookup failed: {:#}", e);
                None
            }
        };
        from_chain.unwrap_or_else(|| {
            warn!("Falling back to local clock for swap deadline");
            let now = U256::from(Utc::now().timestamp().max(0) as u64);
            now + U256::from(metadata::DEADLINE_WINDOW_SECS)
        })
    }

    /// Uploads the swap document and records the application. Returns the
    /// document's public URL.
    async fn publish(
        &self,
        params: &TokenParameters,
        deployment: &DeploymentResult,
    ) -> Result<String, ActionError> {
        let deadline = self.swap_deadline().await;
        let document = metadata::build_metadata(
            &params.name,
            deployment.token_address,
            self.settings.proxy,
            self.settings.chain_id,
            deadline,
        )
        .map_err(ActionError::StorageFailure)?;

        let path = metadata_path(deployment.token_address);
        self.objects
            .upload(
                &self.bucket,
                &path,
                document.into_bytes(),
                METADATA_CONTENT_TYPE,
                true,
            )
            .await
            .map_err(ActionError::StorageFailure)?;
        let metadata_url = self
            .objects
            .public_url(&self.bucket, &path)
            .map_err(ActionError::StorageFailure)?;
        debug!("Swap metadata published at {}", metadata_url);

        let record = ApplicationRecord::for_launch(params, deployment, &metadata_url, Utc::now());
        self.applications
            .insert_application(&record)
            .await
            .map_err(ActionError::PersistenceFailure)?;

        Ok(metadata_url)
    }

    /// Full launch: deploy, publish the swap document, record the application.
    pub async fn launch(&self, params: &TokenParameters) -> Result<LaunchReport, ActionError> {
        let (deployment, receipt) = self.deploy_confirmed(params).await?;
        let metadata_url = self.publish(params, &deployment).await?;

        Ok(LaunchReport {
            parameters: params.clone(),
            deployment,
            tx_hash: receipt.tx_hash,
            metadata_url,
            mini_app_url: format!(
                "{}/{}",
                self.settings.mini_app_base_url,
                to_checksum(&deployment.token_address, None)
            ),
        })
    }

    /// Extracts parameters from `text`, launches, and returns the message for
    /// the user. Never fails: errors become the message.
    pub async fn run(&self, text: &str) -> String {
        let Some(params) = extract(text) else {
            return ActionError::ExtractionFailure.user_message();
        };
        match self.launch(&params).await {
            Ok(report) => report.message(),
            Err(e) => {
                error!("Token launch failed: {}", e);
                e.user_message()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_path_uses_address_suffix() {
        let token: Address = "0x760AfE86e5de5fa0Ee542fc7B7B713e1c5425701".parse().unwrap();
        assert_eq!(metadata_path(token), "tokens/swap_425701.json");
    }
}
