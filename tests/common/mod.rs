//! In-memory stand-ins for the chain, object storage and application table.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::SecretString;

use tokenmill_mcp_server::{
    blockchain::{
        DeploymentResult, FactoryClient, MarketParameters, PreparedDeployment, ReceiptSummary,
    },
    config::DeploySettings,
    storage::{ApplicationRecord, ApplicationStore, ObjectStore},
    Address, CreateTokenAction, TokenDeployer, H256, U256,
};
use ethers::types::TransactionRequest;

pub const BUCKET: &str = "miniapps";
pub const PUBLIC_BASE: &str = "https://storage.test/public";

pub fn factory() -> Address {
    Address::from_low_u64_be(0xfac7)
}

pub fn quote_token() -> Address {
    Address::from_low_u64_be(0x3011)
}

pub fn proxy() -> Address {
    Address::from_low_u64_be(0x9404)
}

pub fn simulated() -> DeploymentResult {
    DeploymentResult {
        token_address: Address::from_low_u64_be(0xabc123),
        market_address: Address::from_low_u64_be(0x4a4e),
    }
}

pub fn tx_hash() -> H256 {
    H256::from_low_u64_be(0x7777)
}

pub fn settings() -> DeploySettings {
    DeploySettings {
        rpc_url: "http://localhost:8545".to_string(),
        chain_id: 10143,
        private_key: SecretString::new(
            "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d".to_string(),
        ),
        factory: factory(),
        quote_token: quote_token(),
        proxy: proxy(),
        receipt_poll_interval: Duration::from_millis(1),
        receipt_max_polls: 3,
        mini_app_base_url: "https://tokenmill.xyz/tokens".to_string(),
    }
}

#[derive(Default)]
pub struct FakeChain {
    pub fail_simulate: bool,
    pub fail_submit: bool,
    pub fail_receipt: bool,
    pub fail_block: bool,
    /// Latest block timestamp; 1_700_000_000 when unset.
    pub block_timestamp: Option<U256>,
    pub simulated_calls: Mutex<Vec<(Address, MarketParameters)>>,
    pub submitted: Mutex<Vec<TransactionRequest>>,
    pub receipts_awaited: Mutex<Vec<H256>>,
}

#[async_trait]
impl FactoryClient for FakeChain {
    async fn simulate_create_market(
        &self,
        factory: Address,
        params: &MarketParameters,
    ) -> Result<PreparedDeployment> {
        self.simulated_calls
            .lock()
            .unwrap()
            .push((factory, params.clone()));
        if self.fail_simulate {
            return Err(anyhow!("execution reverted: invalid parameters"));
        }
        Ok(PreparedDeployment {
            expected: simulated(),
            request: TransactionRequest::new()
                .to(factory)
                .data(params.calldata())
                .gas(5_000_000u64),
        })
    }

    async fn submit(&self, request: TransactionRequest) -> Result<H256> {
        self.submitted.lock().unwrap().push(request);
        if self.fail_submit {
            return Err(anyhow!("insufficient funds for gas"));
        }
        Ok(tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary> {
        self.receipts_awaited.lock().unwrap().push(tx_hash);
        if self.fail_receipt {
            return Err(anyhow!("transaction {:?} reverted in block 12", tx_hash));
        }
        Ok(ReceiptSummary {
            tx_hash,
            block_number: Some(12),
            gas_used: Some(U256::from(4_200_000u64)),
            succeeded: true,
        })
    }

    async fn latest_block_timestamp(&self) -> Result<U256> {
        if self.fail_block {
            return Err(anyhow!("block not found"));
        }
        Ok(self
            .block_timestamp
            .unwrap_or_else(|| U256::from(1_700_000_000u64)))
    }
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub bucket: String,
    pub path: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub overwrite: bool,
}

#[derive(Default)]
pub struct FakeObjects {
    pub fail_upload: bool,
    pub uploads: Mutex<Vec<Upload>>,
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<String> {
        if self.fail_upload {
            return Err(anyhow!("Supabase storage error 403: bucket not found"));
        }
        self.uploads.lock().unwrap().push(Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            content,
            content_type: content_type.to_string(),
            overwrite,
        });
        Ok(format!("{}/{}", bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(format!("{}/{}/{}", PUBLIC_BASE, bucket, path))
    }
}

#[derive(Default)]
pub struct FakeApplications {
    pub fail_insert: bool,
    pub inserted: Mutex<Vec<ApplicationRecord>>,
}

#[async_trait]
impl ApplicationStore for FakeApplications {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<()> {
        if self.fail_insert {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        self.inserted.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// A deployer over the given fakes, with handles kept for assertions.
pub struct Harness {
    pub chain: Arc<FakeChain>,
    pub objects: Arc<FakeObjects>,
    pub applications: Arc<FakeApplications>,
    pub deployer: Arc<TokenDeployer>,
}

impl Harness {
    pub fn new(chain: FakeChain, objects: FakeObjects, applications: FakeApplications) -> Self {
        let chain = Arc::new(chain);
        let objects = Arc::new(objects);
        let applications = Arc::new(applications);
        let deployer = Arc::new(TokenDeployer::new(
            settings(),
            BUCKET,
            chain.clone(),
            objects.clone(),
            applications.clone(),
        ));
        Self {
            chain,
            objects,
            applications,
            deployer,
        }
    }

    pub fn healthy() -> Self {
        Self::new(
            FakeChain::default(),
            FakeObjects::default(),
            FakeApplications::default(),
        )
    }

    pub fn action(&self) -> CreateTokenAction {
        CreateTokenAction::new(self.deployer.clone())
    }
}
