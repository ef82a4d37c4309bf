// src/storage/mod.rs

//! Off-chain publishing: the swap document goes to object storage and the
//! launch is recorded as a row in the `applications` table.

pub mod supabase;

pub use supabase::SupabaseClient;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};

use crate::blockchain::DeploymentResult;
use crate::token::TokenParameters;

pub const APPLICATIONS_TABLE: &str = "applications";

/// State a freshly launched token is recorded with.
pub const PENDING_STATE: &str = "pending";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `content` at `bucket/path` and returns the stored key.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<String>;

    /// Public URL of an object.
    fn public_url(&self, bucket: &str, path: &str) -> Result<String>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<()>;
}

/// One row of the `applications` table. Every column is nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub api_url: Option<String>,
    pub email: Option<String>,
    pub explanation: Option<String>,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub state: Option<String>,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    /// Record for a launched token whose swap document lives at `api_url`.
    pub fn for_launch(
        params: &TokenParameters,
        deployment: &DeploymentResult,
        api_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        ApplicationRecord {
            api_url: Some(api_url.to_string()),
            email: None,
            explanation: Some(format!(
                "Swap 0.1 MON for {} ({}) on TokenMill market {}",
                params.name,
                params.symbol,
                to_checksum(&deployment.market_address, None)
            )),
            name: Some(params.name.clone()),
            project_name: Some(format!("{} ({})", params.name, params.symbol)),
            state: Some(PENDING_STATE.to_string()),
            telegram: None,
            twitter: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;

    #[test]
    fn launch_record_columns() {
        let params = crate::token::extract("create a token called 'Rocket'").unwrap();
        let deployment = DeploymentResult {
            token_address: Address::from_low_u64_be(1),
            market_address: Address::from_low_u64_be(2),
        };
        let now = Utc::now();
        let record = ApplicationRecord::for_launch(&params, &deployment, "https://cdn/x.json", now);

        assert_eq!(record.api_url.as_deref(), Some("https://cdn/x.json"));
        assert_eq!(record.name.as_deref(), Some("Rocket"));
        assert_eq!(record.project_name.as_deref(), Some("Rocket (ROC)"));
        assert_eq!(record.state.as_deref(), Some(PENDING_STATE));
        assert_eq!(record.created_at, Some(now));
        assert_eq!(record.created_at, record.updated_at);

        let row = serde_json::to_value(&record).unwrap();
        let columns: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(columns.len(), 10);
        assert!(row["email"].is_null());
    }
}
