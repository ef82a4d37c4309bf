// src/storage/supabase.rs

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{ApplicationRecord, ApplicationStore, ObjectStore, APPLICATIONS_TABLE};
use crate::config::StorageSettings;

/// Supabase Storage and PostgREST over plain HTTP.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl SupabaseClient {
    pub fn new(settings: &StorageSettings) -> Self {
        Self {
            http: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        req.header("apikey", key.as_str())
            .header("Authorization", format!("Bearer {}", key))
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        debug!("Uploading {} bytes to {}", content.len(), url);

        let res = self
            .authorized(self.http.post(&url))
            .header("Content-Type", content_type)
            .header("x-upsert", if overwrite { "true" } else { "false" })
            .body(content)
            .send()
            .await
            .context("Failed to reach Supabase storage")?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("Supabase storage error {}: {}", status.as_u16(), body);
        }

        let key = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("Key").and_then(|k| k.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("{}/{}", bucket, path));
        info!("Uploaded {}", key);
        Ok(key)
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        let raw = format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        );
        let url = Url::parse(&raw).with_context(|| format!("Invalid public URL {}", raw))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl ApplicationStore for SupabaseClient {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.base_url, APPLICATIONS_TABLE);

        let res = self
            .authorized(self.http.post(&url))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .context("Failed to reach Supabase REST API")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("Supabase insert into {} failed {}: {}", APPLICATIONS_TABLE, status.as_u16(), body);
        }
        info!("Recorded application {:?}", record.name);
        Ok(())
    }
}
