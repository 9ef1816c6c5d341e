//! Document Store Gateway Adapter
//!
//! Implements the `StorageGateway` port against the platform's document
//! store service over HTTP. Items are written one at a time; queries post
//! a key-condition body and get `{Items, Count}` back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::ports::{QueryCondition, QueryResult, StorageGateway};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the document store gateway.
#[derive(Debug, Clone)]
pub struct DocStoreConfig {
    /// Base URL of the document store service
    pub base_url: String,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://docstore.platform.svc.cluster.local:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// HTTP client for the platform document store.
pub struct DocStoreGateway {
    config: DocStoreConfig,
    client: Client,
    healthy: RwLock<bool>,
}

impl DocStoreGateway {
    /// Create a new gateway.
    pub fn new(config: DocStoreConfig) -> Result<Arc<Self>> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Arc::new(Self {
            config,
            client,
            healthy: RwLock::new(true),
        }))
    }

    /// Check if the document store is reachable.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.config.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            *self.healthy.write() = false;
            Error::StoreConnection(e)
        })?;

        if response.status().is_success() {
            *self.healthy.write() = true;
            Ok(())
        } else {
            *self.healthy.write() = false;
            Err(Error::StoreRequest(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }

    /// Check if the gateway is healthy.
    pub fn is_healthy(&self) -> bool {
        *self.healthy.read()
    }

    fn item_url(&self, table: &str) -> String {
        format!("{}/tables/{}/items", self.config.base_url, table)
    }

    fn query_url(&self, table: &str) -> String {
        format!("{}/tables/{}/query", self.config.base_url, table)
    }
}

#[async_trait]
impl StorageGateway for DocStoreGateway {
    #[instrument(skip(self, item), fields(table = %table))]
    async fn put(&self, table: &str, item: Value) -> Result<()> {
        let response = self
            .client
            .post(self.item_url(table))
            .json(&item)
            .send()
            .await
            .map_err(Error::StoreConnection)?;

        if !response.status().is_success() {
            return Err(Error::StoreRequest(format!(
                "put into {} failed with status: {}",
                table,
                response.status()
            )));
        }

        debug!("Stored item in {}", table);
        Ok(())
    }

    #[instrument(skip(self, condition), fields(table = %table))]
    async fn query(&self, table: &str, condition: QueryCondition) -> Result<QueryResult> {
        let response = self
            .client
            .post(self.query_url(table))
            .json(&condition)
            .send()
            .await
            .map_err(Error::StoreConnection)?;

        if !response.status().is_success() {
            return Err(Error::StoreRequest(format!(
                "query against {} failed with status: {}",
                table,
                response.status()
            )));
        }

        let result: QueryResult = response
            .json()
            .await
            .map_err(|e| Error::StoreResponseParse(e.to_string()))?;

        debug!(table, count = result.count, "Query completed");
        Ok(result)
    }
}

// =============================================================================
// Tests
// =============================================================================
