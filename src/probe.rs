//! # Catalog Probe
//!
//! Asks the catalog two independent questions: does the backing store hold
//! any published item, and does the customer-facing listing show any. The
//! engine treats a probe error as "nothing meaningful to report" and skips
//! the cycle.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::ProbeError;
use crate::models::CheckResult;

#[async_trait]
pub trait CatalogProbe: Send + Sync {
    async fn probe_emptiness(&self) -> Result<CheckResult, ProbeError>;
}

/// Probe backed by two JSON endpoints.
///
/// A response counts as empty when it is an empty array, or an object whose
/// `count`/`total` is zero or whose `items`/`products` array is empty.
#[derive(Debug, Clone)]
pub struct HttpCatalogProbe {
    client: Client,
    products_url: String,
    storefront_url: String,
}

impl HttpCatalogProbe {
    pub fn new(client: Client, config: &CatalogConfig) -> Result<Self, ProbeError> {
        if config.products_url.is_empty() || config.storefront_url.is_empty() {
            return Err(ProbeError::Unavailable(
                "catalog.products_url and catalog.storefront_url must be configured".to_string(),
            ));
        }

        Ok(Self {
            client,
            products_url: config.products_url.clone(),
            storefront_url: config.storefront_url.clone(),
        })
    }

    /// Build a probe with its own client bounded by `timeout`
    pub fn with_timeout(config: &CatalogConfig, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shop-health-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Unavailable(format!("Failed to build HTTP client: {e}")))?;
        Self::new(client, config)
    }

    /// Fetch one listing and report whether it is empty.
    ///
    /// `bypass_cache` asks intermediaries to revalidate with the origin. Only
    /// the backing-store read sets it; the storefront read must see exactly
    /// what a customer would, stale cache entries included.
    async fn fetch_is_empty(
        &self,
        source_name: &str,
        url: &str,
        bypass_cache: bool,
    ) -> Result<bool, ProbeError> {
        let mut request = self.client.get(url);
        if bypass_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }
        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::Unavailable(format!("{source_name}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Unavailable(format!(
                "{source_name}: HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProbeError::InvalidResponse {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        listing_is_empty(&body).ok_or_else(|| ProbeError::InvalidResponse {
            source_name: source_name.to_string(),
            reason: "expected an array or an object with count/total/items/products".to_string(),
        })
    }
}

#[async_trait]
impl CatalogProbe for HttpCatalogProbe {
    async fn probe_emptiness(&self) -> Result<CheckResult, ProbeError> {
        let products_empty = self
            .fetch_is_empty("products", &self.products_url, true)
            .await?;
        let shop_query_empty = self
            .fetch_is_empty("storefront", &self.storefront_url, false)
            .await?;

        let result = CheckResult {
            products_exist: !products_empty,
            shop_query_empty,
        };
        debug!(
            products_exist = result.products_exist,
            shop_query_empty = result.shop_query_empty,
            "Catalog probed"
        );
        Ok(result)
    }
}

/// Interpret a listing body; `None` when the shape is not recognised
pub fn listing_is_empty(body: &Value) -> Option<bool> {
    match body {
        Value::Array(items) => Some(items.is_empty()),
        Value::Object(map) => {
            for key in ["count", "total"] {
                if let Some(n) = map.get(key).and_then(Value::as_u64) {
                    return Some(n == 0);
                }
            }
            for key in ["items", "products"] {
                if let Some(items) = map.get(key).and_then(Value::as_array) {
                    return Some(items.is_empty());
                }
            }
            None
        }
        _ => None,
    }
}
