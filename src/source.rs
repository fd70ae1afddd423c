//! Up Bank transaction source
//!
//! Walks the cursor-paginated `/transactions` endpoint one page at a time.
//! A non-2xx page aborts the whole fetch; nothing is retried.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::TrackerError;
use crate::models::{RawTransaction, TransactionPage};
use crate::Result;

/// Anything that can produce the full raw transaction history.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>>;
}

pub struct UpClient {
    client: Client,
    token: String,
    base_url: String,
}

impl UpClient {
    pub fn new(token: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.up_api_key.clone(), &config.up_base_url)
    }

    async fn fetch_page(&self, url: &str) -> Result<TransactionPage> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Up API returned {} for {}", status, url);
            return Err(TrackerError::FetchError {
                status,
                url: url.to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TransactionSource for UpClient {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>> {
        if self.token.is_empty() {
            return Err(TrackerError::ConfigError(
                "UP_API_KEY not configured".to_string(),
            ));
        }

        let mut transactions = Vec::new();
        let mut next = Some(format!("{}/transactions", self.base_url));
        let mut pages = 0;

        while let Some(url) = next {
            let page = self.fetch_page(&url).await?;
            pages += 1;
            debug!("Fetched page {} ({} records)", pages, page.data.len());

            transactions.extend(page.data);
            next = page.links.next;
        }

        info!("Fetched {} transactions over {} pages", transactions.len(), pages);
        Ok(transactions)
    }
}
