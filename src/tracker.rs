//! Transaction pipeline
//!
//! SOURCE → TRANSACTION CACHE → CLEAN → CLASSIFY
//!
//! The transaction cache short-circuits the fetch until a refresh is asked
//! for. Categories are resolved after cleaning so transfers never cost a
//! generation call.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CategoryCache, JsonStore, TRANSACTIONS_KEY};
use crate::classifier::Classifier;
use crate::cleaner::clean;
use crate::config::Config;
use crate::gemini::TextGenerator;
use crate::models::Transaction;
use crate::source::{TransactionSource, UpClient};
use crate::throttle::Throttle;
use crate::Result;

pub struct Tracker {
    source: Box<dyn TransactionSource>,
    classifier: Classifier,
    store: JsonStore,
    categories: CategoryCache,
}

impl Tracker {
    pub fn new(
        source: Box<dyn TransactionSource>,
        classifier: Classifier,
        store: JsonStore,
    ) -> Self {
        let categories = CategoryCache::load(store.clone());
        info!(
            "Tracker cache at {} ({} known merchants)",
            store.dir().display(),
            categories.len()
        );

        Self {
            source,
            classifier,
            store,
            categories,
        }
    }

    /// Up Bank source, Gemini classifier and the configured cache directory.
    pub fn from_config(config: &Config, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let source = UpClient::from_config(config)?;
        let throttle = Throttle::new(config.classify_delay, config.classify_calls_per_minute);
        Ok(Self::new(
            Box::new(source),
            Classifier::new(generator, throttle),
            JsonStore::new(&config.cache_dir),
        ))
    }

    /// Cleaned and classified transactions, newest first as the API returns them.
    pub async fn transactions(&mut self, refresh: bool) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = if refresh {
            Vec::new()
        } else {
            self.store.load(TRANSACTIONS_KEY, Vec::new())
        };

        if transactions.is_empty() {
            info!("Fetching transactions from the banking API");
            transactions = self
                .source
                .fetch_all()
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<Vec<_>>>()?;
            self.store.save(TRANSACTIONS_KEY, &transactions)?;
        } else {
            info!("Using {} cached transactions", transactions.len());
        }

        let mut transactions = clean(transactions);
        let classified = self
            .classifier
            .classify_all(&mut self.categories, &mut transactions)
            .await?;
        info!(
            "{} transactions after cleaning, {} newly categorised",
            transactions.len(),
            classified
        );

        Ok(transactions)
    }
}
