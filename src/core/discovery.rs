//! Candidate discovery over a trailing block window
//!
//! Blocks are fetched in fixed-size batches: every block of a batch is in
//! flight at once, the batch is awaited jointly, then a fixed delay runs
//! before the next batch.

use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::rules::DetectionRules;
use crate::models::types::{normalize_address, Transaction};
use crate::providers::explorer::ExplorerApi;

/// Scans recent blocks for calls to suspicious selectors
pub struct CandidateDiscovery<'a> {
    api: &'a dyn ExplorerApi,
    rules: &'a DetectionRules,
    batch_size: usize,
    batch_delay: Duration,
}

impl<'a> CandidateDiscovery<'a> {
    pub fn new(
        api: &'a dyn ExplorerApi,
        rules: &'a DetectionRules,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            api,
            rules,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// The `lookback` most recent blocks ending at `latest`
    pub fn block_window(latest: u64, lookback: u64) -> RangeInclusive<u64> {
        let start = latest.saturating_sub(lookback.saturating_sub(1));
        start..=latest
    }

    /// Distinct (lowercased, sorted) `to` addresses of suspicious calls
    pub async fn discover(&self, latest: u64, lookback: u64) -> Vec<String> {
        if lookback == 0 {
            return Vec::new();
        }

        let blocks: Vec<u64> = Self::block_window(latest, lookback).collect();
        let total_batches = blocks.len().div_ceil(self.batch_size);
        let mut candidates = BTreeSet::new();

        info!(
            "🔍 Scanning blocks {}..={} ({} batches of {})",
            blocks[0],
            latest,
            total_batches,
            self.batch_size
        );

        for (index, batch) in blocks.chunks(self.batch_size).enumerate() {
            let fetches = batch.iter().map(|&n| self.api.get_block_transactions(n));
            let results = join_all(fetches).await;

            for (&block_number, result) in batch.iter().zip(results) {
                match result {
                    Ok(txs) => self.collect(block_number, &txs, &mut candidates),
                    Err(e) => warn!("⚠️ Skipping block {}: {}", block_number, e),
                }
            }

            info!(
                "📦 Batch {}/{} done (blocks {}..={}), {} candidates so far",
                index + 1,
                total_batches,
                batch[0],
                batch[batch.len() - 1],
                candidates.len()
            );

            if index + 1 < total_batches && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        candidates.into_iter().collect()
    }

    fn collect(&self, block_number: u64, txs: &[Transaction], candidates: &mut BTreeSet<String>) {
        for tx in txs {
            if !self.rules.is_suspicious_call(tx) {
                continue;
            }
            // Contract creations carry no `to`; they are not captured
            let Some(to) = tx.to.as_deref().filter(|t| !t.is_empty()) else {
                debug!("Ignoring creation tx {} in block {}", tx.hash, block_number);
                continue;
            };
            if candidates.insert(normalize_address(to)) {
                debug!("🎯 Candidate {} via tx {} (block {})", to, tx.hash, block_number);
            }
        }
    }
}
