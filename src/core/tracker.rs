//! Tracker - the top-level run
//!
//! load → refresh balances → discover → verify → persist → report.
//! Per-item failures are logged and counted in [`RunStats`]; the run always
//! tries to reach the persist and report steps.

use chrono::{DateTime, Utc};
use eyre::Result;
use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::core::discovery::CandidateDiscovery;
use crate::core::rules::DetectionRules;
use crate::core::verifier::FingerprintVerifier;
use crate::models::config::ScannerConfig;
use crate::models::types::{normalize_address, RunStats, TrackedContract};
use crate::providers::explorer::ExplorerApi;
use crate::utils::report::ReportRenderer;
use crate::utils::store::ContractStore;

pub struct Tracker<'a> {
    api: &'a dyn ExplorerApi,
    config: &'a ScannerConfig,
    rules: DetectionRules,
    store: ContractStore,
    renderer: ReportRenderer,
}

impl<'a> Tracker<'a> {
    pub fn new(api: &'a dyn ExplorerApi, config: &'a ScannerConfig, rules: DetectionRules) -> Self {
        Self {
            api,
            config,
            rules,
            store: ContractStore::new(config.data_file.clone()),
            renderer: ReportRenderer::new(config.chain.clone()),
        }
    }

    /// Run once against the wall clock
    pub async fn run(&self) -> Result<RunStats> {
        self.run_at(Utc::now()).await
    }

    /// Run once with an explicit timestamp for every record touched
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunStats> {
        let mut stats = RunStats::default();
        let mut contracts = self.store.load();

        self.refresh_balances(&mut contracts, now, &mut stats).await;

        let new_contracts = self.discover_new(&contracts, now, &mut stats).await;
        contracts.extend(new_contracts);
        stats.tracked = contracts.len();

        let saved = self.store.save(&contracts);
        if let Err(e) = &saved {
            error!("❌ {}", e);
        }
        let reported = self
            .renderer
            .update_file(&self.config.report_file, &contracts, now);
        if let Err(e) = &reported {
            error!("❌ {}", e);
        }

        saved?;
        reported?;

        info!("📊 {}", stats.summary());
        Ok(stats)
    }

    /// Best-effort balance refresh; a failure leaves that record untouched
    pub async fn refresh_balances(
        &self,
        contracts: &mut [TrackedContract],
        now: DateTime<Utc>,
        stats: &mut RunStats,
    ) {
        if contracts.is_empty() {
            return;
        }
        info!("💰 Refreshing {} balances", contracts.len());

        for contract in contracts.iter_mut() {
            match self.api.get_balance(&contract.address).await {
                Ok(balance) => {
                    let before = contract.status;
                    contract.apply_balance(balance, now);
                    if before != contract.status {
                        info!(
                            "🔄 {} ({}) {} → {}",
                            contract.name,
                            contract.address,
                            before.as_str(),
                            contract.status.as_str()
                        );
                    }
                    stats.refreshed += 1;
                }
                Err(e) => {
                    warn!("⚠️ Balance refresh failed for {}: {}", contract.address, e);
                    stats.refresh_failures += 1;
                }
            }
        }
    }

    /// Discover candidates, drop known ones, verify the rest
    async fn discover_new(
        &self,
        known: &[TrackedContract],
        now: DateTime<Utc>,
        stats: &mut RunStats,
    ) -> Vec<TrackedContract> {
        let latest = match self.api.get_latest_block_number().await {
            Ok(latest) => latest,
            Err(e) => {
                error!("❌ Could not read latest block, skipping discovery: {}", e);
                return Vec::new();
            }
        };
        stats.latest_block = Some(latest);
        info!(
            "🔍 Head {} | rules: {} selectors [{}], {} fingerprints",
            latest,
            self.rules.selectors().len(),
            self.rules
                .selectors()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            self.rules.fingerprints().len()
        );

        let discovery = CandidateDiscovery::new(
            self.api,
            &self.rules,
            self.config.batch_size,
            self.config.batch_delay,
        );
        let candidates = discovery.discover(latest, self.config.lookback_blocks).await;
        stats.candidates = candidates.len();

        let known: HashSet<String> = known.iter().map(|c| normalize_address(&c.address)).collect();
        let fresh: Vec<String> = candidates
            .into_iter()
            .filter(|addr| !known.contains(&normalize_address(addr)))
            .collect();
        stats.already_known = stats.candidates - fresh.len();

        info!(
            "🧪 {} candidates, {} already tracked, verifying {}",
            stats.candidates,
            stats.already_known,
            fresh.len()
        );

        self.verify_candidates(&fresh, now, stats).await
    }

    /// Verify each candidate in turn and build records for the matches
    pub async fn verify_candidates(
        &self,
        candidates: &[String],
        now: DateTime<Utc>,
        stats: &mut RunStats,
    ) -> Vec<TrackedContract> {
        let verifier = FingerprintVerifier::new(self.api, &self.rules);
        let mut found = Vec::new();

        for address in candidates {
            let name = match verifier.verify(address).await {
                Ok(Some(name)) => name,
                Ok(None) => continue,
                Err(e) => {
                    warn!("⚠️ Verification failed for {}: {}", address, e);
                    stats.verification_failures += 1;
                    continue;
                }
            };

            let balance = match self.api.get_balance(address).await {
                Ok(balance) => balance,
                Err(e) => {
                    warn!("⚠️ Balance lookup failed for new match {}: {}", address, e);
                    0.0
                }
            };

            let contract =
                TrackedContract::new(address, self.config.chain.chain_id, Some(name), balance, now);
            info!(
                "🚨 New quiz scam: {} ({}) holding {:.4} {} [{}]",
                contract.name,
                contract.address,
                contract.balance,
                self.config.chain.symbol,
                contract.status.as_str()
            );
            found.push(contract);
            stats.verified += 1;
        }

        found
    }
}
