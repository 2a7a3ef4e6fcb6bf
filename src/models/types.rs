//! Type definitions for Quiz Sentry
//! Persisted records, explorer payloads and run statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{ACTIVE_BALANCE_THRESHOLD, UNKNOWN_NAME};

/// Whether a tracked contract still holds bait
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractStatus {
    /// Balance above the threshold, still luring victims
    Active,
    /// Balance at or below the threshold
    Drained,
}

impl ContractStatus {
    /// Status is a pure function of the balance
    #[inline]
    pub fn from_balance(balance: f64) -> Self {
        if balance > ACTIVE_BALANCE_THRESHOLD {
            Self::Active
        } else {
            Self::Drained
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "ACTIVE",
            ContractStatus::Drained => "DRAINED",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ContractStatus::Active => "🟢",
            ContractStatus::Drained => "⚫",
        }
    }
}

/// A verified quiz honeypot and its latest known balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedContract {
    /// Lowercased contract address (unique key)
    pub address: String,
    /// Chain the contract lives on
    pub chain_id: u64,
    /// Contract name from verified source metadata
    pub name: String,
    /// Native-token balance
    pub balance: f64,
    /// Derived from `balance`
    pub status: ContractStatus,
    /// Set once at creation
    pub first_seen_at: DateTime<Utc>,
    /// Refreshed every run
    pub last_updated_at: DateTime<Utc>,
}

impl TrackedContract {
    pub fn new(
        address: &str,
        chain_id: u64,
        name: Option<String>,
        balance: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            address: normalize_address(address),
            chain_id,
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            balance,
            status: ContractStatus::from_balance(balance),
            first_seen_at: now,
            last_updated_at: now,
        }
    }

    /// Record a refreshed balance. `first_seen_at` is left untouched.
    pub fn apply_balance(&mut self, balance: f64, now: DateTime<Utc>) {
        self.balance = balance;
        self.status = ContractStatus::from_balance(balance);
        self.last_updated_at = now;
    }
}

/// Canonical form used for identity and storage
#[inline]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Transaction body as returned by `eth_getBlockByNumber` with full objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    /// `None` for contract creation
    #[serde(default)]
    pub to: Option<String>,
    /// Call data, hex encoded
    #[serde(default)]
    pub input: String,
}

impl Transaction {
    /// 4-byte selector prefix of the call data (hex, without `0x`)
    pub fn selector_hex(&self) -> Option<&str> {
        let data = self
            .input
            .strip_prefix("0x")
            .or_else(|| self.input.strip_prefix("0X"))
            .unwrap_or(&self.input);
        data.get(..8)
    }
}

/// Verified source returned by `getsourcecode`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub source_code: String,
    pub contract_name: Option<String>,
}

/// Summary of a single run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Records in the store after the run
    pub tracked: usize,
    /// Balances refreshed successfully
    pub refreshed: usize,
    pub refresh_failures: usize,
    /// Chain head used for discovery
    pub latest_block: Option<u64>,
    /// Distinct addresses matched by selector
    pub candidates: usize,
    /// Candidates skipped because they are already tracked
    pub already_known: usize,
    /// New records created this run
    pub verified: usize,
    pub verification_failures: usize,
}

impl RunStats {
    /// Any per-item failure during the run
    pub fn has_failures(&self) -> bool {
        self.refresh_failures > 0 || self.verification_failures > 0 || self.latest_block.is_none()
    }

    pub fn summary(&self) -> String {
        format!(
            "Tracked: {} | Refreshed: {} ({} failed) | Head: {} | Candidates: {} ({} known) | New: {} ({} failed)",
            self.tracked,
            self.refreshed,
            self.refresh_failures,
            self.latest_block
                .map(|b| b.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            self.candidates,
            self.already_known,
            self.verified,
            self.verification_failures,
        )
    }
}
