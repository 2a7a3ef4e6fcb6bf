//! Configuration module for Quiz Sentry
//!
//! Uses constants from utils/constants.rs. The API key is never logged.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    get_chain_name, get_explorer_url, get_native_symbol, is_supported_chain, API_KEY_ENV,
    BATCH_DELAY_MS, BLOCK_BATCH_SIZE, CALL_DELAY_MS, CHAIN_ID_ETHEREUM,
    DEFAULT_DATA_FILE, DEFAULT_EXPLORER_API_URL, DEFAULT_LOOKBACK_BLOCKS, DEFAULT_REPORT_FILE,
    DEFAULT_REQUEST_TIMEOUT_SECS, MAX_RETRIES, RETRY_BASE_DELAY_MS,
};

/// Chain-specific display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub symbol: String,
    /// Explorer base URL for address links
    pub explorer_url: String,
}

impl ChainConfig {
    /// Get config for specific chain
    pub fn get(chain_id: u64) -> Option<ChainConfig> {
        if !is_supported_chain(chain_id) {
            return None;
        }
        Some(ChainConfig {
            chain_id,
            name: get_chain_name(chain_id).to_string(),
            symbol: get_native_symbol(chain_id).to_string(),
            explorer_url: get_explorer_url(chain_id)?.to_string(),
        })
    }

    /// Link to an address page on the explorer
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID_ETHEREUM,
            name: get_chain_name(CHAIN_ID_ETHEREUM).to_string(),
            symbol: get_native_symbol(CHAIN_ID_ETHEREUM).to_string(),
            explorer_url: get_explorer_url(CHAIN_ID_ETHEREUM)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Configuration for a scan run
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Explorer API key (never logged)
    pub api_key: String,
    /// Explorer endpoint
    pub api_url: String,
    pub chain: ChainConfig,
    /// Trailing blocks scanned for candidates
    pub lookback_blocks: u64,
    /// Blocks fetched concurrently per batch
    pub batch_size: usize,
    /// Pause between block batches
    pub batch_delay: Duration,
    /// Pause after every successful explorer call
    pub call_delay: Duration,
    /// Attempts per explorer request
    pub max_retries: u32,
    /// Linear backoff unit
    pub retry_base_delay: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Persisted store path
    pub data_file: PathBuf,
    /// Markdown report path
    pub report_file: PathBuf,
    /// Exit non-zero when any per-item failure occurred
    pub strict_exit: bool,
}

impl ScannerConfig {
    /// Config with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            chain: ChainConfig::default(),
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
            batch_size: BLOCK_BATCH_SIZE,
            batch_delay: Duration::from_millis(BATCH_DELAY_MS),
            call_delay: Duration::from_millis(CALL_DELAY_MS),
            max_retries: MAX_RETRIES,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            strict_exit: false,
        }
    }

    /// Load from process environment. Missing key is fatal.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::missing_api_key(API_KEY_ENV))?;
        info!("🔑 {} configured (key hidden)", API_KEY_ENV);

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("EXPLORER_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }

        if let Some(chain_id) = parse_var::<u64, _>(&lookup, "CHAIN_ID")? {
            config.chain = ChainConfig::get(chain_id).ok_or_else(|| AppError::unsupported_chain(chain_id))?;
        }

        if let Some(lookback) = parse_var::<u64, _>(&lookup, "LOOKBACK_BLOCKS")? {
            if lookback == 0 {
                return Err(AppError::invalid_config("LOOKBACK_BLOCKS", "0"));
            }
            config.lookback_blocks = lookback;
        }

        if let Some(path) = lookup("SCAM_DATA_FILE").filter(|p| !p.trim().is_empty()) {
            config.data_file = PathBuf::from(path.trim());
        }

        if let Some(path) = lookup("SCAM_REPORT_FILE").filter(|p| !p.trim().is_empty()) {
            config.report_file = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup("STRICT_EXIT") {
            config.strict_exit = parse_flag(&raw)
                .ok_or_else(|| AppError::invalid_config("STRICT_EXIT", &raw))?;
        }

        Ok(config)
    }

    /// Zero all pacing delays (tests, local dry runs against a mock)
    pub fn without_delays(mut self) -> Self {
        self.batch_delay = Duration::ZERO;
        self.call_delay = Duration::ZERO;
        self.retry_base_delay = Duration::ZERO;
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::invalid_config(key, &raw)),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
