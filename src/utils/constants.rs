//! Constants Module - Single Source of Truth
//!
//! Every tunable, chain table entry, detection default and unit conversion
//! used across the scanner lives here. Other modules import from this file
//! instead of hardcoding values.

use alloy_primitives::U256;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "QuizSentry";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for explorer requests
pub const USER_AGENT: &str = concat!("QuizSentry/", env!("CARGO_PKG_VERSION"));

// ============================================
// EXPLORER API CONSTANTS
// ============================================

/// Etherscan multichain (v2) endpoint
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Environment variable holding the explorer API key
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

/// Attempts per explorer request
pub const MAX_RETRIES: u32 = 3;

/// Linear backoff unit: attempt N waits N * this
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Pause after every successful explorer call
pub const CALL_DELAY_MS: u64 = 250;

/// Default timeout for a single HTTP request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Explorer `status` value for a successful call
pub const STATUS_OK: &str = "1";

/// Explorer `status` value for a failed call
pub const STATUS_NOT_OK: &str = "0";

// ============================================
// DISCOVERY CONSTANTS
// ============================================

/// Default number of trailing blocks scanned per run
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 1000;

/// Blocks fetched concurrently per batch
pub const BLOCK_BATCH_SIZE: usize = 5;

/// Pause between block batches
pub const BATCH_DELAY_MS: u64 = 1000;

/// `Start(string,string)` - funds the quiz and sets the answer hash
pub const SELECTOR_START: &str = "0xc76de3e9";

/// `Try(string)` - the victim's guess entry point
pub const SELECTOR_TRY: &str = "0x3853682c";

/// Default selector set for quiz honeypots
pub const QUIZ_SELECTORS: [&str; 2] = [SELECTOR_START, SELECTOR_TRY];

/// Source substrings that must all be present for a match
pub const QUIZ_FINGERPRINTS: [&str; 4] = [
    "responseHash",
    "function Try(string",
    "function Start(",
    "isAdmin",
];

/// Display name when the explorer reports none
pub const UNKNOWN_NAME: &str = "Unknown";

// ============================================
// TRACKING & REPORT CONSTANTS
// ============================================

/// Balance (native units) above which a contract still holds bait
pub const ACTIVE_BALANCE_THRESHOLD: f64 = 0.01;

/// Default store location
pub const DEFAULT_DATA_FILE: &str = "data/quiz_scams.json";

/// Default report document
pub const DEFAULT_REPORT_FILE: &str = "README.md";

/// Report start marker
pub const REPORT_START_MARKER: &str = "<!-- QUIZ_SCAMS_START -->";

/// Report end marker
pub const REPORT_END_MARKER: &str = "<!-- QUIZ_SCAMS_END -->";

// ============================================
// CHAIN IDS - Single Source of Truth
// ============================================

/// Ethereum Mainnet
pub const CHAIN_ID_ETHEREUM: u64 = 1;
/// BNB Smart Chain
pub const CHAIN_ID_BSC: u64 = 56;
/// Polygon
pub const CHAIN_ID_POLYGON: u64 = 137;
/// Arbitrum One
pub const CHAIN_ID_ARBITRUM: u64 = 42161;
/// Optimism
pub const CHAIN_ID_OPTIMISM: u64 = 10;
/// Base
pub const CHAIN_ID_BASE: u64 = 8453;

/// Chains served by the Etherscan v2 endpoint with identical semantics
pub const SUPPORTED_CHAIN_IDS: [u64; 6] = [
    CHAIN_ID_ETHEREUM,
    CHAIN_ID_BSC,
    CHAIN_ID_POLYGON,
    CHAIN_ID_ARBITRUM,
    CHAIN_ID_OPTIMISM,
    CHAIN_ID_BASE,
];

/// Get chain name
pub fn get_chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_ETHEREUM => "Ethereum",
        CHAIN_ID_BSC => "BNB Smart Chain",
        CHAIN_ID_POLYGON => "Polygon",
        CHAIN_ID_ARBITRUM => "Arbitrum One",
        CHAIN_ID_OPTIMISM => "Optimism",
        CHAIN_ID_BASE => "Base",
        _ => "Unknown",
    }
}

/// Get native token symbol
pub fn get_native_symbol(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_BSC => "BNB",
        CHAIN_ID_POLYGON => "POL",
        CHAIN_ID_ETHEREUM | CHAIN_ID_ARBITRUM | CHAIN_ID_OPTIMISM | CHAIN_ID_BASE => "ETH",
        _ => "ETH",
    }
}

/// Get block explorer base URL (used for address links in the report)
pub fn get_explorer_url(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        CHAIN_ID_ETHEREUM => Some("https://etherscan.io"),
        CHAIN_ID_BSC => Some("https://bscscan.com"),
        CHAIN_ID_POLYGON => Some("https://polygonscan.com"),
        CHAIN_ID_ARBITRUM => Some("https://arbiscan.io"),
        CHAIN_ID_OPTIMISM => Some("https://optimistic.etherscan.io"),
        CHAIN_ID_BASE => Some("https://basescan.org"),
        _ => None,
    }
}

/// Check if chain is supported
#[inline]
pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAIN_IDS.contains(&chain_id)
}

// ============================================
// CONVERSION FUNCTIONS
// ============================================

/// Convert wei to native units (18 decimals)
#[inline]
pub fn wei_to_native(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e18
}

/// Shorten an address for display: `0x1234...abcd`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
