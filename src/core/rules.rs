//! Detection rules for quiz honeypots
//!
//! Two kinds of predicates, kept apart from control flow so the rule set can
//! be swapped without touching discovery or verification:
//! - [`Selector`]: does this call data invoke a suspicious entry point?
//! - [`Fingerprint`]: does this verified source contain a telltale fragment?

use alloy_primitives::keccak256;
use eyre::{eyre, Result};
use std::fmt;

use crate::models::types::Transaction;
use crate::utils::constants::{QUIZ_FINGERPRINTS, QUIZ_SELECTORS};

/// 4-byte function selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Parse `0xc76de3e9` style hex (prefix optional, any case)
    pub fn from_hex(raw: &str) -> Result<Self> {
        let digits = raw
            .trim()
            .strip_prefix("0x")
            .or_else(|| raw.trim().strip_prefix("0X"))
            .unwrap_or_else(|| raw.trim());
        let bytes = hex::decode(digits).map_err(|e| eyre!("Invalid selector {:?}: {}", raw, e))?;
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| eyre!("Selector {:?} is not 4 bytes", raw))?;
        Ok(Self(arr))
    }

    /// Derive from a canonical signature, e.g. `Try(string)`
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        let mut arr = [0u8; 4];
        arr.copy_from_slice(&hash[..4]);
        Self(arr)
    }

    /// Case-insensitive prefix match on hex call data
    pub fn matches_calldata(&self, tx: &Transaction) -> bool {
        tx.selector_hex()
            .and_then(|prefix| hex::decode(prefix).ok())
            .map(|prefix| prefix.as_slice() == self.0)
            .unwrap_or(false)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Literal, case-sensitive source fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn matches_source(&self, source: &str) -> bool {
        source.contains(self.0.as_str())
    }
}

/// The full rule set handed to discovery and verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRules {
    selectors: Vec<Selector>,
    fingerprints: Vec<Fingerprint>,
}

impl DetectionRules {
    pub fn new(selectors: Vec<Selector>, fingerprints: Vec<Fingerprint>) -> Self {
        Self {
            selectors,
            fingerprints,
        }
    }

    /// Built-in quiz honeypot rules
    pub fn quiz_scam() -> Self {
        let selectors = QUIZ_SELECTORS
            .iter()
            .filter_map(|s| Selector::from_hex(s).ok())
            .collect();
        let fingerprints = QUIZ_FINGERPRINTS.iter().map(|f| Fingerprint::new(*f)).collect();
        Self::new(selectors, fingerprints)
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    /// Any selector matches the call data
    pub fn is_suspicious_call(&self, tx: &Transaction) -> bool {
        self.selectors.iter().any(|s| s.matches_calldata(tx))
    }

    /// Every fingerprint is present. An empty rule set never matches.
    pub fn matches_source(&self, source: &str) -> bool {
        !self.fingerprints.is_empty() && self.fingerprints.iter().all(|f| f.matches_source(source))
    }

    /// Fingerprints absent from `source` (diagnostics)
    pub fn missing_fingerprints<'a>(&'a self, source: &str) -> Vec<&'a str> {
        self.fingerprints
            .iter()
            .filter(|f| !f.matches_source(source))
            .map(Fingerprint::as_str)
            .collect()
    }
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self::quiz_scam()
    }
}
