//! Source fingerprint verification

use eyre::Result;
use tracing::debug;

use crate::core::rules::DetectionRules;
use crate::providers::explorer::ExplorerApi;
use crate::utils::constants::UNKNOWN_NAME;

/// Decides whether a candidate's verified source matches the rule set
pub struct FingerprintVerifier<'a> {
    api: &'a dyn ExplorerApi,
    rules: &'a DetectionRules,
}

impl<'a> FingerprintVerifier<'a> {
    pub fn new(api: &'a dyn ExplorerApi, rules: &'a DetectionRules) -> Self {
        Self { api, rules }
    }

    /// `Some(contract name)` on a full match, `None` otherwise.
    /// Unverified contracts never match.
    pub async fn verify(&self, address: &str) -> Result<Option<String>> {
        let Some(source) = self.api.get_source_code(address).await? else {
            debug!("{} has no verified source", address);
            return Ok(None);
        };

        if !self.rules.matches_source(&source.source_code) {
            debug!(
                "{} missing fingerprints: {:?}",
                address,
                self.rules.missing_fingerprints(&source.source_code)
            );
            return Ok(None);
        }

        Ok(Some(
            source
                .contract_name
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        ))
    }
}
