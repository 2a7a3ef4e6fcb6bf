//! Markdown report rendering
//!
//! The table lives between two marker comments inside an existing document.
//! Everything outside the markers is preserved byte for byte.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::models::config::ChainConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{ContractStatus, TrackedContract};
use crate::utils::constants::{truncate_address, REPORT_END_MARKER, REPORT_START_MARKER};
use crate::utils::store::write_atomic;

pub struct ReportRenderer {
    chain: ChainConfig,
}

impl ReportRenderer {
    pub fn new(chain: ChainConfig) -> Self {
        Self { chain }
    }

    /// ACTIVE first, then by descending balance, then by address for stability
    pub fn sorted<'a>(contracts: &'a [TrackedContract]) -> Vec<&'a TrackedContract> {
        let mut rows: Vec<&TrackedContract> = contracts.iter().collect();
        rows.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| b.balance.partial_cmp(&a.balance).unwrap_or(Ordering::Equal))
                .then_with(|| a.address.cmp(&b.address))
        });
        rows
    }

    /// Summary line plus table (no timestamp)
    pub fn render_table(&self, contracts: &[TrackedContract]) -> String {
        let active: Vec<&TrackedContract> = contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .collect();
        let locked: f64 = active.iter().map(|c| c.balance).sum();

        let mut out = format!(
            "**{}** quiz contracts tracked | **{}** active | **{:.4} {}** still locked\n\n",
            contracts.len(),
            active.len(),
            locked,
            self.chain.symbol
        );
        out.push_str("| Name | Address | Balance | Status | First Seen |\n");
        out.push_str("|------|---------|---------|--------|------------|\n");

        if contracts.is_empty() {
            out.push_str("\n_No quiz contracts detected yet._\n");
            return out;
        }

        for c in Self::sorted(contracts) {
            out.push_str(&format!(
                "| {} | [{}]({}) | {:.4} {} | {} {} | {} |\n",
                escape_cell(&c.name),
                truncate_address(&c.address),
                self.chain.address_url(&c.address),
                c.balance,
                self.chain.symbol,
                c.status.emoji(),
                c.status.as_str(),
                c.first_seen_at.format("%Y-%m-%d"),
            ));
        }
        out
    }

    /// Table followed by the "last updated" line
    pub fn render_section(&self, contracts: &[TrackedContract], now: DateTime<Utc>) -> String {
        format!(
            "{}\n_Last updated: {}_\n",
            self.render_table(contracts),
            now.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }

    /// Replace the marker span of `document` with `section`, or append a new
    /// marker block when the markers are absent
    pub fn splice(document: &str, section: &str) -> String {
        if let Some(start) = document.find(REPORT_START_MARKER) {
            let body_start = start + REPORT_START_MARKER.len();
            if let Some(offset) = document[body_start..].find(REPORT_END_MARKER) {
                let end = body_start + offset;
                return format!(
                    "{}\n{}{}",
                    &document[..body_start],
                    section,
                    &document[end..]
                );
            }
        }

        let mut out = document.to_string();
        if !out.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(REPORT_START_MARKER);
        out.push('\n');
        out.push_str(section);
        out.push_str(REPORT_END_MARKER);
        out.push('\n');
        out
    }

    /// Rewrite the report file in place; a missing file starts empty, an
    /// unreadable one is left alone
    pub fn update_file(
        &self,
        path: &Path,
        contracts: &[TrackedContract],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let document = match fs::read_to_string(path) {
            Ok(doc) => doc,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("📝 Report {} not found, creating it", path.display());
                String::new()
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorCode::ReportReadFailed,
                    format!("Failed to read {}, leaving it untouched", path.display()),
                    e,
                ));
            }
        };
        if !document.contains(REPORT_START_MARKER) {
            warn!("📝 Markers not found in {}, appending a new block", path.display());
        }

        let updated = Self::splice(&document, &self.render_section(contracts, now));
        write_atomic(path, updated.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorCode::ReportWriteFailed,
                format!("Failed to write {}", path.display()),
                e,
            )
        })?;

        info!("📝 Report updated: {} ({} rows)", path.display(), contracts.len());
        Ok(())
    }
}

/// Keep names from breaking the table
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
