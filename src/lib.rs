//! Quiz Sentry Library
//!
//! Explorer-polling tracker for quiz-style honeypot contracts:
//! - Scans recent blocks for calls to `Start`/`Try` quiz selectors
//! - Confirms candidates by fingerprinting their verified source
//! - Tracks balances of confirmed contracts in a JSON store
//! - Renders the list as a Markdown table between marker comments

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{CandidateDiscovery, DetectionRules, Fingerprint, FingerprintVerifier, Selector, Tracker};
pub use models::{AppError, AppResult, ChainConfig, ContractStatus, ErrorCode, RunStats, ScannerConfig, SourceInfo, TrackedContract, Transaction};
pub use providers::{ExplorerApi, ExplorerClient, ExplorerResponse};
pub use utils::{ContractStore, ReportRenderer};
