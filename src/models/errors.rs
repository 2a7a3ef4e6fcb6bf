//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so log lines from scheduled
//! runs can be grepped and grouped.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - EXPLORER_xxx: explorer API errors
//! - CFG_xxx: configuration errors
//! - STORE_xxx / REPORT_xxx: local file errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Explorer Errors
    // ============================================
    /// Connection to the explorer failed
    ExplorerConnectionFailed,
    /// Request timed out
    ExplorerTimeout,
    /// HTTP 429
    ExplorerRateLimited,
    /// Non-success HTTP status
    ExplorerHttpError,
    /// Explorer answered with `status: "0"` or a JSON-RPC error
    ExplorerNotOk,
    /// Body could not be decoded or had an unexpected shape
    ExplorerInvalidResponse,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing API key
    ConfigMissingApiKey,
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Unsupported chain ID
    ConfigUnsupportedChain,

    // ============================================
    // Local File Errors
    // ============================================
    /// Store could not be written
    StoreWriteFailed,
    /// Report exists but could not be read
    ReportReadFailed,
    /// Report could not be written
    ReportWriteFailed,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplorerConnectionFailed => "EXPLORER_CONNECTION_FAILED",
            Self::ExplorerTimeout => "EXPLORER_TIMEOUT",
            Self::ExplorerRateLimited => "EXPLORER_RATE_LIMITED",
            Self::ExplorerHttpError => "EXPLORER_HTTP_ERROR",
            Self::ExplorerNotOk => "EXPLORER_NOT_OK",
            Self::ExplorerInvalidResponse => "EXPLORER_INVALID_RESPONSE",

            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigUnsupportedChain => "CFG_UNSUPPORTED_CHAIN",

            Self::StoreWriteFailed => "STORE_WRITE_FAILED",
            Self::ReportReadFailed => "REPORT_READ_FAILED",
            Self::ReportWriteFailed => "REPORT_WRITE_FAILED",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Missing API key
    pub fn missing_api_key(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingApiKey,
            format!("Missing API key: {}", key_name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key_name: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key_name, value),
        )
    }

    /// Unsupported chain
    pub fn unsupported_chain(chain_id: u64) -> Self {
        Self::new(
            ErrorCode::ConfigUnsupportedChain,
            format!("Unsupported chain_id: {}", chain_id),
        )
    }

    /// Explorer answered "not OK"
    pub fn explorer_not_ok(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerNotOk, msg)
    }

    /// Explorer response had an unexpected shape
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerInvalidResponse, msg)
    }

    /// Explorer rate limited
    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::ExplorerRateLimited, "Rate limited (HTTP 429)")
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExplorerTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::ExplorerConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::new(ErrorCode::ExplorerInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ExplorerInvalidResponse, "JSON parse error", err)
    }
}
