//! Explorer Client Module - Etherscan-style HTTP API
//!
//! Every request is a GET against one endpoint carrying `apikey` and
//! `chainid` plus call-specific `module`/`action` parameters.
//!
//! Retry policy:
//! 1. Up to `max_retries` attempts per request
//! 2. `status: "0"`, JSON-RPC errors, HTTP/transport failures and undecodable
//!    bodies all count as failures
//! 3. Linear backoff: attempt N waits `retry_base_delay * N`
//! 4. Exhaustion degrades to a `{status: "0"}` sentinel, never an abort
//! 5. Every successful call is followed by `call_delay`

use alloy_primitives::U256;
use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::models::config::ScannerConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{SourceInfo, Transaction};
use crate::utils::constants::{wei_to_native, STATUS_NOT_OK, STATUS_OK, USER_AGENT as USER_AGENT_CONST};

/// Explorer operations the tracker depends on
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Current chain head
    async fn get_latest_block_number(&self) -> Result<u64>;

    /// Native balance; 0 when the explorer reports failure
    async fn get_balance(&self, address: &str) -> Result<f64>;

    /// Full transaction bodies of a block
    async fn get_block_transactions(&self, block_number: u64) -> Result<Vec<Transaction>>;

    /// Verified source, `None` for unverified addresses
    async fn get_source_code(&self, address: &str) -> Result<Option<SourceInfo>>;
}

/// Raw explorer envelope
///
/// Proxy (`module=proxy`) answers are JSON-RPC shaped and carry no `status`;
/// the other modules always set it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
    /// JSON-RPC error object (proxy calls only)
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ExplorerResponse {
    /// Sentinel returned once retries are exhausted
    pub fn failed() -> Self {
        Self {
            status: Some(STATUS_NOT_OK.to_string()),
            message: Some("retries exhausted".to_string()),
            ..Default::default()
        }
    }

    /// Explicit `status: "0"`
    pub fn is_not_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_NOT_OK)
    }

    /// Explicit `status: "1"`
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    /// Reject "not OK" answers so the caller retries them
    pub fn check(&self) -> AppResult<()> {
        if self.is_not_ok() {
            let detail = match &self.result {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            return Err(AppError::explorer_not_ok(format!(
                "{} {}",
                self.message.as_deref().unwrap_or("NOTOK"),
                detail
            )
            .trim_end()
            .to_string()));
        }
        if let Some(err) = &self.error {
            return Err(AppError::explorer_not_ok(format!("RPC error: {}", err)));
        }
        Ok(())
    }
}

/// One entry of a `getsourcecode` result
#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "SourceCode", default)]
    source_code: String,
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

/// Parse the hex head from `eth_blockNumber`
pub fn parse_block_number(resp: &ExplorerResponse) -> AppResult<u64> {
    let raw = resp
        .result
        .as_str()
        .ok_or_else(|| AppError::invalid_response("block number is not a string"))?;
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| AppError::invalid_response(format!("block number not hex: {}", raw)))?;
    u64::from_str_radix(hex, 16)
        .map_err(|_| AppError::invalid_response(format!("block number not hex: {}", raw)))
}

/// Convert a wei balance string; any non-success status yields 0
pub fn parse_balance(resp: &ExplorerResponse) -> AppResult<f64> {
    if !resp.is_ok() {
        return Ok(0.0);
    }
    let raw = resp
        .result
        .as_str()
        .ok_or_else(|| AppError::invalid_response("balance is not a string"))?;
    let wei = U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| AppError::invalid_response(format!("balance {:?}: {}", raw, e)))?;
    Ok(wei_to_native(wei))
}

/// Extract transactions from `eth_getBlockByNumber`; a null block is empty
pub fn parse_block_transactions(resp: &ExplorerResponse) -> AppResult<Vec<Transaction>> {
    if resp.is_not_ok() {
        return Err(AppError::explorer_not_ok(
            resp.message.clone().unwrap_or_else(|| "block unavailable".to_string()),
        ));
    }
    match resp.result.get("transactions") {
        Some(txs) => Ok(serde_json::from_value(txs.clone())?),
        None => Ok(Vec::new()),
    }
}

/// Extract verified source from `getsourcecode`
pub fn parse_source_code(resp: &ExplorerResponse) -> AppResult<Option<SourceInfo>> {
    if !resp.is_ok() {
        return Err(AppError::explorer_not_ok(
            resp.message.clone().unwrap_or_else(|| "source unavailable".to_string()),
        ));
    }
    let entries: Vec<SourceCodeEntry> = serde_json::from_value(resp.result.clone())?;
    let Some(entry) = entries.into_iter().next() else {
        return Ok(None);
    };
    if entry.source_code.trim().is_empty() {
        return Ok(None);
    }
    let name = entry.contract_name.trim();
    Ok(Some(SourceInfo {
        source_code: entry.source_code,
        contract_name: (!name.is_empty()).then(|| name.to_string()),
    }))
}

/// reqwest-backed explorer client
#[derive(Clone)]
pub struct ExplorerClient {
    api_url: String,
    api_key: String,
    chain_id: u64,
    client: reqwest::Client,
    max_retries: u32,
    retry_base_delay: Duration,
    call_delay: Duration,
}

impl ExplorerClient {
    /// Create a client from scanner config
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        let client = Self::build_client(config.request_timeout)?;
        let explorer = Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            chain_id: config.chain.chain_id,
            client,
            max_retries: config.max_retries.max(1),
            retry_base_delay: config.retry_base_delay,
            call_delay: config.call_delay,
        };
        info!("✅ Explorer client ready ({})", explorer.masked_url());
        Ok(explorer)
    }

    /// Build HTTP client with custom headers and gzip
    fn build_client(timeout: Duration) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }

    /// Endpoint with the key hidden
    pub fn masked_url(&self) -> String {
        format!("{}?chainid={}&apikey=***HIDDEN***", self.api_url, self.chain_id)
    }

    /// Backoff before retrying after failed attempt `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * attempt
    }

    /// Issue a request with retries; degrades to [`ExplorerResponse::failed`]
    pub async fn request(&self, params: &[(&str, String)]) -> ExplorerResponse {
        let action = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map(|(_, v)| v.as_str())
            .unwrap_or("?");

        for attempt in 1..=self.max_retries {
            match self.execute(params).await {
                Ok(response) => {
                    debug!("📡 {} ok (attempt {}/{})", action, attempt, self.max_retries);
                    tokio::time::sleep(self.call_delay).await;
                    return response;
                }
                Err(e) => {
                    warn!("⚠️ {} failed (attempt {}/{}): {}", action, attempt, self.max_retries, e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay(attempt)).await;
                    }
                }
            }
        }

        error!("❌ {} gave up after {} attempts", action, self.max_retries);
        ExplorerResponse::failed()
    }

    /// Execute a single request
    async fn execute(&self, params: &[(&str, String)]) -> AppResult<ExplorerResponse> {
        let chain_id = self.chain_id.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str()), ("chainid", chain_id.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited());
        }
        if !status.is_success() {
            return Err(AppError::new(
                ErrorCode::ExplorerHttpError,
                format!("HTTP error: {}", status),
            ));
        }

        let body: ExplorerResponse = response.json().await?;
        body.check()?;
        Ok(body)
    }
}

#[async_trait]
impl ExplorerApi for ExplorerClient {
    async fn get_latest_block_number(&self) -> Result<u64> {
        let resp = self
            .request(&[
                ("module", "proxy".to_string()),
                ("action", "eth_blockNumber".to_string()),
            ])
            .await;
        Ok(parse_block_number(&resp)?)
    }

    async fn get_balance(&self, address: &str) -> Result<f64> {
        let resp = self
            .request(&[
                ("module", "account".to_string()),
                ("action", "balance".to_string()),
                ("address", address.to_string()),
                ("tag", "latest".to_string()),
            ])
            .await;
        Ok(parse_balance(&resp)?)
    }

    async fn get_block_transactions(&self, block_number: u64) -> Result<Vec<Transaction>> {
        let resp = self
            .request(&[
                ("module", "proxy".to_string()),
                ("action", "eth_getBlockByNumber".to_string()),
                ("tag", format!("0x{:x}", block_number)),
                ("boolean", "true".to_string()),
            ])
            .await;
        parse_block_transactions(&resp).map_err(|e| eyre!("block {}: {}", block_number, e))
    }

    async fn get_source_code(&self, address: &str) -> Result<Option<SourceInfo>> {
        let resp = self
            .request(&[
                ("module", "contract".to_string()),
                ("action", "getsourcecode".to_string()),
                ("address", address.to_string()),
            ])
            .await;
        Ok(parse_source_code(&resp)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn response(value: serde_json::Value) -> ExplorerResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_block_number_parsing() {
        let resp = response(json!({"jsonrpc": "2.0", "id": 83, "result": "0x10d4f"}));
        assert!(resp.check().is_ok());
        assert_eq!(parse_block_number(&resp).unwrap(), 68943);

        let malformed = response(json!({"jsonrpc": "2.0", "id": 83, "result": "latest"}));
        let err = parse_block_number(&malformed).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExplorerInvalidResponse);

        assert!(parse_block_number(&ExplorerResponse::failed()).is_err());
    }

    #[test]
    fn test_balance_parsing() {
        let resp = response(json!({"status": "1", "message": "OK", "result": "50000000000000000"}));
        assert!((parse_balance(&resp).unwrap() - 0.05).abs() < 1e-12);

        // Non-success degrades to zero instead of failing
        assert_eq!(parse_balance(&ExplorerResponse::failed()).unwrap(), 0.0);

        let garbage = response(json!({"status": "1", "message": "OK", "result": "abc"}));
        assert!(parse_balance(&garbage).is_err());
    }

    #[test]
    fn test_not_ok_is_rejected() {
        let resp = response(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max calls per sec rate limit reached (5/sec)"
        }));
        let err = resp.check().unwrap_err();
        assert_eq!(err.code, ErrorCode::ExplorerNotOk);
        assert!(err.message.contains("rate limit"));

        let rpc_err = response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid argument"}
        }));
        assert!(rpc_err.check().is_err());
    }

    #[test]
    fn test_block_transactions_parsing() {
        let resp = response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "number": "0x10",
                "transactions": [
                    {"hash": "0xaa", "from": "0x01", "to": "0x02", "input": "0x3853682c00"},
                    {"hash": "0xbb", "from": "0x01", "to": null, "input": "0x6080"}
                ]
            }
        }));
        let txs = parse_block_transactions(&resp).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].to.as_deref(), Some("0x02"));
        assert!(txs[1].to.is_none());

        let missing = response(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
        assert!(parse_block_transactions(&missing).unwrap().is_empty());

        assert!(parse_block_transactions(&ExplorerResponse::failed()).is_err());
    }

    #[test]
    fn test_source_code_parsing() {
        let verified = response(json!({
            "status": "1",
            "message": "OK",
            "result": [{"SourceCode": "contract Quiz {}", "ContractName": "Quiz_Game"}]
        }));
        let info = parse_source_code(&verified).unwrap().unwrap();
        assert_eq!(info.source_code, "contract Quiz {}");
        assert_eq!(info.contract_name.as_deref(), Some("Quiz_Game"));

        let unverified = response(json!({
            "status": "1",
            "message": "OK",
            "result": [{"SourceCode": "", "ContractName": ""}]
        }));
        assert!(parse_source_code(&unverified).unwrap().is_none());

        let nameless = response(json!({
            "status": "1",
            "message": "OK",
            "result": [{"SourceCode": "x"}]
        }));
        assert!(parse_source_code(&nameless).unwrap().unwrap().contract_name.is_none());
    }

    #[test]
    fn test_linear_backoff() {
        let config = ScannerConfig::new("secret-key");
        let client = ExplorerClient::new(&config).unwrap();

        assert_eq!(client.retry_delay(1), Duration::from_millis(1000));
        assert_eq!(client.retry_delay(2), Duration::from_millis(2000));
        assert!(!client.masked_url().contains("secret-key"));
        assert!(client.masked_url().contains("***HIDDEN***"));
    }

    const NOTOK: &str = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
    const BALANCE_OK: &str = r#"{"status":"1","message":"OK","result":"50000000000000000"}"#;
    const HEAD_OK: &str = r#"{"jsonrpc":"2.0","id":83,"result":"0x10d4f"}"#;

    /// One-shot HTTP server answering each connection with the next canned
    /// reply (the last one repeats); returns the endpoint and a hit counter
    async fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v2/api", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, AtomicOrdering::SeqCst);
                let (code, body) = replies[n.min(replies.len() - 1)];

                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(read) => request.extend_from_slice(&chunk[..read]),
                    }
                }

                let reply = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    code,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (url, hits)
    }

    fn client_for(url: &str) -> ExplorerClient {
        let mut config = ScannerConfig::new("test-key").without_delays();
        config.api_url = url.to_string();
        ExplorerClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_request_gives_up_after_three_attempts() {
        let (url, hits) = serve(vec![(200, NOTOK)]).await;
        let client = client_for(&url);

        let resp = client.request(&[("module", "proxy".to_string())]).await;

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 3);
        assert!(resp.is_not_ok());
        assert_eq!(resp.message.as_deref(), Some("retries exhausted"));
        assert!(resp.result.is_null());
    }

    #[tokio::test]
    async fn test_balance_degrades_to_zero_when_retries_exhausted() {
        let (url, hits) = serve(vec![(200, NOTOK)]).await;
        let client = client_for(&url);

        assert_eq!(client.get_balance("0x01").await.unwrap(), 0.0);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_request_recovers_within_budget() {
        let (url, hits) = serve(vec![(500, "oops"), (200, NOTOK), (200, BALANCE_OK)]).await;
        let client = client_for(&url);

        let balance = client.get_balance("0x01").await.unwrap();

        assert!((balance - 0.05).abs() < 1e-12);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_success_is_not_retried() {
        let (url, hits) = serve(vec![(200, HEAD_OK)]).await;
        let client = client_for(&url);

        assert_eq!(client.get_latest_block_number().await.unwrap(), 68943);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_backoff_after_final_attempt() {
        let (url, hits) = serve(vec![(429, NOTOK)]).await;
        let mut config = ScannerConfig::new("test-key").without_delays();
        config.api_url = url;
        config.max_retries = 1;
        config.retry_base_delay = Duration::from_secs(30);
        let client = ExplorerClient::new(&config).unwrap();

        let resp = tokio::time::timeout(Duration::from_secs(5), client.request(&[]))
            .await
            .expect("final failure must not sleep");

        assert!(resp.is_not_ok());
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }
}
