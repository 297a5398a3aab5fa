//! JSON-RPC client for a GenLayer node or signing gateway.
//!
//! Reads go through `gen_call`; writes through `gen_sendTransaction`, which the
//! gateway signs for the account bound to the configured access key. The
//! access key travels as a bearer token and is never logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use moodlayer_core::RawResult;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::ClientError;
use crate::config::ClientConfig;
use crate::contract::{Connector, ContractClient, TxHash};
use crate::receipt::{Receipt, ReceiptWait, TxStatus, poll_until};

const CONSENSUS_CONTRACT: &str = "ConsensusMain";

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Kind of `gen_call` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// ABI-decoded read.
    Read,
    /// Undecoded call returning hex calldata.
    Raw,
}

impl CallKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Raw => "raw",
        }
    }
}

/// HTTP JSON-RPC implementation of [`ContractClient`].
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    credential: String,
    account: Option<String>,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client for `config.endpoint` authenticating with `credential`.
    pub fn new(config: &ClientConfig, credential: String) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            credential,
            account: config.account.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Send one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, endpoint = %self.endpoint, "sending RPC request");
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.credential)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let rpc: RpcResponse = resp.json().await?;
        into_result(rpc)
    }

    /// Look up the consensus contract. Fails if the node does not know it.
    pub async fn initialize_consensus(&self) -> Result<(), ClientError> {
        info!("initializing consensus smart contract");
        let result = self
            .request("sim_getConsensusContract", json!([CONSENSUS_CONTRACT]))
            .await?;
        if result.is_null() {
            return Err(ClientError::InvalidResponse(
                "consensus contract not found".into(),
            ));
        }
        info!("consensus smart contract initialized");
        Ok(())
    }

    async fn transaction(&self, hash: &TxHash) -> Result<Option<Receipt>, ClientError> {
        let result = self
            .request("eth_getTransactionByHash", json!([hash.0]))
            .await?;
        parse_receipt(hash, result)
    }
}

#[async_trait]
impl ContractClient for RpcClient {
    fn account_address(&self) -> Option<String> {
        self.account.clone()
    }

    async fn lookup_address(&self) -> Result<Option<String>, ClientError> {
        let result = self.request("eth_accounts", json!([])).await?;
        Ok(result
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn write_contract(
        &self,
        address: &str,
        function: &str,
        args: &[Value],
    ) -> Result<TxHash, ClientError> {
        let mut tx = Map::new();
        tx.insert("to".into(), json!(address));
        tx.insert("function".into(), json!(function));
        tx.insert("args".into(), Value::Array(args.to_vec()));
        if let Some(from) = &self.account {
            tx.insert("from".into(), json!(from));
        }

        let result = self
            .request("gen_sendTransaction", json!([Value::Object(tx)]))
            .await?;
        match result.as_str() {
            Some(hash) => Ok(TxHash(hash.to_string())),
            None => Err(ClientError::InvalidResponse(format!(
                "expected transaction hash, got {result}"
            ))),
        }
    }

    async fn wait_for_transaction_receipt(
        &self,
        hash: &TxHash,
        wait: &ReceiptWait,
    ) -> Result<Receipt, ClientError> {
        let client = self;
        poll_until(hash, wait, move || client.transaction(hash)).await
    }

    async fn read_contract(
        &self,
        address: &str,
        function: &str,
        args: Option<&[Value]>,
    ) -> Result<RawResult, ClientError> {
        let params = call_params(CallKind::Read, address, function, args, None);
        let result = self.request("gen_call", json!([params])).await?;
        Ok(RawResult::from_json(result))
    }

    async fn call_contract(
        &self,
        address: &str,
        function: &str,
        from: Option<&str>,
    ) -> Result<RawResult, ClientError> {
        let params = call_params(CallKind::Raw, address, function, None, from);
        let result = self.request("gen_call", json!([params])).await?;
        Ok(decode_raw(result))
    }
}

/// Builds an [`RpcClient`] when a credential is configured.
pub struct RpcConnector {
    config: ClientConfig,
}

impl RpcConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for RpcConnector {
    async fn connect(&self) -> Result<Option<Arc<dyn ContractClient>>, ClientError> {
        let Some(credential) = self.config.credential.clone() else {
            return Ok(None);
        };
        let client = RpcClient::new(&self.config, credential)?;
        info!(endpoint = %client.endpoint, "created RPC client");
        if let Err(e) = client.initialize_consensus().await {
            warn!(error = %e, "failed to initialize consensus smart contract");
            return Err(e);
        }
        Ok(Some(Arc::new(client)))
    }
}

fn into_result(rpc: RpcResponse) -> Result<Value, ClientError> {
    if let Some(err) = rpc.error {
        return Err(ClientError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    Ok(rpc.result.unwrap_or(Value::Null))
}

/// `gen_call` parameter object. `args: None` leaves the field out entirely.
fn call_params(
    kind: CallKind,
    address: &str,
    function: &str,
    args: Option<&[Value]>,
    from: Option<&str>,
) -> Value {
    let mut params = Map::new();
    params.insert("type".into(), json!(kind.as_str()));
    params.insert("to".into(), json!(address));
    params.insert("function".into(), json!(function));
    if let Some(args) = args {
        params.insert("args".into(), Value::Array(args.to_vec()));
    }
    if let Some(from) = from {
        params.insert("from".into(), json!(from));
    }
    Value::Object(params)
}

/// Raw calls return `0x`-prefixed hex; decode it to bytes when it is valid
/// hex, otherwise pass the value through unchanged.
fn decode_raw(result: Value) -> RawResult {
    if let Some(bytes) = result
        .as_str()
        .and_then(|s| s.strip_prefix("0x"))
        .and_then(|h| hex::decode(h).ok())
    {
        return RawResult::bytes(bytes);
    }
    RawResult::from_json(result)
}

fn parse_receipt(hash: &TxHash, result: Value) -> Result<Option<Receipt>, ClientError> {
    if result.is_null() {
        return Ok(None);
    }
    let status = match result.get("status") {
        Some(s) => serde_json::from_value::<TxStatus>(s.clone())?,
        None => {
            return Err(ClientError::InvalidResponse(
                "transaction has no status".into(),
            ));
        }
    };
    Ok(Some(Receipt {
        hash: hash.clone(),
        status,
        raw: result,
    }))
}
