//! The blockchain client seam.
//!
//! The network SDK (account handling, signing, consensus) lives behind
//! [`ContractClient`]; the rest of the crate only sees these operations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use moodlayer_core::RawResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ClientError;
use crate::receipt::{Receipt, ReceiptWait};

/// Transaction hash returned by a contract write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Operations consumed from the network SDK.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Address of the account the client was created with, if known up front.
    fn account_address(&self) -> Option<String> {
        None
    }

    /// Ask the node for the caller address.
    async fn lookup_address(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }

    /// Submit a state-changing call and return its transaction hash.
    async fn write_contract(
        &self,
        address: &str,
        function: &str,
        args: &[Value],
    ) -> Result<TxHash, ClientError>;

    /// Poll until the transaction reaches `wait.status` or the retries run out.
    async fn wait_for_transaction_receipt(
        &self,
        hash: &TxHash,
        wait: &ReceiptWait,
    ) -> Result<Receipt, ClientError>;

    /// ABI-decoded read. `None` omits the argument list from the request
    /// entirely; `Some(&[])` sends an explicit empty one.
    async fn read_contract(
        &self,
        address: &str,
        function: &str,
        args: Option<&[Value]>,
    ) -> Result<RawResult, ClientError>;

    /// Low-level read that skips ABI decoding.
    async fn call_contract(
        &self,
        address: &str,
        function: &str,
        from: Option<&str>,
    ) -> Result<RawResult, ClientError>;
}

/// Creates the network client.
///
/// `Ok(None)` means no credential is configured, which callers treat as
/// "offline" rather than an error.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Option<Arc<dyn ContractClient>>, ClientError>;
}
