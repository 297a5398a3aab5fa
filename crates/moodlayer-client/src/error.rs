use thiserror::Error;

use crate::receipt::TxStatus;

#[derive(Error, Debug)]
pub enum ClientError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transaction {hash} did not reach {status} after {retries} polls")]
    ReceiptTimeout {
        hash: String,
        status: TxStatus,
        retries: u32,
    },

    #[error("transaction {hash} ended as {status}")]
    TransactionFailed { hash: String, status: TxStatus },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}
