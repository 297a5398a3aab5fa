//! Contract access for Moodlayer: the client seam, the read fallback chain,
//! receipt polling, and the submission flow.

mod error;
pub use error::ClientError;

pub mod config;
pub mod contract;
pub mod fallback;
pub mod receipt;
pub mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use contract::{Connector, ContractClient, TxHash};
pub use fallback::{ReadStrategy, fetch_latest_advice, read_with_fallback};
pub use receipt::{Receipt, ReceiptWait, TxStatus};
pub use service::{AdviceService, Submission, SubmissionState};

#[cfg(feature = "http")]
pub use http::{RpcClient, RpcConnector};
