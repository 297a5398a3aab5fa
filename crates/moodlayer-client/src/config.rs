//! Client configuration.
//!
//! Resolved once at startup (the CLI fills it from flags and environment) and
//! then passed into the connector and the service. Nothing in this crate reads
//! environment variables on its own.

use std::fmt;
use std::time::Duration;

use crate::ClientError;
use crate::receipt::ReceiptWait;

/// Public studionet JSON-RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://studio.genlayer.com/api";
/// Deployed mood-advisor contract.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x8C1308405Cec94423E91d115584e7267dcB75a47";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub contract_address: String,
    /// Access key for the signing gateway. `None` runs the flow offline.
    pub credential: Option<String>,
    /// Sender address used for raw calls, when known.
    pub account: Option<String>,
    pub request_timeout: Duration,
    pub receipt: ReceiptWait,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            credential: None,
            account: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            receipt: ReceiptWait::default(),
        }
    }
}

// Credential is redacted.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("contract_address", &self.contract_address)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("account", &self.account)
            .field("request_timeout", &self.request_timeout)
            .field("receipt", &self.receipt)
            .finish()
    }
}

impl ClientConfig {
    /// Check the configuration and normalise it: trims the endpoint's
    /// trailing slash and treats a blank credential as absent.
    pub fn validated(mut self) -> Result<Self, ClientError> {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        if self.endpoint.is_empty() {
            return Err(ClientError::Config("endpoint cannot be empty".into()));
        }
        self.contract_address = self.contract_address.trim().to_string();
        if self.contract_address.is_empty() {
            return Err(ClientError::Config(
                "contract address cannot be empty".into(),
            ));
        }
        if self.receipt.retries == 0 {
            return Err(ClientError::Config(
                "receipt retries must be at least 1".into(),
            ));
        }
        self.credential = self.credential.filter(|c| !c.trim().is_empty());
        self.account = self.account.filter(|a| !a.trim().is_empty());
        Ok(self)
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}
