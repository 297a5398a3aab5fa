//! Mood submission flow.
//!
//! `Idle → Submitting → {Success, Fallback}`: write the answers to the
//! contract, wait for acceptance, then read and normalize the latest advice.
//! Any failure on that path, including a missing credential, ends in
//! `Fallback` with sample advice and a warning for the user.

use std::sync::Arc;
use std::time::Instant;

use moodlayer_core::{AdviceResponse, MoodData};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{OnceCell, watch};
use tracing::{debug, error, info};

use crate::ClientError;
use crate::contract::{Connector, ContractClient};
use crate::fallback::fetch_latest_advice;
use crate::receipt::ReceiptWait;

/// Contract function that records an assessment and generates advice.
pub const WRITE_FUNCTION: &str = "analyze_mood";

const MISSING_CREDENTIAL_WARNING: &str =
    "Please configure your GenLayer key to receive AI advice. Showing sample results.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success,
    Fallback,
}

/// Outcome of one submission, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub state: SubmissionState,
    pub advice: AdviceResponse,
    /// User-facing notice, set only for `Fallback`.
    pub warning: Option<String>,
}

impl Submission {
    fn success(advice: AdviceResponse) -> Self {
        Self {
            state: SubmissionState::Success,
            advice,
            warning: None,
        }
    }

    fn fallback(warning: impl Into<String>) -> Self {
        Self {
            state: SubmissionState::Fallback,
            advice: AdviceResponse::fallback(),
            warning: Some(warning.into()),
        }
    }
}

/// Owns the lazily created network client and runs submissions against it.
///
/// The client is connected on first use and reused afterwards. A missing
/// credential is not remembered, so a later call connects again.
pub struct AdviceService {
    connector: Box<dyn Connector>,
    client: OnceCell<Arc<dyn ContractClient>>,
    contract_address: String,
    receipt: ReceiptWait,
    state: watch::Sender<SubmissionState>,
}

impl AdviceService {
    pub fn new(
        connector: Box<dyn Connector>,
        contract_address: impl Into<String>,
        receipt: ReceiptWait,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            connector,
            client: OnceCell::new(),
            contract_address: contract_address.into(),
            receipt,
            state,
        }
    }

    /// Build a service backed by the JSON-RPC connector.
    #[cfg(feature = "http")]
    pub fn from_config(config: crate::ClientConfig) -> Result<Self, ClientError> {
        let config = config.validated()?;
        let contract_address = config.contract_address.clone();
        let receipt = config.receipt;
        Ok(Self::new(
            Box::new(crate::http::RpcConnector::new(config)),
            contract_address,
            receipt,
        ))
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    /// Watch state transitions, e.g. to show progress while submitting.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    async fn client(&self) -> Result<Option<Arc<dyn ContractClient>>, ClientError> {
        if let Some(client) = self.client.get() {
            debug!("reusing existing contract client");
            return Ok(Some(client.clone()));
        }
        match self.connector.connect().await? {
            Some(client) => {
                info!("contract client connected");
                let _ = self.client.set(client.clone());
                Ok(Some(client))
            }
            None => {
                error!("no credential configured, contract client unavailable");
                Ok(None)
            }
        }
    }

    /// Submit an assessment and return the advice to show.
    ///
    /// Never fails: errors become a `Fallback` submission.
    pub async fn submit(&self, mood: &MoodData) -> Submission {
        self.state.send_replace(SubmissionState::Submitting);

        let submission = match self.analyze(mood).await {
            Ok(Some(advice)) => Submission::success(advice),
            Ok(None) => Submission::fallback(MISSING_CREDENTIAL_WARNING),
            Err(e) => {
                error!(error = %e, "mood analysis failed");
                Submission::fallback(format!(
                    "Could not get advice from the contract ({e}). Showing sample results."
                ))
            }
        };

        self.state.send_replace(submission.state);
        submission
    }

    async fn analyze(&self, mood: &MoodData) -> Result<Option<AdviceResponse>, ClientError> {
        let Some(client) = self.client().await? else {
            return Ok(None);
        };

        let args = [Value::String(mood.to_contract_arg())];
        info!(
            address = %self.contract_address,
            function = WRITE_FUNCTION,
            "sending mood assessment"
        );
        let hash = client
            .write_contract(&self.contract_address, WRITE_FUNCTION, &args)
            .await?;
        info!(hash = %hash, "transaction sent");

        let start = Instant::now();
        info!(
            hash = %hash,
            status = %self.receipt.status,
            retries = self.receipt.retries,
            interval_ms = self.receipt.interval.as_millis() as u64,
            max_wait_secs = self.receipt.max_wait().as_secs(),
            "waiting for transaction receipt"
        );
        let receipt = client
            .wait_for_transaction_receipt(&hash, &self.receipt)
            .await?;
        info!(
            hash = %hash,
            status = %receipt.status,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "transaction accepted, fetching advice"
        );

        fetch_latest_advice(client.as_ref(), &self.contract_address)
            .await
            .map(Some)
    }

    /// Read the latest advice without submitting. `Ok(None)` when no
    /// credential is configured.
    pub async fn latest_advice(&self) -> Result<Option<AdviceResponse>, ClientError> {
        let Some(client) = self.client().await? else {
            return Ok(None);
        };
        fetch_latest_advice(client.as_ref(), &self.contract_address)
            .await
            .map(Some)
    }
}
