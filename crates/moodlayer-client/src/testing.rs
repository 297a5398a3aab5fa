//! Scripted in-memory client for exercising the chain and the service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moodlayer_core::RawResult;
use serde_json::Value;

use crate::ClientError;
use crate::contract::{Connector, ContractClient, TxHash};
use crate::receipt::{Receipt, ReceiptWait, TxStatus};

pub type Outcome = Result<RawResult, &'static str>;

fn fail(msg: &'static str) -> ClientError {
    ClientError::Other(msg.to_string())
}

/// Each operation returns its scripted outcome and records the call.
pub struct ScriptedClient {
    pub read_no_args: Outcome,
    pub read_empty_args: Outcome,
    pub call_raw: Outcome,
    pub call_from: Outcome,
    pub account: Option<String>,
    pub lookup: Result<Option<String>, &'static str>,
    pub write: Result<TxHash, &'static str>,
    pub receipt_status: TxStatus,
    pub calls: Mutex<Vec<String>>,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self {
            read_no_args: Err("read (no args) unsupported"),
            read_empty_args: Err("read (empty args) unsupported"),
            call_raw: Err("raw call unsupported"),
            call_from: Err("raw call with sender unsupported"),
            account: None,
            lookup: Ok(None),
            write: Ok(TxHash::from("0xfeed")),
            receipt_status: TxStatus::Accepted,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedClient {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContractClient for ScriptedClient {
    fn account_address(&self) -> Option<String> {
        self.account.clone()
    }

    async fn lookup_address(&self) -> Result<Option<String>, ClientError> {
        self.record("lookup_address".into());
        self.lookup.clone().map_err(fail)
    }

    async fn write_contract(
        &self,
        _address: &str,
        function: &str,
        args: &[Value],
    ) -> Result<TxHash, ClientError> {
        self.record(format!("write {function} {}", Value::Array(args.to_vec())));
        self.write.clone().map_err(fail)
    }

    async fn wait_for_transaction_receipt(
        &self,
        hash: &TxHash,
        wait: &ReceiptWait,
    ) -> Result<Receipt, ClientError> {
        self.record(format!("wait {hash}"));
        if self.receipt_status.reaches(wait.status) {
            Ok(Receipt {
                hash: hash.clone(),
                status: self.receipt_status,
                raw: Value::Null,
            })
        } else {
            Err(ClientError::ReceiptTimeout {
                hash: hash.to_string(),
                status: wait.status,
                retries: wait.retries,
            })
        }
    }

    async fn read_contract(
        &self,
        _address: &str,
        function: &str,
        args: Option<&[Value]>,
    ) -> Result<RawResult, ClientError> {
        match args {
            None => {
                self.record(format!("read {function}"));
                self.read_no_args.clone().map_err(fail)
            }
            Some(_) => {
                self.record(format!("read {function} []"));
                self.read_empty_args.clone().map_err(fail)
            }
        }
    }

    async fn call_contract(
        &self,
        _address: &str,
        function: &str,
        from: Option<&str>,
    ) -> Result<RawResult, ClientError> {
        match from {
            None => {
                self.record(format!("call {function}"));
                self.call_raw.clone().map_err(fail)
            }
            Some(addr) => {
                self.record(format!("call {function} from {addr}"));
                self.call_from.clone().map_err(fail)
            }
        }
    }
}

/// Hands out one shared client, or none to simulate a missing credential.
pub struct ScriptedConnector {
    pub client: Option<Arc<ScriptedClient>>,
    pub connects: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(client: Option<Arc<ScriptedClient>>) -> Self {
        Self {
            client,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Option<Arc<dyn ContractClient>>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .client
            .clone()
            .map(|c| c as Arc<dyn ContractClient>))
    }
}
