//! Read-path fallback chain for `get_latest_advice`.
//!
//! SDK releases disagree on which read call shape works against the
//! contract, so the read is attempted with each [`ReadStrategy`] in
//! [`ReadStrategy::ORDER`]; the first success wins. Failures are logged and
//! the chain moves on; only the last applicable strategy's error reaches the
//! caller. This is a call-shape compatibility shim and never retries the same
//! strategy.

use moodlayer_core::{AdviceResponse, RawResult, normalize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ClientError;
use crate::contract::ContractClient;

/// Contract function that returns the most recent advice.
pub const READ_FUNCTION: &str = "get_latest_advice";

const EMPTY_ARGS: &[Value] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// ABI read with no argument list.
    ReadNoArgs,
    /// ABI read with an explicit empty argument list.
    ReadEmptyArgs,
    /// Raw call without ABI decoding.
    RawCall,
    /// Raw call with an explicit sender address.
    RawCallFrom,
}

impl ReadStrategy {
    pub const ORDER: [ReadStrategy; 4] = [
        Self::ReadNoArgs,
        Self::ReadEmptyArgs,
        Self::RawCall,
        Self::RawCallFrom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadNoArgs => "read (no args)",
            Self::ReadEmptyArgs => "read (empty args)",
            Self::RawCall => "raw call",
            Self::RawCallFrom => "raw call (with sender)",
        }
    }

    /// Run this strategy once.
    ///
    /// Returns `None` when the strategy does not apply: a sender-address call
    /// with no resolvable address.
    pub async fn attempt(
        self,
        client: &dyn ContractClient,
        address: &str,
        function: &str,
    ) -> Option<Result<RawResult, ClientError>> {
        match self {
            Self::ReadNoArgs => Some(client.read_contract(address, function, None).await),
            Self::ReadEmptyArgs => Some(
                client
                    .read_contract(address, function, Some(EMPTY_ARGS))
                    .await,
            ),
            Self::RawCall => Some(client.call_contract(address, function, None).await),
            Self::RawCallFrom => {
                let from = resolve_caller(client).await?;
                debug!(from = %from, "resolved caller address");
                Some(client.call_contract(address, function, Some(&from)).await)
            }
        }
    }
}

/// Caller address: the client's account if it has one, else a node lookup.
///
/// A failed lookup counts as unresolved.
pub async fn resolve_caller(client: &dyn ContractClient) -> Option<String> {
    if let Some(addr) = client.account_address().filter(|a| !a.is_empty()) {
        return Some(addr);
    }
    match client.lookup_address().await {
        Ok(addr) => addr.filter(|a| !a.is_empty()),
        Err(e) => {
            warn!(error = %e, "caller address lookup failed");
            None
        }
    }
}

/// Try every strategy in order and return the first successful raw result
/// together with the strategy that produced it.
pub async fn read_with_fallback(
    client: &dyn ContractClient,
    address: &str,
    function: &str,
) -> Result<(ReadStrategy, RawResult), ClientError> {
    let mut last_err = None;

    for strategy in ReadStrategy::ORDER {
        debug!(strategy = strategy.as_str(), function, "attempting contract read");
        match strategy.attempt(client, address, function).await {
            Some(Ok(raw)) => {
                info!(strategy = strategy.as_str(), function, "contract read succeeded");
                return Ok((strategy, raw));
            }
            Some(Err(e)) => {
                warn!(strategy = strategy.as_str(), error = %e, "contract read failed");
                last_err = Some(e);
            }
            None => debug!(strategy = strategy.as_str(), "strategy not applicable, skipped"),
        }
    }

    Err(last_err.unwrap_or_else(|| ClientError::Other("no read strategy applied".into())))
}

/// Read the latest advice from the contract and normalize it.
pub async fn fetch_latest_advice(
    client: &dyn ContractClient,
    address: &str,
) -> Result<AdviceResponse, ClientError> {
    let (strategy, raw) = read_with_fallback(client, address, READ_FUNCTION).await?;
    let advice = normalize(&raw);
    debug!(strategy = strategy.as_str(), advice = %advice.advice, "normalized contract result");
    Ok(advice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use moodlayer_core::advice::DEFAULT_ACTION;

    const ADDR: &str = "0xcontract";

    fn advice_json(advice: &str) -> RawResult {
        RawResult::Text(format!(
            r#"{{"advice":"{advice}","suggested_action":"Stretch."}}"#
        ))
    }

    #[tokio::test]
    async fn first_strategy_wins() {
        let client = ScriptedClient {
            read_no_args: Ok(advice_json("one")),
            read_empty_args: Ok(advice_json("two")),
            ..Default::default()
        };
        let (strategy, raw) = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap();
        assert_eq!(strategy, ReadStrategy::ReadNoArgs);
        assert_eq!(raw, advice_json("one"));
        assert_eq!(client.calls(), vec!["read get_latest_advice"]);
    }

    #[tokio::test]
    async fn second_strategy_used_when_first_fails() {
        let client = ScriptedClient {
            read_empty_args: Ok(advice_json("two")),
            ..Default::default()
        };
        let (strategy, raw) = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap();
        assert_eq!(strategy, ReadStrategy::ReadEmptyArgs);
        assert_eq!(raw, advice_json("two"));
    }

    #[tokio::test]
    async fn raw_call_after_both_reads_fail() {
        let client = ScriptedClient {
            call_raw: Ok(RawResult::bytes(b"plain advice".to_vec())),
            ..Default::default()
        };
        let advice = fetch_latest_advice(&client, ADDR).await.unwrap();
        assert_eq!(advice.advice, "plain advice");
        assert_eq!(advice.suggested_action, DEFAULT_ACTION);
        assert_eq!(
            client.calls(),
            vec![
                "read get_latest_advice",
                "read get_latest_advice []",
                "call get_latest_advice",
            ]
        );
    }

    #[tokio::test]
    async fn no_caller_address_surfaces_raw_call_error() {
        let client = ScriptedClient::default();
        let err = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "raw call unsupported");
        assert!(!client.calls().iter().any(|c| c.contains(" from ")));
    }

    #[tokio::test]
    async fn failed_lookup_counts_as_unresolved() {
        let client = ScriptedClient {
            lookup: Err("lookup unsupported"),
            ..Default::default()
        };
        let err = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "raw call unsupported");
    }

    #[tokio::test]
    async fn account_address_used_for_last_strategy() {
        let client = ScriptedClient {
            account: Some("0xme".into()),
            call_from: Ok(advice_json("four")),
            ..Default::default()
        };
        let (strategy, _) = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap();
        assert_eq!(strategy, ReadStrategy::RawCallFrom);
        let calls = client.calls();
        assert_eq!(calls.last().unwrap(), "call get_latest_advice from 0xme");
        assert!(!calls.contains(&"lookup_address".to_string()));
    }

    #[tokio::test]
    async fn looked_up_address_used_when_account_unknown() {
        let client = ScriptedClient {
            lookup: Ok(Some("0xnode".into())),
            call_from: Ok(advice_json("four")),
            ..Default::default()
        };
        let advice = fetch_latest_advice(&client, ADDR).await.unwrap();
        assert_eq!(advice.advice, "four");
        assert_eq!(
            client.calls().last().unwrap(),
            "call get_latest_advice from 0xnode"
        );
    }

    #[tokio::test]
    async fn last_strategy_error_propagates() {
        let client = ScriptedClient {
            account: Some("0xme".into()),
            ..Default::default()
        };
        let err = read_with_fallback(&client, ADDR, READ_FUNCTION)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "raw call with sender unsupported");
    }

    #[tokio::test]
    async fn each_strategy_runs_in_isolation() {
        let client = ScriptedClient {
            read_empty_args: Ok(RawResult::Null),
            ..Default::default()
        };
        let got = ReadStrategy::ReadEmptyArgs
            .attempt(&client, ADDR, READ_FUNCTION)
            .await;
        assert!(matches!(got, Some(Ok(RawResult::Null))));
        assert!(
            ReadStrategy::RawCallFrom
                .attempt(&client, ADDR, READ_FUNCTION)
                .await
                .is_none()
        );
    }
}
