//! Transaction status and the bounded acceptance wait.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ClientError;
use crate::contract::TxHash;

pub const DEFAULT_RECEIPT_RETRIES: u32 = 150;
pub const DEFAULT_RECEIPT_INTERVAL: Duration = Duration::from_millis(5000);

/// Lifecycle status reported by the network for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Proposing,
    Committing,
    Revealing,
    Accepted,
    Undetermined,
    Finalized,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl TxStatus {
    /// Whether a transaction in this status satisfies a wait for `target`.
    ///
    /// A finalized transaction has necessarily been accepted.
    pub fn reaches(self, target: TxStatus) -> bool {
        self == target || (target == TxStatus::Accepted && self == TxStatus::Finalized)
    }

    /// Terminal statuses that can never reach another one.
    pub fn is_failed(self) -> bool {
        matches!(self, TxStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Proposing => "PROPOSING",
            Self::Committing => "COMMITTING",
            Self::Revealing => "REVEALING",
            Self::Accepted => "ACCEPTED",
            Self::Undetermined => "UNDETERMINED",
            Self::Finalized => "FINALIZED",
            Self::Canceled => "CANCELED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polling policy for [`ContractClient::wait_for_transaction_receipt`](crate::ContractClient::wait_for_transaction_receipt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptWait {
    pub status: TxStatus,
    pub retries: u32,
    pub interval: Duration,
}

impl Default for ReceiptWait {
    fn default() -> Self {
        Self {
            status: TxStatus::Accepted,
            retries: DEFAULT_RECEIPT_RETRIES,
            interval: DEFAULT_RECEIPT_INTERVAL,
        }
    }
}

impl ReceiptWait {
    /// Upper bound on the time spent waiting. Saturates instead of
    /// overflowing on absurd intervals.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.retries)
    }
}

/// A transaction as last observed while waiting.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub hash: TxHash,
    pub status: TxStatus,
    /// Full transaction object as returned by the node.
    pub raw: serde_json::Value,
}

/// Poll `fetch` up to `wait.retries` times, sleeping `wait.interval` between
/// polls, until it yields a receipt whose status reaches `wait.status`.
///
/// A failed poll is logged and counts as one attempt. A canceled transaction
/// ends the wait immediately.
pub async fn poll_until<F, Fut>(
    hash: &TxHash,
    wait: &ReceiptWait,
    mut fetch: F,
) -> Result<Receipt, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<Receipt>, ClientError>>,
{
    for attempt in 1..=wait.retries {
        match fetch().await {
            Ok(Some(receipt)) if receipt.status.reaches(wait.status) => return Ok(receipt),
            Ok(Some(receipt)) if receipt.status.is_failed() => {
                return Err(ClientError::TransactionFailed {
                    hash: hash.to_string(),
                    status: receipt.status,
                });
            }
            Ok(Some(receipt)) => {
                debug!(hash = %hash, status = %receipt.status, attempt, "transaction not ready");
            }
            Ok(None) => debug!(hash = %hash, attempt, "transaction not found yet"),
            Err(e) => warn!(hash = %hash, attempt, error = %e, "receipt poll failed"),
        }
        if attempt < wait.retries {
            tokio::time::sleep(wait.interval).await;
        }
    }

    Err(ClientError::ReceiptTimeout {
        hash: hash.to_string(),
        status: wait.status,
        retries: wait.retries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn receipt(status: TxStatus) -> Receipt {
        Receipt {
            hash: TxHash::from("0xabc"),
            status,
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn finalized_satisfies_accepted() {
        assert!(TxStatus::Finalized.reaches(TxStatus::Accepted));
        assert!(TxStatus::Accepted.reaches(TxStatus::Accepted));
        assert!(!TxStatus::Accepted.reaches(TxStatus::Finalized));
        assert!(!TxStatus::Pending.reaches(TxStatus::Accepted));
    }

    #[test]
    fn status_parses_from_wire_names() {
        let s: TxStatus = serde_json::from_str(r#""ACCEPTED""#).unwrap();
        assert_eq!(s, TxStatus::Accepted);
        let s: TxStatus = serde_json::from_str(r#""LEADER_TIMEOUT""#).unwrap();
        assert_eq!(s, TxStatus::Unknown);
    }

    #[test]
    fn default_wait_matches_network_policy() {
        let wait = ReceiptWait::default();
        assert_eq!(wait.status, TxStatus::Accepted);
        assert_eq!(wait.max_wait(), Duration::from_secs(750));
    }

    #[test]
    fn max_wait_saturates() {
        let wait = ReceiptWait {
            status: TxStatus::Accepted,
            retries: u32::MAX,
            interval: Duration::from_millis(u64::MAX),
        };
        assert_eq!(wait.max_wait(), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_once_status_reached() {
        let polls = AtomicU32::new(0);
        let wait = ReceiptWait::default();
        let hash = TxHash::from("0xabc");
        let polls = &polls;
        let got = poll_until(&hash, &wait, move || async move {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(receipt(if n < 3 {
                TxStatus::Proposing
            } else {
                TxStatus::Accepted
            })))
        })
        .await
        .unwrap();
        assert_eq!(got.status, TxStatus::Accepted);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_transaction_stops_waiting() {
        let polls = AtomicU32::new(0);
        let wait = ReceiptWait::default();
        let hash = TxHash::from("0xabc");
        let polls = &polls;
        let err = poll_until(&hash, &wait, move || async move {
            polls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(receipt(TxStatus::Canceled)))
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::TransactionFailed {
                status: TxStatus::Canceled,
                ..
            }
        ));
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_retries() {
        let polls = AtomicU32::new(0);
        let wait = ReceiptWait {
            status: TxStatus::Accepted,
            retries: 5,
            interval: Duration::from_millis(10),
        };
        let hash = TxHash::from("0xabc");
        let polls = &polls;
        let err = poll_until(&hash, &wait, move || async move {
            polls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Other("node unavailable".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::ReceiptTimeout { retries: 5, .. }));
        assert_eq!(polls.load(Ordering::SeqCst), 5);
    }
}
