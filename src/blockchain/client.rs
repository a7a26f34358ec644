//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Fetch recent blockhashes, signature statuses and transaction records
//! - Relay signed transactions
//! - Fail over between endpoints on transport errors and timeouts

use async_trait::async_trait;
use serde_json::json;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient as SolanaRpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::{RpcError, RpcRequest};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, Commitment, ConfirmationStatus, FinalRecord, Hash, Pubkey,
    RpcConfig, Signature, SignatureStatus,
};
use crate::observability::metrics;

/// Network connection capability used by the donation flow.
///
/// One instance is long-lived and reused for the submission and every poll
/// of an attempt.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Fetch a fresh block reference to anchor a new transaction.
    async fn latest_blockhash(&self) -> BlockchainResult<Hash>;

    /// Query the provisional status of a signature.
    ///
    /// `None` means the node has not seen the signature yet.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> BlockchainResult<Option<SignatureStatus>>;

    /// Fetch the authoritative transaction record.
    async fn transaction(&self, signature: &Signature) -> BlockchainResult<Option<FinalRecord>>;

    /// Relay a signed transaction.
    async fn send_transaction(&self, transaction: &Transaction) -> BlockchainResult<Signature>;
}

fn commitment_config(commitment: Commitment) -> CommitmentConfig {
    let level = match commitment {
        Commitment::Processed => CommitmentLevel::Processed,
        Commitment::Confirmed => CommitmentLevel::Confirmed,
        Commitment::Finalized => CommitmentLevel::Finalized,
    };
    CommitmentConfig { commitment: level }
}

/// Connection refused, reset, HTTP status errors, transport timeouts.
fn is_transport(err: &ClientError) -> bool {
    matches!(err.kind(), ClientErrorKind::Reqwest(_) | ClientErrorKind::Io(_))
}

fn is_timeout(err: &ClientError) -> bool {
    matches!(err.kind(), ClientErrorKind::Reqwest(e) if e.is_timeout())
}

/// Map an answer the node gave on purpose.
fn node_error(method: &str, err: ClientError) -> BlockchainError {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) => {
            BlockchainError::Rpc(format!("{} (code {})", message, code))
        }
        ClientErrorKind::SerdeJson(_) | ClientErrorKind::RpcError(RpcError::ParseError(_)) => {
            BlockchainError::InvalidResponse(format!("{}: {}", method, err))
        }
        _ => BlockchainError::Rpc(format!("{}: {}", method, err)),
    }
}

struct Endpoint {
    url: Url,
    rpc: Arc<SolanaRpcClient>,
}

/// JSON-RPC client with failover support.
pub struct RpcClient {
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Endpoint>,
    config: RpcConfig,
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: RpcConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let commitment = commitment_config(config.commitment);

        let primary: Url = config.url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        let mut urls = vec![primary];

        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => urls.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let endpoints = urls
            .into_iter()
            .map(|url| Endpoint {
                rpc: Arc::new(SolanaRpcClient::new_with_timeout_and_commitment(
                    url.to_string(),
                    timeout_duration,
                    commitment,
                )),
                url,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            rpc_url = %config.url,
            failovers = endpoints.len() - 1,
            commitment = %config.commitment,
            "RPC client initialized"
        );

        Ok(Self {
            endpoints,
            config,
            timeout_duration,
        })
    }

    /// Run one RPC operation, trying each endpoint in order.
    ///
    /// Transport failures and timeouts move on to the next endpoint. An error
    /// object returned by a node is final: another node would reject the same
    /// request for the same reason.
    async fn call<T, F, Fut>(&self, method: &'static str, op: F) -> BlockchainResult<T>
    where
        F: Fn(Arc<SolanaRpcClient>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut timeouts = 0usize;

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            match timeout(self.timeout_duration, op(endpoint.rpc.clone())).await {
                Ok(Ok(value)) => {
                    metrics::record_rpc_request(method, true);
                    return Ok(value);
                }
                Ok(Err(e)) if is_transport(&e) => {
                    if is_timeout(&e) {
                        timeouts += 1;
                    }
                    tracing::warn!(endpoint_idx = i, endpoint = %endpoint.url, method, error = %e, "RPC error, trying next endpoint");
                }
                Ok(Err(e)) => {
                    metrics::record_rpc_request(method, false);
                    return Err(node_error(method, e));
                }
                Err(_) => {
                    timeouts += 1;
                    tracing::warn!(endpoint_idx = i, endpoint = %endpoint.url, method, "RPC timeout, trying next endpoint");
                }
            }
        }

        metrics::record_rpc_request(method, false);
        if timeouts == self.endpoints.len() {
            return Err(BlockchainError::Timeout(self.config.timeout_secs));
        }
        Err(BlockchainError::Rpc(format!(
            "All RPC endpoints failed for {}",
            method
        )))
    }

    /// Get the balance of an account in lamports.
    pub async fn get_balance(&self, address: &Pubkey) -> BlockchainResult<u64> {
        let address = *address;
        let commitment = commitment_config(self.config.commitment);
        let response = self
            .call("getBalance", move |rpc| async move {
                rpc.get_balance_with_commitment(&address, commitment).await
            })
            .await?;
        Ok(response.value)
    }

    /// Check if the node is reachable and reports itself healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self
            .call("getHealth", |rpc| async move { rpc.get_health().await })
            .await
            .is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// `getTransaction` refuses `processed`.
    fn record_commitment(&self) -> Commitment {
        match self.config.commitment {
            Commitment::Processed => Commitment::Confirmed,
            other => other,
        }
    }
}

#[async_trait]
impl Connection for RpcClient {
    async fn latest_blockhash(&self) -> BlockchainResult<Hash> {
        let commitment = commitment_config(self.config.commitment);
        let (blockhash, _last_valid_height) = self
            .call("getLatestBlockhash", move |rpc| async move {
                rpc.get_latest_blockhash_with_commitment(commitment).await
            })
            .await?;
        Ok(blockhash)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> BlockchainResult<Option<SignatureStatus>> {
        let signature = *signature;
        let response = self
            .call("getSignatureStatuses", move |rpc| async move {
                rpc.get_signature_statuses(&[signature]).await
            })
            .await?;

        let status = response.value.into_iter().next().flatten().map(|status| SignatureStatus {
            slot: status.slot,
            confirmation: ConfirmationStatus::from_rpc(
                status.confirmation_status.as_ref(),
                status.err.map(|e| format!("{:?}", e)),
            ),
        });
        Ok(status)
    }

    async fn transaction(&self, signature: &Signature) -> BlockchainResult<Option<FinalRecord>> {
        let params = json!([
            signature.to_string(),
            {
                "encoding": "json",
                "commitment": self.record_commitment(),
                "maxSupportedTransactionVersion": 0
            }
        ]);
        let result = self
            .call("getTransaction", |rpc| {
                let params = params.clone();
                async move {
                    rpc.send::<Option<EncodedConfirmedTransactionWithStatusMeta>>(
                        RpcRequest::GetTransaction,
                        params,
                    )
                    .await
                }
            })
            .await?;

        Ok(result.map(|tx| {
            let meta = tx.transaction.meta;
            FinalRecord {
                signature: *signature,
                slot: tx.slot,
                block_time: tx.block_time,
                fee: meta.as_ref().map(|m| m.fee),
                execution_error: meta.and_then(|m| m.err).map(|e| format!("{:?}", e)),
            }
        }))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> BlockchainResult<Signature> {
        let send_config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(commitment_config(self.config.commitment).commitment),
            encoding: Some(UiTransactionEncoding::Base64),
            ..RpcSendTransactionConfig::default()
        };
        self.call("sendTransaction", |rpc| {
            let send_config = send_config.clone();
            async move { rpc.send_transaction_with_config(transaction, send_config).await }
        })
        .await
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.config.url)
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
