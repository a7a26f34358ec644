//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sol_donate::blockchain::client::Connection;
use sol_donate::blockchain::transaction::TransferInstruction;
use sol_donate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, FinalRecord, Hash, Pubkey, Signature,
    SignatureStatus,
};
use solana_sdk::transaction::Transaction;
use sol_donate::blockchain::wallet::{WalletCapability, WalletError};
use sol_donate::donation::report::{Notice, OutcomeReporter};

pub const SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

pub fn signature() -> Signature {
    SIGNATURE.parse().unwrap()
}

pub fn sender() -> Pubkey {
    Pubkey::new_from_array([1; 32])
}

pub fn recipient() -> Pubkey {
    Pubkey::new_from_array([2; 32])
}

pub fn status(confirmation: ConfirmationStatus) -> BlockchainResult<Option<SignatureStatus>> {
    Ok(Some(SignatureStatus {
        slot: 100,
        confirmation,
    }))
}

pub fn record(execution_error: Option<&str>) -> FinalRecord {
    FinalRecord {
        signature: signature(),
        slot: 101,
        block_time: Some(1_700_000_000),
        fee: Some(5_000),
        execution_error: execution_error.map(str::to_string),
    }
}

/// Connection answering status queries from a script.
///
/// Once the script runs out the last answer repeats.
pub struct ScriptedConnection {
    statuses: Mutex<VecDeque<BlockchainResult<Option<SignatureStatus>>>>,
    last_status: Mutex<Option<SignatureStatus>>,
    final_record: Mutex<Option<BlockchainResult<Option<FinalRecord>>>>,
    pub blockhash_fails: bool,
    pub status_queries: AtomicUsize,
    pub record_queries: AtomicUsize,
    pub blockhash_queries: AtomicUsize,
}

impl ScriptedConnection {
    pub fn new(
        statuses: Vec<BlockchainResult<Option<SignatureStatus>>>,
        final_record: BlockchainResult<Option<FinalRecord>>,
    ) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            last_status: Mutex::new(None),
            final_record: Mutex::new(Some(final_record)),
            blockhash_fails: false,
            status_queries: AtomicUsize::new(0),
            record_queries: AtomicUsize::new(0),
            blockhash_queries: AtomicUsize::new(0),
        }
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn record_queries(&self) -> usize {
        self.record_queries.load(Ordering::SeqCst)
    }

    pub fn blockhash_queries(&self) -> usize {
        self.blockhash_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn latest_blockhash(&self) -> BlockchainResult<Hash> {
        self.blockhash_queries.fetch_add(1, Ordering::SeqCst);
        if self.blockhash_fails {
            return Err(BlockchainError::Rpc("All RPC endpoints failed for getLatestBlockhash".into()));
        }
        Ok(Hash::new_from_array([9; 32]))
    }

    async fn signature_status(&self, _: &Signature) -> BlockchainResult<Option<SignatureStatus>> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(status)) => {
                *self.last_status.lock().unwrap() = status.clone();
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last_status.lock().unwrap().clone()),
        }
    }

    async fn transaction(&self, _: &Signature) -> BlockchainResult<Option<FinalRecord>> {
        self.record_queries.fetch_add(1, Ordering::SeqCst);
        self.final_record
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(None))
    }

    async fn send_transaction(&self, _: &Transaction) -> BlockchainResult<Signature> {
        Ok(signature())
    }
}

/// Wallet whose connection state and answer are set by the test.
pub struct MockWallet {
    address: Mutex<Option<Pubkey>>,
    reject_with: Option<String>,
    pub calls: AtomicUsize,
    pub last_instruction: Mutex<Option<TransferInstruction>>,
}

impl MockWallet {
    pub fn connected() -> Self {
        Self {
            address: Mutex::new(Some(sender())),
            reject_with: None,
            calls: AtomicUsize::new(0),
            last_instruction: Mutex::new(None),
        }
    }

    pub fn disconnected() -> Self {
        let wallet = Self::connected();
        wallet.disconnect();
        wallet
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::connected()
        }
    }

    pub fn disconnect(&self) {
        *self.address.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    fn connected_address(&self) -> Option<Pubkey> {
        *self.address.lock().unwrap()
    }

    async fn sign_and_submit(
        &self,
        instruction: &TransferInstruction,
        blockhash: &Hash,
        connection: &dyn Connection,
    ) -> Result<Signature, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_instruction.lock().unwrap() = Some(*instruction);
        if let Some(reason) = &self.reject_with {
            return Err(WalletError::Rejected(reason.clone()));
        }
        connection
            .send_transaction(&instruction.unsigned_transaction(blockhash))
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))
    }
}

/// Reporter keeping every notice.
#[derive(Default)]
pub struct RecordingReporter {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingReporter {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl OutcomeReporter for RecordingReporter {
    fn report(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Start a programmable JSON-RPC backend on an ephemeral port.
///
/// The handler receives the parsed request body and returns the full
/// response body.
pub async fn start_rpc_backend<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request_body(&mut socket).await else {
                            return;
                        };
                        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        let response = if request["method"] == "getVersion" {
                            serde_json::json!({
                                "jsonrpc": "2.0",
                                "id": request["id"].clone(),
                                "result": {"solana-core": "2.1.0", "feature-set": 1}
                            })
                        } else {
                            handler(request).await
                        }
                        .to_string();
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..].to_vec())
}

/// A backend that accepts connections and never answers.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
