// src/blockchain/models.rs
use chrono::{DateTime, Utc};
use ethers_core::types::{Address, Bytes, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// --- Error types for provider and contract operations ---

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no {0} wallet provider detected")]
    NotDetected(ProviderKind),
    #[error("wallet provider is not connected")]
    NotConnected,
    #[error("wallet has no account available")]
    NoAccount,
    #[error("RPC error in {method}: {message}")]
    Rpc { method: String, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid RPC response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },
    #[error("signing failed: {0}")]
    Signing(String),
}

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("function '{0}' not found in contract interface")]
    UnknownFunction(String),
    #[error("failed to encode call to '{function}'")]
    Encoding {
        function: String,
        #[source]
        source: ethers_core::abi::Error,
    },
    #[error("failed to decode result of '{function}': {reason}")]
    Decoding { function: String, reason: String },
    #[error("contract call failed: {0}")]
    Call(#[from] ProviderError),
}

// --- Provider Models ---

/// The kinds of wallet provider the dashboard can connect through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// An account-managing JSON-RPC endpoint, the analogue of a browser extension wallet.
    Injected,
    /// A locally held private key.
    Local,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Injected => write!(f, "injected"),
            ProviderKind::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "injected" | "metamask" | "browser" => Ok(ProviderKind::Injected),
            "local" | "local-key" | "private-key" => Ok(ProviderKind::Local),
            other => Err(format!("unknown provider kind: {}", other)),
        }
    }
}

/// Connection status of a provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

/// External notifications a wallet emits when the user switches account or network.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged {
        chain_id: u64,
        raw_provider: super::client::RawProvider,
    },
    Disconnected,
}

// --- Transaction Models ---

/// The body handed to a wallet for signing: a call into `to` with ABI-encoded `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequestBody {
    pub to: Address,
    pub data: Bytes,
}

/// Defines the structure for a transaction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub tx_hash: H256,
    pub submitted_at: DateTime<Utc>,
}

impl TransactionResponse {
    pub fn new(tx_hash: H256) -> Self {
        Self {
            tx_hash,
            submitted_at: Utc::now(),
        }
    }
}
