//! Wallet backends a provider session can connect through.

use std::sync::Arc;

use async_trait::async_trait;
use ethers_core::types::Address;
use ethers_signers::{LocalWallet, Signer};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::blockchain::{
    client::RawProvider,
    models::{ProviderError, ProviderKind, TransactionResponse, TxRequestBody},
    nonce_manager::NonceManager,
    services::transactions,
};

/// What a backend hands back once connected.
#[derive(Debug, Clone)]
pub struct WalletConnection {
    pub address: Option<Address>,
    pub chain_id: u64,
    pub raw_provider: RawProvider,
}

/// A wallet the dashboard can connect to and sign through.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether the wallet answers at all.
    async fn is_available(&self) -> bool;

    async fn connect(&self) -> Result<WalletConnection, ProviderError>;

    /// Signs and submits `body` on behalf of `from` through `provider`, the
    /// session's current handle (it changes when the wallet switches network).
    async fn send_transaction(
        &self,
        provider: &RawProvider,
        from: Address,
        body: TxRequestBody,
    ) -> Result<TransactionResponse, ProviderError>;
}

fn parse_accounts(value: Value) -> Result<Vec<Address>, ProviderError> {
    serde_json::from_value(value).map_err(|e| ProviderError::InvalidResponse {
        method: "eth_accounts".to_string(),
        reason: e.to_string(),
    })
}

/// An endpoint that manages its own accounts, the way an extension wallet does.
pub struct InjectedBackend {
    raw_provider: RawProvider,
}

impl InjectedBackend {
    pub fn new(raw_provider: RawProvider) -> Self {
        Self { raw_provider }
    }
}

#[async_trait]
impl WalletBackend for InjectedBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Injected
    }

    async fn is_available(&self) -> bool {
        match self.raw_provider.request("eth_chainId", json!([])).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Injected provider not available: {}", e);
                false
            }
        }
    }

    async fn connect(&self) -> Result<WalletConnection, ProviderError> {
        let accounts = match self.raw_provider.request("eth_requestAccounts", json!([])).await {
            Ok(v) => v,
            Err(ProviderError::Rpc { message, .. }) => {
                debug!("eth_requestAccounts unsupported ({}), falling back to eth_accounts", message);
                self.raw_provider.request("eth_accounts", json!([])).await?
            }
            Err(e) => return Err(e),
        };
        let accounts = parse_accounts(accounts)?;
        let chain_id = self.raw_provider.request_quantity("eth_chainId", json!([])).await?;

        Ok(WalletConnection {
            address: accounts.first().copied(),
            chain_id,
            raw_provider: self.raw_provider.clone(),
        })
    }

    async fn send_transaction(
        &self,
        provider: &RawProvider,
        from: Address,
        body: TxRequestBody,
    ) -> Result<TransactionResponse, ProviderError> {
        transactions::send_managed_transaction(provider, from, body).await
    }
}

/// A private key held by the dashboard itself.
pub struct LocalKeyBackend {
    wallet: LocalWallet,
    raw_provider: RawProvider,
    nonce_manager: Arc<NonceManager>,
}

impl LocalKeyBackend {
    pub fn new(wallet: LocalWallet, raw_provider: RawProvider) -> Self {
        Self {
            wallet,
            raw_provider,
            nonce_manager: Arc::new(NonceManager::new()),
        }
    }
}

#[async_trait]
impl WalletBackend for LocalKeyBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn is_available(&self) -> bool {
        self.raw_provider.request("eth_chainId", json!([])).await.is_ok()
    }

    async fn connect(&self) -> Result<WalletConnection, ProviderError> {
        let chain_id = self.raw_provider.request_quantity("eth_chainId", json!([])).await?;
        info!("Local key {:?} connected on chain {}", self.wallet.address(), chain_id);
        Ok(WalletConnection {
            address: Some(self.wallet.address()),
            chain_id,
            raw_provider: self.raw_provider.clone(),
        })
    }

    async fn send_transaction(
        &self,
        provider: &RawProvider,
        from: Address,
        body: TxRequestBody,
    ) -> Result<TransactionResponse, ProviderError> {
        if from != self.wallet.address() {
            warn!("Refusing to sign for {:?}: local key controls {:?}", from, self.wallet.address());
            return Err(ProviderError::Signing(format!(
                "local key does not control {:?}",
                from
            )));
        }
        transactions::send_signed_transaction(provider, &self.wallet, body, &self.nonce_manager).await
    }
}
