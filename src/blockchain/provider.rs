//! The connected wallet: detection, connection and transaction submission.

use std::str::FromStr;
use std::sync::Arc;

use ethers_core::types::Address;
use ethers_signers::LocalWallet;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::blockchain::{
    backends::{InjectedBackend, LocalKeyBackend, WalletBackend},
    client::RawProvider,
    models::{ConnectionStatus, ProviderError, ProviderEvent, ProviderKind, TransactionResponse, TxRequestBody},
};
use crate::config::Config;

/// Knows which wallets could be connected and which of them actually answered.
#[derive(Default)]
pub struct ProviderDetector {
    candidates: Vec<Arc<dyn WalletBackend>>,
    detected: Vec<Arc<dyn WalletBackend>>,
}

impl ProviderDetector {
    pub fn with_backends(candidates: Vec<Arc<dyn WalletBackend>>) -> Self {
        Self {
            candidates,
            detected: Vec::new(),
        }
    }

    /// Registers the backends enabled by `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut candidates: Vec<Arc<dyn WalletBackend>> = vec![Arc::new(InjectedBackend::new(
            RawProvider::http(&config.rpc_url),
        ))];

        if let Some(key) = &config.tx_private_key {
            match LocalWallet::from_str(key.expose_secret().trim_start_matches("0x")) {
                Ok(wallet) => candidates.push(Arc::new(LocalKeyBackend::new(
                    wallet,
                    RawProvider::http(&config.rpc_url),
                ))),
                Err(e) => warn!("TX_PRIVATE_KEY is set but unusable: {}", e),
            }
        }

        Self::with_backends(candidates)
    }

    /// Probes every candidate and remembers the ones that answered.
    pub async fn init(&mut self) {
        let mut detected = Vec::new();
        for backend in &self.candidates {
            if backend.is_available().await {
                info!("Detected {} wallet provider", backend.kind());
                detected.push(backend.clone());
            }
        }
        self.detected = detected;
    }

    pub fn detected(&self, kind: ProviderKind) -> Option<Arc<dyn WalletBackend>> {
        self.detected.iter().find(|b| b.kind() == kind).cloned()
    }

    pub fn detected_kinds(&self) -> Vec<ProviderKind> {
        self.detected.iter().map(|b| b.kind()).collect()
    }
}

/// One connected wallet.
pub struct ProviderSession {
    backend: Option<Arc<dyn WalletBackend>>,
    address: Option<Address>,
    chain_id: Option<u64>,
    raw_provider: Option<RawProvider>,
    status: ConnectionStatus,
}

impl Default for ProviderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSession {
    pub fn new() -> Self {
        Self {
            backend: None,
            address: None,
            chain_id: None,
            raw_provider: None,
            status: ConnectionStatus::Disconnected,
        }
    }

    /// Connects through the detected backend of `kind`.
    pub async fn init(&mut self, kind: ProviderKind, detector: &ProviderDetector) -> Result<(), ProviderError> {
        self.status = ConnectionStatus::Connecting;

        let result = async {
            let backend = detector.detected(kind).ok_or(ProviderError::NotDetected(kind))?;
            let connection = backend.connect().await?;
            Ok::<_, ProviderError>((backend, connection))
        }
        .await;

        match result {
            Ok((backend, connection)) => {
                info!(
                    "Connected to {} provider on chain {} as {:?}",
                    kind, connection.chain_id, connection.address
                );
                self.backend = Some(backend);
                self.address = connection.address;
                self.chain_id = Some(connection.chain_id);
                self.raw_provider = Some(connection.raw_provider);
                self.status = ConnectionStatus::Connected;
                Ok(())
            }
            Err(e) => {
                self.disconnect();
                self.status = ConnectionStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn raw_provider(&self) -> Option<&RawProvider> {
        self.raw_provider.as_ref()
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Hands `body` to the wallet for signing and submission.
    pub async fn sign_and_send_tx(&self, body: TxRequestBody) -> Result<TransactionResponse, ProviderError> {
        let (backend, provider) = match (&self.backend, &self.raw_provider) {
            (Some(backend), Some(provider)) => (backend, provider),
            _ => return Err(ProviderError::NotConnected),
        };
        let from = self.address.ok_or(ProviderError::NoAccount)?;
        backend.send_transaction(provider, from, body).await
    }

    /// Applies an account or network switch made in the wallet.
    pub fn apply_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                self.address = accounts.first().copied();
                info!("Wallet account changed to {:?}", self.address);
            }
            ProviderEvent::ChainChanged { chain_id, raw_provider } => {
                info!("Wallet switched to chain {}", chain_id);
                self.chain_id = Some(chain_id);
                self.raw_provider = Some(raw_provider);
            }
            ProviderEvent::Disconnected => self.disconnect(),
        }
    }

    pub fn disconnect(&mut self) {
        self.backend = None;
        self.address = None;
        self.chain_id = None;
        self.raw_provider = None;
        self.status = ConnectionStatus::Disconnected;
    }
}
