// src/blockchain/nonce_manager.rs

use std::sync::Arc;

use dashmap::DashMap;
use ethers_core::types::{Address, U256};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::blockchain::{client::RawProvider, models::ProviderError};

// Hands out sequential nonces per sender so back-to-back submissions don't collide.
// Sequences are kept per provider handle: a network switch starts a fresh one.
#[derive(Debug, Clone, Default)]
pub struct NonceManager {
    nonces: Arc<DashMap<(Uuid, Address), Arc<Mutex<NonceState>>>>,
}

#[derive(Debug)]
struct NonceState {
    next_nonce: Option<U256>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the next nonce for `address`, seeding it from the chain on first use.
    pub async fn get_next_nonce(
        &self,
        address: Address,
        provider: &RawProvider,
    ) -> Result<U256, ProviderError> {
        let address_nonce_lock = self
            .nonces
            .entry((provider.id(), address))
            .or_insert_with(|| Arc::new(Mutex::new(NonceState { next_nonce: None })))
            .clone();

        let mut state = address_nonce_lock.lock().await;

        let nonce_to_use = match state.next_nonce {
            Some(nonce) => nonce,
            None => {
                let count = provider
                    .request_quantity(
                        "eth_getTransactionCount",
                        json!([format!("{:?}", address), "pending"]),
                    )
                    .await?;
                U256::from(count)
            }
        };

        state.next_nonce = Some(nonce_to_use + U256::one());

        Ok(nonce_to_use)
    }

    /// Forgets the cached nonce, e.g. after a submission failed before reaching the chain.
    pub fn reset(&self, address: Address, provider: &RawProvider) {
        self.nonces.remove(&(provider.id(), address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::client::RpcTransport;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RpcTransport for CountingTransport {
        async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
            assert_eq!(method, "eth_getTransactionCount");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!("0x5"))
        }
    }

    #[tokio::test]
    async fn nonces_are_sequential_and_seeded_once() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let provider = RawProvider::new(transport.clone());
        let manager = NonceManager::new();
        let sender = Address::repeat_byte(0x11);

        assert_eq!(manager.get_next_nonce(sender, &provider).await.unwrap(), U256::from(5));
        assert_eq!(manager.get_next_nonce(sender, &provider).await.unwrap(), U256::from(6));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        manager.reset(sender, &provider);
        assert_eq!(manager.get_next_nonce(sender, &provider).await.unwrap(), U256::from(5));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn each_provider_handle_has_its_own_sequence() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let first = RawProvider::new(transport.clone());
        let second = RawProvider::new(transport.clone());
        let manager = NonceManager::new();
        let sender = Address::repeat_byte(0x11);

        assert_eq!(manager.get_next_nonce(sender, &first).await.unwrap(), U256::from(5));
        assert_eq!(manager.get_next_nonce(sender, &first).await.unwrap(), U256::from(6));
        assert_eq!(manager.get_next_nonce(sender, &second).await.unwrap(), U256::from(5));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
