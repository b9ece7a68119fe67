//! JSON-RPC plumbing shared by the wallet backends and the contract binding.
//!
//! A [`RawProvider`] is the opaque handle a connected wallet hands out. Every
//! handle carries its own identity so that anything derived from it (contract
//! bindings in particular) can tell when the wallet swapped it out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::blockchain::models::ProviderError;

/// A JSON-RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends `method` with `params` and returns the `result` member of the reply.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// JSON-RPC over HTTP.
pub struct HttpTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        debug!("-> {} {}", self.url, payload);

        let v: Value = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;
        debug!("<- {}", v);

        if let Some(err) = v.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(ProviderError::Rpc {
                method: method.to_string(),
                message,
            });
        }
        v.get("result")
            .cloned()
            .ok_or_else(|| ProviderError::InvalidResponse {
                method: method.to_string(),
                reason: "missing 'result' field".to_string(),
            })
    }
}

/// Opaque handle to a wallet's connection.
#[derive(Clone)]
pub struct RawProvider {
    id: Uuid,
    transport: Arc<dyn RpcTransport>,
}

impl RawProvider {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
        }
    }

    pub fn http(url: &str) -> Self {
        Self::new(Arc::new(HttpTransport::new(url)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.transport.request(method, params).await
    }

    /// Issues `method` and reads the result as a `0x`-prefixed quantity.
    pub async fn request_quantity(&self, method: &str, params: Value) -> Result<u64, ProviderError> {
        let result = self.request(method, params).await?;
        let hex_str = result.as_str().ok_or_else(|| ProviderError::InvalidResponse {
            method: method.to_string(),
            reason: "expected a hex string".to_string(),
        })?;
        u64::from_str_radix(hex_str.trim_start_matches("0x"), 16).map_err(|e| {
            ProviderError::InvalidResponse {
                method: method.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl fmt::Debug for RawProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawProvider").field("id", &self.id).finish()
    }
}
