// src/blockchain/services/transactions.rs

use ethers_core::types::{transaction::eip2718::TypedTransaction, TransactionRequest, H256, U256};
use ethers_signers::{LocalWallet, Signer};
use serde_json::json;
use tracing::{debug, info};

use crate::blockchain::{
    client::RawProvider,
    models::{ProviderError, TransactionResponse, TxRequestBody},
    nonce_manager::NonceManager,
};

async fn request_u256(provider: &RawProvider, method: &str, params: serde_json::Value) -> Result<U256, ProviderError> {
    let result = provider.request(method, params).await?;
    let hex_str = result.as_str().ok_or_else(|| ProviderError::InvalidResponse {
        method: method.to_string(),
        reason: "expected a hex string".to_string(),
    })?;
    U256::from_str_radix(hex_str.trim_start_matches("0x"), 16).map_err(|e| {
        ProviderError::InvalidResponse {
            method: method.to_string(),
            reason: e.to_string(),
        }
    })
}

fn parse_tx_hash(method: &str, value: &serde_json::Value) -> Result<H256, ProviderError> {
    serde_json::from_value(value.clone()).map_err(|e| ProviderError::InvalidResponse {
        method: method.to_string(),
        reason: format!("bad transaction hash: {}", e),
    })
}

/// Signs `body` with `wallet` and submits it as a raw legacy transaction.
/// Nonces come from the shared [`NonceManager`]; a failed submission resets it.
pub async fn send_signed_transaction(
    provider: &RawProvider,
    wallet: &LocalWallet,
    body: TxRequestBody,
    nonce_manager: &NonceManager,
) -> Result<TransactionResponse, ProviderError> {
    let from_address = wallet.address();
    let chain_id = provider.request_quantity("eth_chainId", json!([])).await?;
    let nonce = nonce_manager.get_next_nonce(from_address, provider).await?;

    let mut tx = TransactionRequest::new()
        .from(from_address)
        .to(body.to)
        .data(body.data)
        .nonce(nonce)
        .chain_id(chain_id);

    let result = async {
        let call_obj = serde_json::to_value(&tx).map_err(|e| ProviderError::Signing(e.to_string()))?;
        let gas = request_u256(provider, "eth_estimateGas", json!([call_obj])).await?;
        tx = tx.clone().gas(gas);

        let gas_price = request_u256(provider, "eth_gasPrice", json!([])).await?;
        tx = tx.clone().gas_price(gas_price);

        let typed: TypedTransaction = tx.clone().into();
        let signature = wallet
            .clone()
            .with_chain_id(chain_id)
            .sign_transaction(&typed)
            .await
            .map_err(|e| ProviderError::Signing(e.to_string()))?;
        let raw_tx = typed.rlp_signed(&signature);
        debug!("Submitting signed transaction with nonce {}", nonce);

        let hash = provider
            .request("eth_sendRawTransaction", json!([raw_tx]))
            .await?;
        parse_tx_hash("eth_sendRawTransaction", &hash)
    }
    .await;

    match result {
        Ok(tx_hash) => {
            info!("Transaction {:?} submitted from {:?}", tx_hash, from_address);
            Ok(TransactionResponse::new(tx_hash))
        }
        Err(e) => {
            nonce_manager.reset(from_address, provider);
            Err(e)
        }
    }
}

/// Hands `body` to an account-managing endpoint, which signs it with its own key.
pub async fn send_managed_transaction(
    provider: &RawProvider,
    from: ethers_core::types::Address,
    body: TxRequestBody,
) -> Result<TransactionResponse, ProviderError> {
    let hash = provider
        .request(
            "eth_sendTransaction",
            json!([{ "from": from, "to": body.to, "data": body.data }]),
        )
        .await?;
    let tx_hash = parse_tx_hash("eth_sendTransaction", &hash)?;
    info!("Transaction {:?} submitted from {:?}", tx_hash, from);
    Ok(TransactionResponse::new(tx_hash))
}
