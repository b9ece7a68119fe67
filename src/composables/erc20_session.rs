//! One token contract bound to one provider session.
//!
//! The contract binding is rebuilt from `(address, raw provider handle)` on
//! every access, so a wallet that swapped its handle is never served through a
//! stale binding. Reads degrade to `None` while no wallet is connected; writes
//! fail and hand the error back unchanged.

use ethers_core::abi::Token;
use ethers_core::types::{Address, Bytes, U256};
use thiserror::Error;
use tracing::debug;

use crate::blockchain::{
    models::{ContractError, ProviderError, TransactionResponse, TxRequestBody},
    provider::ProviderSession,
    services::token::{Erc20Contract, Erc20Interface},
};
use crate::store::ProviderInitStore;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("provider session is not connected")]
    ProviderNotConnected,
    #[error(transparent)]
    Encoding(ContractError),
    #[error(transparent)]
    Submission(ProviderError),
}

pub struct Erc20Session<'a> {
    address: Address,
    provider: &'a ProviderSession,
    interface: Erc20Interface,
}

impl<'a> Erc20Session<'a> {
    pub fn new(address: Address, provider: &'a ProviderSession) -> Self {
        Self {
            address,
            provider,
            interface: Erc20Interface,
        }
    }

    /// Binds to the session held by `store`.
    pub fn from_store(address: Address, store: &'a ProviderInitStore) -> Self {
        Self::new(address, store.provider())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// A fresh binding over the provider's current handle, if it has one.
    pub fn contract(&self) -> Option<Erc20Contract> {
        self.provider
            .raw_provider()
            .map(|raw| Erc20Contract::connect(self.address, raw))
    }

    /// Call data for `function` without submitting anything.
    pub fn encode(&self, function: &str, args: &[Token]) -> Result<Bytes, SessionError> {
        self.interface
            .encode_function_data(function, args)
            .map_err(SessionError::Encoding)
    }

    async fn submit(&self, function: &str, args: &[Token]) -> Result<TransactionResponse, SessionError> {
        if !self.provider.is_connected() {
            return Err(SessionError::ProviderNotConnected);
        }
        let data = self.encode(function, args)?;
        debug!("Submitting {} to {:?}", function, self.address);
        self.provider
            .sign_and_send_tx(TxRequestBody {
                to: self.address,
                data,
            })
            .await
            .map_err(SessionError::Submission)
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TransactionResponse, SessionError> {
        self.submit("approve", &[Token::Address(spender), Token::Uint(amount)])
            .await
    }

    pub async fn increase_allowance(
        &self,
        spender: Address,
        added_value: U256,
    ) -> Result<TransactionResponse, SessionError> {
        self.submit(
            "increaseAllowance",
            &[Token::Address(spender), Token::Uint(added_value)],
        )
        .await
    }

    pub async fn decrease_allowance(
        &self,
        spender: Address,
        subtracted_value: U256,
    ) -> Result<TransactionResponse, SessionError> {
        self.submit(
            "decreaseAllowance",
            &[Token::Address(spender), Token::Uint(subtracted_value)],
        )
        .await
    }

    pub async fn transfer(&self, to: Address, amount: U256) -> Result<TransactionResponse, SessionError> {
        self.submit("transfer", &[Token::Address(to), Token::Uint(amount)])
            .await
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionResponse, SessionError> {
        self.submit(
            "transferFrom",
            &[Token::Address(from), Token::Address(to), Token::Uint(amount)],
        )
        .await
    }

    pub async fn renounce_ownership(&self) -> Result<TransactionResponse, SessionError> {
        self.submit("renounceOwnership", &[]).await
    }

    pub async fn mint(&self, to: Address, amount: U256) -> Result<TransactionResponse, SessionError> {
        self.submit("mint", &[Token::Address(to), Token::Uint(amount)])
            .await
    }

    pub async fn get_allowance(&self, owner: Address, spender: Address) -> Result<Option<U256>, ContractError> {
        match self.contract() {
            Some(contract) => contract.allowance(owner, spender).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_balance_of(&self, account: Address) -> Result<Option<U256>, ContractError> {
        match self.contract() {
            Some(contract) => contract.balance_of(account).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_decimals(&self) -> Result<Option<u8>, ContractError> {
        match self.contract() {
            Some(contract) => contract.decimals().await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_name(&self) -> Result<Option<String>, ContractError> {
        match self.contract() {
            Some(contract) => contract.name().await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_owner(&self) -> Result<Option<Address>, ContractError> {
        match self.contract() {
            Some(contract) => contract.owner().await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_symbol(&self) -> Result<Option<String>, ContractError> {
        match self.contract() {
            Some(contract) => contract.symbol().await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_total_supply(&self) -> Result<Option<U256>, ContractError> {
        match self.contract() {
            Some(contract) => contract.total_supply().await.map(Some),
            None => Ok(None),
        }
    }
}
