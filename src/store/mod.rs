//! Application state: the provider session and what the dashboard shows about the token.

pub mod web3_provider;
pub mod web3_providers;

pub use web3_provider::ProviderInitStore;
pub use web3_providers::{LoadState, Web3ProvidersStore};

use thiserror::Error;

use crate::blockchain::models::{ContractError, ProviderError};
use crate::composables::SessionError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Provider is not defined")]
    ProviderNotDefined,
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
