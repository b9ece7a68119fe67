// src/lib.rs

// Re-export commonly used types
pub use ethers::types::{Address, Bytes, H256, U256};

pub mod blockchain;
pub mod composables;
pub mod config;
pub mod helpers;
pub mod store;

pub use composables::{Erc20Session, SessionError};
pub use store::{LoadState, ProviderInitStore, StoreError, Web3ProvidersStore};
