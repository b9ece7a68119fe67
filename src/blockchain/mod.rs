// src/blockchain/mod.rs

pub mod backends;
pub mod client;
pub mod models;
pub mod nonce_manager;
pub mod provider;
pub mod services;

pub use client::RawProvider;
pub use provider::{ProviderDetector, ProviderSession};

// Re-export commonly used types
pub use ethers::{
    types::{Address, Bytes, H256, U256},
    utils::to_checksum,
};
