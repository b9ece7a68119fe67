// src/config.rs

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use ethers_core::types::Address;
use secrecy::SecretString;

use crate::blockchain::models::ProviderKind;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xffD29DF2d09f0eE3464e7Ab2b6cA88B3F49B6dAc";
pub const DEFAULT_TRANSFER_ADDRESS: &str = "0x8c39495181151FB3d6Ac8c0215bDb60C076585a9";
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    /// JSON-RPC endpoint the wallet providers talk to
    pub rpc_url: String,
    /// The token contract the dashboard is bound to
    pub contract_address: Address,
    /// Pre-filled transfer recipient
    pub default_transfer_address: String,
    /// Which detected provider `init` connects through
    pub provider_kind: ProviderKind,
    /// Enables the local-key provider when set
    pub tx_private_key: Option<SecretString>,
    /// Decimals used to parse the amount inputs
    pub token_decimals: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: Address::from_str(DEFAULT_CONTRACT_ADDRESS)
                .unwrap_or_else(|_| Address::zero()),
            default_transfer_address: DEFAULT_TRANSFER_ADDRESS.to_string(),
            provider_kind: ProviderKind::Injected,
            tx_private_key: None,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        url::Url::parse(&rpc_url).context("RPC_URL must be a valid URL")?;

        let contract_address = env::var("CONTRACT_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract_address = Address::from_str(&contract_address)
            .context("CONTRACT_ADDRESS must be a valid EVM address")?;

        let provider_kind = env::var("PROVIDER_KIND")
            .unwrap_or_else(|_| "injected".to_string())
            .parse::<ProviderKind>()
            .map_err(|e| anyhow!(e))
            .context("PROVIDER_KIND must be 'injected' or 'local'")?;

        Ok(Config {
            rpc_url,
            contract_address,
            default_transfer_address: env::var("DEFAULT_TRANSFER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_TRANSFER_ADDRESS.to_string()),
            provider_kind,
            tx_private_key: env::var("TX_PRIVATE_KEY").ok().map(SecretString::new),
            token_decimals: env::var("TOKEN_DECIMALS")
                .unwrap_or_else(|_| DEFAULT_TOKEN_DECIMALS.to_string())
                .parse()
                .context("TOKEN_DECIMALS must be a number between 0 and 255")?,
        })
    }
}
