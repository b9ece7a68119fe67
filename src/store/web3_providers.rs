use std::str::FromStr;
use std::sync::Arc;

use ethers_core::types::{Address, U256};
use tracing::{debug, info};

use crate::blockchain::{
    models::{ProviderEvent, TransactionResponse},
    provider::{ProviderDetector, ProviderSession},
};
use crate::composables::Erc20Session;
use crate::config::Config;
use crate::helpers::{format_balance, parse_amount, BusEvent, ErrorReporter, EventBus, TracingErrorReporter};

use super::StoreError;

pub const BALANCE_UNDEFINED: &str = "Balance is undefined";
pub const NO_ACCOUNT_MESSAGE: &str = "Connect a wallet account to load the token";
pub const REPLENISHED_MESSAGE: &str = "The contract account was successfully replenished";

/// Provider initialization progress. `Loaded` and `LoadFailed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Initializing,
    Loaded,
    LoadFailed,
}

/// Dashboard state: the connected wallet, the token's metadata, and the form inputs.
pub struct Web3ProvidersStore {
    config: Config,
    provider: ProviderSession,
    detector: ProviderDetector,
    load_state: LoadState,

    input_replenishment: String,
    input_transfer_tokens: String,
    input_transfer_address: String,

    contract_address: Address,
    contract_balance: Option<U256>,
    contract_decimals: Option<u8>,
    contract_symbol: Option<String>,
    contract_name: Option<String>,

    reporter: Arc<dyn ErrorReporter>,
    bus: EventBus,
}

impl Web3ProvidersStore {
    pub fn new(
        config: Config,
        detector: ProviderDetector,
        reporter: Arc<dyn ErrorReporter>,
        bus: EventBus,
    ) -> Self {
        Self {
            provider: ProviderSession::new(),
            detector,
            load_state: LoadState::Uninitialized,
            input_replenishment: String::new(),
            input_transfer_tokens: String::new(),
            input_transfer_address: config.default_transfer_address.clone(),
            contract_address: config.contract_address,
            contract_balance: None,
            contract_decimals: None,
            contract_symbol: None,
            contract_name: None,
            reporter,
            bus,
            config,
        }
    }

    pub fn from_config(config: Config) -> Self {
        let detector = ProviderDetector::from_config(&config);
        let bus = EventBus::default();
        let reporter = Arc::new(TracingErrorReporter::with_bus(bus.clone()));
        Self::new(config, detector, reporter, bus)
    }

    pub fn provider(&self) -> &ProviderSession {
        &self.provider
    }

    /// The token session over the current provider.
    pub fn token(&self) -> Erc20Session<'_> {
        Erc20Session::new(self.contract_address, &self.provider)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }

    pub fn is_load_failed(&self) -> bool {
        self.load_state == LoadState::LoadFailed
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn contract_balance(&self) -> Option<U256> {
        self.contract_balance
    }

    pub fn contract_decimals(&self) -> Option<u8> {
        self.contract_decimals
    }

    pub fn contract_symbol(&self) -> Option<&str> {
        self.contract_symbol.as_deref()
    }

    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    pub fn input_transfer_address(&self) -> &str {
        &self.input_transfer_address
    }

    pub fn set_input_replenishment(&mut self, value: impl Into<String>) {
        self.input_replenishment = value.into();
    }

    pub fn set_input_transfer_tokens(&mut self, value: impl Into<String>) {
        self.input_transfer_tokens = value.into();
    }

    pub fn set_input_transfer_address(&mut self, value: impl Into<String>) {
        self.input_transfer_address = value.into();
    }

    /// Whole-unit balance for display.
    pub fn contract_balance_display(&self) -> String {
        match self.contract_balance {
            Some(balance) => format_balance(
                balance,
                self.contract_decimals.unwrap_or(self.config.token_decimals),
            ),
            None => BALANCE_UNDEFINED.to_string(),
        }
    }

    fn report<T>(&self, result: Result<T, StoreError>, context: &str) -> Result<T, StoreError> {
        if let Err(e) = &result {
            self.reporter.process(e, Some(context));
        }
        result
    }

    /// Connects the configured wallet and loads the token metadata for its account.
    pub async fn init(&mut self) -> Result<(), StoreError> {
        self.load_state = LoadState::Initializing;
        let result = self.connect_and_load().await;
        self.load_state = match &result {
            Ok(true) => LoadState::Loaded,
            Ok(false) => LoadState::Uninitialized,
            Err(_) => LoadState::LoadFailed,
        };
        self.report(result, "Problem with initialization").map(|_| ())
    }

    async fn connect_and_load(&mut self) -> Result<bool, StoreError> {
        self.detector.init().await;
        debug!("Detected providers: {:?}", self.detector.detected_kinds());
        self.provider.init(self.config.provider_kind, &self.detector).await?;

        let Some(address) = self.provider.address() else {
            info!("Provider connected without an account; nothing to load");
            self.bus.emit(BusEvent::Warning(NO_ACCOUNT_MESSAGE.to_string()));
            return Ok(false);
        };

        let token = Erc20Session::new(self.contract_address, &self.provider);
        let balance = token.get_balance_of(address).await?;
        let decimals = token.get_decimals().await?;
        let symbol = token.get_symbol().await?;
        let name = token.get_name().await?;

        self.contract_balance = balance;
        self.contract_decimals = decimals;
        self.contract_symbol = symbol;
        self.contract_name = name;
        Ok(true)
    }

    fn parse_input_amount(&self, field: &'static str, input: &str) -> Result<U256, StoreError> {
        parse_amount(input, self.config.token_decimals).map_err(|e| StoreError::InvalidInput {
            field,
            reason: e.to_string(),
        })
    }

    /// Mints the replenishment amount to the connected account and refreshes its balance.
    pub async fn get_balance(&mut self) -> Result<TransactionResponse, StoreError> {
        let result = self.replenish().await;
        self.report(result, "Problem with transaction")
    }

    async fn replenish(&mut self) -> Result<TransactionResponse, StoreError> {
        let address = self.provider.address().ok_or(StoreError::ProviderNotDefined)?;
        let amount = self.parse_input_amount("replenishment amount", &self.input_replenishment)?;

        let token = Erc20Session::new(self.contract_address, &self.provider);
        let response = token.mint(address, amount).await?;
        let balance = token.get_balance_of(address).await?;

        self.contract_balance = balance;
        self.bus.emit(BusEvent::Success(REPLENISHED_MESSAGE.to_string()));
        Ok(response)
    }

    /// Transfers the entered amount to the entered recipient.
    pub async fn transfer_tokens(&mut self) -> Result<TransactionResponse, StoreError> {
        let result = self.send_transfer().await;
        self.report(result, "Problem with transferring tokens")
    }

    async fn send_transfer(&self) -> Result<TransactionResponse, StoreError> {
        if self.provider.address().is_none() {
            return Err(StoreError::ProviderNotDefined);
        }
        let recipient = Address::from_str(self.input_transfer_address.trim()).map_err(|e| {
            StoreError::InvalidInput {
                field: "transfer recipient",
                reason: e.to_string(),
            }
        })?;
        let amount = self.parse_input_amount("transfer amount", &self.input_transfer_tokens)?;

        Ok(self.token().transfer(recipient, amount).await?)
    }

    /// Follows an account or network switch made in the wallet.
    pub async fn handle_provider_event(&mut self, event: ProviderEvent) -> Result<(), StoreError> {
        self.provider.apply_event(event);
        let result = self.refresh_balance().await;
        self.report(result, "Problem with provider update")
    }

    async fn refresh_balance(&mut self) -> Result<(), StoreError> {
        let balance = match self.provider.address() {
            Some(address) => self.token().get_balance_of(address).await?,
            None => None,
        };
        self.contract_balance = balance;
        Ok(())
    }
}
