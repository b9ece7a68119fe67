//! In-process chain and wallet doubles shared by the integration tests.

#![allow(dead_code)]

use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, H256, U256};
use serde_json::{json, Value};

use token_dashboard::blockchain::{
    backends::{InjectedBackend, WalletBackend},
    client::{RawProvider, RpcTransport},
    models::ProviderError,
    provider::ProviderDetector,
    services::token::Erc20Interface,
};
use token_dashboard::helpers::ErrorReporter;

pub const CONTRACT: &str = "0xffD29DF2d09f0eE3464e7Ab2b6cA88B3F49B6dAc";
pub const RECIPIENT: &str = "0x8c39495181151FB3d6Ac8c0215bDb60C076585a9";

pub fn contract() -> Address {
    Address::from_str(CONTRACT).unwrap()
}

pub fn account() -> Address {
    Address::repeat_byte(0x42)
}

pub fn owner() -> Address {
    Address::repeat_byte(0x07)
}

pub fn units(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

/// A transaction the mock wallet was asked to send.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

impl SentTx {
    /// Checks the selector against `function` and decodes the arguments.
    pub fn decode(&self, function: &str) -> Vec<Token> {
        let f = Erc20Interface.function(function).unwrap();
        assert_eq!(&self.data[..4], &f.short_signature(), "selector is not {}", function);
        f.decode_input(&self.data[4..]).unwrap()
    }
}

/// A token contract on a node that manages the wallet's accounts.
pub struct MockChain {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub reject_sends: bool,
    /// A read that reverts, by function name.
    pub failing_call: Option<&'static str>,
    pub balance: Mutex<U256>,
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<SentTx>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            available: true,
            accounts: vec![account()],
            reject_sends: false,
            failing_call: None,
            balance: Mutex::new(units(1234)),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.sent.lock().unwrap().clone()
    }

    fn rpc_error(method: &str, message: &str) -> ProviderError {
        ProviderError::Rpc {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    fn hex_param(value: &Value) -> Vec<u8> {
        let s = value.as_str().unwrap();
        hex::decode(s.trim_start_matches("0x")).unwrap()
    }

    fn call_result(&self, data: &[u8]) -> Result<Value, ProviderError> {
        let interface = Erc20Interface;
        let selector = &data[..4];
        let is = |name: &str| interface.function(name).unwrap().short_signature() == selector;

        if let Some(name) = self.failing_call {
            if is(name) {
                return Err(Self::rpc_error("eth_call", "execution reverted"));
            }
        }

        let token = if is("balanceOf") {
            Token::Uint(*self.balance.lock().unwrap())
        } else if is("decimals") {
            Token::Uint(U256::from(18u8))
        } else if is("symbol") {
            Token::String("DLT".to_string())
        } else if is("name") {
            Token::String("Dashboard Token".to_string())
        } else if is("owner") {
            Token::Address(owner())
        } else if is("totalSupply") {
            Token::Uint(units(1_000_000))
        } else if is("allowance") {
            Token::Uint(units(5))
        } else {
            panic!("unexpected eth_call selector {:?}", selector);
        };
        Ok(json!(format!("0x{}", hex::encode(encode(&[token])))))
    }

    fn record_send(&self, tx: &Value) -> Value {
        let sent = SentTx {
            from: serde_json::from_value(tx["from"].clone()).unwrap(),
            to: serde_json::from_value(tx["to"].clone()).unwrap(),
            data: Self::hex_param(&tx["data"]),
        };

        let mint = Erc20Interface.function("mint").unwrap();
        if sent.data[..4] == mint.short_signature() {
            let args = mint.decode_input(&sent.data[4..]).unwrap();
            if let Some(Token::Uint(amount)) = args.get(1) {
                let mut balance = self.balance.lock().unwrap();
                *balance += *amount;
            }
        }

        let mut sent_list = self.sent.lock().unwrap();
        sent_list.push(sent);
        json!(H256::from_low_u64_be(sent_list.len() as u64))
    }
}

#[async_trait]
impl RpcTransport for MockChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push(method.to_string());
        if !self.available {
            return Err(Self::rpc_error(method, "connection refused"));
        }
        match method {
            "eth_chainId" => Ok(json!("0x7a69")),
            "eth_requestAccounts" => Err(Self::rpc_error(method, "method not supported")),
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_call" => self.call_result(&Self::hex_param(&params[0]["data"])),
            "eth_sendTransaction" if self.reject_sends => {
                Err(Self::rpc_error(method, "User rejected the request."))
            }
            "eth_sendTransaction" => Ok(self.record_send(&params[0])),
            other => Err(Self::rpc_error(other, "method not found")),
        }
    }
}

/// A detector offering one injected wallet backed by `chain`.
pub fn detector_for(chain: &Arc<MockChain>) -> ProviderDetector {
    let backend: Arc<dyn WalletBackend> = Arc::new(InjectedBackend::new(RawProvider::new(chain.clone())));
    ProviderDetector::with_backends(vec![backend])
}

/// Keeps every reported error with its context.
#[derive(Default)]
pub struct RecordingReporter {
    pub entries: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingReporter {
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn process(&self, error: &(dyn Error + 'static), context: Option<&str>) {
        self.entries
            .lock()
            .unwrap()
            .push((error.to_string(), context.map(str::to_string)));
    }
}
