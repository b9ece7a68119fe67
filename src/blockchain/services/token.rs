// src/blockchain/services/token.rs

use ethers_core::abi::{decode, parse_abi, Abi, Function, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};
use lazy_static::lazy_static;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::blockchain::{
    client::RawProvider,
    models::{ContractError, ProviderError},
};

lazy_static! {
    /// Mintable, ownable ERC20 as deployed for the dashboard.
    static ref ERC20_ABI: Abi = parse_abi(&[
        "function name() view returns (string)",
        "function symbol() view returns (string)",
        "function decimals() view returns (uint8)",
        "function totalSupply() view returns (uint256)",
        "function balanceOf(address account) view returns (uint256)",
        "function allowance(address owner, address spender) view returns (uint256)",
        "function owner() view returns (address)",
        "function approve(address spender, uint256 amount) returns (bool)",
        "function increaseAllowance(address spender, uint256 addedValue) returns (bool)",
        "function decreaseAllowance(address spender, uint256 subtractedValue) returns (bool)",
        "function transfer(address to, uint256 amount) returns (bool)",
        "function transferFrom(address from, address to, uint256 amount) returns (bool)",
        "function mint(address to, uint256 amount)",
        "function renounceOwnership()",
    ])
    .expect("static ERC20 ABI parses");
}

fn hex_to_bytes(method: &str, v: &Value) -> Result<Vec<u8>, ProviderError> {
    let s = v.as_str().ok_or_else(|| ProviderError::InvalidResponse {
        method: method.to_string(),
        reason: "eth_call result not string".to_string(),
    })?;
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| ProviderError::InvalidResponse {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

// Some older tokens return bytes32 instead of string for name/symbol.
fn decode_bytes32_string(bytes: &[u8]) -> Option<String> {
    let tokens = decode(&[ParamType::FixedBytes(32)], bytes).ok()?;
    match tokens.first() {
        Some(Token::FixedBytes(b)) => {
            String::from_utf8(b.iter().copied().take_while(|c| *c != 0u8).collect()).ok()
        }
        _ => None,
    }
}

/// ABI of the token contract: encodes calls and decodes results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Erc20Interface;

impl Erc20Interface {
    pub fn function(&self, name: &str) -> Result<&'static Function, ContractError> {
        ERC20_ABI
            .function(name)
            .map_err(|_| ContractError::UnknownFunction(name.to_string()))
    }

    /// Selector followed by the encoded arguments, in declaration order.
    pub fn encode_function_data(&self, name: &str, args: &[Token]) -> Result<Bytes, ContractError> {
        let function = self.function(name)?;
        function
            .encode_input(args)
            .map(Bytes::from)
            .map_err(|source| ContractError::Encoding {
                function: name.to_string(),
                source,
            })
    }

    pub fn decode_function_result(&self, name: &str, data: &[u8]) -> Result<Vec<Token>, ContractError> {
        let function = self.function(name)?;
        function
            .decode_output(data)
            .map_err(|e| ContractError::Decoding {
                function: name.to_string(),
                reason: e.to_string(),
            })
    }
}

/// The token contract at `address`, reachable through one raw provider handle.
#[derive(Debug, Clone)]
pub struct Erc20Contract {
    address: Address,
    provider: RawProvider,
    interface: Erc20Interface,
}

impl Erc20Contract {
    pub fn connect(address: Address, provider: &RawProvider) -> Self {
        Self {
            address,
            provider: provider.clone(),
            interface: Erc20Interface,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Identity of the handle this binding was built from.
    pub fn provider_id(&self) -> Uuid {
        self.provider.id()
    }

    async fn eth_call(&self, name: &str, args: &[Token]) -> Result<Vec<u8>, ContractError> {
        let data = self.interface.encode_function_data(name, args)?;
        let raw = self
            .provider
            .request("eth_call", json!([{ "to": self.address, "data": data }, "latest"]))
            .await?;
        Ok(hex_to_bytes("eth_call", &raw)?)
    }

    async fn call_single(&self, name: &str, args: &[Token]) -> Result<Token, ContractError> {
        let bytes = self.eth_call(name, args).await?;
        self.interface
            .decode_function_result(name, &bytes)?
            .into_iter()
            .next()
            .ok_or_else(|| ContractError::Decoding {
                function: name.to_string(),
                reason: "empty result".to_string(),
            })
    }

    async fn call_uint(&self, name: &str, args: &[Token]) -> Result<U256, ContractError> {
        match self.call_single(name, args).await? {
            Token::Uint(n) => Ok(n),
            other => Err(unexpected(name, &other)),
        }
    }

    async fn call_string(&self, name: &str) -> Result<String, ContractError> {
        let bytes = self.eth_call(name, &[]).await?;
        match self.interface.decode_function_result(name, &bytes) {
            Ok(tokens) => match tokens.into_iter().next() {
                Some(Token::String(s)) => Ok(s),
                Some(other) => Err(unexpected(name, &other)),
                None => Err(ContractError::Decoding {
                    function: name.to_string(),
                    reason: "empty result".to_string(),
                }),
            },
            Err(err) => decode_bytes32_string(&bytes).ok_or(err),
        }
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContractError> {
        self.call_uint("allowance", &[Token::Address(owner), Token::Address(spender)])
            .await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ContractError> {
        self.call_uint("balanceOf", &[Token::Address(account)]).await
    }

    pub async fn decimals(&self) -> Result<u8, ContractError> {
        let n = self.call_uint("decimals", &[]).await?;
        if n > U256::from(u8::MAX) {
            return Err(ContractError::Decoding {
                function: "decimals".to_string(),
                reason: format!("{} does not fit in uint8", n),
            });
        }
        Ok(n.low_u32() as u8)
    }

    pub async fn name(&self) -> Result<String, ContractError> {
        self.call_string("name").await
    }

    pub async fn owner(&self) -> Result<Address, ContractError> {
        match self.call_single("owner", &[]).await? {
            Token::Address(a) => Ok(a),
            other => Err(unexpected("owner", &other)),
        }
    }

    pub async fn symbol(&self) -> Result<String, ContractError> {
        self.call_string("symbol").await
    }

    pub async fn total_supply(&self) -> Result<U256, ContractError> {
        self.call_uint("totalSupply", &[]).await
    }
}

fn unexpected(function: &str, token: &Token) -> ContractError {
    ContractError::Decoding {
        function: function.to_string(),
        reason: format!("unexpected token {:?}", token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::encode;
    use ethers_core::utils::keccak256;

    fn selector(sig: &str) -> [u8; 4] {
        let mut sel = [0u8; 4];
        sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
        sel
    }

    #[test]
    fn encodes_selector_and_arguments_in_order() {
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let amount = U256::from(1_000u64);
        let data = Erc20Interface
            .encode_function_data(
                "transferFrom",
                &[Token::Address(from), Token::Address(to), Token::Uint(amount)],
            )
            .unwrap();

        assert_eq!(&data[..4], &selector("transferFrom(address,address,uint256)"));
        let expected = encode(&[Token::Address(from), Token::Address(to), Token::Uint(amount)]);
        assert_eq!(&data[4..], expected.as_slice());
    }

    #[test]
    fn renounce_ownership_is_selector_only() {
        let data = Erc20Interface.encode_function_data("renounceOwnership", &[]).unwrap();
        assert_eq!(data.to_vec(), selector("renounceOwnership()").to_vec());
    }

    #[test]
    fn mismatched_arguments_fail_to_encode() {
        let err = Erc20Interface
            .encode_function_data("approve", &[Token::Uint(U256::one())])
            .unwrap_err();
        assert!(matches!(err, ContractError::Encoding { .. }));
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = Erc20Interface.encode_function_data("burn", &[]).unwrap_err();
        assert!(matches!(err, ContractError::UnknownFunction(name) if name == "burn"));
    }

    #[test]
    fn bytes32_names_are_decoded() {
        let mut word = [0u8; 32];
        word[..3].copy_from_slice(b"MKR");
        let encoded = encode(&[Token::FixedBytes(word.to_vec())]);
        assert_eq!(decode_bytes32_string(&encoded).as_deref(), Some("MKR"));
    }
}
