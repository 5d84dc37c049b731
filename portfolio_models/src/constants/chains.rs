use alloy::primitives::{Address, address};
use error_stack::{Report, report};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::Error;

/// Pseudo-address used by aggregators and the factory to designate the chain native currency
pub const NATIVE_TOKEN: Address = address!("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

pub const NATIVE_TOKEN_ADDRESSES: [Address; 2] = [NATIVE_TOKEN, Address::ZERO];

pub fn is_native_token(address: &Address) -> bool {
    NATIVE_TOKEN_ADDRESSES.contains(address)
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize_repr,
    Deserialize_repr,
    EnumIter,
    EnumString,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u32)]
pub enum Chain {
    Eth = 1,
    Rop = 3,
    Opti = 10,
    Bsc = 56,
    Poly = 137,
    Ftm = 250,
    Avax = 43114,
    Celo = 42220,
}

/// Static deployment data for one chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain: Chain,
    /// RPC endpoint or well-known network name
    pub provider_endpoint: &'static str,
    /// Deployed portfolio factory. `None` when the SDK cannot operate on this chain.
    pub factory_address: Option<Address>,
    pub wrapped_token: Option<Address>,
}

impl ChainConfig {
    pub fn chain_id(&self) -> u32 {
        self.chain.chain_id()
    }
}

impl Chain {
    pub fn chain_id(self) -> u32 {
        self as u32
    }

    pub fn from_chain_id(chain_id: u32) -> Option<Chain> {
        Chain::iter().find(|chain| chain.chain_id() == chain_id)
    }

    /// Chains with a deployed factory
    pub fn supported_chains() -> Vec<Chain> {
        Chain::iter()
            .filter(|chain| chain.config().factory_address.is_some())
            .collect()
    }

    pub fn config(self) -> ChainConfig {
        match self {
            Chain::Eth => ChainConfig {
                chain: self,
                provider_endpoint: "homestead",
                factory_address: None,
                wrapped_token: Some(address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")),
            },
            Chain::Rop => ChainConfig {
                chain: self,
                provider_endpoint: "ropsten",
                factory_address: None,
                wrapped_token: None,
            },
            Chain::Opti => ChainConfig {
                chain: self,
                provider_endpoint: "https://mainnet.optimism.io",
                factory_address: None,
                wrapped_token: Some(address!("0x4200000000000000000000000000000000000006")),
            },
            Chain::Bsc => ChainConfig {
                chain: self,
                provider_endpoint: "https://bsc-dataseed.binance.org/",
                factory_address: Some(address!("0x1dB81116467789b7dCC3B070ee8f5aA4d90D6940")),
                wrapped_token: Some(address!("0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c")),
            },
            Chain::Poly => ChainConfig {
                chain: self,
                provider_endpoint: "https://polygon-rpc.com",
                factory_address: Some(address!("0xD6D813e31558b45769B83E33Fe10cDef76128Ffc")),
                wrapped_token: Some(address!("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270")),
            },
            Chain::Ftm => ChainConfig {
                chain: self,
                provider_endpoint: "https://rpc.ftm.tools",
                factory_address: None,
                wrapped_token: Some(address!("0x21be370d5312f44cb42ce377bc9b8a0cef1a4c83")),
            },
            Chain::Avax => ChainConfig {
                chain: self,
                provider_endpoint: "https://api.avax.network/ext/bc/C/rpc",
                factory_address: Some(address!("0x1dB81116467789b7dCC3B070ee8f5aA4d90D6940")),
                wrapped_token: Some(address!("0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7")),
            },
            Chain::Celo => ChainConfig {
                chain: self,
                provider_endpoint: "https://forno.celo.org",
                factory_address: None,
                wrapped_token: Some(address!("0x471ece3750da237f93b8e339c536989b8978a438")),
            },
        }
    }

    /// Factory address, failing for chains the SDK cannot operate on
    pub fn factory_address(self) -> Result<Address, Report<Error>> {
        self.config().factory_address.ok_or_else(|| {
            report!(Error::ChainError(format!(
                "Chain not supported (no factory deployed): {self}"
            )))
        })
    }

    /// Replaces the native pseudo-token by the chain wrapped native token
    pub fn wrap_native(self, token: Address) -> Result<Address, Report<Error>> {
        if !is_native_token(&token) {
            return Ok(token);
        }
        self.config().wrapped_token.ok_or_else(|| {
            report!(Error::ChainError(format!("Chain not supported: {self}")))
        })
    }

    /// Replaces the chain wrapped native token by the native pseudo-token
    pub fn unwrap_native(self, token: Address) -> Address {
        match self.config().wrapped_token {
            Some(wrapped) if wrapped == token => NATIVE_TOKEN,
            _ => token,
        }
    }
}

impl TryFrom<u32> for Chain {
    type Error = Report<Error>;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Chain::from_chain_id(value)
            .ok_or_else(|| report!(Error::ChainError(format!("Invalid chain ID: {value}"))))
    }
}

impl TryFrom<&str> for Chain {
    type Error = Report<Error>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if let Ok(chain_id) = value.parse::<u32>() {
            return Chain::try_from(chain_id);
        }
        value
            .to_lowercase()
            .parse::<Chain>()
            .map_err(|_| report!(Error::ChainError(format!("Invalid chain name: {value}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_display() {
        assert_eq!(Chain::Poly.to_string(), "poly");
        assert_eq!(Chain::Bsc.to_string(), "bsc");
        assert_eq!(Chain::Avax.to_string(), "avax");
    }

    #[test]
    fn test_chain_try_from() {
        assert_eq!(Chain::try_from("poly").unwrap(), Chain::Poly);
        assert_eq!(Chain::try_from("POLY").unwrap(), Chain::Poly);
        assert_eq!(Chain::try_from("56").unwrap(), Chain::Bsc);
        assert_eq!(Chain::try_from(43114u32).unwrap(), Chain::Avax);
        assert!(Chain::try_from("mars").is_err());
        assert!(Chain::try_from(9999u32).is_err());
    }

    #[test]
    fn test_supported_chains() {
        let chains = Chain::supported_chains();
        assert!(chains.contains(&Chain::Poly));
        assert!(chains.contains(&Chain::Bsc));
        assert!(chains.contains(&Chain::Avax));
        assert!(!chains.contains(&Chain::Eth));
        assert!(!chains.contains(&Chain::Rop));
    }

    #[test]
    fn test_factory_address() {
        assert!(Chain::Poly.factory_address().is_ok());
        assert!(Chain::Rop.factory_address().is_err());
    }

    #[test]
    fn test_is_native_token() {
        assert!(is_native_token(&NATIVE_TOKEN));
        assert!(is_native_token(&Address::ZERO));
        assert!(!is_native_token(&address!(
            "0x1111111111111111111111111111111111111111"
        )));
    }

    #[test]
    fn test_wrap_unwrap() {
        let wmatic = address!("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");
        let usdc = address!("0x2791bca1f2de4661ed88a30c99a7a9449aa84174");

        assert_eq!(Chain::Poly.wrap_native(NATIVE_TOKEN).unwrap(), wmatic);
        assert_eq!(Chain::Poly.wrap_native(usdc).unwrap(), usdc);
        assert_eq!(Chain::Poly.unwrap_native(wmatic), NATIVE_TOKEN);
        assert_eq!(Chain::Poly.unwrap_native(usdc), usdc);
        assert!(Chain::Rop.wrap_native(NATIVE_TOKEN).is_err());
    }

    #[test]
    fn test_chain_id_roundtrip() {
        for chain in Chain::iter() {
            assert_eq!(Chain::from_chain_id(chain.chain_id()), Some(chain));
            assert_eq!(chain.config().chain_id(), chain.chain_id());
        }
    }
}
