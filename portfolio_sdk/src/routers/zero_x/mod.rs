use alloy::primitives::Address;
use portfolio_models::constants::chains::{Chain, NATIVE_TOKEN, is_native_token};

pub mod requests;
pub mod responses;
pub mod zero_x;

// https://0x.org/docs/0x-swap-api/api-references/get-swap-v1-quote
const ZERO_X_QUOTE_PATH: &str = "/swap/v1/quote";

/// 0x serves each chain from its own host
pub fn zero_x_base_url(chain: Chain) -> Option<&'static str> {
    match chain {
        Chain::Eth => Some("https://api.0x.org"),
        Chain::Bsc => Some("https://bsc.api.0x.org"),
        Chain::Poly => Some("https://polygon.api.0x.org"),
        Chain::Avax => Some("https://avalanche.api.0x.org"),
        Chain::Ftm => Some("https://fantom.api.0x.org"),
        Chain::Opti => Some("https://optimism.api.0x.org"),
        Chain::Celo => Some("https://celo.api.0x.org"),
        Chain::Rop => None,
    }
}

pub fn update_zero_x_native_token(token: Address) -> Address {
    if is_native_token(&token) {
        NATIVE_TOKEN
    } else {
        token
    }
}
