use alloy::primitives::Address;
use portfolio_models::constants::chains::{Chain, NATIVE_TOKEN, is_native_token};

#[allow(clippy::module_inception)]
pub mod paraswap;
pub mod requests;
pub mod responses;

pub const PARASWAP_BASE_API_URL: &str = "https://apiv5.paraswap.io";

/// Dexes excluded from ParaSwap routes, so that it never nests the other competitor
pub const PARASWAP_EXCLUDED_DEXS: &str = "0x";

/// ParaSwap only knows the `0xeeee…` spelling of the native currency
pub fn update_paraswap_native_token(token: Address) -> Address {
    if is_native_token(&token) {
        NATIVE_TOKEN
    } else {
        token
    }
}

pub fn is_chain_supported(chain: Chain) -> bool {
    !matches!(chain, Chain::Celo | Chain::Ftm | Chain::Opti)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_paraswap_native_token() {
        assert_eq!(update_paraswap_native_token(Address::ZERO), NATIVE_TOKEN);
        assert_eq!(update_paraswap_native_token(NATIVE_TOKEN), NATIVE_TOKEN);
        let usdc: Address = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174".parse().unwrap();
        assert_eq!(update_paraswap_native_token(usdc), usdc);
    }

    #[test]
    fn test_supported_chains() {
        assert!(is_chain_supported(Chain::Poly));
        assert!(is_chain_supported(Chain::Bsc));
        assert!(!is_chain_supported(Chain::Celo));
        assert!(!is_chain_supported(Chain::Opti));
    }
}
