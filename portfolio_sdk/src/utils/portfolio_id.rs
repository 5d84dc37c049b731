use alloy::primitives::U256;
use error_stack::report;
use portfolio_models::constants::chains::Chain;
use std::str::FromStr;

use crate::error::{Error, SdkResult};

/// Parses a portfolio (NFT) id.
///
/// Accepted forms: `"42"`, `"0x2a"` and `"<chain>:<decimal id>"`, the latter
/// only when `<chain>` is `expected_chain`.
pub fn infer_nft_id(portfolio_id: &str, expected_chain: Chain) -> SdkResult<U256> {
    let portfolio_id = portfolio_id.trim();
    let is_hex = portfolio_id
        .strip_prefix("0x")
        .or_else(|| portfolio_id.strip_prefix("0X"))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()));
    let is_decimal =
        !portfolio_id.is_empty() && portfolio_id.chars().all(|c| c.is_ascii_digit());

    if is_hex || is_decimal {
        return U256::from_str(&portfolio_id.to_lowercase())
            .map_err(|e| report!(Error::InvalidPortfolioId(format!("{portfolio_id}: {e}"))));
    }

    let Some((chain_name, id)) = portfolio_id.split_once(':') else {
        return Err(report!(Error::InvalidPortfolioId(portfolio_id.to_string())));
    };
    if chain_name != expected_chain.to_string() {
        return Err(report!(Error::InvalidPortfolioId(format!(
            "The given portfolio ID \"{portfolio_id}\" cannot be processed on this chain ({expected_chain})"
        ))));
    }
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(report!(Error::InvalidPortfolioId(portfolio_id.to_string())));
    }
    U256::from_str(id).map_err(|e| report!(Error::InvalidPortfolioId(format!("{portfolio_id}: {e}"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_nft_id_forms() {
        assert_eq!(infer_nft_id("42", Chain::Poly).unwrap(), U256::from(42));
        assert_eq!(infer_nft_id("0x2a", Chain::Poly).unwrap(), U256::from(42));
        assert_eq!(infer_nft_id("0x2A", Chain::Poly).unwrap(), U256::from(42));
        assert_eq!(infer_nft_id("poly:42", Chain::Poly).unwrap(), U256::from(42));
    }

    #[test]
    fn test_infer_nft_id_wrong_chain() {
        let err = infer_nft_id("bsc:42", Chain::Poly).unwrap_err();
        assert!(matches!(err.current_context(), Error::InvalidPortfolioId(_)));
    }

    #[test]
    fn test_infer_nft_id_garbage() {
        assert!(infer_nft_id("", Chain::Poly).is_err());
        assert!(infer_nft_id("0x", Chain::Poly).is_err());
        assert!(infer_nft_id("poly:", Chain::Poly).is_err());
        assert!(infer_nft_id("poly:0x2a", Chain::Poly).is_err());
        assert!(infer_nft_id("hello", Chain::Poly).is_err());
    }
}
