use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXGetQuoteRequest {
    pub sell_token: String,
    pub buy_token: String,
    /// Exactly one of `sell_amount` and `buy_amount` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_amount: Option<String>,
    /// Fraction, e.g. 0.03 for 3%
    pub slippage_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker_address: Option<String>,
    /// Comma separated list of liquidity sources to ignore
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_sources: Option<String>,
    /// The taker (the factory) does not hold the tokens yet
    pub skip_validation: bool,
}
