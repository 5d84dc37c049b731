use alloy::primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXGetQuoteResponse {
    pub chain_id: u32,
    /// Human readable, buy token units per sell token unit
    pub price: String,
    pub guaranteed_price: String,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub estimated_price_impact: Option<Decimal>,
    pub to: Address,
    pub data: Bytes,
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub protocol_fee: U256,
    pub buy_token_address: Address,
    pub sell_token_address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub buy_amount: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub sell_amount: U256,
    pub allowance_target: Address,
}
