use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPriceRouteResponse {
    /// Kept untouched, it must be sent back to `/transactions`
    pub price_route: Value,
}

/// Subset of the price route we read
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRoute {
    pub network: u32,
    pub src_token: Address,
    pub src_decimals: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub src_amount: U256,
    pub dest_token: Address,
    pub dest_decimals: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub dest_amount: U256,
    pub token_transfer_proxy: Address,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub partner_fee: f64,
    #[serde(default, rename = "srcUSD")]
    pub src_usd: Option<String>,
    #[serde(default, rename = "destUSD")]
    pub dest_usd: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    #[serde(default)]
    pub from: Option<Address>,
    pub to: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    pub data: Bytes,
    #[serde(default)]
    pub chain_id: Option<u32>,
}
