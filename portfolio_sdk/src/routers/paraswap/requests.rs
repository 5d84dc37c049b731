use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum ParaswapSide {
    SELL,
    BUY,
}

// https://developers.paraswap.network/api/get-rate-for-a-token-pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPriceRouteRequest {
    pub src_token: String,
    pub src_decimals: u8,
    pub dest_token: String,
    pub dest_decimals: u8,
    /// srcToken amount (SELL) or destToken amount (BUY), in raw units
    pub amount: String,
    pub side: ParaswapSide,
    pub network: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_address: Option<String>,
    /// Comma separated list of dexes to exclude
    #[serde(rename = "excludeDEXS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_dexs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsRequest {
    pub network: u32,
    pub query_params: TransactionsQueryParams,
    pub body_params: TransactionsBodyParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQueryParams {
    pub ignore_checks: bool,
    pub ignore_gas_estimate: bool,
}

// https://developers.paraswap.network/api/build-parameters-for-transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsBodyParams {
    pub src_token: String,
    pub src_decimals: u8,
    pub dest_token: String,
    pub dest_decimals: u8,
    pub src_amount: String,
    pub dest_amount: String,
    /// Price route exactly as returned by `/prices`
    pub price_route: Value,
    pub user_address: String,
}
