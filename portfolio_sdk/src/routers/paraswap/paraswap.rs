use super::{
    PARASWAP_BASE_API_URL, PARASWAP_EXCLUDED_DEXS, is_chain_supported,
    requests::{
        GetPriceRouteRequest, ParaswapSide, TransactionsBodyParams, TransactionsQueryParams,
        TransactionsRequest,
    },
    responses::{GetPriceRouteResponse, PriceRoute, TransactionsResponse},
    update_paraswap_native_token,
};
use crate::{
    error::{Error, QuoteErrorReason, SdkResult},
    routers::{
        AggregatorType, DexAggregator, FetchFailure, QuoteResult, SwapAmount, SwapRequest,
        error_envelope::classify_api_error,
    },
    utils::{
        number_conversion::{normalized_price, price_impact_from_usd},
        ratio::safe_mult,
    },
};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use error_stack::ResultExt;
use portfolio_models::network::client_rate_limit::Client;
use portfolio_models::network::http::{
    HttpMethod, handle_reqwest_response, value_to_sorted_querystring,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// ParaSwap market API adapter
#[derive(Debug, Clone)]
pub struct ParaswapAggregator {
    client: Client,
    base_url: String,
}

impl ParaswapAggregator {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, PARASWAP_BASE_API_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        uri_path: &str,
        query: Option<Value>,
        body: Option<Value>,
        method: HttpMethod,
    ) -> SdkResult<T> {
        let url = match query {
            Some(query) => {
                let query =
                    value_to_sorted_querystring(&query).change_context(Error::ModelsError)?;
                format!("{}{uri_path}?{query}", self.base_url)
            }
            None => format!("{}{uri_path}", self.base_url),
        };

        let mut request = match method {
            HttpMethod::GET => self.client.inner_client().get(url),
            HttpMethod::POST => self.client.inner_client().post(url),
        };
        if let Some(body) = body {
            request = request.json(&body);
        }
        let request = request
            .build()
            .change_context(Error::ReqwestError)
            .attach_printable("Error building paraswap request")?;

        let response = self
            .client
            .execute(request)
            .await
            .change_context(Error::QuoteFailed(QuoteErrorReason::UpstreamError))
            .attach_printable("Error in paraswap request")?;

        handle_reqwest_response(response)
            .await
            .map_err(classify_api_error)
    }

    pub async fn prices(&self, request: GetPriceRouteRequest) -> SdkResult<GetPriceRouteResponse> {
        let query = serde_json::to_value(request).change_context(Error::ParseError)?;
        self.send_request("/prices", Some(query), None, HttpMethod::GET)
            .await
    }

    pub async fn transactions(
        &self,
        request: TransactionsRequest,
    ) -> SdkResult<TransactionsResponse> {
        let uri_path = format!("/transactions/{}", request.network);
        let query = serde_json::to_value(request.query_params).change_context(Error::ParseError)?;
        let body = serde_json::to_value(request.body_params).change_context(Error::ParseError)?;
        self.send_request(&uri_path, Some(query), Some(body), HttpMethod::POST)
            .await
    }

    /// Prices the swap, then builds its calldata with the slippage bound applied.
    ///
    /// Selling: the minimum received is `destAmount * (1 - slippage)`.
    /// Buying: the maximum spent is `srcAmount * (1 + slippage)`.
    pub async fn quote(&self, request: &SwapRequest) -> SdkResult<Option<QuoteResult>> {
        if !is_chain_supported(request.chain) {
            return Ok(None);
        }

        let side = match request.amount {
            SwapAmount::Spend(_) => ParaswapSide::SELL,
            SwapAmount::Buy(_) => ParaswapSide::BUY,
        };
        let src_token = update_paraswap_native_token(request.spend_token).to_string();
        let dest_token = update_paraswap_native_token(request.buy_token).to_string();

        let prices = self
            .prices(GetPriceRouteRequest {
                src_token: src_token.clone(),
                src_decimals: request.spend_token_decimals,
                dest_token: dest_token.clone(),
                dest_decimals: request.buy_token_decimals,
                amount: request.amount.value().to_string(),
                side,
                network: request.chain.chain_id(),
                user_address: request.user_address.map(|a| a.to_string()),
                exclude_dexs: Some(PARASWAP_EXCLUDED_DEXS.to_string()),
            })
            .await?;

        let price_route: PriceRoute = serde_json::from_value(prices.price_route.clone())
            .change_context(Error::QuoteFailed(QuoteErrorReason::InvalidResponse))
            .attach_printable("Failed to deserialize paraswap price route")?;

        let (src_amount, dest_amount) = match side {
            ParaswapSide::SELL => (
                price_route.src_amount,
                safe_mult(price_route.dest_amount, 1.0 - request.slippage)?,
            ),
            ParaswapSide::BUY => (
                safe_mult(price_route.src_amount, 1.0 + request.slippage)?,
                price_route.dest_amount,
            ),
        };
        debug!(
            "Paraswap route {} -> {}: {} for {} (bounded {} for {})",
            src_token,
            dest_token,
            price_route.src_amount,
            price_route.dest_amount,
            src_amount,
            dest_amount
        );

        let transaction = self
            .transactions(TransactionsRequest {
                network: request.chain.chain_id(),
                query_params: TransactionsQueryParams {
                    ignore_checks: true,
                    ignore_gas_estimate: true,
                },
                body_params: TransactionsBodyParams {
                    src_token,
                    src_decimals: request.spend_token_decimals,
                    dest_token,
                    dest_decimals: request.buy_token_decimals,
                    src_amount: src_amount.to_string(),
                    dest_amount: dest_amount.to_string(),
                    price_route: prices.price_route,
                    user_address: request.user_address.unwrap_or(Address::ZERO).to_string(),
                },
            })
            .await?;

        paraswap_to_quote_result(&price_route, transaction, src_amount, dest_amount).map(Some)
    }
}

fn paraswap_to_quote_result(
    price_route: &PriceRoute,
    transaction: TransactionsResponse,
    max_src_amount: U256,
    min_dest_amount: U256,
) -> SdkResult<QuoteResult> {
    let estimated_price_impact = match (&price_route.src_usd, &price_route.dest_usd) {
        (Some(src_usd), Some(dest_usd)) => price_impact_from_usd(src_usd, dest_usd).ok(),
        _ => None,
    };

    Ok(QuoteResult {
        aggregator: AggregatorType::ParaSwap,
        chain_id: price_route.network,
        price: normalized_price(
            price_route.dest_amount,
            price_route.src_amount,
            price_route.src_decimals,
        )?,
        guaranteed_price: normalized_price(
            min_dest_amount,
            max_src_amount,
            price_route.src_decimals,
        )?,
        estimated_price_impact,
        to: transaction.to,
        data: transaction.data,
        value: transaction.value,
        protocol_fee: U256::from(price_route.partner_fee.max(0.0) as u64),
        buy_token: price_route.dest_token,
        sell_token: price_route.src_token,
        buy_amount: price_route.dest_amount,
        sell_amount: price_route.src_amount,
        allowance_target: price_route.token_transfer_proxy,
    })
}

#[async_trait]
impl DexAggregator for ParaswapAggregator {
    fn aggregator_type(&self) -> AggregatorType {
        AggregatorType::ParaSwap
    }

    async fn fetch_quote(
        &self,
        request: &SwapRequest,
    ) -> Result<Option<QuoteResult>, FetchFailure> {
        self.quote(request)
            .await
            .map_err(|report| FetchFailure::from_report(self.aggregator_type(), &report))
    }
}
