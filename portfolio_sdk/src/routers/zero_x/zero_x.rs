use super::{
    ZERO_X_QUOTE_PATH, requests::ZeroXGetQuoteRequest, responses::ZeroXGetQuoteResponse,
    update_zero_x_native_token, zero_x_base_url,
};
use crate::{
    error::{Error, QuoteErrorReason, SdkResult},
    routers::{
        AggregatorType, DexAggregator, FetchFailure, QuoteResult, SwapAmount, SwapRequest,
        error_envelope::classify_api_error,
    },
    utils::number_conversion::{decimal_string_to_scaled_u256, normalized_price},
};
use async_trait::async_trait;
use error_stack::ResultExt as _;
use portfolio_models::network::client_rate_limit::Client;
use portfolio_models::network::http::{handle_reqwest_response, value_to_sorted_querystring};
use tracing::debug;

/// 0x swap API (v1) adapter
#[derive(Debug, Clone)]
pub struct ZeroXAggregator {
    client: Client,
    api_key: Option<String>,
    /// Replaces the per-chain host, for every chain
    base_url: Option<String>,
    excluded_sources: Option<String>,
}

impl ZeroXAggregator {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: None,
            excluded_sources: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_excluded_sources(mut self, sources: &[&str]) -> Self {
        self.excluded_sources = (!sources.is_empty()).then(|| sources.join(","));
        self
    }

    fn base_url(&self, request: &SwapRequest) -> Option<String> {
        zero_x_base_url(request.chain)
            .map(|url| self.base_url.clone().unwrap_or_else(|| url.to_string()))
    }

    pub async fn get_quote(
        &self,
        base_url: &str,
        request: ZeroXGetQuoteRequest,
    ) -> SdkResult<ZeroXGetQuoteResponse> {
        let query = serde_json::to_value(request).change_context(Error::ParseError)?;
        let query_string = value_to_sorted_querystring(&query).change_context(Error::ModelsError)?;
        let url = format!("{base_url}{ZERO_X_QUOTE_PATH}?{query_string}");

        let mut request = self.client.inner_client().get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("0x-api-key", api_key);
        }
        let request = request
            .build()
            .change_context(Error::ReqwestError)
            .attach_printable("Error building 0x request")?;

        let response = self
            .client
            .execute(request)
            .await
            .change_context(Error::QuoteFailed(QuoteErrorReason::UpstreamError))
            .attach_printable("Error in 0x request")?;

        handle_reqwest_response(response)
            .await
            .map_err(classify_api_error)
    }

    /// 0x applies `slippagePercentage` itself: the returned calldata already
    /// carries the guaranteed price.
    pub async fn quote(&self, request: &SwapRequest) -> SdkResult<Option<QuoteResult>> {
        let Some(base_url) = self.base_url(request) else {
            return Ok(None);
        };

        let (sell_amount, buy_amount) = match request.amount {
            SwapAmount::Spend(amount) => (Some(amount.to_string()), None),
            SwapAmount::Buy(amount) => (None, Some(amount.to_string())),
        };

        let response = self
            .get_quote(
                &base_url,
                ZeroXGetQuoteRequest {
                    sell_token: update_zero_x_native_token(request.spend_token).to_string(),
                    buy_token: update_zero_x_native_token(request.buy_token).to_string(),
                    sell_amount,
                    buy_amount,
                    slippage_percentage: request.slippage,
                    taker_address: request.user_address.map(|a| a.to_string()),
                    excluded_sources: self.excluded_sources.clone(),
                    skip_validation: true,
                },
            )
            .await?;
        debug!(
            "0x quote: {} {} for {} {}",
            response.sell_amount,
            response.sell_token_address,
            response.buy_amount,
            response.buy_token_address
        );

        zero_x_to_quote_result(response, request).map(Some)
    }
}

fn zero_x_to_quote_result(
    response: ZeroXGetQuoteResponse,
    request: &SwapRequest,
) -> SdkResult<QuoteResult> {
    let guaranteed_price =
        decimal_string_to_scaled_u256(&response.guaranteed_price, request.buy_token_decimals)
            .change_context(Error::QuoteFailed(QuoteErrorReason::InvalidResponse))?;

    Ok(QuoteResult {
        aggregator: AggregatorType::ZeroEx,
        chain_id: response.chain_id,
        price: normalized_price(
            response.buy_amount,
            response.sell_amount,
            request.spend_token_decimals,
        )?,
        guaranteed_price,
        estimated_price_impact: response.estimated_price_impact,
        to: response.to,
        data: response.data,
        value: response.value,
        protocol_fee: response.protocol_fee,
        buy_token: response.buy_token_address,
        sell_token: response.sell_token_address,
        buy_amount: response.buy_amount,
        sell_amount: response.sell_amount,
        allowance_target: response.allowance_target,
    })
}

#[async_trait]
impl DexAggregator for ZeroXAggregator {
    fn aggregator_type(&self) -> AggregatorType {
        AggregatorType::ZeroEx
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
