pub mod competition;
pub mod error_envelope;
pub mod paraswap;
pub mod zero_x;

use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use error_stack::{FrameKind, Report};
use portfolio_models::constants::chains::Chain;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{Error, QuoteErrorReason, ReportDisplayExt};

/// Aggregators the SDK knows how to query, in priority order.
///
/// The display name is also the operator name registered in the factory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum AggregatorType {
    #[strum(serialize = "Paraswap")]
    #[serde(rename = "Paraswap")]
    ParaSwap,
    #[strum(serialize = "ZeroEx")]
    #[serde(rename = "ZeroEx")]
    ZeroEx,
}

/// Exactly one side of a swap is fixed by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAmount {
    /// Spend exactly this amount of the spent token
    Spend(U256),
    /// Receive exactly this amount of the bought token
    Buy(U256),
}

impl SwapAmount {
    pub fn value(&self) -> U256 {
        match self {
            SwapAmount::Spend(amount) | SwapAmount::Buy(amount) => *amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub chain: Chain,
    pub spend_token: Address,
    pub buy_token: Address,
    pub spend_token_decimals: u8,
    pub buy_token_decimals: u8,
    pub amount: SwapAmount,
    /// Fraction in [0, 1)
    pub slippage: f64,
    /// Address that will execute the swap calldata
    pub user_address: Option<Address>,
}

/// Normalized quote, whatever the aggregator that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResult {
    pub aggregator: AggregatorType,
    pub chain_id: u32,
    /// Bought amount per unit of sold token, scaled by the sold token decimals
    pub price: U256,
    pub guaranteed_price: U256,
    pub estimated_price_impact: Option<Decimal>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub protocol_fee: U256,
    pub buy_token: Address,
    pub sell_token: Address,
    pub buy_amount: U256,
    pub sell_amount: U256,
    pub allowance_target: Address,
}

/// Failure of a single aggregator, absorbed by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub aggregator: AggregatorType,
    pub reason: QuoteErrorReason,
    pub message: String,
}

impl FetchFailure {
    pub fn from_report(aggregator: AggregatorType, report: &Report<Error>) -> Self {
        let reason = report
            .current_context()
            .quote_failure_reason()
            .unwrap_or(QuoteErrorReason::UpstreamError);
        let attachments = report.format();
        let mut message = if attachments.is_empty() {
            report.current_context().to_string()
        } else {
            attachments
        };
        // contexts below the current one carry the upstream cause (transport errors)
        let causes: Vec<String> = report
            .frames()
            .filter_map(|frame| match frame.kind() {
                FrameKind::Context(context) => Some(context.to_string()),
                FrameKind::Attachment(_) => None,
            })
            .skip(1)
            .collect();
        if !causes.is_empty() {
            message = format!("{message}: {}", causes.join(": "));
        }
        Self {
            aggregator,
            reason,
            message,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.aggregator, self.reason, self.message)
    }
}

/// A remote swap-quote provider.
///
/// `Ok(None)` means the aggregator does not serve the requested chain.
#[async_trait]
pub trait DexAggregator: Send + Sync {
    fn aggregator_type(&self) -> AggregatorType;

    async fn fetch_quote(&self, request: &SwapRequest)
    -> Result<Option<QuoteResult>, FetchFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::report;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_aggregator_names() {
        assert_eq!(AggregatorType::ParaSwap.to_string(), "Paraswap");
        assert_eq!(AggregatorType::ZeroEx.to_string(), "ZeroEx");
        assert_eq!(
            AggregatorType::from_str("Paraswap").unwrap(),
            AggregatorType::ParaSwap
        );
        assert!(AggregatorType::from_str("1inch").is_err());
    }

    #[test]
    fn test_aggregator_priority() {
        let order: Vec<AggregatorType> = AggregatorType::iter().collect();
        assert_eq!(order, vec![AggregatorType::ParaSwap, AggregatorType::ZeroEx]);
    }

    #[test]
    fn test_fetch_failure_from_report() {
        let report = report!(Error::QuoteFailed(
            QuoteErrorReason::InsufficientAssetLiquidity
        ))
        .attach_printable("No routes found with enough liquidity");
        let failure = FetchFailure::from_report(AggregatorType::ParaSwap, &report);
        assert_eq!(failure.reason, QuoteErrorReason::InsufficientAssetLiquidity);
        assert_eq!(failure.message, "No routes found with enough liquidity");

        let report = report!(Error::ReqwestError);
        let failure = FetchFailure::from_report(AggregatorType::ZeroEx, &report);
        assert_eq!(failure.reason, QuoteErrorReason::UpstreamError);
        assert_eq!(failure.message, "Reqwest error");
    }

    #[test]
    fn test_fetch_failure_keeps_underlying_cause() {
        let report = report!(Error::ReqwestError)
            .attach_printable("connection refused")
            .change_context(Error::QuoteFailed(QuoteErrorReason::UpstreamError))
            .attach_printable("Error in paraswap request");
        let failure = FetchFailure::from_report(AggregatorType::ParaSwap, &report);
        assert_eq!(failure.reason, QuoteErrorReason::UpstreamError);
        assert_eq!(
            failure.message,
            "connection refused Error in paraswap request: Reqwest error"
        );
    }
}
