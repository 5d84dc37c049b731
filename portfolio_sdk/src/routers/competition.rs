use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use error_stack::report;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{Error, QuoteErrorReason, SdkResult};
use crate::routers::{AggregatorType, DexAggregator, FetchFailure, QuoteResult, SwapRequest};
use crate::utils::uint::cmp_ratios;

/// Runs every allowed aggregator concurrently and keeps the best quote.
///
/// "Best" is the highest bought amount per sold unit. On equal ratios the
/// aggregator registered first wins.
pub struct QuoteResolver {
    aggregators: Vec<Arc<dyn DexAggregator>>,
}

impl QuoteResolver {
    pub fn new(aggregators: Vec<Arc<dyn DexAggregator>>) -> Self {
        Self { aggregators }
    }

    pub fn aggregators(&self) -> impl Iterator<Item = AggregatorType> + '_ {
        self.aggregators.iter().map(|a| a.aggregator_type())
    }

    /// `allowed` restricts the competition; `None` lets every aggregator compete.
    ///
    /// Failures of individual aggregators are absorbed. The call only fails when
    /// no aggregator produced a quote:
    /// - `NO_AGGREGATOR_AVAILABLE` when none was eligible or all declined the chain,
    /// - `INSUFFICIENT_ASSET_LIQUIDITY` when any of them reported it,
    /// - the first failure's reason otherwise.
    pub async fn resolve(
        &self,
        request: &SwapRequest,
        allowed: Option<&HashSet<AggregatorType>>,
    ) -> SdkResult<QuoteResult> {
        let eligible: Vec<&Arc<dyn DexAggregator>> = self
            .aggregators
            .iter()
            .filter(|a| allowed.is_none_or(|allowed| allowed.contains(&a.aggregator_type())))
            .collect();

        let outcomes = join_all(eligible.iter().map(|a| a.fetch_quote(request))).await;

        let mut best: Option<QuoteResult> = None;
        let mut failures: Vec<FetchFailure> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Some(quote)) => {
                    let better = best.as_ref().is_none_or(|current| {
                        cmp_ratios(
                            quote.buy_amount,
                            quote.sell_amount,
                            current.buy_amount,
                            current.sell_amount,
                        ) == Ordering::Greater
                    });
                    if better {
                        best = Some(quote);
                    }
                }
                Ok(None) => {}
                Err(failure) => {
                    warn!("{failure}");
                    failures.push(failure);
                }
            }
        }

        if let Some(quote) = best {
            debug!(
                "Best quote from {}: {} for {}",
                quote.aggregator, quote.sell_amount, quote.buy_amount
            );
            return Ok(quote);
        }

        let reason = if failures.is_empty() {
            QuoteErrorReason::NoAggregatorAvailable
        } else if failures
            .iter()
            .any(|f| f.reason == QuoteErrorReason::InsufficientAssetLiquidity)
        {
            QuoteErrorReason::InsufficientAssetLiquidity
        } else {
            failures[0].reason
        };

        let mut error = report!(Error::QuoteFailed(reason));
        for failure in failures {
            error = error.attach_printable(failure.to_string());
        }
        Err(error)
    }
}
