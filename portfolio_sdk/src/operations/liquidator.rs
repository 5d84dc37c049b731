use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::debug;

use crate::contracts::{CallData, INestedFactory};
use crate::error::SdkResult;
use crate::operations::HasOrders;
use crate::orders::batch::build_output_batch;
use crate::orders::{FeesOn, OrderCollection, OrderKind};
use crate::tools::{PortfolioReader, PortfolioTools};

/// Sells every holding of a portfolio into one token sent to the wallet
pub struct PortfolioLiquidator {
    orders: OrderCollection,
    reader: Arc<dyn PortfolioReader>,
    nft_id: U256,
    received_token: Address,
    slippage: f64,
}

impl PortfolioLiquidator {
    pub fn new(
        tools: Arc<PortfolioTools>,
        reader: Arc<dyn PortfolioReader>,
        nft_id: U256,
        received_token: Address,
        slippage: f64,
    ) -> SdkResult<Self> {
        let received_token = tools.wrap(received_token)?;
        Ok(Self {
            orders: OrderCollection::new(tools),
            reader,
            nft_id,
            received_token,
            slippage,
        })
    }

    pub fn nft_id(&self) -> U256 {
        self.nft_id
    }

    pub fn received_token(&self) -> Address {
        self.received_token
    }

    /// Replaces the orders with one per current holding, each selling the
    /// whole held amount. A token listed twice in the holdings is rejected.
    pub async fn refresh_assets(&mut self) -> SdkResult<()> {
        let holdings = self.reader.token_holdings(self.nft_id).await?;
        let mut orders = OrderCollection::new(self.orders.tools().clone());
        for (token, amount) in holdings {
            if token == self.received_token {
                debug!("Keeping {amount} of {token}, already the received token");
                continue;
            }
            orders.ensure_unique_input(token)?;
            orders
                .push(
                    token,
                    self.received_token,
                    self.slippage,
                    FeesOn::Output,
                    OrderKind::Exit,
                )?
                .set_input_amount(amount);
        }
        self.orders = orders;
        Ok(())
    }
}

#[async_trait]
impl HasOrders for PortfolioLiquidator {
    fn order_collection(&self) -> &OrderCollection {
        &self.orders
    }

    fn order_collection_mut(&mut self) -> &mut OrderCollection {
        &mut self.orders
    }

    async fn build_call_data(&mut self) -> SdkResult<CallData> {
        let batch = build_output_batch(
            &mut self.orders,
            self.received_token,
            false,
            "Nothing to liquidate",
        )
        .await?;
        let data = INestedFactory::processOutputOrdersCall {
            nftId: self.nft_id,
            batchedOrders: vec![batch],
        }
        .abi_encode();
        Ok(CallData::new(self.orders.tools().factory_address(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::collections::HashMap;

    use crate::error::{Error, QuoteErrorReason};
    use crate::routers::competition::tests::{FakeAggregator, FakeBehavior, SUSHI, USDC};
    use crate::routers::{AggregatorType, DexAggregator};
    use crate::tools::tests::{FakeChain, tools_with};

    const WMATIC: Address = address!("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");

    fn liquidator(
        holdings: Vec<(Address, U256)>,
        behavior: FakeBehavior,
    ) -> (PortfolioLiquidator, Arc<FakeAggregator>) {
        let aggregator = FakeAggregator::new(AggregatorType::ParaSwap, behavior);
        let chain = Arc::new(FakeChain {
            decimals: HashMap::from([(USDC, 6)]),
            holdings,
            ..Default::default()
        });
        let tools = tools_with(
            chain,
            vec![aggregator.clone() as Arc<dyn DexAggregator>],
            None,
        );
        let liquidator = PortfolioLiquidator::new(
            tools.clone(),
            tools as Arc<dyn PortfolioReader>,
            U256::from(77),
            USDC,
            0.01,
        )
        .unwrap();
        (liquidator, aggregator)
    }

    #[tokio::test]
    async fn test_liquidate_all_holdings() {
        let (mut liquidator, aggregator) = liquidator(
            vec![
                (SUSHI, U256::from(1_000u64)),
                (USDC, U256::from(5u64)),
                (WMATIC, U256::from(2_000u64)),
            ],
            FakeBehavior::Rate(1, 1),
        );
        liquidator.refresh_assets().await.unwrap();
        assert_eq!(liquidator.orders().len(), 2);
        assert_eq!(aggregator.calls(), 0);

        let call = liquidator.build_call_data().await.unwrap();
        let decoded = INestedFactory::processOutputOrdersCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.nftId, U256::from(77));
        let batch = &decoded.batchedOrders[0];
        assert!(!batch.toReserve);
        assert_eq!(batch.outputToken, USDC);
        assert_eq!(batch.amounts, vec![U256::from(1_000u64), U256::from(2_000u64)]);
        assert_eq!(
            batch.orders.iter().map(|o| o.token).collect::<Vec<_>>(),
            vec![SUSHI, WMATIC]
        );
    }

    #[tokio::test]
    async fn test_refresh_replaces_orders() {
        let (mut liquidator, _) =
            liquidator(vec![(SUSHI, U256::from(1_000u64))], FakeBehavior::Rate(1, 1));
        liquidator.refresh_assets().await.unwrap();
        liquidator.refresh_assets().await.unwrap();
        assert_eq!(liquidator.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_holdings_are_rejected() {
        let (mut liquidator, _) = liquidator(
            vec![(SUSHI, U256::from(1_000u64)), (SUSHI, U256::from(5u64))],
            FakeBehavior::Rate(1, 1),
        );
        let err = liquidator.refresh_assets().await.unwrap_err();
        assert!(matches!(err.current_context(), Error::DuplicateOrder(_)));
    }

    #[tokio::test]
    async fn test_empty_portfolio() {
        let (mut liquidator, _) = liquidator(vec![], FakeBehavior::Rate(1, 1));
        liquidator.refresh_assets().await.unwrap();
        let err = liquidator.build_call_data().await.unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::NothingToDo("Nothing to liquidate".to_string())
        );
    }

    #[tokio::test]
    async fn test_quote_failure_surfaces() {
        let (mut liquidator, _) = liquidator(
            vec![(SUSHI, U256::from(1_000u64))],
            FakeBehavior::Fail(QuoteErrorReason::InsufficientAssetLiquidity),
        );
        liquidator.refresh_assets().await.unwrap();
        let err = liquidator.build_call_data().await.unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::QuoteFailed(QuoteErrorReason::InsufficientAssetLiquidity)
        );
    }
}
