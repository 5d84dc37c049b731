use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::contracts::{CallData, INestedFactory};
use crate::error::SdkResult;
use crate::operations::HasOrders;
use crate::orders::batch::build_output_batch;
use crate::orders::{FeesOn, OrderCollection, OrderKind, TokenOrder};
use crate::tools::PortfolioTools;

/// Swaps several portfolio tokens into a single one, kept in the portfolio.
pub struct MultiToSingleSwapper {
    orders: OrderCollection,
    nft_id: U256,
    received_token: Address,
}

impl MultiToSingleSwapper {
    pub fn new(
        tools: Arc<PortfolioTools>,
        nft_id: U256,
        received_token: Address,
    ) -> SdkResult<Self> {
        let received_token = tools.wrap(received_token)?;
        Ok(Self {
            orders: OrderCollection::new(tools),
            nft_id,
            received_token,
        })
    }

    pub fn nft_id(&self) -> U256 {
        self.nft_id
    }

    pub fn received_token(&self) -> Address {
        self.received_token
    }

    /// Adds an order selling `token` into the received token
    pub fn swap_from(&mut self, token: Address, slippage: f64) -> SdkResult<&mut TokenOrder> {
        let input = self.orders.tools().wrap(token)?;
        self.orders.push(
            input,
            self.received_token,
            slippage,
            FeesOn::Output,
            OrderKind::Entry,
        )
    }
}

#[async_trait]
impl HasOrders for MultiToSingleSwapper {
    fn order_collection(&self) -> &OrderCollection {
        &self.orders
    }

    fn order_collection_mut(&mut self) -> &mut OrderCollection {
        &mut self.orders
    }

    async fn build_call_data(&mut self) -> SdkResult<CallData> {
        let batch =
            build_output_batch(&mut self.orders, self.received_token, true, "Nothing to swap")
                .await?;
        let data = INestedFactory::processOutputOrdersCall {
            nftId: self.nft_id,
            batchedOrders: vec![batch],
        }
        .abi_encode();
        Ok(CallData::new(self.orders.tools().factory_address(), data))
    }
}
