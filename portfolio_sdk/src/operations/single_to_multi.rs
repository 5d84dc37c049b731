use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::contracts::{CallData, INestedFactory};
use crate::error::SdkResult;
use crate::operations::HasOrders;
use crate::orders::batch::build_input_batch;
use crate::orders::{FeesOn, OrderCollection, OrderKind, TokenOrder};
use crate::tools::PortfolioTools;

/// Swaps part of one portfolio token into several others, inside the portfolio.
pub struct SingleToMultiSwapper {
    orders: OrderCollection,
    nft_id: U256,
    spent_token: Address,
}

impl SingleToMultiSwapper {
    pub fn new(tools: Arc<PortfolioTools>, nft_id: U256, spent_token: Address) -> SdkResult<Self> {
        let spent_token = tools.wrap(spent_token)?;
        Ok(Self {
            orders: OrderCollection::new(tools),
            nft_id,
            spent_token,
        })
    }

    pub fn nft_id(&self) -> U256 {
        self.nft_id
    }

    pub fn spent_token(&self) -> Address {
        self.spent_token
    }

    /// Adds an order buying `token` with the spent token
    pub fn swap_to(&mut self, token: Address, slippage: f64) -> SdkResult<&mut TokenOrder> {
        let output = self.orders.tools().wrap(token)?;
        self.orders.ensure_unique_output(output)?;
        self.orders.push(
            self.spent_token,
            output,
            slippage,
            FeesOn::Input,
            OrderKind::Entry,
        )
    }
}

#[async_trait]
impl HasOrders for SingleToMultiSwapper {
    fn order_collection(&self) -> &OrderCollection {
        &self.orders
    }

    fn order_collection_mut(&mut self) -> &mut OrderCollection {
        &mut self.orders
    }

    async fn build_call_data(&mut self) -> SdkResult<CallData> {
        let batch =
            build_input_batch(&mut self.orders, self.spent_token, true, "Nothing to swap").await?;
        let data = INestedFactory::addTokensCall {
            nftId: self.nft_id,
            batchedOrders: vec![batch],
        }
        .abi_encode();
        Ok(CallData::new(self.orders.tools().factory_address(), data))
    }
}
