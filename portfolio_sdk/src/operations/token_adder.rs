use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use portfolio_models::constants::chains::{NATIVE_TOKEN, is_native_token};
use tracing::info;

use crate::contracts::{CallData, IERC20, INestedFactory};
use crate::error::SdkResult;
use crate::operations::HasOrders;
use crate::orders::batch::build_input_batch;
use crate::orders::{FeesOn, OrderCollection, OrderKind, TokenOrder};
use crate::signer::TransactionReceipt;
use crate::tools::PortfolioTools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdderTarget {
    /// Mints a new portfolio
    NewPortfolio,
    Portfolio(U256),
}

/// ERC20 contract of the spent token
pub struct Erc20Handle {
    tools: Arc<PortfolioTools>,
    address: Address,
}

impl Erc20Handle {
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> SdkResult<U256> {
        self.tools
            .read(self.address, IERC20::allowanceCall { owner, spender })
            .await
    }

    pub fn approve_call(&self, spender: Address, amount: U256) -> CallData {
        CallData::new(
            self.address,
            IERC20::approveCall { spender, amount }.abi_encode(),
        )
    }
}

/// Buys tokens with a budget taken from the wallet, into a new or an
/// existing portfolio. The factory takes its fee on the budget.
pub struct PortfolioTokenAdder {
    orders: OrderCollection,
    spent_token: Address,
    target: AdderTarget,
    token_contract: OnceCell<Erc20Handle>,
}

impl PortfolioTokenAdder {
    pub fn new(tools: Arc<PortfolioTools>, spent_token: Address, target: AdderTarget) -> Self {
        let spent_token = if is_native_token(&spent_token) {
            NATIVE_TOKEN
        } else {
            spent_token
        };
        Self {
            orders: OrderCollection::new(tools),
            spent_token,
            target,
            token_contract: OnceCell::new(),
        }
    }

    pub fn spent_token(&self) -> Address {
        self.spent_token
    }

    pub fn target(&self) -> AdderTarget {
        self.target
    }

    fn tools(&self) -> &Arc<PortfolioTools> {
        self.orders.tools()
    }

    fn token_contract(&self) -> &Erc20Handle {
        self.token_contract.get_or_init(|| Erc20Handle {
            tools: self.orders.tools().clone(),
            address: self.spent_token,
        })
    }

    fn spends_native(&self) -> bool {
        self.spent_token == NATIVE_TOKEN
    }

    /// Adds an order buying `token` with part of the budget.
    /// The budget part is set on the returned order.
    pub fn add_token(&mut self, token: Address, slippage: f64) -> SdkResult<&mut TokenOrder> {
        let input = self.tools().wrap(self.spent_token)?;
        let output = self.tools().wrap(token)?;
        self.orders.ensure_unique_output(output)?;
        self.orders
            .push(input, output, slippage, FeesOn::Input, OrderKind::Entry)
    }

    /// Sum of the budgets of every order, fees included
    pub async fn total_budget(&mut self) -> SdkResult<U256> {
        self.orders.total_input().await
    }

    /// Whether the factory may already spend the whole budget
    pub async fn is_approved(&mut self) -> SdkResult<bool> {
        if self.spends_native() {
            return Ok(true);
        }
        let user = self.tools().signer()?.get_address().await?;
        let factory = self.tools().factory_address();
        let total = self.total_budget().await?;
        let allowance = self.token_contract().allowance(user, factory).await?;
        Ok(allowance >= total)
    }

    /// Approves the factory on the spent token, unlimited by default.
    ///
    /// Nothing is sent when spending the native currency.
    pub async fn approve(&self, amount: Option<U256>) -> SdkResult<Option<TransactionReceipt>> {
        if self.spends_native() {
            return Ok(None);
        }
        let signer = self.tools().signer()?.clone();
        let call = self
            .token_contract()
            .approve_call(self.tools().factory_address(), amount.unwrap_or(U256::MAX));
        info!("Approving factory on {}", self.spent_token);
        signer.send_transaction(call).await.map(Some)
    }
}

#[async_trait]
impl HasOrders for PortfolioTokenAdder {
    fn order_collection(&self) -> &OrderCollection {
        &self.orders
    }

    fn order_collection_mut(&mut self) -> &mut OrderCollection {
        &mut self.orders
    }

    async fn build_call_data(&mut self) -> SdkResult<CallData> {
        let batch =
            build_input_batch(&mut self.orders, self.spent_token, false, "Nothing to add").await?;
        let value = if self.spends_native() {
            batch.amount
        } else {
            U256::ZERO
        };
        let data = match self.target {
            AdderTarget::NewPortfolio => INestedFactory::createCall {
                originalTokenId: U256::ZERO,
                batchedOrders: vec![batch],
            }
            .abi_encode(),
            AdderTarget::Portfolio(nft_id) => INestedFactory::addTokensCall {
                nftId: nft_id,
                batchedOrders: vec![batch],
            }
            .abi_encode(),
        };
        Ok(CallData::new(self.tools().factory_address(), data).with_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::collections::HashMap;

    use crate::contracts::to_bytes32;
    use crate::error::Error;
    use crate::operations::tests::FakeSigner;
    use crate::routers::competition::tests::{FakeAggregator, FakeBehavior, SUSHI, USDC};
    use crate::routers::{AggregatorType, DexAggregator};
    use crate::signer::Signer;
    use crate::tools::tests::{FakeChain, tools_with};

    const WMATIC: Address = address!("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");
    const USER: Address = address!("0x000000000000000000000000000000000000beef");

    fn setup(
        allowance: U256,
        signer: Option<Arc<FakeSigner>>,
    ) -> (Arc<PortfolioTools>, Arc<FakeAggregator>) {
        let aggregator = FakeAggregator::new(AggregatorType::ZeroEx, FakeBehavior::Rate(2, 1));
        let chain = Arc::new(FakeChain {
            decimals: HashMap::from([(USDC, 6)]),
            allowance,
            ..Default::default()
        });
        let tools = tools_with(
            chain,
            vec![aggregator.clone() as Arc<dyn DexAggregator>],
            signer.map(|s| s as Arc<dyn Signer>),
        );
        (tools, aggregator)
    }

    #[tokio::test]
    async fn test_create_portfolio_call_data() {
        let (tools, _) = setup(U256::ZERO, None);
        let factory = tools.factory_address();
        let mut adder = PortfolioTokenAdder::new(tools, USDC, AdderTarget::NewPortfolio);
        adder
            .add_token(SUSHI, 0.01)
            .unwrap()
            .set_input_amount(U256::from(1_000_000u64));
        adder
            .add_token(WMATIC, 0.01)
            .unwrap()
            .set_input_amount(U256::from(2_000_000u64));

        let call = adder.build_call_data().await.unwrap();
        assert_eq!(call.to, factory);
        assert_eq!(call.value, U256::ZERO);

        let decoded = INestedFactory::createCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.originalTokenId, U256::ZERO);
        let batch = &decoded.batchedOrders[0];
        assert_eq!(batch.inputToken, USDC);
        assert_eq!(batch.amount, U256::from(3_000_000u64));
        assert!(!batch.fromReserve);
        assert_eq!(
            batch.orders.iter().map(|o| o.token).collect::<Vec<_>>(),
            vec![SUSHI, WMATIC]
        );
        assert!(batch.orders.iter().all(|o| o.operator == to_bytes32("ZeroEx")));
    }

    #[tokio::test]
    async fn test_add_tokens_with_native_budget() {
        let (tools, _) = setup(U256::ZERO, None);
        let mut adder =
            PortfolioTokenAdder::new(tools, Address::ZERO, AdderTarget::Portfolio(U256::from(12)));
        assert_eq!(adder.spent_token(), NATIVE_TOKEN);
        adder
            .add_token(USDC, 0.01)
            .unwrap()
            .set_input_amount(U256::from(10u64).pow(U256::from(18)));

        let call = adder.build_call_data().await.unwrap();
        assert_eq!(call.value, U256::from(10u64).pow(U256::from(18)));
        let decoded = INestedFactory::addTokensCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.nftId, U256::from(12));
        assert_eq!(decoded.batchedOrders[0].inputToken, NATIVE_TOKEN);
        // swaps are quoted from the wrapped token
        assert_eq!(adder.orders()[0].input_token(), WMATIC);
    }

    #[tokio::test]
    async fn test_add_token_validation() {
        let (tools, aggregator) = setup(U256::ZERO, None);
        let mut adder = PortfolioTokenAdder::new(tools, USDC, AdderTarget::NewPortfolio);

        let err = adder.add_token(USDC, 0.01).err().unwrap();
        assert_eq!(err.current_context(), &Error::SelfSwap);

        adder.add_token(SUSHI, 0.01).unwrap();
        adder.add_token(WMATIC, 0.01).unwrap();
        let err = adder.add_token(SUSHI, 0.02).err().unwrap();
        assert!(matches!(err.current_context(), Error::DuplicateOrder(_)));

        assert_eq!(adder.orders().len(), 2);
        assert_eq!(aggregator.calls(), 0);
    }

    #[tokio::test]
    async fn test_nothing_to_add() {
        let (tools, _) = setup(U256::ZERO, None);
        let mut adder = PortfolioTokenAdder::new(tools, USDC, AdderTarget::NewPortfolio);
        let err = adder.build_call_data().await.unwrap_err();
        assert!(matches!(err.current_context(), Error::NothingToDo(_)));
    }

    #[tokio::test]
    async fn test_approval_flow() {
        let signer = Arc::new(FakeSigner::new(USER));
        let (tools, _) = setup(U256::from(500u64), Some(signer.clone()));
        let factory = tools.factory_address();
        let mut adder = PortfolioTokenAdder::new(tools, USDC, AdderTarget::NewPortfolio);
        adder
            .add_token(SUSHI, 0.01)
            .unwrap()
            .set_input_amount(U256::from(1_000u64));

        assert!(!adder.is_approved().await.unwrap());

        adder.approve(None).await.unwrap().unwrap();
        let receipt = adder.execute().await.unwrap();
        assert!(receipt.success);

        let sent = signer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, USDC);
        let approve = IERC20::approveCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(approve.spender, factory);
        assert_eq!(approve.amount, U256::MAX);
        assert_eq!(sent[1].to, factory);
    }

    #[tokio::test]
    async fn test_native_budget_needs_no_approval() {
        let signer = Arc::new(FakeSigner::new(USER));
        let (tools, _) = setup(U256::ZERO, Some(signer.clone()));
        let mut adder = PortfolioTokenAdder::new(tools, NATIVE_TOKEN, AdderTarget::NewPortfolio);
        assert!(adder.is_approved().await.unwrap());
        assert_eq!(adder.approve(None).await.unwrap(), None);
        assert!(signer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_execute_without_signer() {
        let (tools, aggregator) = setup(U256::ZERO, None);
        let mut adder = PortfolioTokenAdder::new(tools, USDC, AdderTarget::NewPortfolio);
        adder
            .add_token(SUSHI, 0.01)
            .unwrap()
            .set_input_amount(U256::from(1_000u64));
        let err = adder.execute().await.unwrap_err();
        assert_eq!(err.current_context(), &Error::MissingSigner);
        assert_eq!(aggregator.calls(), 0);
    }
}
