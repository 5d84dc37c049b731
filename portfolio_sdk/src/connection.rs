use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::ResultExt;
use portfolio_models::constants::chains::Chain;
use portfolio_models::network::client_rate_limit::Client;
use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{Error, SdkResult};
use crate::operations::liquidator::PortfolioLiquidator;
use crate::operations::multi_to_single::MultiToSingleSwapper;
use crate::operations::seller::PortfolioSeller;
use crate::operations::single_to_multi::SingleToMultiSwapper;
use crate::operations::token_adder::{AdderTarget, PortfolioTokenAdder};
use crate::routers::DexAggregator;
use crate::routers::competition::QuoteResolver;
use crate::routers::paraswap::paraswap::ParaswapAggregator;
use crate::routers::zero_x::zero_x::ZeroXAggregator;
use crate::signer::{ChainReader, Signer};
use crate::tools::{PortfolioReader, PortfolioTools};
use crate::utils::portfolio_id::infer_nft_id;

/// Entry point of the SDK, bound to one chain.
///
/// Every operation created from a connection shares its quote resolver,
/// its token metadata cache and its signer.
pub struct PortfolioConnection {
    config: ConnectionConfig,
    tools: Arc<PortfolioTools>,
}

impl PortfolioConnection {
    /// Connects with the ParaSwap and 0x adapters, in that priority order
    pub fn connect(
        config: ConnectionConfig,
        reader: Arc<dyn ChainReader>,
        signer: Option<Arc<dyn Signer>>,
    ) -> SdkResult<Self> {
        let aggregators = default_aggregators(&config)?;
        Self::with_aggregators(config, aggregators, reader, signer)
    }

    pub fn with_aggregators(
        config: ConnectionConfig,
        aggregators: Vec<Arc<dyn DexAggregator>>,
        reader: Arc<dyn ChainReader>,
        signer: Option<Arc<dyn Signer>>,
    ) -> SdkResult<Self> {
        let tools = PortfolioTools::new(
            config.chain,
            QuoteResolver::new(aggregators),
            config.only_use_aggregators.clone(),
            reader,
            signer,
        )?;
        info!(
            "Connected to {} (factory {})",
            config.chain,
            tools.factory_address()
        );
        Ok(Self {
            config,
            tools: Arc::new(tools),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn chain(&self) -> Chain {
        self.config.chain
    }

    pub fn tools(&self) -> &Arc<PortfolioTools> {
        &self.tools
    }

    fn nft_id(&self, portfolio_id: &str) -> SdkResult<U256> {
        infer_nft_id(portfolio_id, self.config.chain)
    }

    /// Mints a new portfolio bought with `budget_token` from the wallet
    pub fn create_portfolio(&self, budget_token: Address) -> PortfolioTokenAdder {
        PortfolioTokenAdder::new(self.tools.clone(), budget_token, AdderTarget::NewPortfolio)
    }

    /// Buys more tokens into an existing portfolio, with `budget_token` from the wallet
    pub fn add_tokens_to_portfolio(
        &self,
        portfolio_id: &str,
        budget_token: Address,
    ) -> SdkResult<PortfolioTokenAdder> {
        let nft_id = self.nft_id(portfolio_id)?;
        Ok(PortfolioTokenAdder::new(
            self.tools.clone(),
            budget_token,
            AdderTarget::Portfolio(nft_id),
        ))
    }

    /// Swaps one token of the portfolio into several others
    pub fn swap_single_to_multi(
        &self,
        portfolio_id: &str,
        spent_token: Address,
    ) -> SdkResult<SingleToMultiSwapper> {
        let nft_id = self.nft_id(portfolio_id)?;
        SingleToMultiSwapper::new(self.tools.clone(), nft_id, spent_token)
    }

    /// Swaps several tokens of the portfolio into one
    pub fn swap_multi_to_single(
        &self,
        portfolio_id: &str,
        received_token: Address,
    ) -> SdkResult<MultiToSingleSwapper> {
        let nft_id = self.nft_id(portfolio_id)?;
        MultiToSingleSwapper::new(self.tools.clone(), nft_id, received_token)
    }

    /// Sells tokens of the portfolio, the proceeds go to the wallet
    pub fn sell_tokens_to_wallet(
        &self,
        portfolio_id: &str,
        received_token: Address,
    ) -> SdkResult<PortfolioSeller> {
        let nft_id = self.nft_id(portfolio_id)?;
        PortfolioSeller::new(self.tools.clone(), nft_id, received_token)
    }

    /// Sells every holding of the portfolio to the wallet. The orders are
    /// loaded from the current holdings.
    pub async fn liquidate_to_wallet_and_destroy(
        &self,
        portfolio_id: &str,
        received_token: Address,
        slippage: f64,
    ) -> SdkResult<PortfolioLiquidator> {
        let nft_id = self.nft_id(portfolio_id)?;
        let mut liquidator = PortfolioLiquidator::new(
            self.tools.clone(),
            self.tools.clone() as Arc<dyn PortfolioReader>,
            nft_id,
            received_token,
            slippage,
        )?;
        liquidator.refresh_assets().await?;
        Ok(liquidator)
    }

    /// Tokens held by a portfolio, with their amounts
    pub async fn get_assets(&self, portfolio_id: &str) -> SdkResult<Vec<(Address, U256)>> {
        let nft_id = self.nft_id(portfolio_id)?;
        self.tools.token_holdings(nft_id).await
    }
}

fn default_aggregators(config: &ConnectionConfig) -> SdkResult<Vec<Arc<dyn DexAggregator>>> {
    let paraswap_client = Client::new(config.paraswap_rate_limit)
        .change_context(Error::ModelsError)
        .attach_printable("Invalid ParaSwap rate limit")?;
    let paraswap = match &config.paraswap_base_url {
        Some(base_url) => ParaswapAggregator::with_base_url(paraswap_client, base_url.clone()),
        None => ParaswapAggregator::new(paraswap_client),
    };

    let zero_x_client = Client::new(config.zero_x_rate_limit)
        .change_context(Error::ModelsError)
        .attach_printable("Invalid 0x rate limit")?;
    let mut zero_x = ZeroXAggregator::new(zero_x_client, config.zero_x_api_key.clone());
    if let Some(base_url) = &config.zero_x_base_url {
        zero_x = zero_x.with_base_url(base_url.clone());
    }

    Ok(vec![Arc::new(paraswap), Arc::new(zero_x)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;
    use std::collections::HashSet;

    use crate::contracts::INestedFactory;
    use crate::operations::HasOrders;
    use crate::operations::tests::FakeSigner;
    use crate::routers::AggregatorType;
    use crate::routers::competition::tests::{FakeAggregator, FakeBehavior, SUSHI, USDC};
    use crate::tests::init_tracing_in_tests;
    use crate::tools::tests::FakeChain;

    const WMATIC: Address = address!("0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");

    fn connection(
        config: ConnectionConfig,
        holdings: Vec<(Address, U256)>,
        signer: Option<Arc<FakeSigner>>,
    ) -> (PortfolioConnection, Arc<FakeAggregator>, Arc<FakeAggregator>) {
        let paraswap = FakeAggregator::new(AggregatorType::ParaSwap, FakeBehavior::Rate(1, 1));
        let zero_x = FakeAggregator::new(AggregatorType::ZeroEx, FakeBehavior::Rate(2, 1));
        let chain = Arc::new(FakeChain {
            holdings,
            ..Default::default()
        });
        let connection = PortfolioConnection::with_aggregators(
            config,
            vec![
                paraswap.clone() as Arc<dyn DexAggregator>,
                zero_x.clone() as Arc<dyn DexAggregator>,
            ],
            chain,
            signer.map(|s| s as Arc<dyn Signer>),
        )
        .unwrap();
        (connection, paraswap, zero_x)
    }

    #[test]
    fn test_connect_builds_default_aggregators() {
        let config = ConnectionConfig::new(Chain::Poly).with_aggregators(&[AggregatorType::ZeroEx]);
        let connection =
            PortfolioConnection::connect(config, Arc::new(FakeChain::default()), None).unwrap();
        assert_eq!(
            connection.tools().resolver().aggregators().collect::<Vec<_>>(),
            vec![AggregatorType::ParaSwap, AggregatorType::ZeroEx]
        );
        assert_eq!(
            connection.tools().allowed_aggregators(),
            Some(&HashSet::from([AggregatorType::ZeroEx]))
        );
    }

    #[test]
    fn test_connect_unsupported_chain() {
        let err = PortfolioConnection::connect(
            ConnectionConfig::new(Chain::Eth),
            Arc::new(FakeChain::default()),
            None,
        )
        .err()
        .unwrap();
        assert_eq!(
            err.current_context(),
            &Error::UnsupportedChain("eth".to_string())
        );
    }

    #[tokio::test]
    async fn test_only_use_aggregators_restricts_competition() {
        init_tracing_in_tests();
        let config =
            ConnectionConfig::new(Chain::Poly).with_aggregators(&[AggregatorType::ParaSwap]);
        let (connection, paraswap, zero_x) = connection(config, vec![], None);

        let mut adder = connection.create_portfolio(USDC);
        adder
            .add_token(SUSHI, 0.01)
            .unwrap()
            .set_input_amount(U256::from(1_000u64));
        let operator = adder.orders_mut()[0].operator().await.unwrap();

        assert_eq!(operator, AggregatorType::ParaSwap);
        assert_eq!(paraswap.calls(), 1);
        assert_eq!(zero_x.calls(), 0);
    }

    #[tokio::test]
    async fn test_best_aggregator_wins_without_restriction() {
        let (connection, _, _) = connection(ConnectionConfig::new(Chain::Poly), vec![], None);
        let mut swapper = connection.swap_single_to_multi("poly:3", USDC).unwrap();
        swapper
            .swap_to(SUSHI, 0.01)
            .unwrap()
            .set_input_amount(U256::from(1_000u64));
        let order = &mut swapper.orders_mut()[0];
        assert_eq!(order.operator().await.unwrap(), AggregatorType::ZeroEx);
        // 990 quoted after the 1% fee, at 2 for 1
        assert_eq!(order.output_qty().await.unwrap(), U256::from(1_980u64));
    }

    #[tokio::test]
    async fn test_portfolio_ids() {
        let (connection, _, _) = connection(ConnectionConfig::new(Chain::Poly), vec![], None);
        let adder = connection.add_tokens_to_portfolio("0x2a", USDC).unwrap();
        assert_eq!(adder.target(), AdderTarget::Portfolio(U256::from(42)));
        assert_eq!(
            connection
                .sell_tokens_to_wallet("42", USDC)
                .unwrap()
                .nft_id(),
            U256::from(42)
        );

        let err = connection.swap_multi_to_single("bsc:42", USDC).err().unwrap();
        assert!(matches!(err.current_context(), Error::InvalidPortfolioId(_)));
    }

    #[tokio::test]
    async fn test_get_assets_and_liquidate() {
        let holdings = vec![(SUSHI, U256::from(10u64)), (WMATIC, U256::from(20u64))];
        let signer = Arc::new(FakeSigner::new(Address::with_last_byte(9)));
        let (connection, _, _) = connection(
            ConnectionConfig::new(Chain::Poly),
            holdings.clone(),
            Some(signer.clone()),
        );

        assert_eq!(connection.get_assets("poly:8").await.unwrap(), holdings);

        let mut liquidator = connection
            .liquidate_to_wallet_and_destroy("poly:8", USDC, 0.01)
            .await
            .unwrap();
        assert_eq!(liquidator.orders().len(), 2);
        liquidator.execute().await.unwrap();

        let sent = signer.sent();
        assert_eq!(sent[0].to, connection.tools().factory_address());
        let decoded = INestedFactory::processOutputOrdersCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(decoded.nftId, U256::from(8));
        assert_eq!(
            decoded.batchedOrders[0].amounts,
            vec![U256::from(10u64), U256::from(20u64)]
        );
    }
}
