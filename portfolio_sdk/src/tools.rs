use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use error_stack::{ResultExt, report};
use once_cell::sync::OnceCell;
use portfolio_models::constants::chains::{Chain, is_native_token};
use tracing::debug;

use crate::contracts::{CallData, IERC20, INestedFactory, INestedRecords};
use crate::error::{Error, SdkResult};
use crate::routers::competition::QuoteResolver;
use crate::routers::{AggregatorType, QuoteResult, SwapRequest};
use crate::signer::{ChainReader, Signer};

const NATIVE_DECIMALS: u8 = 18;

/// Holdings of a portfolio, as stored by the records contract
#[async_trait]
pub trait PortfolioReader: Send + Sync {
    async fn token_holdings(&self, nft_id: U256) -> SdkResult<Vec<(Address, U256)>>;
}

/// Everything an operation needs from its connection: chain data, the quote
/// resolver and the chain collaborators. Shared by all orders of a connection.
pub struct PortfolioTools {
    chain: Chain,
    factory_address: Address,
    resolver: QuoteResolver,
    allowed_aggregators: Option<HashSet<AggregatorType>>,
    reader: Arc<dyn ChainReader>,
    signer: Option<Arc<dyn Signer>>,
    decimals: Mutex<HashMap<Address, u8>>,
    records_address: OnceCell<Address>,
}

impl PortfolioTools {
    pub fn new(
        chain: Chain,
        resolver: QuoteResolver,
        allowed_aggregators: Option<HashSet<AggregatorType>>,
        reader: Arc<dyn ChainReader>,
        signer: Option<Arc<dyn Signer>>,
    ) -> SdkResult<Self> {
        let factory_address = chain
            .factory_address()
            .change_context(Error::UnsupportedChain(chain.to_string()))?;
        Ok(Self {
            chain,
            factory_address,
            resolver,
            allowed_aggregators,
            reader,
            signer,
            decimals: Mutex::new(HashMap::new()),
            records_address: OnceCell::new(),
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn factory_address(&self) -> Address {
        self.factory_address
    }

    pub fn resolver(&self) -> &QuoteResolver {
        &self.resolver
    }

    pub fn allowed_aggregators(&self) -> Option<&HashSet<AggregatorType>> {
        self.allowed_aggregators.as_ref()
    }

    pub fn signer(&self) -> SdkResult<&Arc<dyn Signer>> {
        self.signer.as_ref().ok_or_else(|| report!(Error::MissingSigner))
    }

    /// Native pseudo-token → wrapped native token of the chain
    pub fn wrap(&self, token: Address) -> SdkResult<Address> {
        self.chain
            .wrap_native(token)
            .change_context(Error::UnsupportedChain(self.chain.to_string()))
    }

    pub async fn quote(&self, request: &SwapRequest) -> SdkResult<QuoteResult> {
        self.resolver
            .resolve(request, self.allowed_aggregators.as_ref())
            .await
    }

    /// `eth_call` on `to`, decoding the call return values
    pub async fn read<C>(&self, to: Address, call: C) -> SdkResult<C::Return>
    where
        C: SolCall + Send,
    {
        let call_data = CallData::new(to, call.abi_encode());
        let output = self.reader.call(&call_data).await?;
        C::abi_decode_returns(&output)
            .change_context(Error::AbiError(C::SIGNATURE.to_string()))
            .attach_printable(format!("Invalid return data from {to}: {output}"))
    }

    /// ERC20 decimals, memoized per token
    pub async fn token_decimals(&self, token: Address) -> SdkResult<u8> {
        if is_native_token(&token) {
            return Ok(NATIVE_DECIMALS);
        }
        if let Some(decimals) = self.cached_decimals(&token) {
            return Ok(decimals);
        }
        let decimals = self.read(token, IERC20::decimalsCall {}).await?;
        debug!("Token {token} has {decimals} decimals");
        if let Ok(mut cache) = self.decimals.lock() {
            cache.insert(token, decimals);
        }
        Ok(decimals)
    }

    fn cached_decimals(&self, token: &Address) -> Option<u8> {
        self.decimals
            .lock()
            .ok()
            .and_then(|cache| cache.get(token).copied())
    }

    pub async fn records_address(&self) -> SdkResult<Address> {
        if let Some(address) = self.records_address.get() {
            return Ok(*address);
        }
        let address = self
            .read(self.factory_address, INestedFactory::nestedRecordsCall {})
            .await?;
        Ok(*self.records_address.get_or_init(|| address))
    }
}

#[async_trait]
impl PortfolioReader for PortfolioTools {
    async fn token_holdings(&self, nft_id: U256) -> SdkResult<Vec<(Address, U256)>> {
        let records = self.records_address().await?;
        let holdings = self
            .read(records, INestedRecords::tokenHoldingsCall { nftId: nft_id })
            .await?;
        if holdings.tokens.len() != holdings.amounts.len() {
            return Err(report!(Error::AbiError("tokenHoldings".to_string()))
                .attach_printable("Tokens and amounts length mismatch"));
        }
        Ok(holdings.tokens.into_iter().zip(holdings.amounts).collect())
    }
}
