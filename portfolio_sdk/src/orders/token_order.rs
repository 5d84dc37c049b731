use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::{ResultExt, report};
use tracing::debug;

use crate::contracts::{Order, build_order};
use crate::error::{Error, SdkResult};
use crate::routers::{AggregatorType, QuoteResult, SwapAmount, SwapRequest};
use crate::tools::PortfolioTools;
use crate::utils::ratio::{add_fees, remove_fees};

/// Side of the swap the factory takes its fee from.
///
/// Input fees go with input batches (budget spent from the wallet or the
/// reserve), output fees with output batches (tokens sold out of a portfolio).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeesOn {
    Input,
    Output,
}

/// Whether the order brings value into the portfolio or takes it out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderState {
    Pending,
    AmountRequested(SwapAmount),
    Quoted(QuotedOrder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotedOrder {
    pub requested: SwapAmount,
    /// Amount taken from the input side, fees included when they are on input
    pub input_qty: U256,
    /// Amount expected on the output side, fees deducted when they are on output
    pub output_qty: U256,
    pub quote: QuoteResult,
}

/// One conversion leg of a batch.
///
/// Quoting is lazy: setting an amount only records it, the quote competition
/// runs on the first read and its result is kept until the amount or the
/// slippage changes.
pub struct TokenOrder {
    tools: Arc<PortfolioTools>,
    input_token: Address,
    output_token: Address,
    slippage: f64,
    fees_on: FeesOn,
    kind: OrderKind,
    state: OrderState,
}

impl TokenOrder {
    pub fn new(
        tools: Arc<PortfolioTools>,
        input_token: Address,
        output_token: Address,
        slippage: f64,
        fees_on: FeesOn,
        kind: OrderKind,
    ) -> SdkResult<Self> {
        if input_token == output_token {
            return Err(report!(Error::SelfSwap).attach_printable(format!("Token: {input_token}")));
        }
        validate_slippage(slippage)?;
        Ok(Self {
            tools,
            input_token,
            output_token,
            slippage,
            fees_on,
            kind,
            state: OrderState::Pending,
        })
    }

    pub fn input_token(&self) -> Address {
        self.input_token
    }

    pub fn output_token(&self) -> Address {
        self.output_token
    }

    pub fn slippage(&self) -> f64 {
        self.slippage
    }

    pub fn fees_on(&self) -> FeesOn {
        self.fees_on
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    /// Sell exactly `amount` of the input token
    pub fn set_input_amount(&mut self, amount: U256) -> &mut Self {
        self.state = OrderState::AmountRequested(SwapAmount::Spend(amount));
        self
    }

    /// Receive exactly `amount` of the output token
    pub fn set_output_amount(&mut self, amount: U256) -> &mut Self {
        self.state = OrderState::AmountRequested(SwapAmount::Buy(amount));
        self
    }

    pub fn change_slippage(&mut self, slippage: f64) -> SdkResult<&mut Self> {
        validate_slippage(slippage)?;
        self.slippage = slippage;
        if let OrderState::Quoted(quoted) = &self.state {
            self.state = OrderState::AmountRequested(quoted.requested);
        }
        Ok(self)
    }

    /// Quoted state, without triggering any resolution
    pub fn quoted(&self) -> SdkResult<&QuotedOrder> {
        match &self.state {
            OrderState::Quoted(quoted) => Ok(quoted),
            _ => Err(report!(Error::NoAmountSet)
                .attach_printable(format!("{} -> {}", self.input_token, self.output_token))),
        }
    }

    /// Runs the quote competition if needed
    pub async fn resolve(&mut self) -> SdkResult<&QuotedOrder> {
        if let OrderState::AmountRequested(requested) = self.state {
            let quoted = self.fetch_quote(requested).await?;
            self.state = OrderState::Quoted(quoted);
        }
        self.quoted()
    }

    pub async fn input_qty(&mut self) -> SdkResult<U256> {
        Ok(self.resolve().await?.input_qty)
    }

    pub async fn output_qty(&mut self) -> SdkResult<U256> {
        Ok(self.resolve().await?.output_qty)
    }

    /// Aggregator that won the competition for this order
    pub async fn operator(&mut self) -> SdkResult<AggregatorType> {
        Ok(self.resolve().await?.quote.aggregator)
    }

    pub async fn quote(&mut self) -> SdkResult<&QuoteResult> {
        Ok(&self.resolve().await?.quote)
    }

    /// Factory order executing the quoted swap
    pub async fn order_data(&mut self) -> SdkResult<Order> {
        let token = match self.fees_on {
            FeesOn::Input => self.output_token,
            FeesOn::Output => self.input_token,
        };
        let (input_token, output_token) = (self.input_token, self.output_token);
        let quote = &self.resolve().await?.quote;
        Ok(build_order(
            quote.aggregator,
            token,
            input_token,
            output_token,
            quote.data.clone(),
        ))
    }

    async fn fetch_quote(&self, requested: SwapAmount) -> SdkResult<QuotedOrder> {
        let amount = match (self.fees_on, requested) {
            (FeesOn::Input, SwapAmount::Spend(x)) => SwapAmount::Spend(remove_fees(x)?),
            (FeesOn::Input, SwapAmount::Buy(y)) => SwapAmount::Buy(y),
            (FeesOn::Output, SwapAmount::Spend(x)) => SwapAmount::Spend(x),
            (FeesOn::Output, SwapAmount::Buy(y)) => SwapAmount::Buy(add_fees(y)?),
        };

        let request = SwapRequest {
            chain: self.tools.chain(),
            spend_token: self.input_token,
            buy_token: self.output_token,
            spend_token_decimals: self.tools.token_decimals(self.input_token).await?,
            buy_token_decimals: self.tools.token_decimals(self.output_token).await?,
            amount,
            slippage: self.slippage,
            user_address: Some(self.tools.factory_address()),
        };
        let quote = self
            .tools
            .quote(&request)
            .await
            .attach_printable_lazy(|| {
                format!("Quoting {} -> {}", self.input_token, self.output_token)
            })?;

        let (input_qty, output_qty) = match (self.fees_on, requested) {
            (FeesOn::Input, SwapAmount::Spend(x)) => (x, quote.buy_amount),
            (FeesOn::Input, SwapAmount::Buy(_)) => {
                (add_fees(quote.sell_amount)?, quote.buy_amount)
            }
            (FeesOn::Output, SwapAmount::Spend(x)) => (x, remove_fees(quote.buy_amount)?),
            (FeesOn::Output, SwapAmount::Buy(y)) => (quote.sell_amount, y),
        };
        debug!(
            "Order {} -> {} quoted by {}: {} for {}",
            self.input_token, self.output_token, quote.aggregator, input_qty, output_qty
        );

        Ok(QuotedOrder {
            requested,
            input_qty,
            output_qty,
            quote,
        })
    }
}

fn validate_slippage(slippage: f64) -> SdkResult<()> {
    if !(0.0..1.0).contains(&slippage) {
        return Err(report!(Error::InvalidSlippage(slippage.to_string())));
    }
    Ok(())
}
