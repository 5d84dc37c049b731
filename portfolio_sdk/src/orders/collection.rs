use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::report;
use futures::future::try_join_all;

use crate::contracts::Order;
use crate::error::{Error, SdkResult};
use crate::orders::token_order::{FeesOn, OrderKind, TokenOrder};
use crate::tools::PortfolioTools;

/// Ordered list of the orders of one operation.
///
/// Insertion order is the index order of the batch sent to the factory.
pub struct OrderCollection {
    tools: Arc<PortfolioTools>,
    orders: Vec<TokenOrder>,
}

impl OrderCollection {
    pub fn new(tools: Arc<PortfolioTools>) -> Self {
        Self {
            tools,
            orders: Vec::new(),
        }
    }

    pub fn tools(&self) -> &Arc<PortfolioTools> {
        &self.tools
    }

    pub fn orders(&self) -> &[TokenOrder] {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut [TokenOrder] {
        &mut self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn remove(&mut self, index: usize) -> Option<TokenOrder> {
        (index < self.orders.len()).then(|| self.orders.remove(index))
    }

    /// Creates an order and appends it
    pub fn push(
        &mut self,
        input_token: Address,
        output_token: Address,
        slippage: f64,
        fees_on: FeesOn,
        kind: OrderKind,
    ) -> SdkResult<&mut TokenOrder> {
        let order = TokenOrder::new(
            self.tools.clone(),
            input_token,
            output_token,
            slippage,
            fees_on,
            kind,
        )?;
        let index = self.orders.len();
        self.orders.push(order);
        Ok(&mut self.orders[index])
    }

    pub fn ensure_unique_input(&self, token: Address) -> SdkResult<()> {
        if self.orders.iter().any(|o| o.input_token() == token) {
            return Err(report!(Error::DuplicateOrder(format!(
                "An input order already exists in this operation for token {token}"
            ))));
        }
        Ok(())
    }

    pub fn ensure_unique_output(&self, token: Address) -> SdkResult<()> {
        if self.orders.iter().any(|o| o.output_token() == token) {
            return Err(report!(Error::DuplicateOrder(format!(
                "An output order already exists in this operation for token {token}"
            ))));
        }
        Ok(())
    }

    /// Quotes every order that needs it, concurrently
    pub async fn resolve_all(&mut self) -> SdkResult<()> {
        try_join_all(self.orders.iter_mut().map(|order| async move {
            order.resolve().await.map(|_| ())
        }))
        .await?;
        Ok(())
    }

    /// Amounts taken from the input side, index-aligned with the orders
    pub async fn input_amounts(&mut self) -> SdkResult<Vec<U256>> {
        self.resolve_all().await?;
        self.orders
            .iter()
            .map(|o| o.quoted().map(|q| q.input_qty))
            .collect()
    }

    pub async fn output_amounts(&mut self) -> SdkResult<Vec<U256>> {
        self.resolve_all().await?;
        self.orders
            .iter()
            .map(|o| o.quoted().map(|q| q.output_qty))
            .collect()
    }

    pub async fn total_input(&mut self) -> SdkResult<U256> {
        self.input_amounts()
            .await?
            .into_iter()
            .try_fold(U256::ZERO, |total, amount| {
                total.checked_add(amount).ok_or_else(|| {
                    report!(Error::ArithmeticError("Total budget overflow".to_string()))
                })
            })
    }

    pub async fn orders_data(&mut self) -> SdkResult<Vec<Order>> {
        self.resolve_all().await?;
        let mut data = Vec::with_capacity(self.orders.len());
        for order in self.orders.iter_mut() {
            data.push(order.order_data().await?);
        }
        Ok(data)
    }
}
