use alloy::primitives::{Address, U256};
use error_stack::report;

use crate::contracts::{BatchedInputOrders, BatchedOutputOrders};
use crate::error::{Error, SdkResult};
use crate::orders::OrderCollection;

/// Orders spending `input_token`, from the wallet or from the portfolio reserve.
///
/// The batch amount is the sum of the order inputs (fees included).
pub async fn build_input_batch(
    orders: &mut OrderCollection,
    input_token: Address,
    from_reserve: bool,
    empty_message: &str,
) -> SdkResult<BatchedInputOrders> {
    if orders.is_empty() {
        return Err(report!(Error::NothingToDo(empty_message.to_string())));
    }
    let amount: U256 = orders.total_input().await?;
    let data = orders.orders_data().await?;
    Ok(BatchedInputOrders {
        inputToken: input_token,
        amount,
        orders: data,
        fromReserve: from_reserve,
    })
}

/// Orders selling portfolio tokens into `output_token`.
///
/// `amounts[i]` is the amount of the token sold by `orders[i]`.
pub async fn build_output_batch(
    orders: &mut OrderCollection,
    output_token: Address,
    to_reserve: bool,
    empty_message: &str,
) -> SdkResult<BatchedOutputOrders> {
    if orders.is_empty() {
        return Err(report!(Error::NothingToDo(empty_message.to_string())));
    }
    let amounts = orders.input_amounts().await?;
    let data = orders.orders_data().await?;
    Ok(BatchedOutputOrders {
        outputToken: output_token,
        amounts,
        orders: data,
        toReserve: to_reserve,
    })
}
