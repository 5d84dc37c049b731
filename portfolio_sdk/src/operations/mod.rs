pub mod liquidator;
pub mod multi_to_single;
pub mod seller;
pub mod single_to_multi;
pub mod token_adder;

use async_trait::async_trait;
use tracing::info;

use crate::contracts::CallData;
use crate::error::SdkResult;
use crate::orders::{OrderCollection, TokenOrder};
use crate::signer::TransactionReceipt;

/// Operation built from a list of orders and sent as one factory call
#[async_trait]
pub trait HasOrders: Send {
    fn order_collection(&self) -> &OrderCollection;

    fn order_collection_mut(&mut self) -> &mut OrderCollection;

    fn orders(&self) -> &[TokenOrder] {
        self.order_collection().orders()
    }

    fn orders_mut(&mut self) -> &mut [TokenOrder] {
        self.order_collection_mut().orders_mut()
    }

    fn remove_order(&mut self, index: usize) -> Option<TokenOrder> {
        self.order_collection_mut().remove(index)
    }

    /// Quotes pending orders and encodes the factory call
    async fn build_call_data(&mut self) -> SdkResult<CallData>;

    /// Builds the call and sends it through the connection signer
    async fn execute(&mut self) -> SdkResult<TransactionReceipt> {
        let signer = self.order_collection().tools().signer()?.clone();
        let call_data = self.build_call_data().await?;
        info!(
            "Sending {} bytes to {} (value {})",
            call_data.data.len(),
            call_data.to,
            call_data.value
        );
        signer.send_transaction(call_data).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use alloy::primitives::{Address, B256};
    use async_trait::async_trait;

    use crate::contracts::CallData;
    use crate::error::SdkResult;
    use crate::signer::{Signer, TransactionReceipt};

    /// Records every transaction instead of sending it
    pub struct FakeSigner {
        pub address: Address,
        pub sent: Mutex<Vec<CallData>>,
    }

    impl FakeSigner {
        pub fn new(address: Address) -> Self {
            Self {
                address,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn sent(&self) -> Vec<CallData> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Signer for FakeSigner {
        async fn get_address(&self) -> SdkResult<Address> {
            Ok(self.address)
        }

        async fn send_transaction(&self, call: CallData) -> SdkResult<TransactionReceipt> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(call);
            Ok(TransactionReceipt {
                transaction_hash: B256::with_last_byte(sent.len() as u8),
                block_number: Some(1),
                success: true,
            })
        }
    }
}
