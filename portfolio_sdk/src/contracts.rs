//! ABI of the portfolio factory, its records and ERC20 tokens.

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::routers::AggregatorType;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        bytes32 operator;
        address token;
        bytes callData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct BatchedInputOrders {
        address inputToken;
        uint256 amount;
        Order[] orders;
        bool fromReserve;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct BatchedOutputOrders {
        address outputToken;
        uint256[] amounts;
        Order[] orders;
        bool toReserve;
    }

    interface INestedFactory {
        function create(uint256 originalTokenId, BatchedInputOrders[] calldata batchedOrders) external payable;
        function addTokens(uint256 nftId, BatchedInputOrders[] calldata batchedOrders) external payable;
        function processOutputOrders(uint256 nftId, BatchedOutputOrders[] calldata batchedOrders) external;
        function nestedRecords() external view returns (address);
    }

    interface INestedRecords {
        function tokenHoldings(uint256 nftId) external view returns (address[] memory tokens, uint256[] memory amounts);
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

/// A transaction ready to be sent (or simulated)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallData {
    pub to: Address,
    pub data: Bytes,
    /// Native currency attached to the call
    pub value: U256,
}

impl CallData {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data: Bytes::from(data),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// ASCII name right-padded with zeros to 32 bytes
pub fn to_bytes32(name: &str) -> B256 {
    let mut word = [0u8; 32];
    let bytes = name.as_bytes();
    let len = bytes.len().min(32);
    word[..len].copy_from_slice(&bytes[..len]);
    B256::from(word)
}

/// Factory order executing an aggregator calldata through its operator
pub fn build_order(
    operator: AggregatorType,
    token: Address,
    sell_token: Address,
    buy_token: Address,
    swap_call_data: Bytes,
) -> Order {
    Order {
        operator: to_bytes32(&operator.to_string()),
        token,
        callData: (sell_token, buy_token, swap_call_data)
            .abi_encode_params()
            .into(),
    }
}
