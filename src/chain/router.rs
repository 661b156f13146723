// router.rs - Call descriptors for the V3 SwapRouter and their ABI encoding.
//
// Struct layouts follow ISwapRouter (deadline inside the params struct):
//   exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))
//   exactInput((bytes,address,uint256,uint256,uint256))
//   exactOutputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))
//   exactOutput((bytes,address,uint256,uint256,uint256))
//   unwrapWETH9(uint256,address)
//   multicall(bytes[])

use ethers::abi::{self, Token as AbiToken};
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use ethers::utils::id;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactInputParams {
    pub path: Bytes,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactOutputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_out: U256,
    pub amount_in_maximum: U256,
    pub sqrt_price_limit_x96: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactOutputParams {
    pub path: Bytes,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_out: U256,
    pub amount_in_maximum: U256,
}

/// One router function invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "function", content = "args", rename_all = "camelCase")]
pub enum RouterCall {
    ExactInputSingle(ExactInputSingleParams),
    ExactInput(ExactInputParams),
    ExactOutputSingle(ExactOutputSingleParams),
    ExactOutput(ExactOutputParams),
    #[serde(rename = "unwrapWETH9", rename_all = "camelCase")]
    UnwrapWeth9 { amount_minimum: U256, recipient: Address },
    Multicall(Vec<RouterCall>),
}

impl RouterCall {
    pub fn name(&self) -> &'static str {
        match self {
            RouterCall::ExactInputSingle(_) => "exactInputSingle",
            RouterCall::ExactInput(_) => "exactInput",
            RouterCall::ExactOutputSingle(_) => "exactOutputSingle",
            RouterCall::ExactOutput(_) => "exactOutput",
            RouterCall::UnwrapWeth9 { .. } => "unwrapWETH9",
            RouterCall::Multicall(_) => "multicall",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            RouterCall::ExactInputSingle(_) => {
                "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))"
            }
            RouterCall::ExactInput(_) => "exactInput((bytes,address,uint256,uint256,uint256))",
            RouterCall::ExactOutputSingle(_) => {
                "exactOutputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))"
            }
            RouterCall::ExactOutput(_) => "exactOutput((bytes,address,uint256,uint256,uint256))",
            RouterCall::UnwrapWeth9 { .. } => "unwrapWETH9(uint256,address)",
            RouterCall::Multicall(_) => "multicall(bytes[])",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        id(self.signature())
    }

    fn args(&self) -> Vec<AbiToken> {
        match self {
            RouterCall::ExactInputSingle(p) => vec![AbiToken::Tuple(vec![
                AbiToken::Address(p.token_in),
                AbiToken::Address(p.token_out),
                AbiToken::Uint(U256::from(p.fee)),
                AbiToken::Address(p.recipient),
                AbiToken::Uint(p.deadline),
                AbiToken::Uint(p.amount_in),
                AbiToken::Uint(p.amount_out_minimum),
                AbiToken::Uint(p.sqrt_price_limit_x96),
            ])],
            RouterCall::ExactInput(p) => vec![AbiToken::Tuple(vec![
                AbiToken::Bytes(p.path.to_vec()),
                AbiToken::Address(p.recipient),
                AbiToken::Uint(p.deadline),
                AbiToken::Uint(p.amount_in),
                AbiToken::Uint(p.amount_out_minimum),
            ])],
            RouterCall::ExactOutputSingle(p) => vec![AbiToken::Tuple(vec![
                AbiToken::Address(p.token_in),
                AbiToken::Address(p.token_out),
                AbiToken::Uint(U256::from(p.fee)),
                AbiToken::Address(p.recipient),
                AbiToken::Uint(p.deadline),
                AbiToken::Uint(p.amount_out),
                AbiToken::Uint(p.amount_in_maximum),
                AbiToken::Uint(p.sqrt_price_limit_x96),
            ])],
            RouterCall::ExactOutput(p) => vec![AbiToken::Tuple(vec![
                AbiToken::Bytes(p.path.to_vec()),
                AbiToken::Address(p.recipient),
                AbiToken::Uint(p.deadline),
                AbiToken::Uint(p.amount_out),
                AbiToken::Uint(p.amount_in_maximum),
            ])],
            RouterCall::UnwrapWeth9 { amount_minimum, recipient } => {
                vec![AbiToken::Uint(*amount_minimum), AbiToken::Address(*recipient)]
            }
            RouterCall::Multicall(calls) => vec![AbiToken::Array(
                calls.iter().map(|c| AbiToken::Bytes(c.encode().to_vec())).collect(),
            )],
        }
    }

    /// selector || abi.encode(args)
    pub fn encode(&self) -> Bytes {
        let mut data = self.selector().to_vec();
        data.extend(abi::encode(&self.args()));
        Bytes::from(data)
    }
}

/// Fully-formed router transaction, ready for an external signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    pub target: Address,
    pub call: RouterCall,
    pub value: U256,
    pub gas_limit: Option<U256>,
}

impl CallDescriptor {
    pub fn new(target: Address, call: RouterCall, value: U256) -> Self {
        Self { target, call, value, gas_limit: None }
    }

    pub fn calldata(&self) -> Bytes {
        self.call.encode()
    }

    pub fn function_name(&self) -> &'static str {
        self.call.name()
    }

    pub fn to_transaction_request(&self, from: Option<Address>) -> TransactionRequest {
        let mut tx = TransactionRequest::new()
            .to(self.target)
            .data(self.calldata())
            .value(self.value);
        if let Some(from) = from {
            tx = tx.from(from);
        }
        if let Some(gas) = self.gas_limit {
            tx = tx.gas(gas);
        }
        tx
    }
}
