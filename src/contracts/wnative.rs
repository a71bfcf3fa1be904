use crate::blockchain::ContractCall;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::Result;
use std::sync::Arc;

sol! {
    #[sol(rpc)]
    interface IWrappedNative {
        function balanceOf(address account) external view returns (uint256);
        function withdraw(uint256 amount) external;
    }
}

#[derive(Clone)]
pub struct WrappedNativeContract {
    address: Address,
    provider: Arc<dyn Provider<Ethereum>>,
}

impl WrappedNativeContract {
    pub fn new(address: Address, provider: Arc<dyn Provider<Ethereum>>) -> Self {
        Self { address, provider }
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        let call = IWrappedNative::balanceOfCall { account };
        let data: Vec<u8> = call.abi_encode();

        let result = self
            .provider
            .call(TransactionRequest {
                to: Some(TxKind::Call(self.address)),
                input: TransactionInput::new(Bytes::from(data)),
                ..Default::default()
            })
            .await?;

        let decoded = IWrappedNative::balanceOfCall::abi_decode_returns(&result)?;
        Ok(decoded)
    }

    /// Build the unwrap write; submission goes through the contract writer.
    pub fn withdraw_call(&self, amount: U256) -> ContractCall {
        let call = IWrappedNative::withdrawCall { amount };

        ContractCall {
            to: self.address,
            data: call.abi_encode().into(),
            value: U256::ZERO,
        }
    }
}
