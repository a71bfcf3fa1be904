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
    interface IStrategy {
        function harvest(address callFeeRecipient) external;
        function paused() external view returns (bool);
        function lastHarvest() external view returns (uint256);
    }
}

#[derive(Clone)]
pub struct StrategyContract {
    address: Address,
    provider: Arc<dyn Provider<Ethereum>>,
}

impl StrategyContract {
    pub fn new(address: Address, provider: Arc<dyn Provider<Ethereum>>) -> Self {
        Self { address, provider }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn paused(&self) -> Result<bool> {
        let call = IStrategy::pausedCall {};
        let data: Vec<u8> = call.abi_encode();

        let result = self
            .provider
            .call(TransactionRequest {
                to: Some(TxKind::Call(self.address)),
                input: TransactionInput::new(Bytes::from(data)),
                ..Default::default()
            })
            .await?;

        let decoded = IStrategy::pausedCall::abi_decode_returns(&result)?;
        Ok(decoded)
    }

    pub async fn last_harvest(&self) -> Result<U256> {
        let call = IStrategy::lastHarvestCall {};
        let data: Vec<u8> = call.abi_encode();

        let result = self
            .provider
            .call(TransactionRequest {
                to: Some(TxKind::Call(self.address)),
                input: TransactionInput::new(Bytes::from(data)),
                ..Default::default()
            })
            .await?;

        let decoded = IStrategy::lastHarvestCall::abi_decode_returns(&result)?;
        Ok(decoded)
    }

    /// Build the harvest write; submission goes through the contract
    /// writer, not directly through the provider.
    pub fn harvest_call(&self, call_fee_recipient: Address) -> ContractCall {
        let call = IStrategy::harvestCall {
            callFeeRecipient: call_fee_recipient,
        };

        ContractCall {
            to: self.address,
            data: call.abi_encode().into(),
            value: U256::ZERO,
        }
    }
}
