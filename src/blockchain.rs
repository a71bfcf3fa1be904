use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::Result;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// An ABI-encoded contract write, ready for submission.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
    pub status: TransactionStatus,
}

/// The two chain capabilities the resilience layer consumes. Endpoint
/// configuration, credentials and connection pooling live entirely with the
/// implementation; every call is treated as independent and stateless.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Submit a contract write, returning its transaction hash.
    async fn submit_contract_write(&self, call: ContractCall) -> Result<B256>;

    /// Resolve once the transaction is mined, whether it succeeded or
    /// reverted. Errors are either transient transport failures or a
    /// definitive chain-side rejection; a still-pending transaction keeps
    /// this future unresolved, so callers bound it with a timeout.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt>;
}

pub struct BlockchainClient {
    provider: Arc<dyn Provider<Ethereum>>,
    address: Address,
    receipt_poll_interval: Duration,
}

impl BlockchainClient {
    pub async fn new(
        rpc_url: &str,
        expected_chain_id: u64,
        private_key: &str,
        receipt_poll_interval: Duration,
    ) -> Result<Self> {
        println!("🔗 Connecting to RPC: {}", rpc_url);

        let url = Url::parse(rpc_url)?;

        let signer = PrivateKeySigner::from_str(private_key)?;
        let signer = signer.with_chain_id(Some(expected_chain_id));
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_http(url);

        let chain_id = provider.get_chain_id().await?;
        if chain_id != expected_chain_id {
            return Err(anyhow::anyhow!(
                "Chain ID mismatch: expected {}, got {}",
                expected_chain_id,
                chain_id
            ));
        }

        println!("✅ Connected to chain {}", expected_chain_id);
        println!("🔑 Wallet address: {}", address);

        Ok(Self {
            provider: Arc::new(provider),
            address,
            receipt_poll_interval,
        })
    }

    pub fn provider(&self) -> Arc<dyn Provider<Ethereum>> {
        self.provider.clone()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn get_block_number(&self) -> Result<u64> {
        let block_number = self.provider.get_block_number().await?;
        Ok(block_number)
    }

    pub fn parse_address(addr: &str) -> Result<Address> {
        Address::from_str(addr).map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))
    }
}

#[async_trait]
impl ChainRpc for BlockchainClient {
    async fn submit_contract_write(&self, call: ContractCall) -> Result<B256> {
        let tx = TransactionRequest {
            to: Some(TxKind::Call(call.to)),
            input: TransactionInput::new(call.data),
            value: Some(call.value),
            ..Default::default()
        };

        // Provider already has the signer attached.
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        loop {
            match self.provider.get_transaction_receipt(tx_hash).await? {
                Some(receipt) => {
                    let status = if receipt.status() {
                        TransactionStatus::Success
                    } else {
                        TransactionStatus::Failed
                    };

                    return Ok(TransactionReceipt {
                        hash: tx_hash,
                        block_number: receipt.block_number.unwrap_or(0),
                        gas_used: U256::from(receipt.gas_used),
                        status,
                    });
                }
                // Still pending; the caller's timeout bounds how long we
                // keep polling.
                None => sleep(self.receipt_poll_interval).await,
            }
        }
    }
}
