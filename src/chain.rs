use std::sync::Arc;

use anyhow::Context;
use axum::async_trait;
use ethers::abi::RawLog;
use ethers::contract::EthLogDecode;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::abigen;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use ethers::utils::parse_units;

use crate::config::ChainConfig;

abigen!(
    PoolFactory,
    r#"[
        function createPool(string name, string symbol, string metadataCID, uint256 totalShares, uint256 sharePrice, uint256 maintenancePct) returns (address)
        event PoolCreated(address indexed pool, address indexed creator)
    ]"#
);

/// Deploys pool contracts on behalf of the platform wallet. The factory,
/// its ABI and the share token all live off-repo; this client only needs
/// the deployed pool address back.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn create_pool(
        &self,
        title: &str,
        symbol: &str,
        metadata_uri: &str,
        total_shares: u64,
        share_price: f64,
        maintenance_pct: u32,
    ) -> anyhow::Result<String>;
}

pub struct EvmChainClient {
    factory: PoolFactory<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

/// Share prices are quoted in a 6-decimal stable unit on-chain.
const SHARE_PRICE_DECIMALS: u32 = 6;

/// Clients send whole percentage points; the factory wants basis points.
pub(crate) fn to_basis_points(pct: u32) -> u64 {
    u64::from(pct) * 100
}

impl EvmChainClient {
    pub fn new(cfg: &ChainConfig) -> anyhow::Result<Self> {
        let provider =
            Provider::<Http>::try_from(cfg.rpc_url.as_str()).context("invalid RPC url")?;
        let wallet: LocalWallet = cfg.deployer_key.parse().context("invalid deployer key")?;
        let wallet = wallet.with_chain_id(cfg.chain_id);
        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let factory_address: Address = cfg
            .factory_address
            .parse()
            .context("invalid factory address")?;
        Ok(Self {
            factory: PoolFactory::new(factory_address, client),
        })
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    async fn create_pool(
        &self,
        title: &str,
        symbol: &str,
        metadata_uri: &str,
        total_shares: u64,
        share_price: f64,
        maintenance_pct: u32,
    ) -> anyhow::Result<String> {
        let price_units: U256 = parse_units(share_price.to_string(), SHARE_PRICE_DECIMALS)
            .context("share price out of range")?
            .into();

        let call = self.factory.create_pool(
            title.to_string(),
            symbol.to_string(),
            metadata_uri.to_string(),
            U256::from(total_shares),
            price_units,
            U256::from(to_basis_points(maintenance_pct)),
        );

        let pending = call.send().await.context("createPool send")?;
        let receipt = pending
            .await
            .context("createPool confirmation")?
            .ok_or_else(|| anyhow::anyhow!("createPool transaction dropped"))?;

        // The deployed address comes from the PoolCreated event; fall back
        // to the first log's emitter when the event cannot be decoded.
        let deployed = receipt
            .logs
            .iter()
            .find_map(|log| {
                let raw = RawLog {
                    topics: log.topics.clone(),
                    data: log.data.to_vec(),
                };
                PoolCreatedFilter::decode_log(&raw).ok().map(|ev| ev.pool)
            })
            .or_else(|| receipt.logs.first().map(|log| log.address))
            .ok_or_else(|| anyhow::anyhow!("no logs in createPool receipt"))?;

        Ok(format!("0x{:x}", deployed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_points_convert_to_basis_points() {
        assert_eq!(to_basis_points(10), 1000);
        assert_eq!(to_basis_points(0), 0);
        assert_eq!(to_basis_points(100), 10000);
    }
}
