//! Client for Raydium's public HTTP services: the pool-info registry and
//! the swap-compute quote endpoint.

use crate::PoolRegistry;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use raylp_domain::entities::{MintInfo, PoolInfo};
use raylp_domain::enums::PoolType;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api-v3.raydium.io";
pub const DEFAULT_COMPUTE_URL: &str = "https://transaction-v1.raydium.io";

/// Pool registry and quote service client. Cheap to clone; the underlying
/// HTTP client is shared.
#[derive(Debug, Clone)]
pub struct RaydiumApi {
    http: reqwest::Client,
    base_url: String,
    compute_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPoolPage {
    pub data: Vec<ApiPoolInfo>,
}

/// A pool record as the registry reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPoolInfo {
    pub id: String,
    pub program_id: String,
    #[serde(rename = "type")]
    pub pool_type: PoolType,
    pub mint_a: ApiMint,
    pub mint_b: ApiMint,
    pub price: f64,
    pub fee_rate: f64,
    #[serde(default)]
    pub config: Option<ApiPoolConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMint {
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPoolConfig {
    #[serde(default)]
    pub tick_spacing: Option<u16>,
}

/// Vault and market accounts needed to assemble swap instructions. Market
/// fields are present for Standard pools only, the observation and bitmap
/// accounts for Concentrated pools only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPoolKeys {
    pub id: String,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub open_orders: Option<String>,
    #[serde(default)]
    pub target_orders: Option<String>,
    pub vault: ApiVault,
    #[serde(default)]
    pub market_program_id: Option<String>,
    #[serde(default)]
    pub market_id: Option<String>,
    #[serde(default)]
    pub market_authority: Option<String>,
    #[serde(default)]
    pub market_bids: Option<String>,
    #[serde(default)]
    pub market_asks: Option<String>,
    #[serde(default)]
    pub market_event_queue: Option<String>,
    #[serde(default)]
    pub market_base_vault: Option<String>,
    #[serde(default)]
    pub market_quote_vault: Option<String>,
    #[serde(default)]
    pub observation_id: Option<String>,
    #[serde(default)]
    pub ex_bitmap_account: Option<String>,
    #[serde(default)]
    pub config: Option<ApiKeysConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeysConfig {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiVault {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
}

/// Swap-compute response for a base-in quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCompute {
    pub output_amount: String,
    pub other_amount_threshold: String,
}

impl RaydiumApi {
    pub fn new() -> Self {
        Self::with_urls(DEFAULT_API_URL, DEFAULT_COMPUTE_URL)
    }

    pub fn with_urls(base_url: impl Into<String>, compute_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            compute_url: compute_url.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(%url, "Raydium API request");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .context("Raydium API returned an error status")?;
        let body: ApiResponse<T> = response
            .json()
            .await
            .context("Invalid Raydium API response")?;
        if !body.success {
            bail!(
                "Raydium API error: {}",
                body.msg.unwrap_or_else(|| "unknown".to_string())
            );
        }
        body.data.context("Raydium API response has no data")
    }

    /// Vault/market accounts for one pool.
    pub async fn pool_keys(&self, id: &str) -> Result<ApiPoolKeys> {
        let keys: Vec<Option<ApiPoolKeys>> = self
            .get(format!("{}/pools/key/ids?ids={id}", self.base_url))
            .await?;
        keys.into_iter()
            .flatten()
            .next()
            .with_context(|| format!("No pool keys found for {id}"))
    }

    /// Base-in quote from the swap-compute service. CLMM swap math stays
    /// upstream; only the threshold comes back.
    pub async fn compute_swap_base_in(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<SwapCompute> {
        let url = format!(
            "{}/compute/swap-base-in?inputMint={input_mint}&outputMint={output_mint}\
             &amount={amount}&slippageBps={slippage_bps}&txVersion=V0",
            self.compute_url
        );
        self.get(url).await
    }
}

impl Default for RaydiumApi {
    fn default() -> Self {
        Self::new()
    }
}

fn into_pool_info(api: ApiPoolInfo) -> Result<PoolInfo> {
    let price = Decimal::from_f64(api.price)
        .with_context(|| format!("Pool {} price is not representable", api.id))?;
    Ok(PoolInfo {
        id: api.id,
        program_id: api.program_id,
        pool_type: api.pool_type,
        mint_a: MintInfo::new(api.mint_a.address, api.mint_a.decimals),
        mint_b: MintInfo::new(api.mint_b.address, api.mint_b.decimals),
        price,
        fee_bps: (api.fee_rate * 10_000.0).round() as u32,
        tick_spacing: api.config.and_then(|c| c.tick_spacing),
    })
}

#[async_trait]
impl PoolRegistry for RaydiumApi {
    async fn pools_by_mints(&self, mint_a: &str, mint_b: &str) -> Result<Vec<PoolInfo>> {
        let page: ApiPoolPage = self
            .get(format!(
                "{}/pools/info/mint?mint1={mint_a}&mint2={mint_b}\
                 &poolType=all&poolSortField=default&sortType=desc&pageSize=100&page=1",
                self.base_url
            ))
            .await?;
        page.data.into_iter().map(into_pool_info).collect()
    }

    async fn pool_by_id(&self, id: &str) -> Result<Option<PoolInfo>> {
        // The registry reports missing ids as nulls in the result array.
        let pools: Vec<Option<ApiPoolInfo>> = self
            .get(format!("{}/pools/info/ids?ids={id}", self.base_url))
            .await?;
        pools
            .into_iter()
            .flatten()
            .next()
            .map(into_pool_info)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_info_deserialization() {
        let json = r#"{
            "id": "pool-id",
            "programId": "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK",
            "type": "Concentrated",
            "mintA": {"address": "So11111111111111111111111111111111111111112", "decimals": 9},
            "mintB": {"address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "decimals": 6},
            "price": 152.5,
            "feeRate": 0.0025,
            "config": {"tickSpacing": 10}
        }"#;
        let api: ApiPoolInfo = serde_json::from_str(json).unwrap();
        let pool = into_pool_info(api).unwrap();
        assert_eq!(pool.pool_type, PoolType::Concentrated);
        assert_eq!(pool.mint_a.decimals, 9);
        assert_eq!(pool.fee_bps, 25);
        assert_eq!(pool.tick_spacing, Some(10));
    }

    #[test]
    fn test_standard_pool_has_no_tick_spacing() {
        let json = r#"{
            "id": "pool-id",
            "programId": "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8",
            "type": "Standard",
            "mintA": {"address": "a", "decimals": 9},
            "mintB": {"address": "b", "decimals": 6},
            "price": 1.0,
            "feeRate": 0.0025
        }"#;
        let api: ApiPoolInfo = serde_json::from_str(json).unwrap();
        let pool = into_pool_info(api).unwrap();
        assert_eq!(pool.pool_type, PoolType::Standard);
        assert_eq!(pool.tick_spacing, None);
    }

    #[test]
    fn test_swap_compute_deserialization() {
        let json = r#"{"outputAmount": "123456", "otherAmountThreshold": "122221"}"#;
        let compute: SwapCompute = serde_json::from_str(json).unwrap();
        assert_eq!(compute.other_amount_threshold, "122221");
    }
}
