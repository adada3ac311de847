//! Process-wide authenticated session.

use crate::ChainReader;
use crate::rpc::{RpcConfig, RpcProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use raylp_domain::entities::MintInfo;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::str::FromStr;
use std::sync::Arc;

/// One RPC connection and one signing identity, constructed at process
/// start and shared read-only by every operation.
pub struct Session {
    rpc: Arc<RpcProvider>,
    signer: Keypair,
}

impl Session {
    /// Builds a session from an RPC endpoint and a base58-encoded secret
    /// key.
    pub fn new(rpc_url: impl Into<String>, secret_base58: &str) -> Result<Self> {
        let secret = bs58::decode(secret_base58)
            .into_vec()
            .context("Secret key is not valid base58")?;
        let signer = Keypair::try_from(secret.as_slice())
            .map_err(|e| anyhow!("Secret key is not a valid keypair: {e}"))?;
        Ok(Self {
            rpc: Arc::new(RpcProvider::new(RpcConfig::new(rpc_url))),
            signer,
        })
    }

    pub fn rpc(&self) -> &RpcProvider {
        &self.rpc
    }

    pub fn signer(&self) -> &Keypair {
        &self.signer
    }

    /// Public key of the signing identity.
    pub fn owner(&self) -> Pubkey {
        self.signer.pubkey()
    }
}

/// `ChainReader` backed by the session's RPC connection.
pub struct SolanaChainReader {
    session: Arc<Session>,
}

impl SolanaChainReader {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ChainReader for SolanaChainReader {
    async fn mint_info(&self, mint: &str) -> Result<MintInfo> {
        let address =
            Pubkey::from_str(mint).with_context(|| format!("Invalid mint address {mint}"))?;
        let account = self.session.rpc().mint_account(&address).await?;
        Ok(MintInfo::new(mint, account.decimals))
    }

    async fn epoch(&self) -> Result<u64> {
        self.session.rpc().epoch().await
    }
}
