//! Thin wrapper over the nonblocking Solana RPC client.

use anyhow::{Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;

/// Configuration for the RPC connection.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment: CommitmentConfig,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

/// RPC provider shared by every operation in a process lifetime. Read-only
/// after construction; no timeout or retry policy beyond the client's own.
pub struct RpcProvider {
    client: RpcClient,
}

impl RpcProvider {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.url, config.commitment),
        }
    }

    pub async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .context("Failed to get recent blockhash")
    }

    /// Submits a signed transaction and waits for confirmation.
    pub async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .context("Transaction submission failed")
    }

    pub async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>> {
        let account = self
            .client
            .get_account(address)
            .await
            .with_context(|| format!("Failed to fetch account {address}"))?;
        Ok(account.data)
    }

    pub async fn multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        self.client
            .get_multiple_accounts(addresses)
            .await
            .context("Failed to fetch accounts")
    }

    /// Balance of an SPL token account, in base units.
    pub async fn token_balance(&self, token_account: &Pubkey) -> Result<u64> {
        let balance = self
            .client
            .get_token_account_balance(token_account)
            .await
            .with_context(|| format!("Failed to fetch token balance of {token_account}"))?;
        balance
            .amount
            .parse()
            .context("Token balance is not a u64")
    }

    pub async fn epoch(&self) -> Result<u64> {
        let info = self
            .client
            .get_epoch_info()
            .await
            .context("Failed to fetch epoch info")?;
        Ok(info.epoch)
    }

    pub async fn mint_account(&self, mint: &Pubkey) -> Result<spl_token::state::Mint> {
        let data = self.account_data(mint).await?;
        spl_token::state::Mint::unpack(&data)
            .with_context(|| format!("Account {mint} is not a token mint"))
    }

    pub async fn program_accounts(
        &self,
        program: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            ..Default::default()
        };
        self.client
            .get_program_accounts_with_config(program, config)
            .await
            .with_context(|| format!("Failed to scan accounts of program {program}"))
    }
}
