//! Transaction builders for Raydium swaps and position management.
//!
//! Instruction layouts follow the on-chain programs: AMM v4 uses a one-byte
//! tag, the CLMM program uses anchor discriminators. Every submission signs
//! with the session identity and waits for confirmation.
//!
//! Swaps create the output associated token account idempotently in the
//! same transaction. Wrapping SOL into WSOL for the input side is the
//! wallet's responsibility.

use crate::TransactionBuilder;
use crate::api::{ApiPoolKeys, RaydiumApi};
use crate::raydium::state::{self, PersonalPositionState};
use crate::session::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use raylp_domain::entities::{ClmmPosition, PoolInfo, SwapQuote};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Raydium CLMM program (mainnet).
pub const CLMM_PROGRAM_ID: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";

/// Raydium AMM v4 program (mainnet).
pub const AMM_V4_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Token program ID.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 program ID.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Associated token program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Memo program ID.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Metaplex token metadata program ID.
pub const METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// System program ID.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Rent sysvar ID.
pub const RENT_SYSVAR_ID: &str = "SysvarRent111111111111111111111111111111111";

// Anchor discriminators of the CLMM instructions.
const SWAP_V2_DISCRIMINATOR: [u8; 8] = [43, 4, 237, 11, 26, 201, 30, 98];
const OPEN_POSITION_V2_DISCRIMINATOR: [u8; 8] = [77, 184, 74, 214, 112, 86, 241, 199];
const CLOSE_POSITION_DISCRIMINATOR: [u8; 8] = [123, 134, 81, 0, 49, 68, 98, 98];

/// AMM v4 swap instruction tag (input side fixed).
const AMM_SWAP_BASE_IN_TAG: u8 = 9;

/// Size of an SPL token account, for program-account scans.
const TOKEN_ACCOUNT_SIZE: u64 = 165;

/// Byte offset of the owner field inside a token account.
const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;

/// Builds, signs and submits Raydium transactions for the session owner.
pub struct RaydiumExecutor {
    session: Arc<Session>,
    api: RaydiumApi,
    token_program: Pubkey,
    token_2022_program: Pubkey,
    ata_program: Pubkey,
    memo_program: Pubkey,
    metadata_program: Pubkey,
    system_program: Pubkey,
    rent_sysvar: Pubkey,
}

impl RaydiumExecutor {
    pub fn new(session: Arc<Session>, api: RaydiumApi) -> Self {
        Self {
            session,
            api,
            token_program: Pubkey::from_str(TOKEN_PROGRAM_ID).expect("Invalid token program ID"),
            token_2022_program: Pubkey::from_str(TOKEN_2022_PROGRAM_ID)
                .expect("Invalid token-2022 program ID"),
            ata_program: Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID)
                .expect("Invalid ATA program ID"),
            memo_program: Pubkey::from_str(MEMO_PROGRAM_ID).expect("Invalid memo program ID"),
            metadata_program: Pubkey::from_str(METADATA_PROGRAM_ID)
                .expect("Invalid metadata program ID"),
            system_program: Pubkey::from_str(SYSTEM_PROGRAM_ID).expect("Invalid system program ID"),
            rent_sysvar: Pubkey::from_str(RENT_SYSVAR_ID).expect("Invalid rent sysvar ID"),
        }
    }

    // Private helper methods

    fn derive_ata(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        let (ata, _bump) = Pubkey::find_program_address(
            &[owner.as_ref(), self.token_program.as_ref(), mint.as_ref()],
            &self.ata_program,
        );
        ata
    }

    /// `CreateIdempotent` on the associated token program: a no-op when the
    /// account already exists.
    fn create_ata_idempotent_instruction(&self, owner: &Pubkey, mint: &Pubkey) -> Instruction {
        let ata = self.derive_ata(owner, mint);
        Instruction {
            program_id: self.ata_program,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(ata, false),
                AccountMeta::new_readonly(*owner, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
            ],
            data: vec![1],
        }
    }

    async fn send(&self, instructions: &[Instruction], extra_signers: &[&Keypair]) -> Result<String> {
        let blockhash = self.session.rpc().latest_blockhash().await?;

        // Sign with concrete keypairs inside the block so no signer borrow
        // is held across the submission await.
        let transaction = {
            let mut signers: Vec<&Keypair> = vec![self.session.signer()];
            signers.extend_from_slice(extra_signers);
            Transaction::new_signed_with_payer(
                instructions,
                Some(&self.session.owner()),
                &signers,
                blockhash,
            )
        };

        debug!(
            instructions = instructions.len(),
            "Sending transaction"
        );
        let signature = self.session.rpc().send_and_confirm(&transaction).await?;
        info!(signature = %signature, "Transaction confirmed");
        Ok(signature.to_string())
    }

    fn build_amm_swap_instruction(
        &self,
        pool: &PoolInfo,
        keys: &ApiPoolKeys,
        input_mint: &str,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<Instruction> {
        let mut data = Vec::with_capacity(17);
        data.push(AMM_SWAP_BASE_IN_TAG);
        data.extend_from_slice(&amount_in.to_le_bytes());
        data.extend_from_slice(&min_amount_out.to_le_bytes());

        let owner = self.session.owner();
        let (input, output) = pool.orient(input_mint)?;
        let user_source = self.derive_ata(&owner, &parse_key(&input.address, "input mint")?);
        let user_destination = self.derive_ata(&owner, &parse_key(&output.address, "output mint")?);

        let accounts = vec![
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new(parse_key(&keys.id, "pool id")?, false),
            AccountMeta::new_readonly(required_key(&keys.authority, "authority")?, false),
            AccountMeta::new(required_key(&keys.open_orders, "openOrders")?, false),
            AccountMeta::new(required_key(&keys.target_orders, "targetOrders")?, false),
            AccountMeta::new(parse_key(&keys.vault.a, "vault A")?, false),
            AccountMeta::new(parse_key(&keys.vault.b, "vault B")?, false),
            AccountMeta::new_readonly(
                required_key(&keys.market_program_id, "marketProgramId")?,
                false,
            ),
            AccountMeta::new(required_key(&keys.market_id, "marketId")?, false),
            AccountMeta::new(required_key(&keys.market_bids, "marketBids")?, false),
            AccountMeta::new(required_key(&keys.market_asks, "marketAsks")?, false),
            AccountMeta::new(
                required_key(&keys.market_event_queue, "marketEventQueue")?,
                false,
            ),
            AccountMeta::new(
                required_key(&keys.market_base_vault, "marketBaseVault")?,
                false,
            ),
            AccountMeta::new(
                required_key(&keys.market_quote_vault, "marketQuoteVault")?,
                false,
            ),
            AccountMeta::new_readonly(
                required_key(&keys.market_authority, "marketAuthority")?,
                false,
            ),
            AccountMeta::new(user_source, false),
            AccountMeta::new(user_destination, false),
            AccountMeta::new_readonly(owner, true),
        ];

        Ok(Instruction {
            program_id: parse_key(&pool.program_id, "program id")?,
            accounts,
            data,
        })
    }

    fn build_clmm_swap_instruction(
        &self,
        pool: &PoolInfo,
        keys: &ApiPoolKeys,
        input_mint: &str,
        amount_in: u64,
        quote: &SwapQuote,
    ) -> Result<Instruction> {
        let mut data = Vec::with_capacity(42);
        data.extend_from_slice(&SWAP_V2_DISCRIMINATOR);
        data.extend_from_slice(&amount_in.to_le_bytes());
        data.extend_from_slice(&quote.min_amount_out.to_le_bytes());
        data.extend_from_slice(&0u128.to_le_bytes()); // sqrt_price_limit_x64: no limit
        data.push(1); // is_base_input

        let owner = self.session.owner();
        let (input, output) = pool.orient(input_mint)?;
        let input_mint_key = parse_key(&input.address, "input mint")?;
        let output_mint_key = parse_key(&output.address, "output mint")?;
        // Vault A belongs to mint A; vaults follow the swap direction.
        let (input_vault, output_vault) = if input.address == pool.mint_a.address {
            (&keys.vault.a, &keys.vault.b)
        } else {
            (&keys.vault.b, &keys.vault.a)
        };
        let amm_config = keys
            .config
            .as_ref()
            .context("Pool keys missing CLMM config")?;

        let mut accounts = vec![
            AccountMeta::new(owner, true),
            AccountMeta::new_readonly(parse_key(&amm_config.id, "ammConfig")?, false),
            AccountMeta::new(parse_key(&keys.id, "pool id")?, false),
            AccountMeta::new(self.derive_ata(&owner, &input_mint_key), false),
            AccountMeta::new(self.derive_ata(&owner, &output_mint_key), false),
            AccountMeta::new(parse_key(input_vault, "input vault")?, false),
            AccountMeta::new(parse_key(output_vault, "output vault")?, false),
            AccountMeta::new(required_key(&keys.observation_id, "observationId")?, false),
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new_readonly(self.token_2022_program, false),
            AccountMeta::new_readonly(self.memo_program, false),
            AccountMeta::new_readonly(input_mint_key, false),
            AccountMeta::new_readonly(output_mint_key, false),
        ];
        if let Some(bitmap) = &keys.ex_bitmap_account {
            accounts.push(AccountMeta::new(parse_key(bitmap, "exBitmapAccount")?, false));
        }
        for address in &quote.remaining_accounts {
            accounts.push(AccountMeta::new(parse_key(address, "tick array")?, false));
        }

        Ok(Instruction {
            program_id: parse_key(&pool.program_id, "program id")?,
            accounts,
            data,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_open_position_instruction(
        &self,
        pool: &PoolInfo,
        keys: &ApiPoolKeys,
        nft_mint: &Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        base_amount: u64,
        other_amount_max: u64,
    ) -> Result<Instruction> {
        let tick_spacing = pool
            .tick_spacing
            .context("Pool has no tick spacing")?;
        let lower_start = state::tick_array_start_index(tick_lower, tick_spacing);
        let upper_start = state::tick_array_start_index(tick_upper, tick_spacing);

        let mut data = Vec::with_capacity(60);
        data.extend_from_slice(&OPEN_POSITION_V2_DISCRIMINATOR);
        data.extend_from_slice(&tick_lower.to_le_bytes());
        data.extend_from_slice(&tick_upper.to_le_bytes());
        data.extend_from_slice(&lower_start.to_le_bytes());
        data.extend_from_slice(&upper_start.to_le_bytes());
        data.extend_from_slice(&0u128.to_le_bytes()); // liquidity: derived from base side
        data.extend_from_slice(&base_amount.to_le_bytes()); // amount_0_max
        data.extend_from_slice(&other_amount_max.to_le_bytes()); // amount_1_max
        data.push(0); // with_metadata
        data.extend_from_slice(&[1, 1]); // base_flag: Some(true), size from mint A

        let owner = self.session.owner();
        let program = parse_key(&pool.program_id, "program id")?;
        let pool_key = parse_key(&keys.id, "pool id")?;
        let mint_a = parse_key(&pool.mint_a.address, "mint A")?;
        let mint_b = parse_key(&pool.mint_b.address, "mint B")?;

        let metadata_account = Pubkey::find_program_address(
            &[
                b"metadata",
                self.metadata_program.as_ref(),
                nft_mint.as_ref(),
            ],
            &self.metadata_program,
        )
        .0;

        let accounts = vec![
            AccountMeta::new(owner, true),                                  // payer
            AccountMeta::new_readonly(owner, false),                        // position_nft_owner
            AccountMeta::new(*nft_mint, true),                              // position_nft_mint
            AccountMeta::new(self.derive_ata(&owner, nft_mint), false),     // position_nft_account
            AccountMeta::new(metadata_account, false),                      // metadata_account
            AccountMeta::new(pool_key, false),                              // pool_state
            AccountMeta::new(
                state::protocol_position_pda(&program, &pool_key, tick_lower, tick_upper),
                false,
            ),
            AccountMeta::new(
                state::tick_array_pda(&program, &pool_key, lower_start),
                false,
            ),
            AccountMeta::new(
                state::tick_array_pda(&program, &pool_key, upper_start),
                false,
            ),
            AccountMeta::new(state::position_pda(&program, nft_mint), false),
            AccountMeta::new(self.derive_ata(&owner, &mint_a), false),      // token_account_0
            AccountMeta::new(self.derive_ata(&owner, &mint_b), false),      // token_account_1
            AccountMeta::new(parse_key(&keys.vault.a, "vault A")?, false),  // token_vault_0
            AccountMeta::new(parse_key(&keys.vault.b, "vault B")?, false),  // token_vault_1
            AccountMeta::new_readonly(self.rent_sysvar, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new_readonly(self.ata_program, false),
            AccountMeta::new_readonly(self.metadata_program, false),
        ];

        Ok(Instruction {
            program_id: program,
            accounts,
            data,
        })
    }

    fn build_close_position_instruction(
        &self,
        pool: &PoolInfo,
        position: &ClmmPosition,
    ) -> Result<Instruction> {
        let owner = self.session.owner();
        let program = parse_key(&pool.program_id, "program id")?;
        let nft_mint = parse_key(&position.nft_mint, "position NFT mint")?;

        let accounts = vec![
            AccountMeta::new(owner, true),                               // nft_owner
            AccountMeta::new(nft_mint, false),                           // position_nft_mint
            AccountMeta::new(self.derive_ata(&owner, &nft_mint), false), // position_nft_account
            AccountMeta::new(state::position_pda(&program, &nft_mint), false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.token_program, false),
        ];

        Ok(Instruction {
            program_id: program,
            accounts,
            data: CLOSE_POSITION_DISCRIMINATOR.to_vec(),
        })
    }
}

#[async_trait]
impl TransactionBuilder for RaydiumExecutor {
    async fn swap_amm(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<String> {
        info!(pool = %pool.id, input_mint, amount_in, min_amount_out, "Submitting AMM swap");
        let keys = self.api.pool_keys(&pool.id).await?;
        let (_, output) = pool.orient(input_mint)?;
        let owner = self.session.owner();
        let create_ata = self
            .create_ata_idempotent_instruction(&owner, &parse_key(&output.address, "output mint")?);
        let swap =
            self.build_amm_swap_instruction(pool, &keys, input_mint, amount_in, min_amount_out)?;
        self.send(&[create_ata, swap], &[]).await
    }

    async fn swap_clmm(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        amount_in: u64,
        quote: &SwapQuote,
    ) -> Result<String> {
        info!(
            pool = %pool.id,
            input_mint,
            amount_in,
            min_amount_out = quote.min_amount_out,
            "Submitting CLMM swap"
        );
        let keys = self.api.pool_keys(&pool.id).await?;
        let (_, output) = pool.orient(input_mint)?;
        let owner = self.session.owner();
        let create_ata = self
            .create_ata_idempotent_instruction(&owner, &parse_key(&output.address, "output mint")?);
        let swap = self.build_clmm_swap_instruction(pool, &keys, input_mint, amount_in, quote)?;
        self.send(&[create_ata, swap], &[]).await
    }

    async fn open_position(
        &self,
        pool: &PoolInfo,
        tick_lower: i32,
        tick_upper: i32,
        base_amount: u64,
        other_amount_max: u64,
    ) -> Result<String> {
        info!(
            pool = %pool.id,
            tick_lower,
            tick_upper,
            base_amount,
            "Opening position"
        );
        let keys = self.api.pool_keys(&pool.id).await?;
        // The position is represented by a fresh NFT; its mint signs the
        // creation transaction.
        let nft_mint = Keypair::new();
        let instruction = self.build_open_position_instruction(
            pool,
            &keys,
            &nft_mint.pubkey(),
            tick_lower,
            tick_upper,
            base_amount,
            other_amount_max,
        )?;
        self.send(&[instruction], &[&nft_mint]).await
    }

    async fn close_position(&self, pool: &PoolInfo, position: &ClmmPosition) -> Result<String> {
        info!(pool = %pool.id, nft_mint = %position.nft_mint, "Closing position");
        let instruction = self.build_close_position_instruction(pool, position)?;
        self.send(&[instruction], &[]).await
    }

    async fn owner_positions(&self, program_id: &str) -> Result<Vec<ClmmPosition>> {
        let program = parse_key(program_id, "program id")?;
        let owner = self.session.owner();

        let filters = vec![
            RpcFilterType::DataSize(TOKEN_ACCOUNT_SIZE),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                TOKEN_ACCOUNT_OWNER_OFFSET,
                owner.to_bytes().to_vec(),
            )),
        ];
        let token_accounts = self
            .session
            .rpc()
            .program_accounts(&self.token_program, filters)
            .await?;

        // Position NFTs show up as token accounts holding exactly one unit.
        let mut nft_mints = Vec::new();
        for (_, account) in &token_accounts {
            let Ok(token) = spl_token::state::Account::unpack(&account.data) else {
                continue;
            };
            if token.amount == 1 {
                nft_mints.push(Pubkey::new_from_array(token.mint.to_bytes()));
            }
        }

        let mut positions = Vec::new();
        for chunk in nft_mints.chunks(100) {
            let pdas: Vec<Pubkey> = chunk
                .iter()
                .map(|mint| state::position_pda(&program, mint))
                .collect();
            let accounts = self.session.rpc().multiple_accounts(&pdas).await?;
            for account in accounts.into_iter().flatten() {
                let Ok(parsed) = PersonalPositionState::parse(&account.data) else {
                    continue;
                };
                positions.push(ClmmPosition {
                    nft_mint: parsed.nft_mint.to_string(),
                    pool_id: parsed.pool_id.to_string(),
                    tick_lower: parsed.tick_lower_index,
                    tick_upper: parsed.tick_upper_index,
                    liquidity: parsed.liquidity,
                });
            }
        }
        debug!(owner = %owner, count = positions.len(), "Scanned owner positions");
        Ok(positions)
    }
}

fn parse_key(value: &str, name: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("Invalid {name} address: {value}"))
}

fn required_key(value: &Option<String>, name: &str) -> Result<Pubkey> {
    let value = value
        .as_deref()
        .with_context(|| format!("Pool keys missing {name}"))?;
    parse_key(value, name)
}
