use anyhow::{Context, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// Number of ticks covered by one tick-array account.
pub const TICK_ARRAY_SIZE: i32 = 60;

/// Prefix of the CLMM pool account.
///
/// Borsh reads fields in declaration order, so a prefix struct covering the
/// fields the workflows need is enough; trailing bytes (observation state,
/// reward infos, padding) are left unread.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PoolState {
    pub discriminator: [u8; 8],
    pub bump: [u8; 1],
    pub amm_config: Pubkey,
    pub owner: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub observation_key: Pubkey,
    pub mint_decimals_0: u8,
    pub mint_decimals_1: u8,
    pub tick_spacing: u16,
    pub liquidity: u128,
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
}

impl PoolState {
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::deserialize(&mut &data[..]).context("Failed to parse CLMM pool state")
    }
}

/// Prefix of the personal position account tied to a position NFT.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PersonalPositionState {
    pub discriminator: [u8; 8],
    pub bump: u8,
    pub nft_mint: Pubkey,
    pub pool_id: Pubkey,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub liquidity: u128,
}

impl PersonalPositionState {
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::deserialize(&mut &data[..]).context("Failed to parse personal position state")
    }
}

/// First tick covered by the tick array containing `tick`.
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let ticks_per_array = TICK_ARRAY_SIZE * i32::from(tick_spacing.max(1));
    tick.div_euclid(ticks_per_array) * ticks_per_array
}

/// Address of the tick-array account starting at `start_index`.
pub fn tick_array_pda(program: &Pubkey, pool: &Pubkey, start_index: i32) -> Pubkey {
    Pubkey::find_program_address(
        &[b"tick_array", pool.as_ref(), &start_index.to_be_bytes()],
        program,
    )
    .0
}

/// Address of the personal position account for a position NFT.
pub fn position_pda(program: &Pubkey, nft_mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"position", nft_mint.as_ref()], program).0
}

/// Address of the pool-wide protocol position for a tick range.
pub fn protocol_position_pda(
    program: &Pubkey,
    pool: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"position",
            pool.as_ref(),
            &tick_lower.to_be_bytes(),
            &tick_upper.to_be_bytes(),
        ],
        program,
    )
    .0
}
