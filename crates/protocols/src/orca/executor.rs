//! Whirlpool instruction builders.
//!
//! Provides the instructions the automator needs from the Whirlpool program:
//! - Open and close positions
//! - Increase/decrease liquidity
//! - Refresh and collect fees and rewards
//! - Initialize missing tick arrays

use crate::rpc::{
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Orca Whirlpool program ID (mainnet).
pub const WHIRLPOOL_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc");

/// Ticks covered by one tick array account.
pub const TICK_ARRAY_SIZE: i32 = 88;

const OPEN_POSITION: [u8; 8] = [135, 128, 47, 77, 15, 152, 240, 49];
const INCREASE_LIQUIDITY: [u8; 8] = [46, 156, 243, 118, 13, 205, 251, 178];
const DECREASE_LIQUIDITY: [u8; 8] = [160, 38, 208, 111, 104, 91, 44, 1];
const UPDATE_FEES_AND_REWARDS: [u8; 8] = [154, 230, 250, 13, 236, 209, 75, 223];
const COLLECT_FEES: [u8; 8] = [164, 152, 207, 99, 30, 186, 19, 182];
const COLLECT_REWARD: [u8; 8] = [70, 5, 132, 87, 86, 235, 177, 34];
const CLOSE_POSITION: [u8; 8] = [123, 134, 81, 0, 49, 68, 98, 98];
const INITIALIZE_TICK_ARRAY: [u8; 8] = [11, 188, 193, 214, 141, 91, 149, 184];

/// First tick of the array containing `tick`.
pub fn tick_array_start_index(tick: i32, tick_spacing: i32) -> i32 {
    let ticks_per_array = tick_spacing * TICK_ARRAY_SIZE;
    tick.div_euclid(ticks_per_array) * ticks_per_array
}

/// Accounts shared by increase and decrease liquidity.
#[derive(Debug, Clone)]
pub struct ModifyLiquidityAccounts {
    pub whirlpool: Pubkey,
    pub position_authority: Pubkey,
    pub position: Pubkey,
    pub position_token_account: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
}

/// Accounts for fee collection.
#[derive(Debug, Clone)]
pub struct CollectFeesAccounts {
    pub whirlpool: Pubkey,
    pub position_authority: Pubkey,
    pub position: Pubkey,
    pub position_token_account: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_b: Pubkey,
}

/// Accounts for collecting one reward slot.
#[derive(Debug, Clone)]
pub struct CollectRewardAccounts {
    pub whirlpool: Pubkey,
    pub position_authority: Pubkey,
    pub position: Pubkey,
    pub position_token_account: Pubkey,
    pub reward_owner_account: Pubkey,
    pub reward_vault: Pubkey,
}

/// Builder for Orca Whirlpool instructions.
#[derive(Debug, Clone, Copy)]
pub struct WhirlpoolExecutor {
    /// Whirlpool program ID.
    program_id: Pubkey,
}

impl Default for WhirlpoolExecutor {
    fn default() -> Self {
        Self::new(WHIRLPOOL_PROGRAM_ID)
    }
}

impl WhirlpoolExecutor {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Position PDA of a position mint, with its bump.
    pub fn position_pda(&self, position_mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[b"position", position_mint.as_ref()], &self.program_id)
    }

    /// Tick array PDA starting at `start_index`.
    pub fn tick_array_pda(&self, whirlpool: &Pubkey, start_index: i32) -> Pubkey {
        let start = start_index.to_string();
        let (pda, _bump) = Pubkey::find_program_address(
            &[b"tick_array", whirlpool.as_ref(), start.as_bytes()],
            &self.program_id,
        );
        pda
    }

    /// Tick array PDA covering `tick`.
    pub fn tick_array_for_tick(&self, whirlpool: &Pubkey, tick: i32, tick_spacing: i32) -> Pubkey {
        self.tick_array_pda(whirlpool, tick_array_start_index(tick, tick_spacing))
    }

    pub fn initialize_tick_array(
        &self,
        whirlpool: &Pubkey,
        funder: &Pubkey,
        start_index: i32,
    ) -> Instruction {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&INITIALIZE_TICK_ARRAY);
        data.extend_from_slice(&start_index.to_le_bytes());

        let accounts = vec![
            AccountMeta::new_readonly(*whirlpool, false), // whirlpool
            AccountMeta::new(*funder, true),              // funder
            AccountMeta::new(self.tick_array_pda(whirlpool, start_index), false), // tick_array
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false), // system_program
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data,
        }
    }

    /// Mints a position NFT into the owner's associated account.
    pub fn open_position(
        &self,
        whirlpool: &Pubkey,
        owner: &Pubkey,
        position_mint: &Pubkey,
        position_token_account: &Pubkey,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Instruction {
        let (position, bump) = self.position_pda(position_mint);

        let mut data = Vec::with_capacity(17);
        data.extend_from_slice(&OPEN_POSITION);
        data.push(bump);
        data.extend_from_slice(&tick_lower.to_le_bytes());
        data.extend_from_slice(&tick_upper.to_le_bytes());

        let accounts = vec![
            AccountMeta::new(*owner, true),                        // funder
            AccountMeta::new_readonly(*owner, false),              // owner
            AccountMeta::new(position, false),                     // position
            AccountMeta::new(*position_mint, true),                // position_mint
            AccountMeta::new(*position_token_account, false),      // position_token_account
            AccountMeta::new_readonly(*whirlpool, false),          // whirlpool
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),    // token_program
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),   // system_program
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),      // rent
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false), // associated_token_program
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data,
        }
    }

    pub fn increase_liquidity(
        &self,
        accounts: &ModifyLiquidityAccounts,
        liquidity_amount: u128,
        token_max_a: u64,
        token_max_b: u64,
    ) -> Instruction {
        self.modify_liquidity(
            INCREASE_LIQUIDITY,
            accounts,
            liquidity_amount,
            token_max_a,
            token_max_b,
        )
    }

    pub fn decrease_liquidity(
        &self,
        accounts: &ModifyLiquidityAccounts,
        liquidity_amount: u128,
        token_min_a: u64,
        token_min_b: u64,
    ) -> Instruction {
        self.modify_liquidity(
            DECREASE_LIQUIDITY,
            accounts,
            liquidity_amount,
            token_min_a,
            token_min_b,
        )
    }

    fn modify_liquidity(
        &self,
        discriminator: [u8; 8],
        accounts: &ModifyLiquidityAccounts,
        liquidity_amount: u128,
        token_a: u64,
        token_b: u64,
    ) -> Instruction {
        let mut data = Vec::with_capacity(40);
        data.extend_from_slice(&discriminator);
        data.extend_from_slice(&liquidity_amount.to_le_bytes());
        data.extend_from_slice(&token_a.to_le_bytes());
        data.extend_from_slice(&token_b.to_le_bytes());

        let accounts = vec![
            AccountMeta::new(accounts.whirlpool, false),                      // whirlpool
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),               // token_program
            AccountMeta::new_readonly(accounts.position_authority, true),     // position_authority
            AccountMeta::new(accounts.position, false),                       // position
            AccountMeta::new_readonly(accounts.position_token_account, false), // position_token_account
            AccountMeta::new(accounts.token_owner_account_a, false),          // token_owner_account_a
            AccountMeta::new(accounts.token_owner_account_b, false),          // token_owner_account_b
            AccountMeta::new(accounts.token_vault_a, false),                  // token_vault_a
            AccountMeta::new(accounts.token_vault_b, false),                  // token_vault_b
            AccountMeta::new(accounts.tick_array_lower, false),               // tick_array_lower
            AccountMeta::new(accounts.tick_array_upper, false),               // tick_array_upper
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data,
        }
    }

    pub fn update_fees_and_rewards(
        &self,
        whirlpool: &Pubkey,
        position: &Pubkey,
        tick_array_lower: &Pubkey,
        tick_array_upper: &Pubkey,
    ) -> Instruction {
        let accounts = vec![
            AccountMeta::new(*whirlpool, false),                 // whirlpool
            AccountMeta::new(*position, false),                  // position
            AccountMeta::new_readonly(*tick_array_lower, false), // tick_array_lower
            AccountMeta::new_readonly(*tick_array_upper, false), // tick_array_upper
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data: UPDATE_FEES_AND_REWARDS.to_vec(),
        }
    }

    pub fn collect_fees(&self, accounts: &CollectFeesAccounts) -> Instruction {
        let accounts = vec![
            AccountMeta::new_readonly(accounts.whirlpool, false),              // whirlpool
            AccountMeta::new_readonly(accounts.position_authority, true),      // position_authority
            AccountMeta::new(accounts.position, false),                        // position
            AccountMeta::new_readonly(accounts.position_token_account, false), // position_token_account
            AccountMeta::new(accounts.token_owner_account_a, false),           // token_owner_account_a
            AccountMeta::new(accounts.token_vault_a, false),                   // token_vault_a
            AccountMeta::new(accounts.token_owner_account_b, false),           // token_owner_account_b
            AccountMeta::new(accounts.token_vault_b, false),                   // token_vault_b
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),                // token_program
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data: COLLECT_FEES.to_vec(),
        }
    }

    pub fn collect_reward(&self, accounts: &CollectRewardAccounts, reward_index: u8) -> Instruction {
        let mut data = COLLECT_REWARD.to_vec();
        data.push(reward_index);

        let accounts = vec![
            AccountMeta::new_readonly(accounts.whirlpool, false),              // whirlpool
            AccountMeta::new_readonly(accounts.position_authority, true),      // position_authority
            AccountMeta::new(accounts.position, false),                        // position
            AccountMeta::new_readonly(accounts.position_token_account, false), // position_token_account
            AccountMeta::new(accounts.reward_owner_account, false),            // reward_owner_account
            AccountMeta::new(accounts.reward_vault, false),                    // reward_vault
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),                // token_program
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data,
        }
    }

    /// Burns the position NFT and returns rent to `receiver`.
    pub fn close_position(
        &self,
        position_authority: &Pubkey,
        receiver: &Pubkey,
        position: &Pubkey,
        position_mint: &Pubkey,
        position_token_account: &Pubkey,
    ) -> Instruction {
        let accounts = vec![
            AccountMeta::new_readonly(*position_authority, true), // position_authority
            AccountMeta::new(*receiver, false),                   // receiver
            AccountMeta::new(*position, false),                   // position
            AccountMeta::new(*position_mint, false),              // position_mint
            AccountMeta::new(*position_token_account, false),     // position_token_account
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),   // token_program
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data: CLOSE_POSITION.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liquidity_accounts() -> ModifyLiquidityAccounts {
        ModifyLiquidityAccounts {
            whirlpool: Pubkey::new_unique(),
            position_authority: Pubkey::new_unique(),
            position: Pubkey::new_unique(),
            position_token_account: Pubkey::new_unique(),
            token_owner_account_a: Pubkey::new_unique(),
            token_owner_account_b: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            tick_array_lower: Pubkey::new_unique(),
            tick_array_upper: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_tick_array_start_index() {
        assert_eq!(tick_array_start_index(0, 64), 0);
        assert_eq!(tick_array_start_index(5631, 64), 0);
        assert_eq!(tick_array_start_index(5632, 64), 5632);
        assert_eq!(tick_array_start_index(-1, 64), -5632);
        assert_eq!(tick_array_start_index(-640, 64), -5632);
        assert_eq!(tick_array_start_index(1000, 1), 968);
    }

    #[test]
    fn test_open_position_data() {
        let executor = WhirlpoolExecutor::default();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = executor.open_position(&Pubkey::new_unique(), &owner, &mint, &Pubkey::new_unique(), -640, 960);

        let (position, bump) = executor.position_pda(&mint);
        assert_eq!(ix.program_id, WHIRLPOOL_PROGRAM_ID);
        assert_eq!(&ix.data[..8], &OPEN_POSITION);
        assert_eq!(ix.data[8], bump);
        assert_eq!(&ix.data[9..13], &(-640i32).to_le_bytes());
        assert_eq!(&ix.data[13..17], &960i32.to_le_bytes());
        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(ix.accounts[2].pubkey, position);
        assert!(ix.accounts[3].is_signer);
    }

    #[test]
    fn test_modify_liquidity_layout() {
        let executor = WhirlpoolExecutor::default();
        let accounts = liquidity_accounts();
        let ix = executor.decrease_liquidity(&accounts, 1_000, 7, 9);

        assert_eq!(&ix.data[..8], &DECREASE_LIQUIDITY);
        assert_eq!(&ix.data[8..24], &1_000u128.to_le_bytes());
        assert_eq!(&ix.data[24..32], &7u64.to_le_bytes());
        assert_eq!(&ix.data[32..40], &9u64.to_le_bytes());
        assert_eq!(ix.accounts.len(), 11);
        assert!(ix.accounts[2].is_signer);
        assert_eq!(ix.accounts[10].pubkey, accounts.tick_array_upper);

        let ix = executor.increase_liquidity(&accounts, 1, 2, 3);
        assert_eq!(&ix.data[..8], &INCREASE_LIQUIDITY);
    }

    #[test]
    fn test_collect_reward_index() {
        let executor = WhirlpoolExecutor::default();
        let accounts = CollectRewardAccounts {
            whirlpool: Pubkey::new_unique(),
            position_authority: Pubkey::new_unique(),
            position: Pubkey::new_unique(),
            position_token_account: Pubkey::new_unique(),
            reward_owner_account: Pubkey::new_unique(),
            reward_vault: Pubkey::new_unique(),
        };
        let ix = executor.collect_reward(&accounts, 2);
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[8], 2);
        assert_eq!(ix.accounts.len(), 7);
    }

    #[test]
    fn test_tick_array_pda_differs_per_start() {
        let executor = WhirlpoolExecutor::default();
        let pool = Pubkey::new_unique();
        assert_eq!(
            executor.tick_array_for_tick(&pool, 100, 64),
            executor.tick_array_pda(&pool, 0)
        );
        assert_ne!(
            executor.tick_array_pda(&pool, 0),
            executor.tick_array_pda(&pool, -5632)
        );
    }
}
