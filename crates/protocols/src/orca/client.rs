//! [`PoolClient`] backed by the Whirlpool program.

use super::executor::{
    CollectFeesAccounts, CollectRewardAccounts, ModifyLiquidityAccounts, WhirlpoolExecutor,
    tick_array_start_index,
};
use super::whirlpool::{Position, Whirlpool};
use crate::error::ProtocolError;
use crate::rpc::{RpcProvider, create_ata_idempotent_instruction, derive_ata, parse_pubkey};
use crate::transaction::PendingTransaction;
use crate::{OpenedPosition, PoolClient};
use async_trait::async_trait;
use clmm_autopilot_domain::entities::{PoolSnapshot, PositionSnapshot};
use clmm_autopilot_domain::math::concentrated_liquidity::{
    IncreaseLiquidityQuote, token_amounts_from_liquidity,
};
use clmm_autopilot_domain::math::tick_math::tick_to_sqrt_price_x64;
use clmm_autopilot_domain::value_objects::{Percentage, TickRange};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use tracing::debug;

/// Reads Whirlpool accounts and builds requests signed by `wallet`.
pub struct WhirlpoolClient {
    provider: Arc<RpcProvider>,
    executor: WhirlpoolExecutor,
    wallet: Pubkey,
}

impl WhirlpoolClient {
    pub fn new(provider: Arc<RpcProvider>, wallet: Pubkey) -> Self {
        Self {
            provider,
            executor: WhirlpoolExecutor::default(),
            wallet,
        }
    }

    #[must_use]
    pub fn with_executor(mut self, executor: WhirlpoolExecutor) -> Self {
        self.executor = executor;
        self
    }

    fn liquidity_accounts(
        &self,
        pool: &PoolSnapshot,
        position_address: &Pubkey,
        position_mint: &Pubkey,
        range: TickRange,
    ) -> Result<ModifyLiquidityAccounts, ProtocolError> {
        let whirlpool = parse_pubkey(&pool.address)?;
        Ok(ModifyLiquidityAccounts {
            whirlpool,
            position_authority: self.wallet,
            position: *position_address,
            position_token_account: derive_ata(&self.wallet, position_mint),
            token_owner_account_a: derive_ata(&self.wallet, &parse_pubkey(&pool.token_mint_a)?),
            token_owner_account_b: derive_ata(&self.wallet, &parse_pubkey(&pool.token_mint_b)?),
            token_vault_a: parse_pubkey(&pool.token_vault_a)?,
            token_vault_b: parse_pubkey(&pool.token_vault_b)?,
            tick_array_lower: self.executor.tick_array_for_tick(
                &whirlpool,
                range.lower,
                pool.tick_spacing,
            ),
            tick_array_upper: self.executor.tick_array_for_tick(
                &whirlpool,
                range.upper,
                pool.tick_spacing,
            ),
        })
    }

    fn position_accounts(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<ModifyLiquidityAccounts, ProtocolError> {
        self.liquidity_accounts(
            pool,
            &parse_pubkey(&position.address)?,
            &parse_pubkey(&position.position_mint)?,
            TickRange::new(position.tick_lower_index, position.tick_upper_index),
        )
    }

    fn owner_account_setup(&self, pool: &PoolSnapshot) -> Result<Vec<Instruction>, ProtocolError> {
        Ok(vec![
            create_ata_idempotent_instruction(
                &self.wallet,
                &self.wallet,
                &parse_pubkey(&pool.token_mint_a)?,
            ),
            create_ata_idempotent_instruction(
                &self.wallet,
                &self.wallet,
                &parse_pubkey(&pool.token_mint_b)?,
            ),
        ])
    }

    /// Initialises the tick arrays of `range` that do not exist yet.
    async fn tick_array_setup(
        &self,
        pool: &PoolSnapshot,
        range: TickRange,
    ) -> Result<Vec<Instruction>, ProtocolError> {
        let whirlpool = parse_pubkey(&pool.address)?;
        let mut starts = vec![tick_array_start_index(range.lower, pool.tick_spacing)];
        let upper_start = tick_array_start_index(range.upper, pool.tick_spacing);
        if upper_start != starts[0] {
            starts.push(upper_start);
        }

        let mut instructions = Vec::new();
        for start in starts {
            let tick_array = self.executor.tick_array_pda(&whirlpool, start);
            if !self.provider.account_exists(&tick_array).await? {
                debug!(%tick_array, start, "Tick array missing, initializing");
                instructions.push(
                    self.executor
                        .initialize_tick_array(&whirlpool, &self.wallet, start),
                );
            }
        }
        Ok(instructions)
    }

    fn collect_fees_instruction(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<Instruction, ProtocolError> {
        let accounts = self.position_accounts(pool, position)?;
        Ok(self.executor.collect_fees(&CollectFeesAccounts {
            whirlpool: accounts.whirlpool,
            position_authority: accounts.position_authority,
            position: accounts.position,
            position_token_account: accounts.position_token_account,
            token_owner_account_a: accounts.token_owner_account_a,
            token_vault_a: accounts.token_vault_a,
            token_owner_account_b: accounts.token_owner_account_b,
            token_vault_b: accounts.token_vault_b,
        }))
    }

    fn collect_reward_instruction(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        reward_index: usize,
    ) -> Result<Instruction, ProtocolError> {
        let reward = pool
            .reward_infos
            .get(reward_index)
            .filter(|reward| reward.is_initialized())
            .ok_or_else(|| {
                ProtocolError::InvalidRequest(format!(
                    "reward {reward_index} of pool {} is not initialized",
                    pool.address
                ))
            })?;
        let index = u8::try_from(reward_index)
            .map_err(|_| ProtocolError::InvalidRequest(format!("reward index {reward_index}")))?;
        let position_mint = parse_pubkey(&position.position_mint)?;
        Ok(self.executor.collect_reward(
            &CollectRewardAccounts {
                whirlpool: parse_pubkey(&pool.address)?,
                position_authority: self.wallet,
                position: parse_pubkey(&position.address)?,
                position_token_account: derive_ata(&self.wallet, &position_mint),
                reward_owner_account: derive_ata(&self.wallet, &parse_pubkey(&reward.mint)?),
                reward_vault: parse_pubkey(&reward.vault)?,
            },
            index,
        ))
    }

    fn update_instruction(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<Instruction, ProtocolError> {
        let accounts = self.position_accounts(pool, position)?;
        Ok(self.executor.update_fees_and_rewards(
            &accounts.whirlpool,
            &accounts.position,
            &accounts.tick_array_lower,
            &accounts.tick_array_upper,
        ))
    }

    /// Harvest and burn, preceded by a full withdrawal when liquidity remains.
    fn close_instructions(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        tolerance: Percentage,
    ) -> Result<Vec<Instruction>, ProtocolError> {
        let mut instructions = self.owner_account_setup(pool)?;

        if position.liquidity > 0 {
            let (amount_a, amount_b) = token_amounts_from_liquidity(
                position.liquidity,
                pool.sqrt_price,
                tick_to_sqrt_price_x64(position.tick_lower_index)?,
                tick_to_sqrt_price_x64(position.tick_upper_index)?,
                false,
            )?;
            let min_a = tolerance.subtract_from(u64::try_from(amount_a).unwrap_or(u64::MAX));
            let min_b = tolerance.subtract_from(u64::try_from(amount_b).unwrap_or(u64::MAX));
            instructions.push(self.update_instruction(pool, position)?);
            instructions.push(self.executor.decrease_liquidity(
                &self.position_accounts(pool, position)?,
                position.liquidity,
                min_a,
                min_b,
            ));
        }

        instructions.push(self.collect_fees_instruction(pool, position)?);
        for (index, reward) in pool.initialized_rewards() {
            instructions.push(create_ata_idempotent_instruction(
                &self.wallet,
                &self.wallet,
                &parse_pubkey(&reward.mint)?,
            ));
            instructions.push(self.collect_reward_instruction(pool, position, index)?);
        }

        let position_mint = parse_pubkey(&position.position_mint)?;
        instructions.push(self.executor.close_position(
            &self.wallet,
            &self.wallet,
            &parse_pubkey(&position.address)?,
            &position_mint,
            &derive_ata(&self.wallet, &position_mint),
        ));
        Ok(instructions)
    }
}

#[async_trait]
impl PoolClient for WhirlpoolClient {
    async fn get_pool(&self, address: &str) -> Result<PoolSnapshot, ProtocolError> {
        let data = self.provider.get_account_data(&parse_pubkey(address)?).await?;
        Ok(Whirlpool::decode(address, &data)?.to_snapshot(address))
    }

    async fn get_position(&self, address: &str) -> Result<PositionSnapshot, ProtocolError> {
        let data = self.provider.get_account_data(&parse_pubkey(address)?).await?;
        Ok(Position::decode(address, &data)?.to_snapshot(address))
    }

    async fn open_position(
        &self,
        pool: &PoolSnapshot,
        range: TickRange,
        quote: &IncreaseLiquidityQuote,
    ) -> Result<OpenedPosition, ProtocolError> {
        let whirlpool = parse_pubkey(&pool.address)?;
        let position_mint = Arc::new(Keypair::new());
        let mint = position_mint.pubkey();
        let (position_address, _bump) = self.executor.position_pda(&mint);

        let mut instructions = self.tick_array_setup(pool, range).await?;
        instructions.extend(self.owner_account_setup(pool)?);
        instructions.push(self.executor.open_position(
            &whirlpool,
            &self.wallet,
            &mint,
            &derive_ata(&self.wallet, &mint),
            range.lower,
            range.upper,
        ));
        instructions.push(self.executor.increase_liquidity(
            &self.liquidity_accounts(pool, &position_address, &mint, range)?,
            quote.liquidity_amount,
            quote.token_max_a,
            quote.token_max_b,
        ));

        Ok(OpenedPosition {
            position_mint: mint.to_string(),
            position_address: position_address.to_string(),
            transaction: PendingTransaction::new(format!("open position {range}"), instructions)
                .with_signer(position_mint),
        })
    }

    async fn increase_liquidity(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        quote: &IncreaseLiquidityQuote,
    ) -> Result<PendingTransaction, ProtocolError> {
        let mut instructions = self.owner_account_setup(pool)?;
        instructions.push(self.executor.increase_liquidity(
            &self.position_accounts(pool, position)?,
            quote.liquidity_amount,
            quote.token_max_a,
            quote.token_max_b,
        ));
        Ok(PendingTransaction::new("increase liquidity", instructions))
    }

    async fn decrease_liquidity(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        liquidity: u128,
        token_min_a: u64,
        token_min_b: u64,
    ) -> Result<PendingTransaction, ProtocolError> {
        let mut instructions = self.owner_account_setup(pool)?;
        instructions.push(self.executor.decrease_liquidity(
            &self.position_accounts(pool, position)?,
            liquidity,
            token_min_a,
            token_min_b,
        ));
        Ok(PendingTransaction::new("decrease liquidity", instructions))
    }

    async fn close_position(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        tolerance: Percentage,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(PendingTransaction::new(
            "close position",
            self.close_instructions(pool, position, tolerance)?,
        ))
    }

    async fn update_fees_and_rewards(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(PendingTransaction::new(
            "update fees and rewards",
            vec![self.update_instruction(pool, position)?],
        ))
    }

    async fn collect_fees(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
    ) -> Result<PendingTransaction, ProtocolError> {
        let mut instructions = self.owner_account_setup(pool)?;
        instructions.push(self.collect_fees_instruction(pool, position)?);
        Ok(PendingTransaction::new("collect fees", instructions))
    }

    async fn collect_reward(
        &self,
        pool: &PoolSnapshot,
        position: &PositionSnapshot,
        reward_index: usize,
    ) -> Result<PendingTransaction, ProtocolError> {
        Ok(PendingTransaction::new(
            format!("collect reward {reward_index}"),
            vec![self.collect_reward_instruction(pool, position, reward_index)?],
        ))
    }
}
