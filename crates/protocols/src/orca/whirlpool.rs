//! Whirlpool program account layouts.

use crate::error::ProtocolError;
use borsh::{BorshDeserialize, BorshSerialize};
use clmm_autopilot_domain::entities::{NUM_REWARDS, PoolSnapshot, PositionSnapshot, RewardInfo};
use solana_sdk::pubkey::Pubkey;

/// Anchor discriminator of the `Whirlpool` account.
pub const WHIRLPOOL_DISCRIMINATOR: [u8; 8] = [63, 149, 209, 12, 225, 128, 99, 9];

/// Anchor discriminator of the `Position` account.
pub const POSITION_DISCRIMINATOR: [u8; 8] = [170, 188, 143, 228, 122, 64, 247, 208];

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WhirlpoolRewardInfo {
    pub mint: [u8; 32],
    pub vault: [u8; 32],
    /// Reward authority in older pools, extension data in newer ones.
    pub authority: [u8; 32],
    pub emissions_per_second_x64: u128,
    pub growth_global_x64: u128,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Whirlpool {
    pub discriminator: [u8; 8],
    pub whirlpools_config: [u8; 32],
    pub whirlpool_bump: [u8; 1],
    pub tick_spacing: u16,
    pub fee_tier_index_seed: [u8; 2],
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub token_mint_a: [u8; 32],
    pub token_vault_a: [u8; 32],
    pub fee_growth_global_a: u128,
    pub token_mint_b: [u8; 32],
    pub token_vault_b: [u8; 32],
    pub fee_growth_global_b: u128,
    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [WhirlpoolRewardInfo; NUM_REWARDS],
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionRewardInfo {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub discriminator: [u8; 8],
    pub whirlpool: [u8; 32],
    pub position_mint: [u8; 32],
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

fn key(bytes: &[u8; 32]) -> String {
    Pubkey::new_from_array(*bytes).to_string()
}

/// Deserialises a layout prefix; trailing account padding is ignored.
fn decode<T: BorshDeserialize>(
    kind: &'static str,
    address: &str,
    data: &[u8],
    discriminator: &[u8; 8],
) -> Result<T, ProtocolError> {
    let err = |reason: String| ProtocolError::Decode {
        kind,
        address: address.to_string(),
        reason,
    };
    if data.len() < 8 || &data[..8] != discriminator {
        return Err(err("discriminator mismatch".to_string()));
    }
    T::deserialize(&mut &data[..]).map_err(|e| err(e.to_string()))
}

impl Whirlpool {
    pub fn decode(address: &str, data: &[u8]) -> Result<Self, ProtocolError> {
        decode("whirlpool", address, data, &WHIRLPOOL_DISCRIMINATOR)
    }

    pub fn to_snapshot(&self, address: &str) -> PoolSnapshot {
        let reward_infos = self.reward_infos.clone().map(|reward| RewardInfo {
            mint: key(&reward.mint),
            vault: key(&reward.vault),
            emissions_per_second_x64: reward.emissions_per_second_x64,
        });
        PoolSnapshot {
            address: address.to_string(),
            token_mint_a: key(&self.token_mint_a),
            token_mint_b: key(&self.token_mint_b),
            token_vault_a: key(&self.token_vault_a),
            token_vault_b: key(&self.token_vault_b),
            sqrt_price: self.sqrt_price,
            tick_current_index: self.tick_current_index,
            tick_spacing: i32::from(self.tick_spacing),
            fee_rate: self.fee_rate,
            liquidity: self.liquidity,
            reward_infos,
        }
    }
}

impl Position {
    pub fn decode(address: &str, data: &[u8]) -> Result<Self, ProtocolError> {
        decode("position", address, data, &POSITION_DISCRIMINATOR)
    }

    pub fn to_snapshot(&self, address: &str) -> PositionSnapshot {
        PositionSnapshot {
            address: address.to_string(),
            whirlpool: key(&self.whirlpool),
            position_mint: key(&self.position_mint),
            liquidity: self.liquidity,
            tick_lower_index: self.tick_lower_index,
            tick_upper_index: self.tick_upper_index,
            fee_owed_a: self.fee_owed_a,
            fee_owed_b: self.fee_owed_b,
            reward_owed: self.reward_infos.map(|reward| reward.amount_owed),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use clmm_autopilot_domain::entities::DEFAULT_ADDRESS;

    pub(crate) fn sample_whirlpool() -> Whirlpool {
        let mut reward_infos: [WhirlpoolRewardInfo; NUM_REWARDS] = Default::default();
        reward_infos[0].mint = [7; 32];
        reward_infos[0].vault = [8; 32];
        reward_infos[0].emissions_per_second_x64 = 1 << 64;
        Whirlpool {
            discriminator: WHIRLPOOL_DISCRIMINATOR,
            whirlpools_config: [1; 32],
            whirlpool_bump: [255],
            tick_spacing: 64,
            fee_tier_index_seed: [64, 0],
            fee_rate: 3000,
            protocol_fee_rate: 300,
            liquidity: 1_000_000,
            sqrt_price: 1 << 64,
            tick_current_index: -1000,
            protocol_fee_owed_a: 0,
            protocol_fee_owed_b: 0,
            token_mint_a: [2; 32],
            token_vault_a: [3; 32],
            fee_growth_global_a: 0,
            token_mint_b: [4; 32],
            token_vault_b: [5; 32],
            fee_growth_global_b: 0,
            reward_last_updated_timestamp: 1_700_000_000,
            reward_infos,
        }
    }

    #[test]
    fn test_decode_whirlpool_with_padding() {
        let mut data = borsh::to_vec(&sample_whirlpool()).unwrap();
        data.extend_from_slice(&[0; 12]);

        let snapshot = Whirlpool::decode("pool", &data).unwrap().to_snapshot("pool");
        assert_eq!(snapshot.tick_spacing, 64);
        assert_eq!(snapshot.tick_current_index, -1000);
        assert_eq!(snapshot.fee_rate, 3000);
        assert_eq!(snapshot.token_mint_a, Pubkey::new_from_array([2; 32]).to_string());
        assert!(snapshot.reward_infos[0].is_initialized());
        assert_eq!(snapshot.reward_infos[1].mint, DEFAULT_ADDRESS);
        assert_eq!(snapshot.initialized_rewards().count(), 1);
    }

    #[test]
    fn test_decode_position() {
        let mut reward_infos = [PositionRewardInfo::default(); NUM_REWARDS];
        reward_infos[2].amount_owed = 42;
        let position = Position {
            discriminator: POSITION_DISCRIMINATOR,
            whirlpool: [9; 32],
            position_mint: [10; 32],
            liquidity: 5_000,
            tick_lower_index: -640,
            tick_upper_index: 960,
            fee_growth_checkpoint_a: 0,
            fee_owed_a: 5,
            fee_growth_checkpoint_b: 0,
            fee_owed_b: 0,
            reward_infos,
        };
        let data = borsh::to_vec(&position).unwrap();

        let snapshot = Position::decode("pos", &data).unwrap().to_snapshot("pos");
        assert_eq!(snapshot.tick_lower_index, -640);
        assert_eq!(snapshot.tick_upper_index, 960);
        assert_eq!(snapshot.fee_owed_a, 5);
        assert_eq!(snapshot.reward_owed, [0, 0, 42]);
    }

    #[test]
    fn test_wrong_discriminator_is_rejected() {
        let data = borsh::to_vec(&sample_whirlpool()).unwrap();
        let err = Position::decode("pool", &data).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode { kind: "position", .. }));

        let err = Whirlpool::decode("short", &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode { .. }));
    }
}
