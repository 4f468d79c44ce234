pub mod pool;
pub mod position;
pub mod token;

// Re-export for easier access
pub use pool::{DEFAULT_ADDRESS, NUM_REWARDS, PoolSnapshot, RewardInfo};
pub use position::PositionSnapshot;
pub use token::{PairBalances, Token, TokenBalance};
