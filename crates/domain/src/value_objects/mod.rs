pub mod percentage;
pub mod tick_range;

pub use percentage::Percentage;
pub use tick_range::TickRange;
