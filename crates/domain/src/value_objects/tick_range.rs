use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower and upper tick of a position range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub lower: i32,
    pub upper: i32,
}

impl TickRange {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Non-empty and aligned to `spacing` on both ends.
    pub fn is_valid_for(&self, spacing: i32) -> bool {
        spacing > 0
            && self.lower < self.upper
            && self.lower.rem_euclid(spacing) == 0
            && self.upper.rem_euclid(spacing) == 0
    }

    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.lower && tick <= self.upper
    }

    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(TickRange::new(-640, 960).is_valid_for(64));
        assert!(!TickRange::new(960, 960).is_valid_for(64));
        assert!(!TickRange::new(-640, 1000).is_valid_for(64));
        assert!(!TickRange::new(-640, 960).is_valid_for(0));
        assert_eq!(TickRange::new(-640, 960).width(), 1600);
    }
}
