//! Order domain — placing, revoking, and listing orders.

pub mod client;

use serde::{Deserialize, Serialize};

// ─── Direction ───────────────────────────────────────────────────────────────

/// Trade direction as the portal encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `"B"`
    Buy,
    /// `"S"`
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "B",
            Self::Sell => "S",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
