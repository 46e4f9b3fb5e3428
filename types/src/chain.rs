//! Chain identifier newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric chain identifier (EVM convention: mainnet is 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_decimal() {
        assert_eq!(ChainId::new(1).to_string(), "1");
        assert_eq!(ChainId::new(42161).to_string(), "42161");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&ChainId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: ChainId = serde_json::from_str("5").unwrap();
        assert_eq!(back, ChainId::new(5));
    }
}
