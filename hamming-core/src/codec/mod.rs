use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Error-correcting transform consumed by the pipeline.
pub trait Codec: Send + Sync {
    fn encode(&self, data: &[u8]) -> CodecResult<Vec<u8>>;

    /// Injects bit errors into an encoded buffer without changing its shape.
    fn corrupt(&self, coded: &[u8]) -> CodecResult<Vec<u8>>;

    /// `correct = false` passes detected errors through untouched.
    fn decode(&self, coded: &[u8], correct: bool) -> CodecResult<Vec<u8>>;
}

/// Block geometry of the Hamming code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HammingLevel {
    /// 4-bit blocks carrying 1 data bit
    L1,
    /// 8-bit blocks carrying 4 data bits
    #[default]
    L2,
    /// 16-bit blocks carrying 11 data bits
    L3,
}

impl HammingLevel {
    pub fn block_bits(self) -> usize {
        match self {
            HammingLevel::L1 => 4,
            HammingLevel::L2 => 8,
            HammingLevel::L3 => 16,
        }
    }

    /// `block_bits - log2(block_bits) - 1`
    pub fn data_bits(self) -> usize {
        match self {
            HammingLevel::L1 => 1,
            HammingLevel::L2 => 4,
            HammingLevel::L3 => 11,
        }
    }

    pub fn from_block_bits(bits: u8) -> Option<Self> {
        match bits {
            4 => Some(HammingLevel::L1),
            8 => Some(HammingLevel::L2),
            16 => Some(HammingLevel::L3),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            HammingLevel::L1 => "l1",
            HammingLevel::L2 => "l2",
            HammingLevel::L3 => "l3",
        }
    }
}

impl fmt::Display for HammingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HammingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l1" | "1" => Ok(HammingLevel::L1),
            "l2" | "2" => Ok(HammingLevel::L2),
            "l3" | "3" => Ok(HammingLevel::L3),
            other => Err(format!("invalid hamming level `{other}`, expected l1/l2/l3")),
        }
    }
}

pub mod hamming;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_geometry() {
        for level in [HammingLevel::L1, HammingLevel::L2, HammingLevel::L3] {
            let n = level.block_bits();
            assert_eq!(level.data_bits(), n - n.trailing_zeros() as usize - 1);
            assert_eq!(HammingLevel::from_block_bits(n as u8), Some(level));
        }
        assert_eq!(HammingLevel::from_block_bits(12), None);
    }

    #[test]
    fn level_parses_cli_spellings() {
        assert_eq!("L3".parse::<HammingLevel>(), Ok(HammingLevel::L3));
        assert_eq!("1".parse::<HammingLevel>(), Ok(HammingLevel::L1));
        assert!("l4".parse::<HammingLevel>().is_err());
        assert_eq!(HammingLevel::default().to_string(), "l2");
    }
}
