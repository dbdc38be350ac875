use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::HammingLevel;
use crate::codec::hamming::HammingCodec;
use crate::error::{HammingError, Result};

/// Largest file accepted by default; bigger inputs are refused before the pipeline runs.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1_000_000;

pub const ENV_MAX_FILE_BYTES: &str = "HAMMING_MAX_FILE_BYTES";
pub const ENV_LEVEL: &str = "HAMMING_LEVEL";
pub const ENV_SEED: &str = "HAMMING_SEED";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_file_bytes: u64,
    pub level: HammingLevel,
    /// Fixed corruptor seed; `None` draws one from the OS.
    pub corrupt_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            level: HammingLevel::default(),
            corrupt_seed: None,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Defaults, then the optional JSON file, then `HAMMING_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        base.apply_vars(|key| std::env::var(key).ok())
    }

    pub fn apply_vars(mut self, get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = get(ENV_MAX_FILE_BYTES) {
            self.max_file_bytes = v
                .trim()
                .parse()
                .map_err(|e| HammingError::Config(format!("{ENV_MAX_FILE_BYTES}={v}: {e}")))?;
        }
        if let Some(v) = get(ENV_LEVEL) {
            self.level = v
                .parse()
                .map_err(|e| HammingError::Config(format!("{ENV_LEVEL}: {e}")))?;
        }
        if let Some(v) = get(ENV_SEED) {
            let seed = v
                .trim()
                .parse()
                .map_err(|e| HammingError::Config(format!("{ENV_SEED}={v}: {e}")))?;
            self.corrupt_seed = Some(seed);
        }
        Ok(self)
    }

    pub fn check_size(&self, size: u64) -> Result<()> {
        check_size(size, self.max_file_bytes)
    }

    pub fn build_codec(&self) -> Result<HammingCodec> {
        match self.corrupt_seed {
            Some(seed) => Ok(HammingCodec::new(self.level, seed)),
            None => Ok(HammingCodec::from_entropy(self.level)?),
        }
    }
}

/// The cap is inclusive: a file of exactly `limit` bytes is accepted.
pub fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(HammingError::SizeLimitExceeded { size, limit });
    }
    Ok(())
}
