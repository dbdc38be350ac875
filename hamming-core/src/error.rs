use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Error, Debug)]
pub enum HammingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is {size} bytes, limit is {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error("pipeline failed at {stage}: {reason}")]
    Pipeline { stage: Stage, reason: CodecError },

    #[error("no file loaded")]
    NoCurrentFile,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised by a [`crate::codec::Codec`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    #[error("bad magic: not a hamming container")]
    BadMagic,

    #[error("unsupported block size {0} bits")]
    UnsupportedBlock(u8),

    #[error("payload of {bits} bits is not a multiple of the {block_bits}-bit block")]
    Misaligned { bits: usize, block_bits: usize },

    #[error("last block claims {last} data bits, block holds {max}")]
    BadTrailer { last: u8, max: usize },

    #[error("corruptor state unavailable")]
    RngPoisoned,

    #[error("{0}")]
    Other(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, HammingError>;
