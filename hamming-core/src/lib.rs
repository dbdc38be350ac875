#![forbid(unsafe_code)]

pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod filename;
pub mod pipeline;
pub mod session;
pub mod stats;

// Re-exports: stable API surface
pub use classify::{Preview, is_previewable};
pub use codec::hamming::HammingCodec;
pub use codec::{Codec, HammingLevel};
pub use config::Config;
pub use error::{CodecError, HammingError, Result};
pub use filename::{Artifact, FileName};
pub use pipeline::{FileRecord, Orchestrator, Stage};
pub use session::{
    DirSink, DownloadSink, FileSource, MemorySink, MemorySource, PathSource, Selection, Session,
};
pub use stats::RecordStats;
