use serde::{Deserialize, Serialize};

use crate::classify::is_previewable;
use crate::pipeline::FileRecord;

/// Sizes and digests of a record; carries no file contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    pub name: String,
    pub content_bytes: u64,
    pub encoded_bytes: u64,
    pub corrupted_bytes: u64,
    pub recovered_bytes: u64,
    pub corrupted_plain_bytes: u64,
    pub content_blake3: String,
    pub recovered_blake3: String,
    pub corrupted_plain_blake3: String,
    /// Strict decode reproduced the content byte for byte.
    pub recovered_exact: bool,
    /// Bytes of the lenient decode that differ from the content.
    pub corrupted_plain_diff_bytes: u64,
    pub previewable: bool,
}

impl RecordStats {
    pub fn of(record: &FileRecord) -> Self {
        Self {
            name: record.name().to_owned(),
            content_bytes: record.content().len() as u64,
            encoded_bytes: record.encoded().len() as u64,
            corrupted_bytes: record.corrupted().len() as u64,
            recovered_bytes: record.decoded_fixed().len() as u64,
            corrupted_plain_bytes: record.decoded_unfixed().len() as u64,
            content_blake3: digest(record.content()),
            recovered_blake3: digest(record.decoded_fixed()),
            corrupted_plain_blake3: digest(record.decoded_unfixed()),
            recovered_exact: record.decoded_fixed() == record.content(),
            corrupted_plain_diff_bytes: diff_bytes(record.content(), record.decoded_unfixed()),
            previewable: is_previewable(record.text()),
        }
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Differing positions plus the length mismatch.
pub fn diff_bytes(a: &[u8], b: &[u8]) -> u64 {
    let differing = a.iter().zip(b).filter(|(x, y)| x != y).count();
    (differing + a.len().abs_diff(b.len())) as u64
}
