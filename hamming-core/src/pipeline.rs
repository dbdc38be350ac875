//! encode → corrupt → strict decode → lenient decode.
//!
//! Both decodes read the same corrupted buffer, which is what makes the
//! recovered and corrupted outputs comparable.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::{Codec, CodecResult};
use crate::error::{HammingError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Encode,
    Corrupt,
    DecodeFixed,
    DecodeUnfixed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Encode => "encode",
            Stage::Corrupt => "corrupt",
            Stage::DecodeFixed => "decode-fixed",
            Stage::DecodeUnfixed => "decode-unfixed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Original bytes plus every buffer derived from them. Never mutated once built.
#[derive(Debug)]
pub struct FileRecord {
    name: String,
    content: Vec<u8>,
    encoded: Vec<u8>,
    corrupted: Vec<u8>,
    decoded_fixed: Vec<u8>,
    decoded_unfixed: Vec<u8>,
    text: String,
}

impl FileRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn corrupted(&self) -> &[u8] {
        &self.corrupted
    }

    pub fn decoded_fixed(&self) -> &[u8] {
        &self.decoded_fixed
    }

    pub fn decoded_unfixed(&self) -> &[u8] {
        &self.decoded_unfixed
    }

    /// Lossy text view of `content`.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Lossy UTF-8 decode with a leading byte-order mark dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_owned(),
        None => text.into_owned(),
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    codec: Arc<dyn Codec>,
}

impl Orchestrator {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec }
    }

    /// Runs every stage; either all buffers are produced or none are.
    pub fn run(&self, name: impl Into<String>, content: Vec<u8>) -> Result<FileRecord> {
        let name = name.into();
        let started = Instant::now();

        let encoded = run_stage(Stage::Encode, || self.codec.encode(&content))?;
        let corrupted = run_stage(Stage::Corrupt, || self.codec.corrupt(&encoded))?;
        let decoded_fixed = run_stage(Stage::DecodeFixed, || self.codec.decode(&corrupted, true))?;
        let decoded_unfixed =
            run_stage(Stage::DecodeUnfixed, || self.codec.decode(&corrupted, false))?;
        let text = decode_text(&content);

        debug!(
            file = %name,
            bytes = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(FileRecord {
            name,
            content,
            encoded,
            corrupted,
            decoded_fixed,
            decoded_unfixed,
            text,
        })
    }
}

fn run_stage(stage: Stage, f: impl FnOnce() -> CodecResult<Vec<u8>>) -> Result<Vec<u8>> {
    let started = Instant::now();
    match f() {
        Ok(out) => {
            debug!(
                %stage,
                out_bytes = out.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "stage done"
            );
            Ok(out)
        }
        Err(reason) => {
            warn!(%stage, %reason, "stage failed");
            Err(HammingError::Pipeline { stage, reason })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::HammingLevel;
    use crate::codec::hamming::HammingCodec;
    use crate::error::CodecError;
    use std::sync::Mutex;

    /// Tags its outputs and remembers what each call received.
    #[derive(Default)]
    pub(crate) struct RecordingCodec {
        pub corrupt_calls: Mutex<usize>,
        pub decode_inputs: Mutex<Vec<(Vec<u8>, bool)>>,
        pub fail_at: Option<Stage>,
        /// Fails `stage` only for inputs ending with the marker bytes.
        pub fail_on: Option<(Stage, Vec<u8>)>,
    }

    impl RecordingCodec {
        pub fn failing(stage: Stage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Default::default()
            }
        }

        pub fn failing_on(stage: Stage, marker: &[u8]) -> Self {
            Self {
                fail_on: Some((stage, marker.to_vec())),
                ..Default::default()
            }
        }

        fn fail(&self, stage: Stage, input: &[u8]) -> CodecResult<()> {
            let marked = matches!(&self.fail_on, Some((s, m)) if *s == stage && input.ends_with(m));
            if self.fail_at == Some(stage) || marked {
                return Err(CodecError::Other(format!("{stage} refused")));
            }
            Ok(())
        }
    }

    impl Codec for RecordingCodec {
        fn encode(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
            self.fail(Stage::Encode, data)?;
            let mut out = b"E:".to_vec();
            out.extend_from_slice(data);
            Ok(out)
        }

        fn corrupt(&self, coded: &[u8]) -> CodecResult<Vec<u8>> {
            self.fail(Stage::Corrupt, coded)?;
            let mut calls = self.corrupt_calls.lock().unwrap();
            *calls += 1;
            let mut out = format!("C{calls}:").into_bytes();
            out.extend_from_slice(coded);
            Ok(out)
        }

        fn decode(&self, coded: &[u8], correct: bool) -> CodecResult<Vec<u8>> {
            let stage = if correct {
                Stage::DecodeFixed
            } else {
                Stage::DecodeUnfixed
            };
            self.fail(stage, coded)?;
            self.decode_inputs.lock().unwrap().push((coded.to_vec(), correct));
            let mut out = if correct { b"F:".to_vec() } else { b"U:".to_vec() };
            out.extend_from_slice(coded);
            Ok(out)
        }
    }

    #[test]
    fn stages_feed_each_other() {
        let codec = Arc::new(RecordingCodec::default());
        let record = Orchestrator::new(codec.clone())
            .run("a.txt", b"hi".to_vec())
            .unwrap();

        assert_eq!(record.name(), "a.txt");
        assert_eq!(record.content(), b"hi");
        assert_eq!(record.encoded(), b"E:hi");
        assert_eq!(record.corrupted(), b"C1:E:hi");
        assert_eq!(record.decoded_fixed(), b"F:C1:E:hi");
        assert_eq!(record.decoded_unfixed(), b"U:C1:E:hi");
        assert_eq!(record.text(), "hi");
    }

    #[test]
    fn both_decodes_share_one_corruption() {
        let codec = Arc::new(RecordingCodec::default());
        Orchestrator::new(codec.clone())
            .run("x", vec![1, 2, 3])
            .unwrap();

        assert_eq!(*codec.corrupt_calls.lock().unwrap(), 1);
        let inputs = codec.decode_inputs.lock().unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].0, inputs[1].0);
        assert_eq!((inputs[0].1, inputs[1].1), (true, false));
    }

    #[test]
    fn failure_names_the_stage() {
        for stage in [
            Stage::Encode,
            Stage::Corrupt,
            Stage::DecodeFixed,
            Stage::DecodeUnfixed,
        ] {
            let orchestrator = Orchestrator::new(Arc::new(RecordingCodec::failing(stage)));
            match orchestrator.run("x", vec![0]) {
                Err(HammingError::Pipeline { stage: got, .. }) => assert_eq!(got, stage),
                other => panic!("expected pipeline error at {stage}, got {other:?}"),
            }
        }
    }

    #[test]
    fn hamming_pipeline_recovers_content() {
        let orchestrator = Orchestrator::new(Arc::new(HammingCodec::new(HammingLevel::L2, 4)));
        let content = b"The quick brown fox jumps over the lazy dog".to_vec();
        let record = orchestrator.run("fox.txt", content.clone()).unwrap();
        assert_eq!(record.decoded_fixed(), content.as_slice());
        assert_eq!(record.decoded_unfixed().len(), content.len());
        assert_eq!(record.corrupted().len(), record.encoded().len());
    }

    #[test]
    fn text_is_lossy_and_drops_bom() {
        assert_eq!(decode_text(b"\xef\xbb\xbfhello"), "hello");
        assert_eq!(decode_text(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::DecodeFixed.to_string(), "decode-fixed");
        assert_eq!(
            serde_json::to_string(&Stage::DecodeUnfixed).unwrap(),
            "\"decode-unfixed\""
        );
    }
}
