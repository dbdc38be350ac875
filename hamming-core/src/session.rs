//! The single "current file" slot and the user actions that touch it.
//!
//! Every selection takes a ticket when it starts. A finished pipeline run is
//! published only if no later selection has published already, so the most
//! recently *selected* file ends up current whatever order the runs finish in.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info};

use crate::classify::Preview;
use crate::config::{Config, check_size};
use crate::error::{HammingError, Result};
use crate::filename::Artifact;
use crate::pipeline::{FileRecord, Orchestrator};

/// Where selected files come from. `size` must be known before any bytes are read.
pub trait FileSource: Send {
    fn name(&self) -> &str;

    fn size(&self) -> u64;

    fn read(self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

pub struct PathSource {
    path: PathBuf,
    name: String,
    size: u64,
}

impl PathSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path,
            name,
            size: meta.len(),
        })
    }
}

impl FileSource for PathSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read(self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl FileSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read(self) -> Result<Vec<u8>> {
        Ok(self.bytes)
    }
}

/// Persists a downloaded artifact.
pub trait DownloadSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes artifacts into a directory, creating it on first use.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn take(&self) -> Vec<(String, Vec<u8>)> {
        std::mem::take(&mut *self.saved.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((file_name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Outcome of a selection that ran the pipeline to completion.
#[derive(Debug, Clone)]
pub enum Selection {
    Published(Arc<FileRecord>),
    /// A later selection was already current; this record was dropped.
    Superseded(Arc<FileRecord>),
}

impl Selection {
    pub fn record(&self) -> &Arc<FileRecord> {
        match self {
            Selection::Published(r) | Selection::Superseded(r) => r,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Selection::Published(_))
    }
}

#[derive(Default)]
struct Slot {
    ticket: u64,
    record: Option<Arc<FileRecord>>,
}

pub struct Session {
    orchestrator: Orchestrator,
    max_file_bytes: u64,
    tickets: AtomicU64,
    slot: RwLock<Slot>,
}

impl Session {
    pub fn new(orchestrator: Orchestrator, max_file_bytes: u64) -> Self {
        Self {
            orchestrator,
            max_file_bytes,
            tickets: AtomicU64::new(0),
            slot: RwLock::new(Slot::default()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let codec = config.build_codec()?;
        Ok(Self::new(
            Orchestrator::new(Arc::new(codec)),
            config.max_file_bytes,
        ))
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn current(&self) -> Option<Arc<FileRecord>> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .record
            .clone()
    }

    /// Like [`Session::current`], for callers that treat an empty slot as an error.
    pub fn require_current(&self) -> Result<Arc<FileRecord>> {
        self.current().ok_or(HammingError::NoCurrentFile)
    }

    pub fn check_size(&self, size: u64) -> Result<()> {
        check_size(size, self.max_file_bytes)
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.tickets.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replaces the current record unless a later ticket already did.
    pub fn publish(&self, ticket: Ticket, record: Arc<FileRecord>) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if ticket.0 < slot.ticket {
            return false;
        }
        slot.ticket = ticket.0;
        slot.record = Some(record);
        true
    }

    /// Loads a file and runs the pipeline on it. Oversized or failing inputs
    /// leave the current record untouched.
    pub async fn select<S: FileSource>(&self, source: S) -> Result<Selection> {
        self.check_size(source.size())?;
        let ticket = self.begin();
        let name = source.name().to_owned();

        let content = source.read().await?;
        self.check_size(content.len() as u64)?;

        let orchestrator = self.orchestrator.clone();
        let record = tokio::task::spawn_blocking(move || orchestrator.run(name, content))
            .await
            .map_err(|e| HammingError::Io(std::io::Error::other(e)))??;
        let record = Arc::new(record);

        if self.publish(ticket, Arc::clone(&record)) {
            info!(file = %record.name(), bytes = record.content().len(), "file loaded");
            Ok(Selection::Published(record))
        } else {
            debug!(file = %record.name(), "selection superseded by a later one");
            Ok(Selection::Superseded(record))
        }
    }

    /// Hands one artifact of the current record to `sink`; `Ok(None)` when nothing is loaded.
    pub fn download(&self, artifact: Artifact, sink: &dyn DownloadSink) -> Result<Option<String>> {
        let Some(record) = self.current() else {
            debug!(%artifact, "no file loaded, download ignored");
            return Ok(None);
        };
        let file_name = artifact.derive_name(record.name());
        sink.save(&file_name, artifact.bytes(&record))?;
        Ok(Some(file_name))
    }

    pub fn preview(&self) -> Option<Preview> {
        self.current().and_then(|r| Preview::of(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;
    use crate::pipeline::tests::RecordingCodec;

    fn session(limit: u64) -> Session {
        Session::new(Orchestrator::new(Arc::new(RecordingCodec::default())), limit)
    }

    #[tokio::test]
    async fn select_publishes() {
        let s = session(100);
        let sel = s.select(MemorySource::new("a.txt", b"abc".to_vec())).await.unwrap();
        assert!(sel.is_published());
        assert_eq!(s.current().unwrap().name(), "a.txt");
    }

    #[tokio::test]
    async fn oversize_keeps_previous_record() {
        let s = session(3);
        s.select(MemorySource::new("a.txt", b"abc".to_vec())).await.unwrap();
        let err = s
            .select(MemorySource::new("b.txt", b"abcd".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, HammingError::SizeLimitExceeded { size: 4, limit: 3 }));
        assert_eq!(s.current().unwrap().name(), "a.txt");
    }

    #[tokio::test]
    async fn pipeline_failure_keeps_previous_record() {
        let s = Session::new(
            Orchestrator::new(Arc::new(RecordingCodec::failing_on(Stage::Corrupt, b"BAD"))),
            100,
        );
        s.select(MemorySource::new("a.txt", b"abc".to_vec())).await.unwrap();
        let first = s.current().unwrap();

        let err = s
            .select(MemorySource::new("b.txt", b"BAD".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, HammingError::Pipeline { stage: Stage::Corrupt, .. }));

        let current = s.current().unwrap();
        assert!(Arc::ptr_eq(&current, &first));
        assert_eq!(current.name(), "a.txt");

        s.select(MemorySource::new("c.txt", b"ok".to_vec())).await.unwrap();
        assert_eq!(s.current().unwrap().name(), "c.txt");
    }

    #[test]
    fn require_current_reports_missing_file() {
        let s = session(100);
        assert!(matches!(s.require_current(), Err(HammingError::NoCurrentFile)));
    }

    #[test]
    fn stale_ticket_is_not_published() {
        let s = session(100);
        let orchestrator = Orchestrator::new(Arc::new(RecordingCodec::default()));
        let a = s.begin();
        let b = s.begin();
        assert!(s.publish(b, Arc::new(orchestrator.run("b", vec![]).unwrap())));
        assert!(!s.publish(a, Arc::new(orchestrator.run("a", vec![]).unwrap())));
        assert_eq!(s.current().unwrap().name(), "b");
    }

    #[test]
    fn download_without_file_is_noop() {
        let s = session(100);
        let sink = MemorySink::default();
        assert_eq!(s.download(Artifact::Recovered, &sink).unwrap(), None);
        assert!(sink.take().is_empty());
        assert!(s.preview().is_none());
    }

    #[tokio::test]
    async fn download_uses_derived_names() {
        let s = session(100);
        s.select(MemorySource::new("notes.txt", b"hi".to_vec())).await.unwrap();
        let sink = MemorySink::default();
        for artifact in Artifact::ALL {
            s.download(artifact, &sink).unwrap();
        }
        let saved = sink.take();
        let names: Vec<_> = saved.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            [
                "notes.txt.hamming",
                "notes_corrupted.txt.hamming",
                "notes_corrupted.txt",
                "notes_recovered.txt"
            ]
        );
        assert_eq!(saved[0].1, b"E:hi");
        assert_eq!(saved[1].1, b"C1:E:hi");
        assert_eq!(saved[2].1, b"U:C1:E:hi");
        assert_eq!(saved[3].1, b"F:C1:E:hi");
    }

    #[tokio::test]
    async fn dir_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(100);
        s.select(MemorySource::new("photo.png", vec![1, 2])).await.unwrap();
        let out = dir.path().join("out");
        let name = s.download(Artifact::Encoded, &DirSink::new(&out)).unwrap();
        assert_eq!(name.as_deref(), Some("photo.png.hamming"));
        assert_eq!(std::fs::read(out.join("photo.png.hamming")).unwrap(), b"E:\x01\x02");
    }

    #[tokio::test]
    async fn path_source_reads_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [0u8; 10]).unwrap();
        let src = PathSource::open(&path).await.unwrap();
        assert_eq!(src.name(), "data.bin");
        assert_eq!(src.size(), 10);
        assert_eq!(src.read().await.unwrap(), vec![0u8; 10]);
    }
}
