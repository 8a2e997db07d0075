//! Output sinks for assembled chunks.
//!
//! Three targets:
//!
//! - **stream**: raw chunk bytes to stdout, no filesystem side effects
//! - **directory**: one `chunk-<index>.txt` file per chunk
//! - **aggregate**: all chunks concatenated into `whole-chunk-output.txt`
//!
//! Writes are sequential and in index order. A failed write never stops
//! the remaining ones; [`WriteFailurePolicy`] decides whether failures
//! are reported back as an error once every chunk has been attempted.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::error::{KomodoError, Result};
use crate::core::types::Chunk;

/// File name used by the aggregate sink
pub const AGGREGATE_FILE_NAME: &str = "whole-chunk-output.txt";

/// File name of one chunk in directory mode
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk-{index}.txt")
}

/// Destination of chunk payloads
pub trait OutputSink {
    /// Persist one chunk. Called with increasing indices.
    fn write(&mut self, index: usize, content: &[u8]) -> io::Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Human-readable destination for logs
    fn describe(&self) -> String;
}

/// What to do once writes have failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// Log failures and report success
    #[default]
    Continue,
    /// Attempt every write, then return `PartialWrite`
    Fail,
}

impl std::str::FromStr for WriteFailurePolicy {
    type Err = KomodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(WriteFailurePolicy::Continue),
            "fail" => Ok(WriteFailurePolicy::Fail),
            other => Err(KomodoError::ConfigError(format!(
                "on_write_error must be 'continue' or 'fail', got '{other}'"
            ))),
        }
    }
}

/// Counts from one [`write_chunks`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub failed: usize,
}

/// Write every chunk in order, applying the failure policy at the end
pub fn write_chunks(
    sink: &mut dyn OutputSink,
    chunks: &[Chunk],
    policy: WriteFailurePolicy,
) -> Result<WriteReport> {
    let mut report = WriteReport::default();

    for chunk in chunks {
        match sink.write(chunk.index, &chunk.content) {
            Ok(()) => report.written += 1,
            Err(source) => {
                let err = KomodoError::WriteFailed {
                    index: chunk.index,
                    source,
                };
                tracing::warn!("{} ({})", err, sink.describe());
                report.failed += 1;
            }
        }
    }

    if let Err(e) = sink.finish() {
        // Buffered bytes may be lost, so no chunk counts as written
        tracing::warn!("Failed to finish output {}: {}", sink.describe(), e);
        report.failed = chunks.len();
        report.written = 0;
    }

    if report.failed > 0 && policy == WriteFailurePolicy::Fail {
        return Err(KomodoError::PartialWrite {
            failed: report.failed,
            total: chunks.len(),
        });
    }

    Ok(report)
}

/// Writes raw chunk bytes to a stream (stdout by default)
pub struct StreamSink<W: Write> {
    writer: W,
}

impl StreamSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for StreamSink<W> {
    fn write(&mut self, _index: usize, content: &[u8]) -> io::Result<()> {
        self.writer.write_all(content)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn describe(&self) -> String {
        "stream".to_string()
    }
}

/// One file per chunk in a directory created on first write
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, index: usize, content: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(chunk_file_name(index)), content)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Every chunk concatenated into a single file
#[derive(Debug)]
pub struct AggregateSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl AggregateSink {
    /// Aggregate file inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(AGGREGATE_FILE_NAME),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut BufWriter<File>> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            self.file = Some(BufWriter::new(File::create(&self.path)?));
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("aggregate file not open"))
    }
}

impl OutputSink for AggregateSink {
    fn write(&mut self, _index: usize, content: &[u8]) -> io::Result<()> {
        self.file()?.write_all(content)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.file()?.flush()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Where a run sends its chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stream,
    Directory(PathBuf),
    Aggregate(PathBuf),
}

impl OutputTarget {
    /// Open a sink for this target
    pub fn open(&self) -> Box<dyn OutputSink> {
        match self {
            OutputTarget::Stream => Box::new(StreamSink::stdout()),
            OutputTarget::Directory(dir) => Box::new(DirectorySink::new(dir)),
            OutputTarget::Aggregate(dir) => Box::new(AggregateSink::new(dir)),
        }
    }

    /// Directory written to, if any
    pub fn output_dir(&self) -> Option<&Path> {
        match self {
            OutputTarget::Stream => None,
            OutputTarget::Directory(dir) | OutputTarget::Aggregate(dir) => Some(dir),
        }
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stream => write!(f, "stdout"),
            OutputTarget::Directory(dir) => write!(f, "{}", dir.display()),
            OutputTarget::Aggregate(dir) => {
                write!(f, "{}", dir.join(AGGREGATE_FILE_NAME).display())
            }
        }
    }
}
