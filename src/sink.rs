//! Destinations for finalized subtitles.
//!
//! The pipeline hands every finalized subtitle to each registered sink, in
//! emission order. Persisting to disk and retaining segments in memory are
//! deliberately separate observers of the same stream.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{srt::Subtitle, Result};

/// Receives finalized subtitles in emission order.
pub trait SegmentSink {
    /// Accept one finalized subtitle. A failure here is fatal for the run:
    /// a gap in persisted output is not recoverable mid-stream.
    fn emit(&mut self, subtitle: &Subtitle) -> Result<()>;
}

/// Writes each subtitle to an SRT file as soon as it is finalized, so the
/// file is valid and inspectable mid-run, and a cancelled run still leaves
/// a usable, truncated subtitle file behind.
pub struct SrtFileSink {
    path: PathBuf,
    file: File,
}

impl SrtFileSink {
    /// Create the output file, truncating anything already there.
    pub fn create(path: &Path) -> Result<SrtFileSink> {
        let file = File::create(path)
            .with_context(|| format!("could not create {}", path.display()))?;
        Ok(SrtFileSink {
            path: path.to_owned(),
            file,
        })
    }

    /// The path this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SegmentSink for SrtFileSink {
    fn emit(&mut self, subtitle: &Subtitle) -> Result<()> {
        self.file
            .write_all(subtitle.to_srt().as_bytes())
            .with_context(|| format!("could not write to {}", self.path.display()))?;
        self.file
            .flush()
            .with_context(|| format!("could not write to {}", self.path.display()))?;
        Ok(())
    }
}

/// Retains emitted subtitles in memory for the duration of the run.
#[derive(Debug, Default)]
pub struct MemorySink {
    segments: Vec<Subtitle>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// The subtitles emitted so far, in emission order.
    pub fn segments(&self) -> &[Subtitle] {
        &self.segments
    }

    /// Consume the sink, returning the emitted subtitles.
    pub fn into_segments(self) -> Vec<Subtitle> {
        self.segments
    }
}

impl SegmentSink for MemorySink {
    fn emit(&mut self, subtitle: &Subtitle) -> Result<()> {
        self.segments.push(subtitle.clone());
        Ok(())
    }
}
