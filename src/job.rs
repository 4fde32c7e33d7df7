//! Per-run job state: cancellation, the job aggregate and its exported
//! artifacts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::debug;

use crate::codec::AudioBuffer;
use crate::error::{DubError, Result};
use crate::lang::Voice;

/// Cooperative cancellation flag shared between a job and its initiator.
///
/// Checked at stage boundaries and around remote calls; it never
/// interrupts an in-flight request or render, it only discards the
/// result afterwards.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DubError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The synthesized, duration-synced output of a job.
#[derive(Debug)]
pub struct DubResult {
    /// Synced audio; duration matches the source within the sync
    /// tolerance.
    pub buffer: AudioBuffer,
    /// WAV serialization of `buffer`.
    pub wav: Vec<u8>,
    pub wav_path: PathBuf,
    pub mp3_path: Option<PathBuf>,
    pub srt_path: Option<PathBuf>,
}

/// One dubbing run: a source file, a target language and voice, and the
/// scratch directory owning every exported artifact.
///
/// Artifacts never outlive their job: [`Job::release`] (or dropping the
/// job) deletes the scratch directory and everything exported into it.
#[derive(Debug)]
pub struct Job {
    pub input: PathBuf,
    pub target_language: String,
    pub voice: Voice,
    /// Source media duration in seconds, filled in during ingestion.
    pub source_duration_secs: f64,
    scratch: TempDir,
    artifacts: Vec<PathBuf>,
}

impl Job {
    pub fn new(
        input: impl Into<PathBuf>,
        target_language: impl Into<String>,
        voice: Voice,
    ) -> Result<Self> {
        let scratch = TempDir::new()?;
        debug!("Job scratch directory: {:?}", scratch.path());
        Ok(Self {
            input: input.into(),
            target_language: target_language.into(),
            voice,
            source_duration_secs: 0.0,
            scratch,
            artifacts: Vec::new(),
        })
    }

    /// Write an artifact into the job-owned scratch directory and track
    /// its handle.
    pub(crate) fn export(&mut self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.scratch.path().join(name);
        std::fs::write(&path, bytes)?;
        self.artifacts.push(path.clone());
        Ok(path)
    }

    /// Paths of every artifact exported so far, in export order.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Copy all exported artifacts into `dest`, returning the new paths.
    /// The originals stay owned by the job.
    pub fn persist_artifacts(&self, dest: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dest)?;
        let mut persisted = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let name = artifact
                .file_name()
                .ok_or_else(|| DubError::Io(std::io::Error::other("artifact has no file name")))?;
            let target = dest.join(name);
            std::fs::copy(artifact, &target)?;
            persisted.push(target);
        }
        Ok(persisted)
    }

    /// Release every exported artifact. Dropping the job has the same
    /// effect; this makes the teardown explicit at replacement time.
    pub fn release(self) {
        debug!("Releasing job artifacts in {:?}", self.scratch.path());
        // TempDir deletes the scratch directory on drop.
    }
}
