//! Destination files with skip-if-exists and guaranteed cleanup.
//!
//! A [`WriteHandle`] owns the destination path from the moment it is created
//! until it is committed. Every other exit (explicit [`WriteHandle::discard`],
//! an error returned from [`WriteHandle::commit`], or the handle being dropped
//! because its future was abandoned on timeout) removes the file, so a
//! truncated image never satisfies the next run's existence check.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::error::DownloadError;

/// Result of opening a destination.
#[derive(Debug)]
pub enum SinkOpen {
    /// The destination already exists; nothing to do.
    AlreadyExists,
    /// The destination was created exclusively and is ready for writing.
    Ready(WriteHandle),
}

/// Opens destination files for download tasks.
///
/// Checking and creating are separate steps: callers check [`FileSink::exists`]
/// before any request is sent and call [`FileSink::create`] only once the
/// response status is known to be 200, so a failed request never leaves a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl FileSink {
    /// Whether `path` is already on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the existence check itself fails.
    pub async fn exists(path: &Path) -> Result<bool, DownloadError> {
        let found = tokio::fs::try_exists(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        if found {
            debug!(path = %path.display(), "destination exists, skipping");
        }
        Ok(found)
    }

    /// Creates `path` for exclusive writing.
    ///
    /// Losing an exclusive-create race to another writer is reported as
    /// [`SinkOpen::AlreadyExists`].
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the create fails for any other
    /// reason (permissions, missing directory, disk full).
    pub async fn create(path: &Path) -> Result<SinkOpen, DownloadError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => Ok(SinkOpen::Ready(WriteHandle::new(path.to_path_buf(), file))),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Ok(SinkOpen::AlreadyExists)
            }
            Err(e) => Err(DownloadError::io(path, e)),
        }
    }
}

/// Exclusive write access to one destination file.
#[derive(Debug)]
pub struct WriteHandle {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    bytes_written: u64,
    /// Set once committed or discarded; an unsettled handle removes its file on drop.
    settled: bool,
}

impl WriteHandle {
    /// Wraps an open file; the handle now owns removal of `path`.
    pub(crate) fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: Some(BufWriter::new(file)),
            bytes_written: 0,
            settled: false,
        }
    }

    /// Destination path of this handle.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Appends a chunk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the write fails.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), DownloadError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(DownloadError::io(
                self.path.clone(),
                std::io::Error::other("write after close"),
            ));
        };
        writer
            .write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(self.path.clone(), e))?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes and closes the file, keeping it on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if flushing fails; the file is removed
    /// in that case.
    pub async fn commit(mut self) -> Result<u64, DownloadError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .await
                .map_err(|e| DownloadError::io(self.path.clone(), e))?;
            writer
                .shutdown()
                .await
                .map_err(|e| DownloadError::io(self.path.clone(), e))?;
        }
        self.settled = true;
        Ok(self.bytes_written)
    }

    /// Closes the file and removes it, best-effort.
    pub async fn discard(mut self) {
        drop(self.writer.take());
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            debug!(path = %self.path.display(), error = %e, "failed to remove partial file");
        }
        self.settled = true;
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        drop(self.writer.take());
        debug!(path = %self.path.display(), "removing abandoned partial file");
        let _ = std::fs::remove_file(&self.path);
    }
}
