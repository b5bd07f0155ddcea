//! Writing the document to a user-chosen file.
//!
//! The core hands over bytes and gets back success or an [`ExportError`];
//! everything about where and how the bytes land lives behind
//! [`ExportSink`]. Writes run on their own thread so the editor never waits
//! on storage.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tempfile::NamedTempFile;

use crate::error::ExportError;

/// File name suggested when the user has not picked one.
pub const DEFAULT_FILE_NAME: &str = "untitled.md";

/// Extension added to names typed without one.
pub const DEFAULT_EXTENSION: &str = "md";

/// Something that can store the serialized document.
pub trait ExportSink: Send + Sync {
    /// Write `bytes` to `destination`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the destination cannot be written.
    fn write(&self, destination: &Path, bytes: &[u8]) -> Result<(), ExportError>;
}

/// Writes through a temporary file in the destination directory and renames
/// it into place, so readers see either the old file or the complete new one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFileSink;

impl ExportSink for AtomicFileSink {
    fn write(&self, destination: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        let _scope = crate::perf::scope("export.write");
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(|err| ExportError::from_io(destination, err))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| ExportError::from_io(destination, err))?;
        tmp.persist(destination)
            .map_err(|err| ExportError::from_io(destination, err.error))?;
        Ok(())
    }
}

/// Outcome of one export, reported once.
#[derive(Debug)]
pub struct ExportOutcome {
    pub destination: PathBuf,
    /// Number of bytes written on success.
    pub result: Result<usize, ExportError>,
}

/// Turn what the user typed into a destination path.
///
/// Relative names are resolved against `base_dir`. A name without an
/// extension gets `.md`.
///
/// # Errors
///
/// Returns [`ExportError::InvalidDestination`] for blank input or a path that
/// names an existing directory.
pub fn resolve_destination(input: &str, base_dir: &Path) -> Result<PathBuf, ExportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ExportError::InvalidDestination(
            "file name is empty".to_string(),
        ));
    }
    let mut path = PathBuf::from(trimmed);
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if trimmed.ends_with('/') || path.is_dir() {
        return Err(ExportError::InvalidDestination(format!(
            "{} is a directory",
            path.display()
        )));
    }
    if path.extension().is_none() {
        path.set_extension(DEFAULT_EXTENSION);
    }
    Ok(path)
}

/// Write `bytes` on a background thread and report through `on_done`.
///
/// There is no cancellation and no retry: once started, the write runs to
/// completion or failure and `on_done` is called exactly once.
///
/// # Errors
///
/// Returns an error if the worker thread cannot be created; `on_done` is not
/// called in that case.
pub fn spawn_export<F>(
    sink: Arc<dyn ExportSink>,
    destination: PathBuf,
    bytes: Vec<u8>,
    on_done: F,
) -> std::io::Result<()>
where
    F: FnOnce(ExportOutcome) + Send + 'static,
{
    thread::Builder::new()
        .name("mdpane-export".to_string())
        .spawn(move || {
            let len = bytes.len();
            let result = sink.write(&destination, &bytes).map(|()| len);
            match &result {
                Ok(written) => {
                    tracing::info!(path = %destination.display(), bytes = written, "exported");
                }
                Err(err) => {
                    tracing::warn!(path = %destination.display(), %err, "export failed");
                }
            }
            crate::perf::log_event(
                "export.done",
                format!("path={} ok={}", destination.display(), result.is_ok()),
            );
            on_done(ExportOutcome {
                destination,
                result,
            });
        })?;
    Ok(())
}
