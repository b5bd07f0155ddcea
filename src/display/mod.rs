//! Secondary display support.
//!
//! Moving the preview to another screen is a capability of the host, not of
//! the document. The app only asks for a status and requests a switch; the
//! answer comes back through a callback. In a terminal the "other screen" is
//! a second terminal device (for example another tab's `/dev/pts/N`).

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::error::DisplayError;

/// Whether the preview is currently shown on a secondary display.
///
/// Written only by display adapters in this module; everything else reads.
static SECONDARY_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn is_secondary_active() -> bool {
    SECONDARY_ACTIVE.load(Ordering::Relaxed)
}

fn set_secondary_active(active: bool) {
    SECONDARY_ACTIVE.store(active, Ordering::Relaxed);
}

/// Availability of a secondary display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayStatus {
    #[default]
    Unsupported,
    Available,
    Active,
}

impl DisplayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Available => "available",
            Self::Active => "active",
        }
    }
}

/// Completion callback for [`DisplayTarget::request_switch`].
pub type SwitchCallback = Box<dyn FnOnce(Result<DisplayStatus, DisplayError>) + Send>;

/// A host capability that can take over the preview.
pub trait DisplayTarget: Send {
    fn status(&self) -> DisplayStatus;

    /// Ask to move onto the secondary display, or back off it when already
    /// active. Returns immediately; `done` receives the new status.
    fn request_switch(&mut self, done: SwitchCallback);

    /// Show preview text on the secondary display. A no-op unless active.
    ///
    /// # Errors
    ///
    /// Returns an error if the secondary display can no longer be written.
    fn present(&mut self, _lines: &[String]) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// The host has no secondary display.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecondaryDisplay;

impl DisplayTarget for NoSecondaryDisplay {
    fn status(&self) -> DisplayStatus {
        DisplayStatus::Unsupported
    }

    fn request_switch(&mut self, done: SwitchCallback) {
        done(Err(DisplayError::Unsupported));
    }
}

/// A second terminal device used as the preview screen.
pub struct TtyDisplay {
    path: PathBuf,
    device: Arc<Mutex<Option<File>>>,
}

impl TtyDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            device: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisplayTarget for TtyDisplay {
    fn status(&self) -> DisplayStatus {
        let active = self
            .device
            .lock()
            .expect("display device lock poisoned")
            .is_some();
        if active {
            DisplayStatus::Active
        } else {
            DisplayStatus::Available
        }
    }

    fn request_switch(&mut self, done: SwitchCallback) {
        let device = Arc::clone(&self.device);
        let path = self.path.clone();
        let spawn = |task: Box<dyn FnOnce() + Send>| {
            thread::Builder::new()
                .name("mdpane-display".to_string())
                .spawn(task)
                .map(drop)
        };
        run_detached(spawn, self.path.clone(), done, move |done| {
            let mut slot = device.lock().expect("display device lock poisoned");
            if let Some(mut file) = slot.take() {
                // Leave the borrowed terminal clean.
                let _ = file.write_all(b"\x1b[2J\x1b[H");
                set_secondary_active(false);
                drop(slot);
                done(Ok(DisplayStatus::Available));
                return;
            }
            match OpenOptions::new().write(true).open(&path) {
                Ok(file) => {
                    *slot = Some(file);
                    set_secondary_active(true);
                    drop(slot);
                    tracing::info!(path = %path.display(), "preview moved to secondary display");
                    done(Ok(DisplayStatus::Active));
                }
                Err(source) => {
                    drop(slot);
                    done(Err(DisplayError::Device { path, source }));
                }
            }
        });
    }

    fn present(&mut self, lines: &[String]) -> Result<(), DisplayError> {
        let mut slot = self.device.lock().expect("display device lock poisoned");
        let Some(file) = slot.as_mut() else {
            return Ok(());
        };
        let mut out = BufWriter::new(file);
        let written = out
            .write_all(b"\x1b[2J\x1b[H")
            .and_then(|()| {
                for line in lines {
                    out.write_all(line.as_bytes())?;
                    out.write_all(b"\r\n")?;
                }
                out.flush()
            });
        drop(out);
        if let Err(source) = written {
            // The device went away; fall back to the main screen.
            *slot = None;
            set_secondary_active(false);
            return Err(DisplayError::Device {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }
}

/// Run `job` through `spawn`, handing it `done`.
///
/// If the task cannot be started, `done` still gets called with the error,
/// so callers waiting on a switch are never left hanging.
fn run_detached(
    spawn: impl FnOnce(Box<dyn FnOnce() + Send>) -> io::Result<()>,
    path: PathBuf,
    done: SwitchCallback,
    job: impl FnOnce(SwitchCallback) + Send + 'static,
) {
    let pending = Arc::new(Mutex::new(Some(done)));
    let for_task = Arc::clone(&pending);
    let started = spawn(Box::new(move || {
        let done = for_task.lock().expect("switch callback lock poisoned").take();
        if let Some(done) = done {
            job(done);
        }
    }));
    if let Err(source) = started {
        tracing::warn!(%source, "could not start display switch");
        let done = pending.lock().expect("switch callback lock poisoned").take();
        if let Some(done) = done {
            done(Err(DisplayError::Device { path, source }));
        }
    }
}

impl std::fmt::Debug for TtyDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyDisplay")
            .field("path", &self.path)
            .field("status", &self.status())
            .finish()
    }
}
