//! Timing and event tracing for the render and export paths.
//!
//! [`scope`] measures a block (markdown conversion, preview layout, export
//! writes) and reports it through `tracing` at debug level once `--perf` is
//! on. [`log_event`] appends to the render event log chosen with
//! `--render-debug-log`: one line per keypress, render request, stale
//! result or export outcome, stamped with milliseconds since the log opened.
//! That log is how out-of-order render results get diagnosed after the fact.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::Instant;

static TIMINGS: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: LazyLock<Mutex<EventLog>> = LazyLock::new(|| Mutex::new(EventLog::closed()));

/// Times the enclosing block; reports on drop.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(target: "mdpane::perf", scope = self.name, elapsed_ms, "timing");
        log_event("timing", format!("{} {elapsed_ms:.2} ms", self.name));
    }
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn set_enabled(enabled: bool) {
    TIMINGS.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMINGS.load(Ordering::Relaxed)
}

/// Destination of [`log_event`] lines. Closed unless a path was given.
#[derive(Debug)]
struct EventLog {
    opened: Instant,
    writer: Option<BufWriter<File>>,
}

impl EventLog {
    fn closed() -> Self {
        Self {
            opened: Instant::now(),
            writer: None,
        }
    }

    fn open(path: &Path) -> std::io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "# mdpane {} render event log",
            env!("CARGO_PKG_VERSION")
        )?;
        writer.flush()?;
        Ok(Self {
            opened: Instant::now(),
            writer: Some(writer),
        })
    }

    fn append(&mut self, name: &str, detail: &str) {
        let elapsed_ms = self.opened.elapsed().as_secs_f64() * 1000.0;
        if let Some(writer) = self.writer.as_mut() {
            // The log is best effort; a full disk must not stop the editor.
            let _ = writeln!(writer, "{elapsed_ms:>10.3}ms {name:<18} {detail}")
                .and_then(|()| writer.flush());
        }
    }
}

/// Open (or with `None`, close) the render event log.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let next = match path {
        Some(path) => EventLog::open(path)?,
        None => EventLog::closed(),
    };
    *EVENT_LOG.lock().expect("event log lock poisoned") = next;
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    EVENT_LOG
        .lock()
        .expect("event log lock poisoned")
        .writer
        .is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    EVENT_LOG
        .lock()
        .expect("event log lock poisoned")
        .append(name, detail.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_timings_flag_toggles() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_event_log_records_render_events_until_closed() {
        let temp_file = NamedTempFile::new().unwrap();
        set_debug_log_path(Some(temp_file.path())).unwrap();
        assert!(is_debug_log_enabled());
        log_event("render.stale", "version=3 shown=4");
        set_debug_log_path(None).unwrap();
        assert!(!is_debug_log_enabled());
        log_event("render.stale", "after close");

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("# mdpane "));
        assert!(content.contains("render.stale"));
        assert!(content.contains("version=3 shown=4"));
        assert!(!content.contains("after close"));
    }
}
