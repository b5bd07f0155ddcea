//! Log routing for a process that takes over its own terminal.
//!
//! Without a log file, `tracing` output goes to stderr. While the editor
//! owns the screen, stderr is that screen, so [`ConsoleWriter`] drops
//! records between [`pause_console`] and [`resume_console`].

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::EitherWriter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

static CONSOLE_PAUSED: AtomicBool = AtomicBool::new(false);

/// Stop writing to stderr; the terminal belongs to the UI now.
pub fn pause_console() {
    CONSOLE_PAUSED.store(true, Ordering::Relaxed);
}

pub fn resume_console() {
    CONSOLE_PAUSED.store(false, Ordering::Relaxed);
}

pub fn console_paused() -> bool {
    CONSOLE_PAUSED.load(Ordering::Relaxed)
}

/// stderr writer that goes quiet while the console is paused.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = EitherWriter<io::Stderr, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        if console_paused() {
            EitherWriter::B(io::sink())
        } else {
            EitherWriter::A(io::stderr())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-wide flag is not raced.
    #[test]
    fn test_console_writer_is_silent_while_paused() {
        assert!(matches!(ConsoleWriter.make_writer(), EitherWriter::A(_)));
        pause_console();
        assert!(console_paused());
        assert!(matches!(ConsoleWriter.make_writer(), EitherWriter::B(_)));
        resume_console();
        assert!(matches!(ConsoleWriter.make_writer(), EitherWriter::A(_)));
    }
}
