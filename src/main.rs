//! mdpane - edit markdown in the terminal with a live preview beside it.
//!
//! # Usage
//!
//! ```bash
//! mdpane
//! mdpane --export-dir ~/notes --file-name todo.md
//! mdpane --gfm --secondary-tty /dev/pts/4
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdpane::app::{App, DEFAULT_SPLIT_WIDTH, DEFAULT_SYNC_RENDER_LIMIT};
use mdpane::config::{ConfigFlags, ThemeMode};
use mdpane::export::DEFAULT_FILE_NAME;
use mdpane::logging::{self, ConsoleWriter};
use mdpane::perf;
use mdpane::render::{MarkdownFlavor, RenderPipeline};

/// A terminal markdown editor with a live preview pane
#[derive(Parser, Debug)]
#[command(name = "mdpane", version, about, long_about = None)]
struct Cli {
    /// Minimum terminal width for showing editor and preview side by side
    #[arg(long, value_name = "COLUMNS")]
    split_width: Option<u16>,

    /// Directory relative export names are resolved against
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// File name the export prompt suggests
    #[arg(long, value_name = "NAME")]
    file_name: Option<String>,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Enable GitHub flavored markdown extensions
    #[arg(long)]
    gfm: bool,

    /// Largest document in bytes rendered on the input thread
    #[arg(long, value_name = "BYTES")]
    sync_render_limit: Option<usize>,

    /// Terminal device to use as the secondary preview display
    #[arg(long, value_name = "TTY")]
    secondary_tty: Option<PathBuf>,

    /// Write log output to a file (stderr is silenced while the editor is open)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable performance timing
    #[arg(long)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            split_width: self.split_width,
            sync_render_limit: self.sync_render_limit,
            export_dir: self.export_dir.clone(),
            file_name: self.file_name.clone(),
            secondary_tty: self.secondary_tty.clone(),
            theme: self.theme,
            gfm: self.gfm,
            perf: self.perf,
            render_debug_log: self.render_debug_log.clone(),
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging::DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(ConsoleWriter).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let effective = ConfigFlags::from_env().union(&cli.flags());
    tracing::debug!(?effective, "configuration");

    perf::set_enabled(effective.perf);
    if let Err(err) = perf::set_debug_log_path(effective.render_debug_log.as_deref()) {
        tracing::warn!(
            path = ?effective.render_debug_log,
            %err,
            "failed to initialize render debug log"
        );
    }

    effective.theme.unwrap_or_default().apply();

    let flavor = if effective.gfm {
        MarkdownFlavor::Gfm
    } else {
        MarkdownFlavor::CommonMark
    };
    let export_dir = match effective.export_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if !export_dir.is_dir() {
        anyhow::bail!("Export directory not found: {}", export_dir.display());
    }

    let mut app = App::new()
        .with_pipeline(RenderPipeline::new(flavor))
        .with_split_width(effective.split_width.unwrap_or(DEFAULT_SPLIT_WIDTH))
        .with_sync_render_limit(
            effective
                .sync_render_limit
                .unwrap_or(DEFAULT_SYNC_RENDER_LIMIT),
        )
        .with_export(
            export_dir,
            effective
                .file_name
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        )
        .with_secondary_tty(effective.secondary_tty);

    tracing::info!("starting editor");
    app.run().context("Application error")
}
