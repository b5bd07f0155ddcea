use std::io::stdout;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::Runtime;
use crate::app::{App, Message, Model, update};
use crate::display::DisplayStatus;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the editor until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or drawn to.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; mdpane requires an interactive terminal")?;
        crate::render::install_panic_guard();
        crate::logging::pause_console();
        let size = terminal.size();
        drop(init_scope);
        let size = match size {
            Ok(size) => size,
            Err(err) => {
                ratatui::restore();
                crate::logging::resume_console();
                return Err(err.into());
            }
        };

        let (events, inbox) = mpsc::channel();
        let mut runtime = self.runtime(events);
        let mut model = self.build_model((size.width, size.height), runtime.display_status());
        model
            .document
            .subscribe(|event| tracing::debug!(?event, "document changed"));

        let result = execute!(stdout(), EnableBracketedPaste, EnableMouseCapture)
            .context("Failed to enable terminal input modes")
            .and_then(|()| self.event_loop(&mut terminal, &mut model, &mut runtime, &inbox));

        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
        ratatui::restore();
        crate::logging::resume_console();
        // Joins the render thread.
        drop(runtime);

        result
    }

    pub(super) fn dispatch(model: &mut Model, runtime: &mut Runtime, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        runtime.handle_message_side_effects(model, &side_msg);
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        runtime: &mut Runtime,
        inbox: &Receiver<Message>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        // First render of the seed text.
        Self::dispatch(model, runtime, Message::Redraw);

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                Self::dispatch(model, runtime, Message::Resize(width, height));
                needs_render = true;
            }
            model.resize_pending = resize_debouncer.is_pending();

            // Results from render, export and display threads.
            while let Ok(msg) = inbox.try_recv() {
                crate::perf::log_event("event.background", format!("frame={frame_idx} msg={msg:?}"));
                Self::dispatch(model, runtime, msg);
                needs_render = true;
            }

            // The secondary display can go away without a switch request.
            if model.display_status == DisplayStatus::Active
                && !model.display_switching
                && !crate::display::is_secondary_active()
            {
                Self::dispatch(
                    model,
                    runtime,
                    Message::DisplayStatusChanged(Ok(runtime.display_status())),
                );
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || model.awaiting_background() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    self.handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    Self::dispatch(model, runtime, msg);
                    needs_render = true;
                }

                // Coalesce key repeat and paste bursts into a single draw.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        self.handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        drained += 1;
                        Self::dispatch(model, runtime, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3} version={} preview={:?}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0,
                        model.document.version(),
                        model.preview.version()
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
