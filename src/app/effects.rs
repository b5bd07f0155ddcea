use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::app::{Message, Model, ToastLevel};
use crate::display::{DisplayStatus, DisplayTarget};
use crate::export::{ExportSink, resolve_destination, spawn_export};
use crate::render::{RenderPipeline, RenderRequest, RenderWorker};

/// Everything the app does outside of `update`: rendering large documents
/// on the worker, writing exports, driving the secondary display.
///
/// Background work reports back by sending a [`Message`] into `events`.
pub(super) struct Runtime {
    events: Sender<Message>,
    pipeline: RenderPipeline,
    worker: Option<RenderWorker>,
    display: Box<dyn DisplayTarget>,
    sink: Arc<dyn ExportSink>,
    /// Preview version last pushed to the secondary display
    presented: Option<u64>,
}

impl Runtime {
    pub(super) fn new(
        events: Sender<Message>,
        pipeline: RenderPipeline,
        display: Box<dyn DisplayTarget>,
        sink: Arc<dyn ExportSink>,
    ) -> Self {
        Self {
            events,
            pipeline,
            worker: None,
            display,
            sink,
            presented: None,
        }
    }

    pub(super) fn display_status(&self) -> DisplayStatus {
        self.display.status()
    }

    /// Carry out whatever the last update asked for.
    pub(super) fn handle_message_side_effects(&mut self, model: &mut Model, msg: &Message) {
        if let Message::DisplayStatusChanged(_) = msg {
            self.presented = None;
        }
        self.schedule_render(model);
        self.start_export(model);
        self.start_display_switch(model);
        self.mirror_preview(model);
    }

    fn schedule_render(&mut self, model: &mut Model) {
        if !model.render_requested {
            return;
        }
        model.render_requested = false;
        let version = model.document.version();
        let len = model.document.text().len();

        if len > model.sync_render_limit {
            match self.worker_mut() {
                Ok(worker) => {
                    let text = model.document.get_text();
                    if worker.request(RenderRequest { version, text }) {
                        model.render_in_flight = Some(version);
                        crate::perf::log_event(
                            "render.queued",
                            format!("version={version} bytes={len}"),
                        );
                        return;
                    }
                    self.worker = None;
                }
                Err(err) => {
                    tracing::warn!(%err, "render worker unavailable; rendering inline");
                }
            }
        }

        let html = {
            let _scope = crate::perf::scope("render.inline");
            model.document.render()
        };
        model.render_in_flight = None;
        model.preview.show(version, html);
    }

    fn worker_mut(&mut self) -> std::io::Result<&mut RenderWorker> {
        if self.worker.is_none() {
            let events = self.events.clone();
            let worker = RenderWorker::spawn(self.pipeline, move |result| {
                let _ = events.send(Message::RenderFinished(result));
            })?;
            self.worker = Some(worker);
        }
        self.worker
            .as_mut()
            .ok_or_else(|| std::io::Error::other("render worker missing"))
    }

    fn start_export(&self, model: &mut Model) {
        let Some(input) = model.export_requested.take() else {
            return;
        };
        let destination = match resolve_destination(&input, &model.export_dir) {
            Ok(destination) => destination,
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Export failed: {err}"));
                return;
            }
        };
        let version = model.document.version();
        let bytes = model.document.serialize();
        let events = self.events.clone();
        let started = spawn_export(
            Arc::clone(&self.sink),
            destination,
            bytes,
            move |outcome| {
                let _ = events.send(Message::ExportFinished {
                    destination: outcome.destination,
                    version,
                    result: outcome.result.map_err(|err| err.to_string()),
                });
            },
        );
        match started {
            Ok(()) => model.export_in_flight = true,
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Export failed: {err}"));
            }
        }
    }

    fn start_display_switch(&mut self, model: &mut Model) {
        if !model.display_switch_requested {
            return;
        }
        model.display_switch_requested = false;
        let events = self.events.clone();
        self.display.request_switch(Box::new(move |result| {
            let _ = events.send(Message::DisplayStatusChanged(
                result.map_err(|err| err.to_string()),
            ));
        }));
    }

    /// Push the preview to the secondary display when it is showing there.
    fn mirror_preview(&mut self, model: &mut Model) {
        if model.display_status != DisplayStatus::Active {
            return;
        }
        let version = model.preview.version();
        if version.is_none() || version == self.presented {
            return;
        }
        match self.display.present(&model.preview.plain_lines()) {
            Ok(()) => self.presented = version,
            Err(err) => {
                self.presented = None;
                model.display_status = self.display.status();
                model.show_toast(ToastLevel::Error, format!("Secondary display lost: {err}"));
                model.reflow_layout();
            }
        }
    }
}

#[cfg(test)]
impl Runtime {
    pub(super) fn has_worker(&self) -> bool {
        self.worker.is_some()
    }
}
