//! Background rendering for documents too large to convert on every keystroke.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::RenderPipeline;

/// A snapshot of the document text to render, tagged with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub version: u64,
    pub text: String,
}

/// HTML for the document as it was at `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub version: u64,
    pub html: String,
}

/// Owns a render thread fed through a channel.
///
/// Requests queued while a render is in flight are collapsed: the thread
/// only ever renders the newest one it has seen, so a burst of edits costs
/// one conversion instead of one per keystroke. Results may still arrive
/// after a newer synchronous render; receivers compare versions.
pub struct RenderWorker {
    tx: Option<Sender<RenderRequest>>,
    handle: Option<JoinHandle<()>>,
    last_requested: Option<u64>,
}

impl RenderWorker {
    /// Start the render thread. `deliver` runs on that thread for each result.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create the thread.
    pub fn spawn<F>(pipeline: RenderPipeline, deliver: F) -> std::io::Result<Self>
    where
        F: Fn(RenderResult) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("mdpane-render".to_string())
            .spawn(move || run(&pipeline, &rx, &deliver))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            last_requested: None,
        })
    }

    /// Queue a render. Returns false if the render thread has gone away.
    pub fn request(&mut self, request: RenderRequest) -> bool {
        let version = request.version;
        let Some(tx) = &self.tx else {
            return false;
        };
        if tx.send(request).is_err() {
            tracing::warn!(version, "render worker is gone; request dropped");
            return false;
        }
        self.last_requested = Some(version);
        true
    }

    /// Version of the most recent request handed to the thread.
    pub const fn last_requested(&self) -> Option<u64> {
        self.last_requested
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Closing the channel ends the loop in `run`.
        self.tx = None;
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("render worker panicked during shutdown");
        }
    }
}

impl std::fmt::Debug for RenderWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderWorker")
            .field("running", &self.tx.is_some())
            .field("last_requested", &self.last_requested)
            .finish()
    }
}

fn run<F>(pipeline: &RenderPipeline, rx: &Receiver<RenderRequest>, deliver: &F)
where
    F: Fn(RenderResult),
{
    while let Ok(first) = rx.recv() {
        let mut newest = first;
        let mut skipped = 0_u32;
        while let Ok(next) = rx.try_recv() {
            if next.version >= newest.version {
                newest = next;
            }
            skipped += 1;
        }
        let started = Instant::now();
        let html = pipeline.render(&newest.text);
        tracing::debug!(
            version = newest.version,
            skipped,
            bytes = newest.text.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "background render finished"
        );
        crate::perf::log_event(
            "render.worker",
            format!("version={} skipped={skipped}", newest.version),
        );
        deliver(RenderResult {
            version: newest.version,
            html,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_worker_renders_request() {
        let (tx, rx) = mpsc::channel();
        let mut worker = RenderWorker::spawn(RenderPipeline::default(), move |result| {
            let _ = tx.send(result);
        })
        .unwrap();

        assert!(worker.request(RenderRequest {
            version: 1,
            text: "# Hi".to_string(),
        }));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.version, 1);
        assert!(result.html.contains("<h1>Hi</h1>"));
        assert_eq!(worker.last_requested(), Some(1));
    }

    #[test]
    fn test_worker_final_result_is_newest_request() {
        let (tx, rx) = mpsc::channel();
        let mut worker = RenderWorker::spawn(RenderPipeline::default(), move |result| {
            let _ = tx.send(result);
        })
        .unwrap();

        for version in 1..=20 {
            worker.request(RenderRequest {
                version,
                text: format!("# Version {version}"),
            });
        }

        let mut last = None;
        while let Ok(result) = rx.recv_timeout(Duration::from_secs(5)) {
            let done = result.version == 20;
            last = Some(result);
            if done {
                break;
            }
        }
        let last = last.unwrap();
        assert_eq!(last.version, 20);
        assert!(last.html.contains("Version 20"));
    }

    #[test]
    fn test_drop_joins_thread() {
        let worker = RenderWorker::spawn(RenderPipeline::default(), |_| {}).unwrap();
        drop(worker);
    }
}
