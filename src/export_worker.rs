//! Background slide export.
//!
//! An [`Exporter`] owns one worker thread. Slides are submitted as snapshots
//! and exported in order; each job reports back exactly once on the event
//! channel returned by [`Exporter::spawn`]. Submitting a slide whose previous
//! export is still queued or running is refused with
//! [`Submission::AlreadyInFlight`], so the same slide is never written by two
//! jobs at once.
//!
//! Dropping the exporter abandons it: queued jobs that have not started are
//! skipped and results nobody receives are discarded. Use
//! [`Exporter::finish`] to wait for everything submitted so far.

use crate::config::StudioConfig;
use crate::render::{ExportOutcome, FontBook, RenderBackend, export_slide};
use crate::types::Slide;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// Result of one export job.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Finished(ExportOutcome),
    Failed { id: String, message: String },
}

impl ExportEvent {
    pub fn slide_id(&self) -> &str {
        match self {
            ExportEvent::Finished(outcome) => &outcome.id,
            ExportEvent::Failed { id, .. } => id,
        }
    }
}

/// Answer to [`Exporter::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Queued,
    /// An export for this slide id has not reported yet.
    AlreadyInFlight,
    /// The worker thread is gone; nothing will be exported.
    Closed,
}

type InFlight = Arc<Mutex<HashSet<String>>>;

pub struct Exporter {
    jobs: Option<Sender<Slide>>,
    in_flight: InFlight,
    abandoned: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Exporter {
    /// Start the worker thread.
    pub fn spawn<B>(
        backend: B,
        config: StudioConfig,
        fonts: Arc<FontBook>,
        output_dir: PathBuf,
    ) -> (Self, Receiver<ExportEvent>)
    where
        B: RenderBackend + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Slide>();
        let (event_tx, event_rx) = mpsc::channel();
        let in_flight: InFlight = Arc::default();
        let abandoned = Arc::new(AtomicBool::new(false));

        let worker = {
            let in_flight = Arc::clone(&in_flight);
            let abandoned = Arc::clone(&abandoned);
            std::thread::spawn(move || {
                for slide in job_rx {
                    if abandoned.load(Ordering::Acquire) {
                        tracing::debug!(slide = %slide.id, "exporter dropped, skipping job");
                        break;
                    }
                    let result = export_slide(&backend, &slide, &config, &fonts, &output_dir);
                    let event = match result {
                        Ok(outcome) => ExportEvent::Finished(outcome),
                        Err(e) => {
                            tracing::error!(slide = %slide.id, error = %e, "export failed");
                            ExportEvent::Failed {
                                id: slide.id.clone(),
                                message: e.to_string(),
                            }
                        }
                    };
                    // Clear before reporting so a listener can resubmit immediately
                    lock(&in_flight).remove(&slide.id);
                    if event_tx.send(event).is_err() {
                        tracing::debug!(slide = %slide.id, "no listener for export result");
                    }
                }
            })
        };

        let exporter = Self {
            jobs: Some(job_tx),
            in_flight,
            abandoned,
            worker: Some(worker),
        };
        (exporter, event_rx)
    }

    /// Queue a snapshot of `slide` for export.
    pub fn submit(&self, slide: &Slide) -> Submission {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains(&slide.id) {
            tracing::debug!(slide = %slide.id, "export already in flight");
            return Submission::AlreadyInFlight;
        }

        let Some(jobs) = &self.jobs else {
            return Submission::Closed;
        };
        if jobs.send(slide.clone()).is_err() {
            tracing::error!(slide = %slide.id, "export worker has stopped");
            return Submission::Closed;
        }
        in_flight.insert(slide.id.clone());
        Submission::Queued
    }

    /// Whether an export for `id` has been submitted but not reported.
    pub fn is_in_flight(&self, id: &str) -> bool {
        lock(&self.in_flight).contains(id)
    }

    pub fn pending(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Stop accepting jobs and wait until every queued job has reported.
    pub fn finish(mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("export worker panicked");
            }
        }
    }
}

impl Drop for Exporter {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.abandoned.store(true, Ordering::Release);
        }
        // Closing the channel ends the worker loop; the thread is not joined
        self.jobs.take();
    }
}

fn lock(in_flight: &InFlight) -> std::sync::MutexGuard<'_, HashSet<String>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
