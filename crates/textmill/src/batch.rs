//! Job orchestrator: validates batch requests, builds one task per file
//! and routes outcomes back through the progress channel.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::error;

use crate::cache::ResultCache;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::document::DocumentBackend;
use crate::error::{ExtractError, ValidationError};
use crate::ocr::{OcrOptions, TextRecognizer};
use crate::pipeline::{ExtractRequest, PagePipeline};
use crate::progress::{event_channel, EventPayload, JobEmitter, JobEvent};
use crate::worker::{Job, ProgressCallback, TaskQueue};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "bmp"];

/// Options shared by every job in one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub use_ocr: bool,
    /// 1-based inclusive page bounds; both or neither. PDFs only.
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub password: Option<String>,
}

/// Top-level coordinator. Owns the task queue, the page pipeline and the
/// per-batch cancellation token.
pub struct Orchestrator {
    queue: TaskQueue,
    pipeline: Arc<PagePipeline>,
    recognizer: Arc<dyn TextRecognizer>,
    ocr_options: OcrOptions,
    cancel: CancelToken,
}

impl Orchestrator {
    /// `progress` is the batch-level callback fed by the task queue with
    /// the aggregate completion percentage.
    pub fn new(
        config: &Config,
        backend: Arc<dyn DocumentBackend>,
        recognizer: Arc<dyn TextRecognizer>,
        progress: Option<ProgressCallback>,
    ) -> Self {
        let cache = Arc::new(ResultCache::new());
        let pipeline = Arc::new(PagePipeline::from_config(
            config,
            backend,
            Arc::clone(&recognizer),
            cache,
        ));

        Self {
            queue: TaskQueue::new(config.worker_count, progress),
            pipeline,
            recognizer,
            ocr_options: OcrOptions::from(&config.ocr),
            cancel: CancelToken::new(),
        }
    }

    /// Validates every input synchronously, then submits one job per path.
    /// No job is created when any input is rejected.
    ///
    /// Starting a new batch clears the cancellation token; cancellation is
    /// batch-scoped.
    pub fn submit_batch(
        &self,
        paths: &[PathBuf],
        options: BatchOptions,
    ) -> Result<Batch, ValidationError> {
        validate_page_range(&options)?;
        for path in paths {
            validate_path(path)?;
        }

        self.cancel.reset();
        let (sender, receiver) = event_channel();

        for path in paths {
            let job = Job::new(path.clone());
            let emitter = JobEmitter::new(&job.id, &job.filename(), sender.clone());
            let cancel = self.cancel.clone();

            if job.is_pdf() {
                let pipeline = Arc::clone(&self.pipeline);
                let request = ExtractRequest {
                    path: path.clone(),
                    use_ocr: options.use_ocr,
                    start_page: options.start_page,
                    end_page: options.end_page,
                    password: options.password.clone(),
                };
                self.queue
                    .submit(move || pipeline.run(&request, &cancel, &emitter));
            } else {
                let recognizer = Arc::clone(&self.recognizer);
                let ocr_options = self.ocr_options.clone();
                let path = path.clone();
                self.queue.submit(move || {
                    run_image_job(&path, recognizer.as_ref(), &ocr_options, &cancel, &emitter)
                });
            }
        }

        Ok(Batch {
            receiver,
            cancel: self.cancel.clone(),
            job_count: paths.len(),
        })
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }
}

/// A plain image has no page concept: one OCR call, one terminal event.
fn run_image_job(
    path: &Path,
    recognizer: &dyn TextRecognizer,
    options: &OcrOptions,
    cancel: &CancelToken,
    emitter: &JobEmitter,
) {
    if cancel.is_cancelled() {
        emitter.cancelled(crate::pipeline::runner::CANCELLED_MESSAGE);
        return;
    }

    let outcome = std::fs::read(path)
        .map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })
        .and_then(|bytes| recognizer.recognize(&bytes, options));

    match outcome {
        Ok(text) => {
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            emitter.result(normalized);
        }
        Err(e) => {
            error!(
                "Image OCR failed for {}: {}",
                crate::sanitize::redact_path(path),
                e
            );
            emitter.error(e.to_string());
        }
    }
}

fn validate_page_range(options: &BatchOptions) -> Result<(), ValidationError> {
    match (options.start_page, options.end_page) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if start < 1 {
                return Err(ValidationError::InvalidPageRange {
                    start,
                    end,
                    reason: "start page must be at least 1".to_string(),
                });
            }
            if end < start {
                return Err(ValidationError::InvalidPageRange {
                    start,
                    end,
                    reason: "end page precedes start page".to_string(),
                });
            }
            Ok(())
        }
        _ => Err(ValidationError::IncompletePageRange),
    }
}

fn validate_path(path: &Path) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        });
    }

    Ok(())
}

/// Consumer handle for one submitted batch: the single receiving end of
/// the batch's progress channel plus its cancellation token.
#[derive(Debug)]
pub struct Batch {
    receiver: Receiver<JobEvent>,
    cancel: CancelToken,
    job_count: usize,
}

/// Terminal outcome of one job, as gathered by [`Batch::collect`].
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: String,
    pub filename: String,
    pub payload: EventPayload,
}

impl Batch {
    pub fn job_count(&self) -> usize {
        self.job_count
    }

    /// Blocking receive. Returns `None` once every producer is gone.
    pub fn recv(&self) -> Option<JobEvent> {
        self.receiver.recv().ok()
    }

    /// Non-blocking receive for poll-style consumers.
    pub fn try_recv(&self) -> Option<JobEvent> {
        self.receiver.try_recv().ok()
    }

    /// The underlying channel, for consumers that select over several
    /// batches at once.
    pub fn receiver(&self) -> &Receiver<JobEvent> {
        &self.receiver
    }

    /// Requests cancellation of every job in this batch.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drains the channel until every job reached a terminal event and
    /// returns the per-job outcomes. An `Error` or `Cancelled` event ends
    /// only its own job; the rest are still awaited.
    pub fn collect(self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::with_capacity(self.job_count);
        let mut finished: HashSet<String> = HashSet::new();

        while finished.len() < self.job_count {
            let Some(event) = self.recv() else {
                // All producers dropped; whatever is finished is all there is.
                break;
            };
            if event.payload.is_terminal() && finished.insert(event.job_id.clone()) {
                outcomes.push(JobOutcome {
                    job_id: event.job_id,
                    filename: event.filename,
                    payload: event.payload,
                });
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_missing_file() {
        let result = validate_path(Path::new("/nonexistent/scan.pdf"));
        assert!(matches!(result, Err(ValidationError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_path_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, b"x").unwrap();

        match validate_path(&path) {
            Err(ValidationError::UnsupportedExtension { extension, .. }) => {
                assert_eq!(extension, "docx");
            }
            other => panic!("Expected UnsupportedExtension, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_validate_path_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SCAN.PDF");
        std::fs::write(&path, b"x").unwrap();

        assert!(validate_path(&path).is_ok());
    }

    #[test]
    fn test_validate_range_accepts_unset_and_wellformed() {
        assert!(validate_page_range(&BatchOptions::default()).is_ok());
        assert!(validate_page_range(&BatchOptions {
            start_page: Some(2),
            end_page: Some(4),
            ..Default::default()
        })
        .is_ok());
        assert!(validate_page_range(&BatchOptions {
            start_page: Some(3),
            end_page: Some(3),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn test_validate_range_rejects_inverted() {
        let result = validate_page_range(&BatchOptions {
            start_page: Some(4),
            end_page: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ValidationError::InvalidPageRange { .. })
        ));
    }

    #[test]
    fn test_validate_range_rejects_zero_start() {
        let result = validate_page_range(&BatchOptions {
            start_page: Some(0),
            end_page: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ValidationError::InvalidPageRange { .. })
        ));
    }

    #[test]
    fn test_validate_range_rejects_half_open() {
        let result = validate_page_range(&BatchOptions {
            start_page: Some(2),
            end_page: None,
            ..Default::default()
        });
        assert!(matches!(result, Err(ValidationError::IncompletePageRange)));
    }
}
