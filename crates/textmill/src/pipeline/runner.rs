use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info_span};

use crate::cache::{Fingerprint, ResultCache};
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::document::{DocumentBackend, PageSource};
use crate::error::ExtractError;
use crate::ocr::{OcrOptions, TextRecognizer};
use crate::progress::JobEmitter;
use crate::sanitize;

pub(crate) const CANCELLED_MESSAGE: &str = "Operation cancelled";

/// One document extraction request, as validated by the orchestrator.
/// Page bounds are 1-based and inclusive; `None` means all pages.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub path: PathBuf,
    pub use_ocr: bool,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub password: Option<String>,
}

enum Outcome {
    Text(String),
    Cancelled,
}

/// Turns one document into one text string: consults the cache, fans the
/// pages out to a nested bounded pool, emits progress in completion order
/// and assembles the result in page order.
pub struct PagePipeline {
    backend: Arc<dyn DocumentBackend>,
    recognizer: Arc<dyn TextRecognizer>,
    cache: Arc<ResultCache>,
    ocr_options: OcrOptions,
    text_workers: usize,
    ocr_workers: usize,
}

impl PagePipeline {
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        recognizer: Arc<dyn TextRecognizer>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self::from_config(&Config::default(), backend, recognizer, cache)
    }

    pub fn from_config(
        config: &Config,
        backend: Arc<dyn DocumentBackend>,
        recognizer: Arc<dyn TextRecognizer>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            backend,
            recognizer,
            cache,
            ocr_options: OcrOptions::from(&config.ocr),
            text_workers: config.pages.text_workers,
            ocr_workers: config.pages.ocr_workers,
        }
    }

    /// Runs one extraction job to its terminal event. Never panics and
    /// never propagates an error to the caller: every outcome leaves
    /// through the emitter.
    pub fn run(&self, request: &ExtractRequest, cancel: &CancelToken, emitter: &JobEmitter) {
        let filename = sanitize::redact_path(&request.path);
        let _span = info_span!("pipeline",
            filename = %filename,
            use_ocr = request.use_ocr,
        )
        .entered();

        if cancel.is_cancelled() {
            emitter.cancelled(CANCELLED_MESSAGE);
            return;
        }

        match self.extract(request, cancel, emitter) {
            Ok(Outcome::Text(text)) => emitter.result(text),
            Ok(Outcome::Cancelled) => emitter.cancelled(CANCELLED_MESSAGE),
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", filename, e);
                emitter.error(e.to_string());
            }
        }
    }

    fn extract(
        &self,
        request: &ExtractRequest,
        cancel: &CancelToken,
        emitter: &JobEmitter,
    ) -> Result<Outcome, ExtractError> {
        let fingerprint = Fingerprint::for_file(
            &request.path,
            request.use_ocr,
            request.start_page,
            request.end_page,
            request.password.as_deref(),
        )
        .map_err(|e| ExtractError::ReadDocument {
            path: request.path.clone(),
            source: e,
        })?;

        if let Some(text) = self.cache.lookup(&fingerprint) {
            debug!("Result cache hit, skipping extraction");
            return Ok(Outcome::Text(text));
        }

        let source = {
            let _step = info_span!("open_document").entered();
            self.backend.open(&request.path, request.password.as_deref())?
        };

        let pages = resolve_page_range(source.page_count(), request.start_page, request.end_page);
        if pages.is_empty() {
            // Zero-page document or a range past the last page: empty
            // text, not an error.
            self.cache.store(fingerprint, String::new());
            return Ok(Outcome::Text(String::new()));
        }

        let per_page = {
            let _step = info_span!("extract_pages", count = pages.len()).entered();
            match self.run_page_units(source.as_ref(), &pages, request.use_ocr, cancel, emitter)? {
                Some(per_page) => per_page,
                None => return Ok(Outcome::Cancelled),
            }
        };

        let text = assemble(&per_page);
        self.cache.store(fingerprint, text.clone());
        Ok(Outcome::Text(text))
    }

    /// Fans one unit per page out to a bounded thread pool and collects
    /// completions. Returns `None` when cancellation stopped the fan-out
    /// before every unit finished; already-running units complete but
    /// their text is discarded with the rest of the job.
    fn run_page_units(
        &self,
        source: &dyn PageSource,
        pages: &[usize],
        use_ocr: bool,
        cancel: &CancelToken,
        emitter: &JobEmitter,
    ) -> Result<Option<Vec<String>>, ExtractError> {
        let pool_size = if use_ocr {
            self.ocr_workers
        } else {
            self.text_workers
        };
        let worker_count = pool_size.min(pages.len());

        let next_unit = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let (done_tx, done_rx) =
            crossbeam_channel::unbounded::<(usize, Result<String, ExtractError>)>();

        let total = pages.len();
        let mut slots: Vec<Option<String>> = vec![None; total];
        let mut completed = 0usize;
        let mut first_error: Option<ExtractError> = None;

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                let done_tx = done_tx.clone();
                let next_unit = &next_unit;
                let failed = &failed;
                scope.spawn(move || loop {
                    // Cancellation boundary: checked before taking each unit.
                    if cancel.is_cancelled() || failed.load(Ordering::Relaxed) {
                        break;
                    }
                    let slot = next_unit.fetch_add(1, Ordering::Relaxed);
                    if slot >= pages.len() {
                        break;
                    }
                    let outcome = self.extract_page(source, pages[slot], use_ocr);
                    if done_tx.send((slot, outcome)).is_err() {
                        break;
                    }
                });
            }
            drop(done_tx);

            // Single consumer: progress goes out in completion order, text
            // lands in its page-index slot. A slot is written exactly once.
            for (slot, outcome) in done_rx.iter() {
                match outcome {
                    Ok(text) => {
                        slots[slot] = Some(text);
                        completed += 1;
                        if first_error.is_none() && !cancel.is_cancelled() {
                            emitter.progress((100 * completed / total) as u8);
                        }
                    }
                    Err(e) => {
                        failed.store(true, Ordering::Relaxed);
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        if cancel.is_cancelled() && completed < total {
            return Ok(None);
        }

        Ok(Some(slots.into_iter().map(Option::unwrap_or_default).collect()))
    }

    fn extract_page(
        &self,
        source: &dyn PageSource,
        page: usize,
        use_ocr: bool,
    ) -> Result<String, ExtractError> {
        if use_ocr {
            let image = source.rasterize(page, self.ocr_options.dpi)?;
            self.recognizer.recognize(&image, &self.ocr_options)
        } else {
            source.page_text(page)
        }
    }
}

/// Resolves the effective zero-based page indices. Bounds were validated
/// upstream; `end` is additionally clamped to the real page count so a
/// too-large bound stays useful instead of silently empty.
fn resolve_page_range(
    page_count: usize,
    start_page: Option<u32>,
    end_page: Option<u32>,
) -> Vec<usize> {
    match (start_page, end_page) {
        (Some(start), Some(end)) => {
            let first = (start as usize).saturating_sub(1);
            let last = (end as usize).min(page_count);
            (first..last).collect()
        }
        _ => (0..page_count).collect(),
    }
}

/// Joins per-page texts in page order with a newline. Whitespace runs
/// collapse to single spaces; pages with no text contribute nothing, not
/// even a blank line.
fn assemble(per_page: &[String]) -> String {
    per_page
        .iter()
        .map(|text| normalize_whitespace(text))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_range_when_unspecified() {
        assert_eq!(resolve_page_range(3, None, None), vec![0, 1, 2]);
    }

    #[test]
    fn test_resolve_explicit_range_is_one_based_inclusive() {
        // Pages 2-4 of a 5 page document are indices 1, 2, 3.
        assert_eq!(resolve_page_range(5, Some(2), Some(4)), vec![1, 2, 3]);
    }

    #[test]
    fn test_resolve_single_page() {
        assert_eq!(resolve_page_range(5, Some(3), Some(3)), vec![2]);
    }

    #[test]
    fn test_resolve_clamps_end_to_page_count() {
        assert_eq!(resolve_page_range(3, Some(2), Some(99)), vec![1, 2]);
    }

    #[test]
    fn test_resolve_range_past_document_is_empty() {
        assert!(resolve_page_range(3, Some(5), Some(7)).is_empty());
    }

    #[test]
    fn test_resolve_zero_page_document() {
        assert!(resolve_page_range(0, None, None).is_empty());
    }

    #[test]
    fn test_assemble_joins_in_page_order() {
        let pages = vec![
            "first  page".to_string(),
            "second\npage".to_string(),
            "third\tpage".to_string(),
        ];
        assert_eq!(assemble(&pages), "first page\nsecond page\nthird page");
    }

    #[test]
    fn test_assemble_skips_empty_pages() {
        let pages = vec![
            "content".to_string(),
            String::new(),
            "   \n ".to_string(),
            "more".to_string(),
        ];
        assert_eq!(assemble(&pages), "content\nmore");
    }

    #[test]
    fn test_assemble_all_empty_yields_empty() {
        let pages = vec![String::new(), String::new()];
        assert_eq!(assemble(&pages), "");
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_whitespace("a  b\t\tc\n\nd"), "a b c d");
        assert_eq!(normalize_whitespace("  padded  "), "padded");
    }
}
