//! Shared stub collaborators for textmill integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use textmill::error::ExtractError;
use textmill::{DocumentBackend, OcrOptions, PageSource, TextRecognizer};

/// Scripted document shared between a backend and the sources it opens.
/// Counters record collaborator invocations so tests can assert that the
/// cache short-circuits work or that cancellation stopped the fan-out.
pub struct StubDoc {
    pub pages: Vec<String>,
    /// Per-page artificial latency, to force completion orders.
    pub delays_ms: Vec<u64>,
    pub required_password: Option<String>,
    /// Page index whose text read fails, if any.
    pub failing_page: Option<usize>,
    pub opens: AtomicUsize,
    pub page_reads: AtomicUsize,
    pub rasterizes: AtomicUsize,
}

impl StubDoc {
    pub fn with_pages(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            delays_ms: Vec::new(),
            required_password: None,
            failing_page: None,
            opens: AtomicUsize::new(0),
            page_reads: AtomicUsize::new(0),
            rasterizes: AtomicUsize::new(0),
        })
    }

    pub fn with_delays(pages: &[&str], delays_ms: &[u64]) -> Arc<Self> {
        let mut doc = Self::with_pages(pages);
        Arc::get_mut(&mut doc).unwrap().delays_ms = delays_ms.to_vec();
        doc
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn page_reads(&self) -> usize {
        self.page_reads.load(Ordering::SeqCst)
    }

    pub fn rasterizes(&self) -> usize {
        self.rasterizes.load(Ordering::SeqCst)
    }

    fn sleep_for(&self, index: usize) {
        if let Some(ms) = self.delays_ms.get(index) {
            std::thread::sleep(Duration::from_millis(*ms));
        }
    }
}

pub struct StubBackend(pub Arc<StubDoc>);

impl DocumentBackend for StubBackend {
    fn open(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<Box<dyn PageSource>, ExtractError> {
        self.0.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(required) = &self.0.required_password {
            if password != Some(required.as_str()) {
                return Err(ExtractError::Auth {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(Box::new(StubPages(Arc::clone(&self.0))))
    }
}

struct StubPages(Arc<StubDoc>);

impl PageSource for StubPages {
    fn page_count(&self) -> usize {
        self.0.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        self.0.page_reads.fetch_add(1, Ordering::SeqCst);
        self.0.sleep_for(index);
        if self.0.failing_page == Some(index) {
            return Err(ExtractError::PageRead {
                page: index,
                message: "stub page failure".to_string(),
            });
        }
        Ok(self.0.pages[index].clone())
    }

    fn rasterize(&self, index: usize, _dpi: u32) -> Result<Vec<u8>, ExtractError> {
        self.0.rasterizes.fetch_add(1, Ordering::SeqCst);
        self.0.sleep_for(index);
        Ok(self.0.pages[index].clone().into_bytes())
    }
}

/// Recognizer that returns the image bytes as text, so tests can follow
/// data through the OCR path without Tesseract installed.
pub struct EchoRecognizer;

impl TextRecognizer for EchoRecognizer {
    fn recognize(&self, image_bytes: &[u8], _options: &OcrOptions) -> Result<String, ExtractError> {
        Ok(String::from_utf8_lossy(image_bytes).to_string())
    }
}

/// Recognizer that always fails, for error-path tests.
pub struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn recognize(
        &self,
        _image_bytes: &[u8],
        _options: &OcrOptions,
    ) -> Result<String, ExtractError> {
        Err(ExtractError::Ocr("stub recognizer failure".to_string()))
    }
}
