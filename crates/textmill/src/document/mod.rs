pub mod pdf;

pub use pdf::LopdfBackend;

use std::path::Path;

use crate::error::ExtractError;

/// One opened document, yielding per-page text or rendered page images.
///
/// Page indices are zero-based throughout; the 1-based inclusive ranges
/// users supply are resolved before the pipeline touches a source.
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Extracts the embedded text layer of one page.
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;

    /// Renders one page to PNG bytes at the given resolution. Used only in
    /// OCR mode.
    fn rasterize(&self, index: usize, dpi: u32) -> Result<Vec<u8>, ExtractError>;
}

/// Opens documents. The pipeline depends on this trait only, never on a
/// concrete backend.
pub trait DocumentBackend: Send + Sync {
    /// Opens and authenticates a document.
    ///
    /// Returns `ExtractError::Auth` when the document is encrypted and the
    /// password is missing or wrong.
    fn open(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<Box<dyn PageSource>, ExtractError>;
}
