pub mod tesseract;

pub use tesseract::TesseractRecognizer;

use crate::config::OcrConfig;
use crate::error::ExtractError;

/// Knobs for one recognition call.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    pub language: String,
    pub dpi: u32,
    pub page_seg_mode: u32,
    pub engine_mode: u32,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::from(&OcrConfig::default())
    }
}

impl From<&OcrConfig> for OcrOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            dpi: config.dpi,
            page_seg_mode: config.page_seg_mode,
            engine_mode: config.engine_mode,
        }
    }
}

/// Turns a page image into text. The pipeline depends on this trait only.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_bytes: &[u8], options: &OcrOptions) -> Result<String, ExtractError>;
}
