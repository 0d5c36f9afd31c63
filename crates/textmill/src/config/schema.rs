use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub pages: PagePoolConfig,
}

fn default_worker_count() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            ocr: OcrConfig::default(),
            pages: PagePoolConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract page segmentation mode (0-13).
    #[serde(default = "default_psm")]
    pub page_seg_mode: u32,
    /// Tesseract engine mode (0-3).
    #[serde(default = "default_oem")]
    pub engine_mode: u32,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_dpi() -> u32 {
    200
}

fn default_psm() -> u32 {
    1
}

fn default_oem() -> u32 {
    3
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            dpi: default_dpi(),
            page_seg_mode: default_psm(),
            engine_mode: default_oem(),
        }
    }
}

/// Sizes of the nested per-document page pools. OCR units are CPU-heavy,
/// so the OCR pool is strictly smaller than the text-layer pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePoolConfig {
    #[serde(default = "default_text_workers")]
    pub text_workers: usize,
    #[serde(default = "default_ocr_workers")]
    pub ocr_workers: usize,
}

fn default_text_workers() -> usize {
    4
}

fn default_ocr_workers() -> usize {
    2
}

impl Default for PagePoolConfig {
    fn default() -> Self {
        Self {
            text_workers: default_text_workers(),
            ocr_workers: default_ocr_workers(),
        }
    }
}
