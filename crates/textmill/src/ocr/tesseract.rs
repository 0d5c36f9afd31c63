use std::io::Cursor;

use crate::error::ExtractError;
use crate::ocr::{OcrOptions, TextRecognizer};

/// Default `TextRecognizer` backed by Tesseract via leptess.
///
/// Images are converted to grayscale before recognition; Tesseract handles
/// thresholding itself and grayscale input avoids color noise.
pub struct TesseractRecognizer;

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image_bytes: &[u8], options: &OcrOptions) -> Result<String, ExtractError> {
        let _span = tracing::info_span!("ocr.recognize", lang = %options.language).entered();

        let img = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractError::Ocr(format!("Failed to load image: {}", e)))?;

        let gray = img.grayscale();
        let mut png_data = Vec::new();
        let mut cursor = Cursor::new(&mut png_data);
        gray.write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| ExtractError::Ocr(format!("Failed to convert image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &options.language)
            .map_err(|e| ExtractError::Ocr(format!("Failed to initialize Tesseract: {}", e)))?;

        lt.set_variable(
            leptess::Variable::TesseditPagesegMode,
            &options.page_seg_mode.to_string(),
        )
        .map_err(|e| ExtractError::Ocr(format!("Failed to set page segmentation mode: {}", e)))?;
        lt.set_variable(
            leptess::Variable::TesseditOcrEngineMode,
            &options.engine_mode.to_string(),
        )
        .map_err(|e| ExtractError::Ocr(format!("Failed to set engine mode: {}", e)))?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| ExtractError::Ocr(format!("Failed to set image for OCR: {}", e)))?;
        lt.set_source_resolution(options.dpi as i32);

        lt.get_utf8_text()
            .map_err(|e| ExtractError::Ocr(format!("OCR failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_data_error() {
        let recognizer = TesseractRecognizer::new();
        let result = recognizer.recognize(b"not valid image data", &OcrOptions::default());

        assert!(result.is_err());
        match result {
            Err(ExtractError::Ocr(msg)) => {
                assert!(msg.contains("Failed to load image"));
            }
            _ => panic!("Expected Ocr error for invalid image data"),
        }
    }

    #[test]
    fn test_empty_image_data_error() {
        let recognizer = TesseractRecognizer::new();
        let result = recognizer.recognize(&[], &OcrOptions::default());

        assert!(result.is_err());
        match result {
            Err(ExtractError::Ocr(msg)) => {
                assert!(msg.contains("Failed to load image"));
            }
            _ => panic!("Expected Ocr error for empty image data"),
        }
    }
}
