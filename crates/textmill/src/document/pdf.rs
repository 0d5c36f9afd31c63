use std::path::{Path, PathBuf};
use std::process::Command;

use crate::document::{DocumentBackend, PageSource};
use crate::error::ExtractError;
use crate::sanitize;

/// Default `DocumentBackend`: lopdf for parsing and text-layer extraction,
/// poppler-utils for the cases lopdf cannot cover (rasterization, encrypted
/// documents, PDFs with unparseable cross-reference tables).
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for LopdfBackend {
    fn open(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<Box<dyn PageSource>, ExtractError> {
        let _span =
            tracing::info_span!("document.open", filename = %sanitize::redact_path(path)).entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        match lopdf::Document::load_mem(&pdf_bytes) {
            Ok(doc) if doc.trailer.has(b"Encrypt") => {
                // lopdf parsed the structure but the streams are encrypted.
                // Verify the password via pdfinfo, then read pages through
                // pdftotext/pdftoppm which decrypt on the fly.
                verify_password(path, password)?;
                let page_count = count_pages_with_pdfinfo(path, password)?;
                Ok(Box::new(PdfPages {
                    path: path.to_path_buf(),
                    parsed: None,
                    password: password.map(|p| p.to_string()),
                    page_count,
                }))
            }
            Ok(doc) => {
                let page_count = doc.get_pages().len();
                Ok(Box::new(PdfPages {
                    path: path.to_path_buf(),
                    parsed: Some(doc),
                    password: None,
                    page_count,
                }))
            }
            Err(e) => {
                // e.g. invalid cross-reference table; poppler handles more
                // PDF variants than lopdf does.
                tracing::warn!(
                    "lopdf failed to parse {}: {}. Falling back to poppler.",
                    sanitize::redact_path(path),
                    e
                );
                verify_password(path, password)?;
                let page_count = count_pages_with_pdfinfo(path, password)?;
                Ok(Box::new(PdfPages {
                    path: path.to_path_buf(),
                    parsed: None,
                    password: password.map(|p| p.to_string()),
                    page_count,
                }))
            }
        }
    }
}

/// An opened PDF. `parsed` is `Some` when lopdf handles the document
/// directly; otherwise every page read shells out to poppler.
struct PdfPages {
    path: PathBuf,
    parsed: Option<lopdf::Document>,
    password: Option<String>,
    page_count: usize,
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        match &self.parsed {
            Some(doc) => {
                // lopdf numbers pages from 1.
                doc.extract_text(&[index as u32 + 1])
                    .map_err(|e| ExtractError::PageRead {
                        page: index,
                        message: e.to_string(),
                    })
            }
            None => pdftotext_page(&self.path, index, self.password.as_deref()),
        }
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<Vec<u8>, ExtractError> {
        pdftoppm_page(&self.path, index, dpi, self.password.as_deref())
    }
}

/// Checks an encrypted PDF's password by running pdfinfo against it.
/// A missing password on an encrypted document is an auth failure too.
fn verify_password(path: &Path, password: Option<&str>) -> Result<(), ExtractError> {
    let mut cmd = Command::new("pdfinfo");
    if let Some(pw) = password {
        cmd.args(["-upw", pw]);
    }
    let output = cmd.arg(path).output().map_err(|e| {
        ExtractError::Document(format!(
            "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("Incorrect password") || stderr.contains("Encrypted") {
        return Err(ExtractError::Auth {
            path: path.to_path_buf(),
        });
    }

    Err(ExtractError::Document(format!(
        "pdfinfo failed: {}",
        stderr
    )))
}

/// Page count via pdfinfo (poppler-utils). Used when lopdf can't give one.
fn count_pages_with_pdfinfo(path: &Path, password: Option<&str>) -> Result<usize, ExtractError> {
    let mut cmd = Command::new("pdfinfo");
    if let Some(pw) = password {
        cmd.args(["-upw", pw]);
    }
    let output = cmd.arg(path).output().map_err(|e| {
        ExtractError::Document(format!(
            "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    if !output.status.success() {
        return Err(ExtractError::Document(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(count_str) = line.strip_prefix("Pages:") {
            if let Ok(count) = count_str.trim().parse::<usize>() {
                return Ok(count);
            }
        }
    }

    // pdfinfo printed no page count; treat the document as single-page.
    Ok(1)
}

fn pdftotext_page(
    path: &Path,
    index: usize,
    password: Option<&str>,
) -> Result<String, ExtractError> {
    let page_num = index + 1;
    let mut cmd = Command::new("pdftotext");
    cmd.args(["-f", &page_num.to_string(), "-l", &page_num.to_string()]);
    if let Some(pw) = password {
        cmd.args(["-upw", pw]);
    }
    let output = cmd.arg(path).arg("-").output().map_err(|e| {
        ExtractError::Document(format!(
            "Failed to run pdftotext: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    if !output.status.success() {
        return Err(ExtractError::PageRead {
            page: index,
            message: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Renders one page to PNG with pdftoppm. The output filename carries a
/// page-number suffix whose zero padding varies with the document size, so
/// all plausible spellings are probed.
fn pdftoppm_page(
    path: &Path,
    index: usize,
    dpi: u32,
    password: Option<&str>,
) -> Result<Vec<u8>, ExtractError> {
    let page_num = index + 1;
    let output_prefix = std::env::temp_dir().join(format!("textmill_page_{}", uuid::Uuid::new_v4()));

    let mut cmd = Command::new("pdftoppm");
    cmd.args([
        "-png",
        "-r",
        &dpi.to_string(),
        "-f",
        &page_num.to_string(),
        "-l",
        &page_num.to_string(),
    ]);
    if let Some(pw) = password {
        cmd.args(["-upw", pw]);
    }
    let output = cmd.arg(path).arg(&output_prefix).output().map_err(|e| {
        ExtractError::Render {
            page: index,
            message: format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ),
        }
    })?;

    if !output.status.success() {
        return Err(ExtractError::Render {
            page: index,
            message: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let candidates = [
        format!("{}-{}.png", output_prefix.display(), page_num),
        format!("{}-{:02}.png", output_prefix.display(), page_num),
        format!("{}-{:03}.png", output_prefix.display(), page_num),
    ];
    let image_path = candidates
        .iter()
        .find(|p| Path::new(p).exists())
        .ok_or_else(|| ExtractError::Render {
            page: index,
            message: "Failed to find rendered page image".to_string(),
        })?;

    let image_data = std::fs::read(image_path).map_err(|e| ExtractError::Render {
        page: index,
        message: format!("Failed to read rendered image: {}", e),
    })?;

    let _ = std::fs::remove_file(image_path);

    Ok(image_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Builds a minimal PDF where each page holds one line of text.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.new_object_id();
        let resources_id = doc.new_object_id();

        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
            }),
        );

        doc.objects.insert(
            resources_id,
            Object::Dictionary(dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                },
            }),
        );

        let mut page_ids = Vec::new();
        for page_text in pages {
            let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", page_text);
            let content_id = doc.add_object(Object::Stream(Stream::new(
                dictionary! {},
                content.into_bytes(),
            )));
            let page_id = doc.add_object(Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            }));
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_open_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        std::fs::write(&path, build_pdf(&["one", "two", "three"])).unwrap();

        let backend = LopdfBackend::new();
        let source = backend.open(&path, None).unwrap();
        assert_eq!(source.page_count(), 3);
    }

    #[test]
    fn test_page_text_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.pdf");
        std::fs::write(&path, build_pdf(&["alpha page", "beta page"])).unwrap();

        let backend = LopdfBackend::new();
        let source = backend.open(&path, None).unwrap();

        assert!(source.page_text(0).unwrap().contains("alpha page"));
        assert!(source.page_text(1).unwrap().contains("beta page"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let backend = LopdfBackend::new();
        let result = backend.open(Path::new("/nonexistent/document.pdf"), None);

        match result {
            Err(ExtractError::ReadDocument { path, .. }) => {
                assert_eq!(path.to_str().unwrap(), "/nonexistent/document.pdf");
            }
            _ => panic!("Expected ReadDocument error"),
        }
    }
}
