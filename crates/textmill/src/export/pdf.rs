//! Plain-text PDF writer: Courier body, US Letter pages.

use std::path::Path;

use lopdf::{dictionary, Document, Object, Stream};

use crate::error::ExportError;

const LINES_PER_PAGE: usize = 60;

pub fn write_pdf(text: &str, path: &Path) -> Result<(), ExportError> {
    let bytes = build_text_pdf(text)?;
    std::fs::write(path, bytes).map_err(|e| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn build_text_pdf(text: &str) -> Result<Vec<u8>, ExportError> {
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

    let lines: Vec<&str> = text.lines().collect();
    let page_count = lines.len().div_ceil(LINES_PER_PAGE).max(1);

    let mut page_ids = Vec::new();
    for page_num in 0..page_count {
        let start = page_num * LINES_PER_PAGE;
        let end = ((page_num + 1) * LINES_PER_PAGE).min(lines.len());
        let page_lines = if start < lines.len() {
            &lines[start..end]
        } else {
            &[]
        };

        let content = format_text_content(page_lines);
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
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    Ok(buffer)
}

fn format_text_content(lines: &[&str]) -> String {
    let mut content = String::new();
    content.push_str("BT\n");
    content.push_str("/F1 10 Tf\n");
    content.push_str("50 742 Td\n");
    content.push_str("12 TL\n");

    for line in lines {
        let escaped = escape_pdf_string(line);
        content.push_str(&format!("({}) Tj T*\n", escaped));
    }

    content.push_str("ET\n");
    content
}

fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() && !c.is_control() => c.to_string(),
            // Type1 Courier is Latin-1 only; substitute a space.
            _ => " ".to_string(),
        })
        .collect()
}
