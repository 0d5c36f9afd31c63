//! Minimal OOXML writers: a one-part DOCX and a one-sheet XLSX, each a zip
//! archive of hand-assembled XML parts.

use std::io::Write;
use std::path::Path;

use quick_xml::escape::escape;

use crate::error::ExportError;

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const XLSX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const XLSX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const XLSX_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const XLSX_WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

pub fn write_docx(text: &str, path: &Path) -> Result<(), ExportError> {
    let parts = [
        ("[Content_Types].xml", DOCX_CONTENT_TYPES.to_string()),
        ("_rels/.rels", DOCX_RELS.to_string()),
        ("word/document.xml", render_document_xml(text)),
    ];
    write_archive(path, &parts)
}

pub fn write_xlsx(text: &str, path: &Path) -> Result<(), ExportError> {
    let parts = [
        ("[Content_Types].xml", XLSX_CONTENT_TYPES.to_string()),
        ("_rels/.rels", XLSX_RELS.to_string()),
        ("xl/workbook.xml", XLSX_WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", XLSX_WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", render_sheet_xml(text)),
    ];
    write_archive(path, &parts)
}

fn write_archive(path: &Path, parts: &[(&str, String)]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|e| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in parts {
        writer
            .start_file(*name, options)
            .map_err(|e| ExportError::Ooxml(format!("Failed to start part '{}': {}", name, e)))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| ExportError::Ooxml(format!("Failed to write part '{}': {}", name, e)))?;
    }

    writer
        .finish()
        .map_err(|e| ExportError::Ooxml(format!("Failed to finish archive: {}", e)))?;

    Ok(())
}

/// One paragraph per text line.
fn render_document_xml(text: &str) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    for line in text.split('\n') {
        xml.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
        xml.push_str(&escape(line));
        xml.push_str("</w:t></w:r></w:p>");
    }

    xml.push_str("</w:body></w:document>");
    xml
}

/// One row per text line, single column of inline strings.
fn render_sheet_xml(text: &str) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (row, line) in text.trim().split('\n').enumerate() {
        let row = row + 1;
        xml.push_str(&format!(
            r#"<row r="{row}"><c r="A{row}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c></row>"#,
            escape(line)
        ));
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}
