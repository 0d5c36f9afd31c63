//! Export writers: `export(text, path)` dispatches on the destination
//! extension.

pub mod ooxml;
pub mod pdf;

use std::path::Path;

use crate::error::ExportError;

pub fn export(text: &str, path: &Path) -> Result<(), ExportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => write_file(path, text),
        "html" => write_file(path, &render_html(text)),
        "rtf" => write_file(path, &render_rtf(text)),
        "csv" => write_file(path, &render_csv(text)),
        "docx" => ooxml::write_docx(text, path),
        "xlsx" => ooxml::write_xlsx(text, path),
        "pdf" => pdf::write_pdf(text, path),
        other => Err(ExportError::UnsupportedFormat(other.to_string())),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    std::fs::write(path, content).map_err(|e| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn render_html(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<html><body><pre>{}</pre></body></html>", escaped)
}

fn render_rtf(text: &str) -> String {
    let mut body = String::new();
    for c in text.chars() {
        match c {
            '\\' => body.push_str("\\\\"),
            '{' => body.push_str("\\{"),
            '}' => body.push_str("\\}"),
            '\n' => body.push_str("\\par "),
            c if c.is_ascii() => body.push(c),
            // Non-ASCII goes out as a signed 16-bit unicode escape.
            c => body.push_str(&format!("\\u{}?", c as u32 as i32 as i16)),
        }
    }
    format!("{{\\rtf1\\ansi\\deff0{{{}}}}}", body)
}

/// One text line per row, single column.
fn render_csv(text: &str) -> String {
    let mut out = String::new();
    for line in text.trim().split('\n') {
        if line.contains(',') || line.contains('"') || line.contains('\r') {
            out.push('"');
            out.push_str(&line.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
