use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextmillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Rejections raised before any job is created.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file extension '{extension}' for '{path}'")]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("Invalid page range {start}-{end}: {reason}")]
    InvalidPageRange {
        start: u32,
        end: u32,
        reason: String,
    },

    #[error("Incomplete page range: both start and end pages are required")]
    IncompletePageRange,
}

/// Failures inside a running extraction job. Every variant is contained at
/// the job boundary and surfaces as an `Error` event, never a panic.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Wrong or missing password for '{path}'")]
    Auth { path: PathBuf },

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process document: {0}")]
    Document(String),

    #[error("Failed to read page {page}: {message}")]
    PageRead { page: usize, message: String },

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("OCR failed: {0}")]
    Ocr(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build PDF: {0}")]
    Pdf(String),

    #[error("Failed to build OOXML archive: {0}")]
    Ooxml(String),
}

pub type Result<T> = std::result::Result<T, TextmillError>;
