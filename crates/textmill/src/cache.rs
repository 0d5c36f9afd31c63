//! Session-scoped result cache keyed by job fingerprints.
//!
//! A fingerprint binds the content hash of the source file to the four
//! extraction parameters, so a changed file or a different page range can
//! never produce a false hit. The map is unbounded for the process
//! lifetime and not persisted; a long-running service adaptation should
//! bound it (e.g. LRU by byte size).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Cache key for one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Hex SHA-256 of the source file's bytes.
    pub content_hash: String,
    pub use_ocr: bool,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub password: Option<String>,
}

impl Fingerprint {
    /// Hashes the file at `path` and combines it with the extraction
    /// parameters. Fails only on I/O errors reading the file.
    pub fn for_file(
        path: &Path,
        use_ocr: bool,
        start_page: Option<u32>,
        end_page: Option<u32>,
        password: Option<&str>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            content_hash: hash_file(path)?,
            use_ocr,
            start_page,
            end_page,
            password: password.map(|p| p.to_string()),
        })
    }
}

/// Streaming SHA-256 of a file's contents, hex-encoded.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 65536];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Mapping from fingerprint to previously assembled text.
#[derive(Default)]
pub struct ResultCache {
    inner: Mutex<HashMap<Fingerprint, String>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.inner
            .lock()
            .expect("cache mutex poisoned")
            .get(fingerprint)
            .cloned()
    }

    pub fn store(&self, fingerprint: Fingerprint, text: String) {
        self.inner
            .lock()
            .expect("cache mutex poisoned")
            .insert(fingerprint, text);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
