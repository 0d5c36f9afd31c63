use std::path::{Path, PathBuf};

/// One user-requested conversion, as tracked by the orchestrator.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub source_path: PathBuf,
    /// MIME type of the source file (e.g., "application/pdf", "image/png").
    pub mime_type: Option<String>,
}

impl Job {
    pub fn new(source_path: PathBuf) -> Self {
        let mime_type = Self::detect_mime_type(&source_path);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            mime_type,
        }
    }

    /// The filename shown to the consumer in progress events.
    pub fn filename(&self) -> String {
        crate::sanitize::redact_path(&self.source_path)
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.as_deref() == Some("application/pdf")
    }

    /// Detects MIME type from file path using the mime_guess crate.
    /// Returns `None` for unknown extensions.
    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_new() {
        let job = Job::new(PathBuf::from("/test/document.pdf"));
        assert!(!job.id.is_empty());
        assert_eq!(job.source_path, PathBuf::from("/test/document.pdf"));
        assert_eq!(job.mime_type, Some("application/pdf".to_string()));
        assert!(job.is_pdf());
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = Job::new(PathBuf::from("/test/a.pdf"));
        let b = Job::new(PathBuf::from("/test/a.pdf"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_mime_type_detection() {
        let job = Job::new(PathBuf::from("scan.png"));
        assert_eq!(job.mime_type, Some("image/png".to_string()));
        assert!(!job.is_pdf());

        let job = Job::new(PathBuf::from("photo.jpg"));
        assert_eq!(job.mime_type, Some("image/jpeg".to_string()));

        let job = Job::new(PathBuf::from("file.xyz123"));
        assert!(job.mime_type.is_none());
    }

    #[test]
    fn test_filename_strips_directory() {
        let job = Job::new(PathBuf::from("/home/user/secret/scan.pdf"));
        assert_eq!(job.filename(), "scan.pdf");
    }
}
