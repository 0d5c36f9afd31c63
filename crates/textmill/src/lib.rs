//! textmill converts PDF documents and images into editable text,
//! optionally via OCR, and exports the result to multiple file formats.
//!
//! The core is a worker-pool task queue driving concurrent, cancellable,
//! progress-reporting extraction jobs: the [`batch::Orchestrator`] accepts
//! a batch of input paths, each job runs the [`pipeline::PagePipeline`]
//! (or a single OCR call for plain images), and outcomes flow back to the
//! consumer through a typed progress channel. A session-scoped
//! [`cache::ResultCache`] short-circuits repeated requests.

pub mod batch;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod ocr;
pub mod pipeline;
pub mod postprocess;
pub mod progress;
pub mod sanitize;
pub mod worker;

pub use batch::{Batch, BatchOptions, JobOutcome, Orchestrator};
pub use cache::{Fingerprint, ResultCache};
pub use cancel::CancelToken;
pub use config::{load_config, Config};
pub use document::{DocumentBackend, LopdfBackend, PageSource};
pub use error::{
    ConfigError, ExportError, ExtractError, Result, TextmillError, ValidationError,
};
pub use export::export;
pub use ocr::{OcrOptions, TesseractRecognizer, TextRecognizer};
pub use pipeline::{ExtractRequest, PagePipeline};
pub use progress::{EventPayload, JobEmitter, JobEvent};
pub use worker::{Job, TaskQueue};

// Re-export crossbeam_channel so consumers can select over batch receivers.
pub use crossbeam_channel;
