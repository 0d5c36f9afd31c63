pub mod runner;

pub use runner::{ExtractRequest, PagePipeline};
