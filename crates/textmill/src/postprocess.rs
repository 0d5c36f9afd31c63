//! Text post-processing registry.
//!
//! Transforms are registered explicitly at startup and applied in
//! registration order. A failing transform is logged and skipped; the
//! chain continues with the text it had before that transform.

use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransformError(pub String);

pub trait TextTransform: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, text: &str) -> Result<String, TransformError>;
}

#[derive(Default)]
pub struct TransformRegistry {
    transforms: Vec<Box<dyn TextTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, transform: Box<dyn TextTransform>) {
        self.transforms.push(transform);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn apply_all(&self, text: &str) -> String {
        let mut current = text.to_string();
        for transform in &self.transforms {
            match transform.process(&current) {
                Ok(processed) => current = processed,
                Err(e) => {
                    error!("Transform '{}' failed: {}", transform.name(), e);
                }
            }
        }
        current
    }
}
