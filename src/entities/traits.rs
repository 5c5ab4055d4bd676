// Entity recognizer trait: the seam between extraction and the model.
//
// The extractor only needs labelled spans back from a batch of texts. The
// default implementation runs a local ONNX token-classification model; tests
// use in-memory recognizers.

use async_trait::async_trait;

use crate::error::Result;

/// One recognized entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    /// Surface text as it appears in the input
    pub text: String,
    /// Entity type label (e.g. "GPE", "LOC", "ORG", "PERSON")
    pub label: String,
    /// Byte offsets into the input
    pub start: usize,
    pub end: usize,
}

/// Trait for named-entity recognition.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entities in each text. The output has one entry per input,
    /// in input order.
    async fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<EntitySpan>>>;
}
