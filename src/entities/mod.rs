// Named-entity extraction: local ONNX recognition, type filtering and
// cleanup of entity strings.

pub mod clean;
pub mod download;
pub mod extractor;
pub mod model;
pub mod onnx;
pub mod traits;

pub use clean::{EntityCleaner, StopWordSet};
pub use extractor::{annotate_works, AnnotatedWork, EntityExtractor, DEFAULT_ENTITY_TYPES};
pub use model::EntityModel;
pub use onnx::OnnxEntityRecognizer;
pub use traits::{EntityRecognizer, EntitySpan};
