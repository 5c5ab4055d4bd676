// Optional translation to English ahead of entity recognition.

pub mod google;
pub mod rate_limiter;
pub mod traits;

pub use google::GoogleTranslator;
pub use traits::{translate_or_passthrough, Translator};
