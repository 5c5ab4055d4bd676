// Orchestration of fetch, normalization, translation and annotation.

pub mod report;

pub use report::{annotate_corpus, fetch_works, run_works, translate_works};
