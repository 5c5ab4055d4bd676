// Biblioscope: bibliographic retrieval and entity analysis over OpenAlex
//
// This is the library root. Each module corresponds to one stage of the
// pipeline, from the HTTP client up to corpus statistics.

pub mod analysis;
pub mod config;
pub mod entities;
pub mod error;
pub mod normalize;
pub mod openalex;
pub mod output;
pub mod pipeline;
pub mod translate;

pub use error::{Error, Result};
