// Corpus statistics: baseline-relative proportions, entity frequencies,
// gazetteer counts, abstract coverage and keyword ranking.

pub mod coverage;
pub mod frequency;
pub mod gazetteer;
pub mod keywords;
pub mod proportion;

pub use coverage::{abstract_coverage, CoverageRow};
pub use frequency::{entity_frequencies, top_entities, Bucket};
pub use gazetteer::count_matches;
pub use keywords::rank_keywords;
pub use proportion::{compute_proportions, run_proportions, ProportionRow};
