// OpenAlex retrieval: query building, paginated fetching with retry, and
// flattening raw records into `Work`s.

pub mod client;
pub mod inverted_index;
pub mod paginate;
pub mod query;
pub mod record;
pub mod retry;
