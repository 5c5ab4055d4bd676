// Text normalization: composable string transforms applied to selected
// work fields.

pub mod pipeline;
pub mod transform;

pub use pipeline::{normalize_works, Pipeline};
pub use transform::Transform;
