// Transform pipelines and column-wise normalization of works.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::transform::Transform;
use crate::openalex::record::{TextField, Work};

/// Ordered list of transforms, applied left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Default for Pipeline {
    /// trim → lowercase → collapse whitespace → transliterate
    fn default() -> Self {
        Self::new(vec![
            Transform::Trim,
            Transform::Lowercase,
            Transform::CollapseWhitespace,
            Transform::Transliterate,
        ])
    }
}

impl Pipeline {
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Run the pipeline. A missing value is returned unchanged without
    /// touching any transform.
    pub fn apply(&self, text: Option<&str>) -> Option<String> {
        let text = text?;
        Some(
            self.transforms
                .iter()
                .fold(text.to_string(), |acc, t| t.apply(&acc)),
        )
    }
}

/// Normalize `fields` of every work, returning new works.
///
/// Each field is normalized once even if listed twice. A value that ends up
/// blank after normalization becomes missing.
pub fn normalize_works(works: &[Work], fields: &[TextField], pipeline: &Pipeline) -> Vec<Work> {
    let mut unique_fields: Vec<TextField> = Vec::with_capacity(fields.len());
    for &field in fields {
        if !unique_fields.contains(&field) {
            unique_fields.push(field);
        }
    }

    let normalized: Vec<Work> = works
        .iter()
        .map(|work| {
            let mut out = work.clone();
            for &field in &unique_fields {
                let value = pipeline
                    .apply(work.field(field))
                    .filter(|s| !s.trim().is_empty());
                out.set_field(field, value);
            }
            out
        })
        .collect();

    debug!(
        works = normalized.len(),
        fields = ?unique_fields,
        "Normalized text fields"
    );

    normalized
}
