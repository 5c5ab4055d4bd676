// JSON export of result sets.
//
// Plain dumps with no schema contract: each annotated work becomes one flat
// object with its fields plus a `<field>_ents` key per processed column.
// Files are timestamped so repeated runs never overwrite each other.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::entities::AnnotatedWork;

/// One flat JSON object for an annotated work.
pub fn work_to_json(annotated: &AnnotatedWork) -> Result<Value> {
    let mut object = match serde_json::to_value(&annotated.work)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (field, entities) in &annotated.entities {
        object.insert(format!("{field}_ents"), serde_json::to_value(entities)?);
    }
    Ok(Value::Object(object))
}

/// Write annotated works to `<dir>/<stem>-<timestamp>.json`.
pub fn export_works(works: &[AnnotatedWork], dir: &Path, stem: &str) -> Result<PathBuf> {
    let values = works.iter().map(work_to_json).collect::<Result<Vec<_>>>()?;
    export_json(&values, dir, stem)
}

/// Write any serializable value (rows, tables) to
/// `<dir>/<stem>-<timestamp>.json`.
pub fn export_json<T: Serialize + ?Sized>(value: &T, dir: &Path, stem: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(timestamped_name(stem));
    let json = serde_json::to_string_pretty(value).context("Failed to serialize export")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Exported results");
    Ok(path)
}

fn timestamped_name(stem: &str) -> String {
    format!("{stem}-{}.json", chrono::Local::now().format("%Y%m%dT%H%M%S"))
}
