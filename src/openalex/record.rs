// Work records: flattening OpenAlex's nested JSON into one typed row.
//
// The raw record is several levels deep (authorships → author, primary
// location → source, …). Parsing never fails: every lookup that hits a
// missing key, a null, or a non-object on the way down yields `None`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::inverted_index::{decode, InvertedIndex};
use crate::error::Error;

/// One bibliographic item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// OpenAlex id (e.g. `https://openalex.org/W2741809807`)
    pub id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    /// Comma-joined raw author names
    pub authors: Option<String>,
    /// Venue display name
    pub publication: Option<String>,
    pub year: i32,
    pub language: Option<String>,
    pub item_type: Option<String>,
    /// Field-weighted citation impact
    pub fwci: Option<f64>,
    pub cited_by: u64,
    pub keywords: Option<String>,
    pub topics: Option<String>,
    pub concepts: Option<String>,
    /// Reconstructed from the inverted index
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl Work {
    /// Year recorded when the upstream omits `publication_year`.
    pub const UNKNOWN_YEAR: i32 = 0;

    /// Read a text field.
    pub fn field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => self.title.as_deref(),
            TextField::Abstract => self.abstract_text.as_deref(),
            TextField::Authors => self.authors.as_deref(),
            TextField::Publication => self.publication.as_deref(),
            TextField::Keywords => self.keywords.as_deref(),
            TextField::Topics => self.topics.as_deref(),
            TextField::Concepts => self.concepts.as_deref(),
        }
    }

    /// Replace a text field.
    pub fn set_field(&mut self, field: TextField, value: Option<String>) {
        let slot = match field {
            TextField::Title => &mut self.title,
            TextField::Abstract => &mut self.abstract_text,
            TextField::Authors => &mut self.authors,
            TextField::Publication => &mut self.publication,
            TextField::Keywords => &mut self.keywords,
            TextField::Topics => &mut self.topics,
            TextField::Concepts => &mut self.concepts,
        };
        *slot = value;
    }
}

/// The text-valued columns of a `Work` that can be normalized or annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Abstract,
    Authors,
    Publication,
    Keywords,
    Topics,
    Concepts,
}

impl TextField {
    pub const ALL: [TextField; 7] = [
        TextField::Title,
        TextField::Abstract,
        TextField::Authors,
        TextField::Publication,
        TextField::Keywords,
        TextField::Topics,
        TextField::Concepts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Abstract => "abstract",
            TextField::Authors => "authors",
            TextField::Publication => "publication",
            TextField::Keywords => "keywords",
            TextField::Topics => "topics",
            TextField::Concepts => "concepts",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextField::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::Config(format!("unknown text field {s:?}")))
    }
}

/// Walk `path` through nested objects.
///
/// Returns `None` at the first key that is missing, maps to null, or whose
/// parent is not an object.
pub fn nested_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Collapse the upstream spellings of "no value" into `None`.
pub fn present_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if is_missing_spelling(s) => None,
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn is_missing_spelling(s: &str) -> bool {
    matches!(s, "None" | "nan" | "NaN")
}

/// Comma-join the `label` attribute of every element in a list.
///
/// Elements without the label are skipped. An absent or empty list, or one
/// in which no element carries the label, yields `None`.
pub fn join_labels(list: Option<&Value>, label: &str) -> Option<String> {
    let items = list?.as_array()?;
    let labels: Vec<String> = items
        .iter()
        .filter_map(|item| present_str(nested_get(item, &[label])))
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(","))
    }
}

/// Flatten one raw OpenAlex work into a `Work`.
pub fn parse_record(raw: &Value) -> Work {
    let id = present_str(nested_get(raw, &["id"])).unwrap_or_else(|| {
        warn!("Work record without an id");
        String::new()
    });

    let year = nested_get(raw, &["publication_year"])
        .and_then(Value::as_i64)
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or_else(|| {
            debug!(id = %id, "Work record without a publication year");
            Work::UNKNOWN_YEAR
        });

    let abstract_text = nested_get(raw, &["abstract_inverted_index"]).and_then(|value| {
        match InvertedIndex::from_json(value).and_then(|index| decode(&index)) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping undecodable abstract");
                None
            }
        }
    });

    Work {
        doi: present_str(nested_get(raw, &["doi"])),
        title: present_str(nested_get(raw, &["display_name"])),
        authors: join_labels(nested_get(raw, &["authorships"]), "raw_author_name"),
        publication: present_str(nested_get(
            raw,
            &["primary_location", "source", "display_name"],
        )),
        year,
        language: present_str(nested_get(raw, &["language"])),
        item_type: present_str(nested_get(raw, &["type"])),
        fwci: nested_get(raw, &["fwci"]).and_then(Value::as_f64),
        cited_by: nested_get(raw, &["cited_by_count"])
            .and_then(Value::as_u64)
            .unwrap_or(0),
        keywords: join_labels(nested_get(raw, &["keywords"]), "display_name"),
        topics: join_labels(nested_get(raw, &["topics"]), "display_name"),
        concepts: join_labels(nested_get(raw, &["concepts"]), "display_name"),
        abstract_text,
        id,
    }
}

/// Drop repeated ids, keeping the first occurrence.
///
/// Works without an id cannot be compared, so they are all kept.
pub fn dedup_by_id(works: Vec<Work>) -> Vec<Work> {
    let before = works.len();
    let mut seen = HashSet::new();
    let mut without_id = 0usize;
    let unique: Vec<Work> = works
        .into_iter()
        .filter(|w| {
            if w.id.is_empty() {
                without_id += 1;
                return true;
            }
            seen.insert(w.id.clone())
        })
        .collect();

    if without_id > 0 {
        warn!(count = without_id, "Kept works without an id");
    }
    if unique.len() < before {
        warn!(
            dropped = before - unique.len(),
            "Upstream returned duplicate work ids"
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_get_stops_at_non_object() {
        let v = json!({"a": {"b": "leaf"}});
        assert!(nested_get(&v, &["a", "b", "c"]).is_none());
        assert_eq!(nested_get(&v, &["a", "b"]).unwrap(), "leaf");
    }

    #[test]
    fn test_nested_get_null_is_missing() {
        let v = json!({"a": null});
        assert!(nested_get(&v, &["a"]).is_none());
        assert!(nested_get(&v, &["a", "b"]).is_none());
    }

    #[test]
    fn test_present_str_collapses_missing_spellings() {
        assert_eq!(present_str(Some(&json!("None"))), None);
        assert_eq!(present_str(Some(&json!("nan"))), None);
        assert_eq!(present_str(Some(&json!(null))), None);
        assert_eq!(present_str(None), None);
        assert_eq!(present_str(Some(&json!(""))), Some(String::new()));
    }

    #[test]
    fn test_text_field_round_trips_through_str() {
        for field in TextField::ALL {
            assert_eq!(field.as_str().parse::<TextField>().unwrap(), field);
        }
        assert!("venue".parse::<TextField>().is_err());
    }

    #[test]
    fn test_set_field_then_read() {
        let mut work = parse_record(&json!({"id": "W1"}));
        work.set_field(TextField::Abstract, Some("text".into()));
        assert_eq!(work.field(TextField::Abstract), Some("text"));
    }
}
