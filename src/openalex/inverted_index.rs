// Abstract reconstruction from OpenAlex's inverted index.
//
// OpenAlex does not ship abstracts as text. Each work carries an
// `abstract_inverted_index` mapping every distinct word to the positions it
// occupies, and the text has to be rebuilt by laying words back out on a
// position line.

use serde_json::Value;

use crate::error::{Error, Result};

/// Largest position accepted when decoding. Anything beyond this is treated
/// as corrupt data rather than allocated.
pub const MAX_POSITION: i64 = 1_000_000;

/// Word → positions map, in source key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvertedIndex {
    entries: Vec<(String, Vec<i64>)>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word with its positions. Repeated words are kept as separate
    /// entries, so later ones win on colliding positions.
    pub fn push(&mut self, word: impl Into<String>, positions: Vec<i64>) {
        self.entries.push((word.into(), positions));
    }

    /// Build an index from the raw JSON object.
    ///
    /// Fails if the value is not an object or any position is not an integer.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| Error::MalformedIndex {
            word: String::new(),
            detail: "index is not a JSON object".to_string(),
        })?;

        let mut index = Self::new();
        for (word, positions) in map {
            let list = positions.as_array().ok_or_else(|| Error::MalformedIndex {
                word: word.clone(),
                detail: "positions are not a list".to_string(),
            })?;

            let positions = list
                .iter()
                .map(|p| {
                    p.as_i64().ok_or_else(|| Error::MalformedIndex {
                        word: word.clone(),
                        detail: format!("has non-integer position {p}"),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            index.push(word.clone(), positions);
        }
        Ok(index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct entries (words).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of positions across all words.
    pub fn position_count(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.entries.iter().map(|(w, p)| (w.as_str(), p.as_slice()))
    }
}

impl<W: Into<String>> FromIterator<(W, Vec<i64>)> for InvertedIndex {
    fn from_iter<I: IntoIterator<Item = (W, Vec<i64>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(w, p)| (w.into(), p)).collect(),
        }
    }
}

/// Rebuild text from an inverted index.
///
/// The output has exactly `max(position) + 1` space-separated slots; slots no
/// word claims render as empty segments, so gaps show up as runs of spaces.
/// When two words claim the same position the one iterated last wins. That
/// only happens on anomalous upstream data and no tie-break is defined.
pub fn decode(index: &InvertedIndex) -> Result<String> {
    let mut max_position: Option<i64> = None;

    for (word, positions) in index.iter() {
        for &pos in positions {
            if pos < 0 {
                return Err(Error::MalformedIndex {
                    word: word.to_string(),
                    detail: format!("has negative position {pos}"),
                });
            }
            if pos > MAX_POSITION {
                return Err(Error::MalformedIndex {
                    word: word.to_string(),
                    detail: format!("has position {pos} beyond {MAX_POSITION}"),
                });
            }
            max_position = Some(max_position.map_or(pos, |m| m.max(pos)));
        }
    }

    let Some(max_position) = max_position else {
        return Ok(String::new());
    };

    let mut slots: Vec<&str> = vec![""; max_position as usize + 1];
    for (word, positions) in index.iter() {
        for &pos in positions {
            slots[pos as usize] = word;
        }
    }

    Ok(slots.join(" "))
}
