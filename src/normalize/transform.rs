// Individual string transforms. Each one is total over &str.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One pure string transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Strip leading and trailing whitespace
    Trim,
    Lowercase,
    /// Replace every whitespace run with one space and trim the ends
    CollapseWhitespace,
    /// Fold to plain ASCII-range letters where a canonical base exists
    Transliterate,
}

impl Transform {
    pub fn apply(self, s: &str) -> String {
        match self {
            Transform::Trim => s.trim().to_string(),
            Transform::Lowercase => s.to_lowercase(),
            Transform::CollapseWhitespace => s.split_whitespace().collect::<Vec<_>>().join(" "),
            Transform::Transliterate => transliterate(s),
        }
    }
}

/// Decompose (NFKD), drop combining marks, and fold the handful of Latin
/// letters that have no decomposition.
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'đ' | 'ð' => out.push('d'),
            'Đ' | 'Ð' => out.push('D'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'þ' => out.push_str("th"),
            'Þ' => out.push_str("TH"),
            'ı' => out.push('i'),
            '‘' | '’' | '‚' | '′' => out.push('\''),
            '“' | '”' | '„' | '″' => out.push('"'),
            '–' | '—' | '‐' | '‑' => out.push('-'),
            _ => out.push(c),
        }
    }
    out
}
