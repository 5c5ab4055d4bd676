// Gazetteer matching: how many works mention each curated phrase.
//
// Complements model-based recognition with a fixed vocabulary of places and
// case studies ("haiti indemnity", "stolen generations"). Text and terms are
// folded the same way before matching:
//
//   lowercase -> transliterate -> punctuation to spaces -> single spaces
//
// and a term only matches on whole words, so "usa" never counts inside
// "thousand". A work counts once per term however often it repeats it.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::normalize::transform::transliterate;
use crate::openalex::record::{TextField, Work};

/// Fold text for matching. Blank input folds to an empty string.
pub fn fold(text: &str) -> String {
    let folded: String = transliterate(&text.to_lowercase())
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count the works whose `field` mentions each term.
///
/// Terms are folded and de-duplicated (the folded form is what comes back).
/// Terms no work mentions are left out. Highest count first, ties
/// alphabetical.
pub fn count_matches(works: &[Work], field: TextField, terms: &[String]) -> Vec<(String, u64)> {
    let mut seen = HashSet::new();
    let patterns: Vec<(String, String)> = terms
        .iter()
        .map(|t| fold(t))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .map(|t| {
            let padded = format!(" {t} ");
            (t, padded)
        })
        .collect();

    if patterns.len() < terms.len() {
        debug!(
            given = terms.len(),
            distinct = patterns.len(),
            "Dropped blank or repeated gazetteer terms"
        );
    }

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut scanned = 0usize;
    for work in works {
        let Some(text) = work.field(field) else {
            continue;
        };
        scanned += 1;
        let padded = format!(" {} ", fold(text));
        for (term, pattern) in &patterns {
            if padded.contains(pattern.as_str()) {
                *counts.entry(term.as_str()).or_default() += 1;
            }
        }
    }

    info!(
        field = %field,
        works = scanned,
        terms = patterns.len(),
        matched = counts.len(),
        "Counted gazetteer matches"
    );

    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(term, count)| (term.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_abstract(id: &str, text: Option<&str>) -> Work {
        Work {
            id: id.to_string(),
            abstract_text: text.map(str::to_string),
            ..Work::default()
        }
    }

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_fold_matches_normalized_text() {
        assert_eq!(fold("  São Paulo,  Brazil! "), "sao paulo brazil");
        assert_eq!(fold("Afro-descendant"), "afro descendant");
        assert_eq!(fold(" -- "), "");
    }

    #[test]
    fn test_counts_works_not_occurrences() {
        let works = vec![
            with_abstract("W1", Some("Haiti, Haiti and the Haiti indemnity")),
            with_abstract("W2", Some("Reparations owed to HAITI.")),
            with_abstract("W3", Some("Jamaica")),
        ];
        let ranked = count_matches(
            &works,
            TextField::Abstract,
            &terms(&["haiti", "haiti indemnity", "jamaica", "cuba"]),
        );
        assert_eq!(
            ranked,
            vec![
                ("haiti".to_string(), 2),
                ("haiti indemnity".to_string(), 1),
                ("jamaica".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_terms_match_whole_words_only() {
        let works = vec![with_abstract("W1", Some("A thousand claims in Mayotte"))];
        let ranked = count_matches(&works, TextField::Abstract, &terms(&["usa", "maya"]));
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_repeated_and_blank_terms_count_once() {
        let works = vec![with_abstract("W1", Some("Jim Crow laws"))];
        let ranked = count_matches(
            &works,
            TextField::Abstract,
            &terms(&["jim crow", "Jim Crow", "  ", "jim-crow"]),
        );
        assert_eq!(ranked, vec![("jim crow".to_string(), 1)]);
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let works = vec![with_abstract("W1", None), with_abstract("W2", Some("Chagos"))];
        let ranked = count_matches(&works, TextField::Abstract, &terms(&["chagos"]));
        assert_eq!(ranked, vec![("chagos".to_string(), 1)]);
        assert!(count_matches(&works, TextField::Title, &terms(&["chagos"])).is_empty());
    }
}
