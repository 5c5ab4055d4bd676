// Abstract coverage: how many works per year came back without an abstract.
//
// OpenAlex drops abstracts for many publishers, and entity counts over the
// abstract field are only comparable across years with similar coverage.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::openalex::record::Work;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub year: i32,
    pub total: u64,
    pub missing: u64,
    /// Percentage of `total` with no abstract, 0 to 100
    pub pct_missing: f64,
}

/// Per-year abstract coverage, ascending by year.
pub fn abstract_coverage(works: &[Work]) -> Vec<CoverageRow> {
    let mut by_year: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for work in works {
        let entry = by_year.entry(work.year).or_default();
        entry.0 += 1;
        if work.abstract_text.as_deref().is_none_or(|a| a.trim().is_empty()) {
            entry.1 += 1;
        }
    }

    by_year
        .into_iter()
        .map(|(year, (total, missing))| CoverageRow {
            year,
            total,
            missing,
            pct_missing: missing as f64 / total as f64 * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(year: i32, abstract_text: Option<&str>) -> Work {
        Work {
            year,
            abstract_text: abstract_text.map(String::from),
            ..Work::default()
        }
    }

    #[test]
    fn test_coverage_per_year() {
        let works = vec![
            work(2001, Some("text")),
            work(2000, None),
            work(2001, None),
            work(2001, Some("  ")),
            work(2000, Some("text")),
        ];
        let rows = abstract_coverage(&works);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2000);
        assert_eq!(rows[0].missing, 1);
        assert!((rows[0].pct_missing - 50.0).abs() < 1e-9);
        assert_eq!(rows[1].total, 3);
        assert_eq!(rows[1].missing, 2);
    }

    #[test]
    fn test_empty_corpus_has_no_rows() {
        assert!(abstract_coverage(&[]).is_empty());
    }
}
