// Entity frequency statistics.
//
// Explodes each work's entity list for a field and counts occurrences per
// time bucket, or overall. A work whose field had no entities contributes
// nothing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::AnnotatedWork;
use crate::error::Error;
use crate::openalex::record::TextField;

/// Time grouping for frequency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    Year,
    Decade,
}

impl Bucket {
    /// Bucket key for a publication year. Decades floor toward negative
    /// infinity so 1899 lands in 1890.
    pub fn key(self, year: i32) -> i32 {
        match self {
            Bucket::Year => year,
            Bucket::Decade => year.div_euclid(10) * 10,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bucket::Year => "year",
            Bucket::Decade => "decade",
        })
    }
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(Bucket::Year),
            "decade" | "period" => Ok(Bucket::Decade),
            other => Err(Error::Config(format!("unknown bucket {other:?}"))),
        }
    }
}

/// bucket → entity → occurrences
pub type FrequencyTable = BTreeMap<i32, BTreeMap<String, u64>>;

/// Count entity occurrences in `field` per bucket.
pub fn entity_frequencies(works: &[AnnotatedWork], field: TextField, bucket: Bucket) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for annotated in works {
        let entities = annotated.entities_for(field);
        if entities.is_empty() {
            continue;
        }
        let counts = table.entry(bucket.key(annotated.work.year)).or_default();
        for entity in entities {
            *counts.entry(entity.clone()).or_default() += 1;
        }
    }
    table
}

/// The `n` most frequent entities in `field` across all works, highest
/// count first, ties alphabetical.
pub fn top_entities(works: &[AnnotatedWork], field: TextField, n: usize) -> Vec<(String, u64)> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for annotated in works {
        for entity in annotated.entities_for(field) {
            *totals.entry(entity.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = totals
        .into_iter()
        .map(|(entity, count)| (entity.to_string(), count))
        .collect();
    // BTreeMap iteration is alphabetical and sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Keep only the `n` most frequent entities within each bucket.
pub fn top_per_bucket(table: &FrequencyTable, n: usize) -> BTreeMap<i32, Vec<(String, u64)>> {
    table
        .iter()
        .map(|(bucket, counts)| {
            let mut ranked: Vec<(String, u64)> =
                counts.iter().map(|(e, c)| (e.clone(), *c)).collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(n);
            (*bucket, ranked)
        })
        .collect()
}
