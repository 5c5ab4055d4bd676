// Baseline-relative proportions.
//
// A search for "reparations" returning 40 works in 2020 says little on its
// own; 40 out of 4,000 matching the same filters without the search term
// does. Each grouping key's filtered count is divided by its baseline count.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::openalex::client::GroupedCount;
use crate::openalex::paginate::{PageSource, PagedFetcher};
use crate::openalex::query::WorksQuery;

/// One grouping key's filtered count against its baseline count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionRow {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_display_name: Option<String>,
    /// Filtered count (0 when the key is absent from the filtered result)
    pub count: u64,
    /// Baseline count
    pub count_total: u64,
    /// `count / count_total`; NaN when the baseline count is zero
    pub proportion: f64,
}

/// Left-join `filtered` onto `baseline` by key.
///
/// Every baseline key appears once, in baseline order. Filtered keys the
/// baseline lacks are dropped. Repeated keys on either side are summed.
pub fn compute_proportions(filtered: &[GroupedCount], baseline: &[GroupedCount]) -> Vec<ProportionRow> {
    let mut filtered_counts: HashMap<&str, u64> = HashMap::with_capacity(filtered.len());
    for group in filtered {
        *filtered_counts.entry(group.key.as_str()).or_default() += group.count;
    }

    let mut rows: Vec<ProportionRow> = Vec::with_capacity(baseline.len());
    let mut row_index: HashMap<&str, usize> = HashMap::with_capacity(baseline.len());

    for group in baseline {
        match row_index.get(group.key.as_str()) {
            Some(&i) => rows[i].count_total += group.count,
            None => {
                row_index.insert(group.key.as_str(), rows.len());
                rows.push(ProportionRow {
                    key: group.key.clone(),
                    key_display_name: group.key_display_name.clone(),
                    count: filtered_counts.get(group.key.as_str()).copied().unwrap_or(0),
                    count_total: group.count,
                    proportion: f64::NAN,
                });
            }
        }
    }

    for row in &mut rows {
        row.proportion = ratio(row.count, row.count_total);
    }

    let orphans = filtered_counts
        .keys()
        .filter(|k| !row_index.contains_key(*k))
        .count();
    if orphans > 0 {
        debug!(orphans, "Filtered keys missing from baseline were dropped");
    }

    rows
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        f64::NAN
    } else {
        count as f64 / total as f64
    }
}

/// Fetch grouped counts for `query` and for its search-free baseline
/// concurrently, then join them.
pub async fn run_proportions<S: PageSource + ?Sized>(
    source: &S,
    query: &WorksQuery,
    page_size: u32,
) -> Result<Vec<ProportionRow>> {
    let baseline_query = query.without_search();
    let fetcher = PagedFetcher::new(source).page_size(page_size);

    let (filtered, baseline) = tokio::try_join!(
        fetcher.collect_groups(query),
        fetcher.collect_groups(&baseline_query),
    )?;

    let rows = compute_proportions(&filtered, &baseline);
    info!(
        keys = rows.len(),
        filtered_total = rows.iter().map(|r| r.count).sum::<u64>(),
        baseline_total = rows.iter().map(|r| r.count_total).sum::<u64>(),
        "Computed proportions"
    );
    Ok(rows)
}
