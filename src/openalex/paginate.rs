// Cursor pagination over `/works`, exposed as lazy streams.
//
// Each call builds a fresh stream with its own cursor; nothing is shared
// between calls. A page is only requested when the consumer pulls past the
// items already delivered, and the stream stops as soon as the upstream
// runs dry or the result cap is reached.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use super::client::{GroupedCount, WorksPage, MAX_PAGE_SIZE};
use super::query::WorksQuery;
use super::record::{dedup_by_id, parse_record, Work};
use crate::error::{Error, Result};

/// Cursor value that starts a cursor-paged listing.
pub const START_CURSOR: &str = "*";

/// Anything that can serve one page of a works query.
///
/// `OpenAlexClient` is the production implementation; tests substitute
/// in-memory sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &WorksQuery, cursor: &str, per_page: u32) -> Result<WorksPage>;
}

/// Paginated fetcher with an optional result cap.
pub struct PagedFetcher<'a, S: PageSource + ?Sized> {
    source: &'a S,
    page_size: u32,
    max_results: Option<usize>,
}

struct CursorState {
    next: Option<String>,
    yielded: usize,
}

impl<'a, S: PageSource + ?Sized> PagedFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            page_size: MAX_PAGE_SIZE,
            max_results: None,
        }
    }

    /// Items per page, clamped to 1..=200.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Stop after this many items in total.
    pub fn max_results(mut self, cap: Option<usize>) -> Self {
        self.max_results = cap;
        self
    }

    /// Stream individual works. The query must not be grouped.
    pub fn works(&self, query: &'a WorksQuery) -> BoxStream<'a, Result<Work>> {
        if query.group_by.is_some() {
            return config_error("works() called on a grouped query; use groups()");
        }
        self.items(query, |page| page.results.iter().map(parse_record).collect())
    }

    /// Stream aggregation rows. The query must carry a grouping attribute.
    pub fn groups(&self, query: &'a WorksQuery) -> BoxStream<'a, Result<GroupedCount>> {
        if query.group_by.is_none() {
            return config_error("groups() called on a query without group_by");
        }
        self.items(query, |page| page.group_by)
    }

    /// Collect every work, dropping duplicate ids.
    pub async fn collect_works(&self, query: &'a WorksQuery) -> Result<Vec<Work>> {
        let works: Vec<Work> = self.works(query).try_collect().await?;
        info!(count = works.len(), "Fetched works");
        Ok(dedup_by_id(works))
    }

    /// Collect every aggregation row.
    pub async fn collect_groups(&self, query: &'a WorksQuery) -> Result<Vec<GroupedCount>> {
        let groups: Vec<GroupedCount> = self.groups(query).try_collect().await?;
        info!(
            count = groups.len(),
            group_by = query.group_by.as_deref().unwrap_or_default(),
            "Fetched grouped counts"
        );
        Ok(groups)
    }

    fn items<T: Send + 'a>(
        &self,
        query: &'a WorksQuery,
        extract: fn(WorksPage) -> Vec<T>,
    ) -> BoxStream<'a, Result<T>> {
        let source = self.source;
        let per_page = self.page_size;
        let cap = self.max_results;

        let initial = CursorState {
            next: Some(START_CURSOR.to_string()),
            yielded: 0,
        };

        stream::try_unfold(initial, move |state| async move {
            let Some(cursor) = state.next else {
                return Ok(None);
            };
            if cap.is_some_and(|cap| state.yielded >= cap) {
                return Ok(None);
            }

            let page = source.fetch_page(query, &cursor, per_page).await?;
            let next = page.meta.next_cursor.clone().filter(|c| !c.is_empty());
            let mut items = extract(page);

            if items.is_empty() {
                return Ok(None);
            }
            if let Some(cap) = cap {
                items.truncate(cap - state.yielded);
            }

            let yielded = state.yielded + items.len();
            debug!(
                page_size = items.len(),
                total = yielded,
                has_next = next.is_some(),
                "Fetched page"
            );

            Ok::<_, Error>(Some((items, CursorState { next, yielded })))
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
    }
}

fn config_error<'a, T: Send + 'a>(message: &str) -> BoxStream<'a, Result<T>> {
    let err = Error::Config(message.to_string());
    stream::once(async move { Err(err) }).boxed()
}
