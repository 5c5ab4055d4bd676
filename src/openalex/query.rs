// Query construction for the OpenAlex `/works` endpoint.
//
// OpenAlex takes one comma-separated `filter` parameter; values inside a
// clause are OR-combined with `|`. Empty sets contribute no clause at all,
// otherwise the API would match on an empty value.

use serde::Serialize;

/// Default grouping attribute for proportion runs.
pub const DEFAULT_GROUP_BY: &str = "publication_year";

/// Filters, search terms and optional grouping for one works query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorksQuery {
    pub work_types: Vec<String>,
    /// Primary-topic domain ids (e.g. "2" for Social Sciences)
    pub domains: Vec<String>,
    /// Inclusive publication-year range
    pub year_range: Option<(i32, i32)>,
    pub languages: Vec<String>,
    /// OR-combined terms matched against title and abstract
    pub search_terms: Vec<String>,
    /// Server-side aggregation attribute
    pub group_by: Option<String>,
}

impl WorksQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn work_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.work_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn years(mut self, start: i32, end: i32) -> Self {
        self.year_range = Some((start, end));
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn search<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn group_by(mut self, attribute: impl Into<String>) -> Self {
        self.group_by = Some(attribute.into());
        self
    }

    /// The same query with the free-text clause removed, the baseline
    /// denominator for proportion analysis.
    pub fn without_search(&self) -> Self {
        Self {
            search_terms: Vec::new(),
            ..self.clone()
        }
    }

    /// Render the `filter` parameter, or `None` if no clause applies.
    pub fn filter_param(&self) -> Option<String> {
        let mut clauses = Vec::new();

        if let Some(clause) = or_clause("type", &self.work_types) {
            clauses.push(clause);
        }
        if let Some(clause) = or_clause("primary_topic.domain.id", &self.domains) {
            clauses.push(clause);
        }
        if let Some((start, end)) = self.year_range {
            clauses.push(format!("publication_year:{start}-{end}"));
        }
        if let Some(clause) = or_clause("language", &self.languages) {
            clauses.push(clause);
        }
        if let Some(clause) = or_clause("title_and_abstract.search", &self.search_terms) {
            clauses.push(clause);
        }

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(","))
        }
    }

    /// Full query-string parameters for one page request.
    pub fn page_params(&self, cursor: &str, per_page: u32) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(filter) = self.filter_param() {
            params.push(("filter".to_string(), filter));
        }
        if let Some(ref group) = self.group_by {
            params.push(("group_by".to_string(), group.clone()));
        }
        params.push(("per_page".to_string(), per_page.to_string()));
        params.push(("cursor".to_string(), cursor.to_string()));
        params
    }
}

/// `key:a|b|c`, skipping blank values. Commas would split the filter, so
/// they are stripped from values.
fn or_clause(key: &str, values: &[String]) -> Option<String> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim().replace(',', " "))
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(format!("{key}:{}", values.join("|")))
    }
}
