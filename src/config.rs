// Report configuration.
//
// One TOML file describes a corpus (search terms, filters, year range) and
// what to do with it (which columns to normalize and annotate, which model,
// retry behaviour). A few deployment-specific values can be overridden from
// the environment, which dotenvy populates from .env at startup.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityModel, StopWordSet, DEFAULT_ENTITY_TYPES};
use crate::normalize::Pipeline;
use crate::openalex::client::{ClientConfig, DEFAULT_API_URL, MAX_PAGE_SIZE};
use crate::openalex::query::{WorksQuery, DEFAULT_GROUP_BY};
use crate::openalex::record::TextField;
use crate::openalex::retry::{RetryPolicy, DEFAULT_RETRY_STATUSES};

/// Everything one report run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Search terms, OR-combined against title and abstract
    pub query: Vec<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub work_types: Vec<String>,
    /// Primary-topic domain ids
    pub domains: Vec<String>,
    pub languages: Vec<String>,
    /// Sent as `mailto` so requests join the polite pool
    pub contact_email: Option<String>,
    pub api_url: String,

    pub normalize_columns: Vec<TextField>,
    pub normalize_pipeline: Pipeline,

    pub entity_columns: Vec<TextField>,
    pub entity_types: Vec<String>,
    pub entity_model: EntityModel,
    pub entity_stop_words: StopWordSet,
    pub model_dir: Option<PathBuf>,
    /// Parallel NER sessions
    pub workers: usize,
    /// Translate annotated columns to English before recognition
    pub translate: bool,
    /// Curated place and case-study phrases counted by `gazetteer`
    pub gazetteer: Vec<String>,

    /// Stop after this many works
    pub result_cap: Option<usize>,
    pub page_size: u32,
    pub group_by: String,

    pub max_retries: u32,
    pub retry_backoff_factor: f64,
    pub retry_http_codes: Vec<u16>,

    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            query: Vec::new(),
            start_year: None,
            end_year: None,
            work_types: Vec::new(),
            domains: Vec::new(),
            languages: Vec::new(),
            contact_email: None,
            api_url: DEFAULT_API_URL.to_string(),
            normalize_columns: vec![TextField::Title, TextField::Abstract],
            normalize_pipeline: Pipeline::default(),
            entity_columns: vec![TextField::Title, TextField::Abstract],
            entity_types: DEFAULT_ENTITY_TYPES.iter().map(|t| t.to_string()).collect(),
            entity_model: EntityModel::default(),
            entity_stop_words: StopWordSet::default(),
            model_dir: None,
            workers: 1,
            translate: false,
            gazetteer: Vec::new(),
            result_cap: None,
            page_size: MAX_PAGE_SIZE,
            group_by: DEFAULT_GROUP_BY.to_string(),
            max_retries: retry.max_retries,
            retry_backoff_factor: retry.backoff_factor,
            retry_http_codes: DEFAULT_RETRY_STATUSES.to_vec(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ReportConfig {
    /// Load from a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without touching the environment or validating.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `OPENALEX_EMAIL`, `OPENALEX_API_URL` and `BIBLIOSCOPE_MODEL_DIR`
    /// from `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = get("OPENALEX_EMAIL") {
            self.contact_email = Some(email);
        }
        if let Some(url) = get("OPENALEX_API_URL") {
            self.api_url = url;
        }
        if let Some(dir) = get("BIBLIOSCOPE_MODEL_DIR") {
            self.model_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                anyhow::bail!("start_year ({start}) is after end_year ({end})");
            }
        }
        if self.end_year.is_some() && self.start_year.is_none() {
            anyhow::bail!("end_year is set but start_year is not");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            anyhow::bail!("page_size must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size);
        }
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        if !self.retry_backoff_factor.is_finite() || self.retry_backoff_factor < 0.0 {
            anyhow::bail!("retry_backoff_factor must be a non-negative number");
        }
        if let Some(code) = self.retry_http_codes.iter().find(|c| !(100..=599).contains(*c)) {
            anyhow::bail!("retry_http_codes contains {code}, which is not an HTTP status");
        }
        if self.group_by.trim().is_empty() {
            anyhow::bail!("group_by must not be empty");
        }
        Ok(())
    }

    /// Inclusive year range. A start without an end runs to the current year.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let start = self.start_year?;
        let end = self.end_year.unwrap_or_else(|| chrono::Utc::now().year());
        Some((start, end))
    }

    /// The ungrouped works query for this report.
    pub fn works_query(&self) -> WorksQuery {
        let query = WorksQuery::new()
            .work_types(self.work_types.iter().cloned())
            .domains(self.domains.iter().cloned())
            .languages(self.languages.iter().cloned())
            .search(self.query.iter().cloned());
        match self.year_range() {
            Some((start, end)) => query.years(start, end),
            None => query,
        }
    }

    /// The same query grouped by `group_by`, for proportion runs.
    pub fn grouped_query(&self) -> WorksQuery {
        self.works_query().group_by(self.group_by.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            contact_email: self.contact_email.clone(),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                backoff_factor: self.retry_backoff_factor,
                retry_statuses: self.retry_http_codes.clone(),
            },
        }
    }

    /// Base directory holding downloaded models.
    pub fn model_base_dir(&self) -> PathBuf {
        self.model_dir
            .clone()
            .unwrap_or_else(crate::entities::download::default_model_dir)
    }

    /// Check that the configured entity model has been downloaded.
    pub fn require_entity_model(&self) -> Result<()> {
        let base = self.model_base_dir();
        if !crate::entities::download::model_files_present(&base, self.entity_model) {
            anyhow::bail!(
                "Entity model '{}' not found in {}\n\
                 Run `biblioscope download-model --model {}` to download it.",
                self.entity_model,
                self.entity_model.dir(&base).display(),
                self.entity_model,
            );
        }
        Ok(())
    }
}
