// Report pipelines: fetch works, normalize, optionally translate, annotate.
//
// Entity recognition reads the parsed text, not the normalized copy: the NER
// models are case-sensitive and lose most entities on lowercased input.
// Entity strings are cleaned on the way out, so annotations are normalized
// either way. The works handed back carry the normalized fields.

use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::ReportConfig;
use crate::entities::{annotate_works, AnnotatedWork, EntityExtractor};
use crate::error::Result;
use crate::normalize::normalize_works;
use crate::openalex::paginate::{PageSource, PagedFetcher};
use crate::openalex::record::{dedup_by_id, TextField, Work};
use crate::translate::{translate_or_passthrough, Translator};

/// Fetch every work matching the configured query, up to `result_cap`.
pub async fn fetch_works<S: PageSource + ?Sized>(source: &S, config: &ReportConfig) -> Result<Vec<Work>> {
    let query = config.works_query();
    let fetcher = PagedFetcher::new(source)
        .page_size(config.page_size)
        .max_results(config.result_cap);

    let pb = match config.result_cap {
        Some(cap) => {
            let pb = ProgressBar::new(cap as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Fetching [{bar:30}] {pos}/{len} ({eta})")
                    .expect("valid template"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  Fetching {spinner} {pos} works ({elapsed})")
                    .expect("valid template"),
            );
            pb
        }
    };

    let works: Vec<Work> = fetcher
        .works(&query)
        .inspect_ok(|_| pb.inc(1))
        .try_collect()
        .await?;
    pb.finish_and_clear();

    let works = dedup_by_id(works);
    info!(count = works.len(), "Fetched works");
    Ok(works)
}

/// Replace each listed field with its English translation. Failures keep
/// the original text.
pub async fn translate_works(works: &mut [Work], fields: &[TextField], translator: &dyn Translator) {
    let pb = ProgressBar::new((works.len() * fields.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Translating [{bar:30}] {pos}/{len} ({eta})")
            .expect("valid template"),
    );

    for work in works.iter_mut() {
        for &field in fields {
            if let Some(text) = work.field(field).map(str::to_string) {
                let translated = translate_or_passthrough(translator, &text).await;
                work.set_field(field, Some(translated));
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
}

/// The full works pipeline.
///
/// Without an extractor the works come back normalized with empty
/// annotation maps.
pub async fn run_works<S: PageSource + ?Sized>(
    source: &S,
    config: &ReportConfig,
    extractor: Option<&EntityExtractor>,
    translator: Option<&dyn Translator>,
) -> Result<Vec<AnnotatedWork>> {
    let raw = fetch_works(source, config).await?;
    annotate_corpus(raw, config, extractor, translator).await
}

/// Normalize and annotate an already-fetched corpus.
pub async fn annotate_corpus(
    raw: Vec<Work>,
    config: &ReportConfig,
    extractor: Option<&EntityExtractor>,
    translator: Option<&dyn Translator>,
) -> Result<Vec<AnnotatedWork>> {
    let normalized = normalize_works(&raw, &config.normalize_columns, &config.normalize_pipeline);

    let Some(extractor) = extractor else {
        return Ok(normalized.into_iter().map(AnnotatedWork::new).collect());
    };

    let mut ner_input = raw;
    if let Some(translator) = translator {
        translate_works(&mut ner_input, &config.entity_columns, translator).await;
    }

    let mut annotated = annotate_works(ner_input, &config.entity_columns, extractor).await?;
    for (entry, work) in annotated.iter_mut().zip(normalized) {
        entry.work = work;
    }

    info!(
        works = annotated.len(),
        columns = ?config.entity_columns,
        "Annotated works"
    );
    Ok(annotated)
}
