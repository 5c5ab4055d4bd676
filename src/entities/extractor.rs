// Entity extraction over work fields.
//
// Wraps an EntityRecognizer with the corpus-level rules: blank text never
// reaches the model, only configured entity types are kept, every surface
// string is cleaned, and a failing batch degrades to "no entities" instead of
// aborting a long run.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::clean::EntityCleaner;
use super::traits::{EntityRecognizer, EntitySpan};
use crate::error::Result;
use crate::openalex::record::{TextField, Work};

/// Location-like entity types kept by default.
pub const DEFAULT_ENTITY_TYPES: [&str; 2] = ["GPE", "LOC"];

/// Labels the CoNLL-03 models emit for a requested OntoNotes type. Those
/// models have no GPE class and tag countries and cities as LOC.
const TYPE_ALIASES: [(&str, &str); 1] = [("GPE", "LOC")];

/// Texts sent to the recognizer per call. A model failure only costs the
/// batch it happened in.
const BATCH_SIZE: usize = 64;

/// Extracted entities for one field: `None` when the field was processed but
/// had no text or no surviving entities.
pub type FieldEntities = Option<Vec<String>>;

pub struct EntityExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    types: HashSet<String>,
    cleaner: EntityCleaner,
}

impl EntityExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            types: HashSet::new(),
            cleaner: EntityCleaner::default(),
        }
        .with_types(DEFAULT_ENTITY_TYPES)
    }

    /// Keep only these entity labels (compared case-insensitively). `GPE`
    /// also keeps `LOC`.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = HashSet::new();
        for t in types {
            let t = t.as_ref().trim().to_uppercase();
            if t.is_empty() {
                continue;
            }
            for (requested, emitted) in TYPE_ALIASES {
                if t == requested {
                    kept.insert(emitted.to_string());
                }
            }
            kept.insert(t);
        }
        self.types = kept;
        self
    }

    pub fn with_cleaner(mut self, cleaner: EntityCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Extract entities from a single text.
    pub async fn extract(&self, text: Option<&str>) -> Result<FieldEntities> {
        let mut out = self.extract_batch(&[text]).await?;
        Ok(out.pop().flatten())
    }

    /// Extract entities from many texts. Output order matches input order.
    pub async fn extract_batch(&self, texts: &[Option<&str>]) -> Result<Vec<FieldEntities>> {
        let mut results: Vec<FieldEntities> = vec![None; texts.len()];

        let pending: Vec<(usize, String)> = texts
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                t.map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| (i, t.to_string()))
            })
            .collect();

        debug!(
            total = texts.len(),
            non_blank = pending.len(),
            "Extracting entities"
        );

        for chunk in pending.chunks(BATCH_SIZE) {
            let batch: Vec<String> = chunk.iter().map(|(_, t)| t.clone()).collect();

            let spans = match self.recognizer.recognize_batch(&batch).await {
                Ok(spans) if spans.len() == batch.len() => spans,
                Ok(spans) => {
                    warn!(
                        expected = batch.len(),
                        got = spans.len(),
                        "Recognizer returned a mismatched batch, treating as no entities"
                    );
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, batch = batch.len(), "Entity recognition failed for batch");
                    continue;
                }
            };

            for ((idx, _), spans) in chunk.iter().zip(spans) {
                results[*idx] = self.keep(&spans);
            }
        }

        Ok(results)
    }

    /// Filter by type and clean. Detection order is kept.
    fn keep(&self, spans: &[EntitySpan]) -> FieldEntities {
        let entities: Vec<String> = spans
            .iter()
            .filter(|s| self.types.contains(&s.label.to_uppercase()))
            .filter_map(|s| self.cleaner.clean(&s.text))
            .collect();

        if entities.is_empty() {
            None
        } else {
            Some(entities)
        }
    }
}

/// A work with its per-field entity annotations.
///
/// A field missing from `entities` was not processed; a field mapped to
/// `None` was processed and had no entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedWork {
    pub work: Work,
    pub entities: BTreeMap<TextField, FieldEntities>,
}

impl AnnotatedWork {
    pub fn new(work: Work) -> Self {
        Self {
            work,
            entities: BTreeMap::new(),
        }
    }

    /// Entities for `field`, flattening "not processed" and "none found".
    pub fn entities_for(&self, field: TextField) -> &[String] {
        self.entities
            .get(&field)
            .and_then(|e| e.as_deref())
            .unwrap_or(&[])
    }
}

/// Run extraction over each listed field of every work.
pub async fn annotate_works(
    works: Vec<Work>,
    fields: &[TextField],
    extractor: &EntityExtractor,
) -> Result<Vec<AnnotatedWork>> {
    let mut unique: Vec<TextField> = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(field) {
            unique.push(*field);
        }
    }

    let mut annotated: Vec<AnnotatedWork> = works.into_iter().map(AnnotatedWork::new).collect();

    for field in unique {
        let texts: Vec<Option<&str>> = annotated.iter().map(|a| a.work.field(field)).collect();
        let extracted = extractor.extract_batch(&texts).await?;

        let found = extracted.iter().filter(|e| e.is_some()).count();
        info!(field = %field, works = annotated.len(), with_entities = found, "Annotated field");

        for (work, entities) in annotated.iter_mut().zip(extracted) {
            work.entities.insert(field, entities);
        }
    }

    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::Error;

    /// Tags every capitalized word as LOC and counts calls.
    struct CapitalizedAsLoc {
        calls: AtomicU32,
    }

    #[async_trait]
    impl EntityRecognizer for CapitalizedAsLoc {
        async fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut offset = 0;
                    t.split(' ')
                        .filter_map(|w| {
                            let start = offset;
                            offset += w.len() + 1;
                            w.chars().next().filter(|c| c.is_uppercase()).map(|_| EntitySpan {
                                text: w.to_string(),
                                label: "LOC".to_string(),
                                start,
                                end: start + w.len(),
                            })
                        })
                        .collect()
                })
                .collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl EntityRecognizer for Failing {
        async fn recognize_batch(&self, _texts: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
            Err(Error::Model("boom".into()))
        }
    }

    fn counting() -> Arc<CapitalizedAsLoc> {
        Arc::new(CapitalizedAsLoc {
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test]
    async fn test_blank_text_skips_model() {
        let recognizer = counting();
        let extractor = EntityExtractor::new(recognizer.clone());

        assert_eq!(extractor.extract(Some("")).await.unwrap(), None);
        assert_eq!(extractor.extract(Some("   ")).await.unwrap(), None);
        assert_eq!(extractor.extract(None).await.unwrap(), None);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extract_cleans_entities() {
        let extractor = EntityExtractor::new(counting());
        let got = extractor.extract(Some("slavery in Jamaica's parishes")).await.unwrap();
        assert_eq!(got, Some(vec!["jamaica".to_string()]));
    }

    #[tokio::test]
    async fn test_no_entities_is_none() {
        let extractor = EntityExtractor::new(counting());
        assert_eq!(extractor.extract(Some("all lower case")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_type_filter_drops_other_labels() {
        let extractor = EntityExtractor::new(counting()).with_types(["ORG"]);
        assert_eq!(extractor.extract(Some("Haiti")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_gpe_also_keeps_loc_labels() {
        let extractor = EntityExtractor::new(counting()).with_types(["gpe"]);
        assert_eq!(
            extractor.extract(Some("in Haiti")).await.unwrap(),
            Some(vec!["haiti".to_string()])
        );

        let loc_only = EntityExtractor::new(counting()).with_types(["LOC"]);
        assert!(!loc_only.types.contains("GPE"));
    }

    #[tokio::test]
    async fn test_batch_preserves_positions() {
        let recognizer = counting();
        let extractor = EntityExtractor::new(recognizer.clone());
        let got = extractor
            .extract_batch(&[Some("Haiti"), None, Some(""), Some("in Brazil")])
            .await
            .unwrap();

        assert_eq!(
            got,
            vec![
                Some(vec!["haiti".to_string()]),
                None,
                None,
                Some(vec!["brazil".to_string()]),
            ]
        );
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_none() {
        let extractor = EntityExtractor::new(Arc::new(Failing));
        let got = extractor.extract_batch(&[Some("Haiti"), Some("Cuba")]).await.unwrap();
        assert_eq!(got, vec![None, None]);
    }

    #[tokio::test]
    async fn test_annotate_works_marks_processed_fields() {
        let extractor = EntityExtractor::new(counting());
        let work = Work {
            id: "W1".into(),
            title: Some("Reparations in Haiti".into()),
            ..Work::default()
        };

        let annotated = annotate_works(
            vec![work],
            &[TextField::Title, TextField::Abstract, TextField::Title],
            &extractor,
        )
        .await
        .unwrap();

        let a = &annotated[0];
        assert_eq!(a.entities.len(), 2);
        assert_eq!(a.entities_for(TextField::Title), ["reparations", "haiti"]);
        assert_eq!(a.entities.get(&TextField::Abstract), Some(&None));
        assert!(!a.entities.contains_key(&TextField::Keywords));
    }
}
