// Unit tests for entity extraction with in-memory recognizers.
//
// The recognizers here stand in for the ONNX model: one counts calls so the
// tests can assert blank text never reaches it, one returns fixed spans.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use biblioscope::entities::onnx::{decode_bio, TaggedToken};
use biblioscope::entities::{
    annotate_works, EntityCleaner, EntityExtractor, EntityModel, EntityRecognizer, EntitySpan,
    StopWordSet,
};
use biblioscope::openalex::record::{TextField, Work};
use biblioscope::{Error, Result};

/// Returns the same spans for every text and counts calls.
struct FixedSpans {
    spans: Vec<EntitySpan>,
    calls: AtomicU32,
}

impl FixedSpans {
    fn new(spans: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            spans: spans
                .iter()
                .map(|(text, label)| EntitySpan {
                    text: text.to_string(),
                    label: label.to_string(),
                    start: 0,
                    end: text.len(),
                })
                .collect(),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl EntityRecognizer for FixedSpans {
    async fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|_| self.spans.clone()).collect())
    }
}

/// Tags each whole text as one LOC span, so outputs can be traced back to
/// their inputs.
struct EchoAsLoc {
    calls: AtomicU32,
}

#[async_trait]
impl EntityRecognizer for EchoAsLoc {
    async fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| {
                vec![EntitySpan {
                    text: t.clone(),
                    label: "LOC".to_string(),
                    start: 0,
                    end: t.len(),
                }]
            })
            .collect())
    }
}

// ============================================================
// extract: blank input
// ============================================================

#[tokio::test]
async fn empty_text_never_reaches_model() {
    let recognizer = FixedSpans::new(&[("Haiti", "GPE")]);
    let extractor = EntityExtractor::new(recognizer.clone());

    assert_eq!(extractor.extract(Some("")).await.unwrap(), None);
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn all_blank_batch_never_reaches_model() {
    let recognizer = FixedSpans::new(&[("Haiti", "GPE")]);
    let extractor = EntityExtractor::new(recognizer.clone());

    let out = extractor.extract_batch(&[None, Some(" \n "), Some("")]).await.unwrap();
    assert_eq!(out, vec![None, None, None]);
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

// ============================================================
// extract: filtering and cleanup
// ============================================================

#[tokio::test]
async fn default_types_keep_places_only() {
    let recognizer = FixedSpans::new(&[
        ("the United States", "GPE"),
        ("Caribbean", "LOC"),
        ("Toussaint Louverture", "PERSON"),
        ("UNESCO", "ORG"),
    ]);
    let extractor = EntityExtractor::new(recognizer);

    let got = extractor.extract(Some("anything")).await.unwrap().unwrap();
    assert_eq!(got, vec!["united states", "caribbean"]);
}

#[tokio::test]
async fn configured_types_and_stop_words_apply() {
    let recognizer = FixedSpans::new(&[("Bank of England", "ORG"), ("Haiti", "GPE")]);
    let extractor = EntityExtractor::new(recognizer)
        .with_types(["org"])
        .with_cleaner(EntityCleaner::new(StopWordSet::English));

    let got = extractor.extract(Some("anything")).await.unwrap().unwrap();
    assert_eq!(got, vec!["bank england"]);
}

#[tokio::test]
async fn entities_cleaning_to_nothing_yield_none() {
    let recognizer = FixedSpans::new(&[("The", "GPE"), ("...", "LOC")]);
    let extractor = EntityExtractor::new(recognizer);
    assert_eq!(extractor.extract(Some("text")).await.unwrap(), None);
}

// ============================================================
// extract_batch: ordering across recognizer batches
// ============================================================

#[tokio::test]
async fn batches_larger_than_one_call_keep_input_order() {
    let recognizer = Arc::new(EchoAsLoc {
        calls: AtomicU32::new(0),
    });
    let extractor = EntityExtractor::new(recognizer.clone());

    let texts: Vec<Option<String>> = (0..150)
        .map(|i| (i % 7 != 0).then(|| format!("Place{i}")))
        .collect();
    let refs: Vec<Option<&str>> = texts.iter().map(|t| t.as_deref()).collect();

    let out = extractor.extract_batch(&refs).await.unwrap();

    assert_eq!(out.len(), 150);
    for (i, entities) in out.iter().enumerate() {
        if i % 7 == 0 {
            assert_eq!(entities, &None, "text {i}");
        } else {
            assert_eq!(entities, &Some(vec![format!("place{i}")]), "text {i}");
        }
    }
    // 128 non-blank texts in recognizer calls of 64
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
}

// ============================================================
// annotate_works
// ============================================================

#[tokio::test]
async fn annotation_distinguishes_unprocessed_from_empty() {
    let recognizer = FixedSpans::new(&[("Jamaica", "GPE")]);
    let extractor = EntityExtractor::new(recognizer.clone());

    let works = vec![
        Work {
            id: "W1".into(),
            title: Some("Sugar and slavery".into()),
            ..Work::default()
        },
        Work {
            id: "W2".into(),
            title: None,
            ..Work::default()
        },
    ];

    let annotated = annotate_works(works, &[TextField::Title], &extractor).await.unwrap();

    assert_eq!(annotated[0].entities_for(TextField::Title), ["jamaica"]);
    assert_eq!(annotated[1].entities.get(&TextField::Title), Some(&None));
    assert!(annotated[0].entities.get(&TextField::Abstract).is_none());
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
}

// ============================================================
// Model selection and BIO decoding
// ============================================================

#[test]
fn unsupported_model_name_is_invalid_model() {
    assert!(matches!(
        "en_core_web_md".parse::<EntityModel>(),
        Err(Error::InvalidModel(_))
    ));
}

#[test]
fn bio_decoding_recovers_place_names_from_subwords() {
    let text = "Port-au-Prince, Haiti";
    let tag = |word_id, start, end, tag: &str| TaggedToken {
        word_id: Some(word_id),
        start,
        end,
        tag: tag.to_string(),
    };
    let tokens = vec![
        tag(0, 0, 4, "B-LOC"),
        tag(1, 4, 5, "I-LOC"),
        tag(2, 5, 7, "I-LOC"),
        tag(3, 7, 8, "I-LOC"),
        tag(4, 8, 14, "I-LOC"),
        tag(5, 14, 15, "O"),
        tag(6, 16, 21, "B-LOC"),
    ];

    let spans = decode_bio(text, &tokens);
    let names: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(names, vec!["Port-au-Prince", "Haiti"]);
}
