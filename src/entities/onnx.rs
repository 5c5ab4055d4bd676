// Local ONNX entity recognizer using a BERT token-classification model.
//
// Runs entirely on the local CPU. The model emits one BIO tag per subword
// token (B-LOC, I-LOC, O, ...); tags are lifted to whole words using the
// tokenizer's word ids and then merged into entity spans.
//
// Texts longer than the model's 512-token limit are split into overlapping
// windows; spans from all windows are merged back by character offset.
//
// Loading is lazy and happens once: the first batch pays for it, every later
// batch reuses the same sessions, and a failed load is remembered. With
// `workers > 1` a pool of sessions is loaded and a batch is split across that
// many blocking tasks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::try_join_all;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::download::{CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE};
use super::traits::{EntityRecognizer, EntitySpan};
use crate::error::{Error, Result};

/// BERT's positional limit. Longer texts are split into windows of this size.
const MAX_TOKENS: usize = 512;

/// Tokens shared by consecutive windows, so an entity cut at one window's
/// edge appears whole in the next.
const WINDOW_STRIDE: usize = 64;

/// ONNX-backed recognizer. Cheap to construct; the model loads on first use.
pub struct OnnxEntityRecognizer {
    model_dir: PathBuf,
    workers: usize,
    /// Load outcome; a failure is kept as its message
    loaded: OnceCell<std::result::Result<Arc<LoadedModel>, String>>,
}

struct LoadedModel {
    // One session per worker. ort::Session::run takes &mut self, so each
    // sits behind its own Mutex.
    sessions: Vec<Mutex<Session>>,
    tokenizer: Tokenizer,
    /// Class index → BIO tag
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

impl OnnxEntityRecognizer {
    /// Point at a model directory containing `onnx/model_quantized.onnx`,
    /// `tokenizer.json` and `config.json`. Nothing is read until the first
    /// batch.
    pub fn new(model_dir: &Path, workers: usize) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            workers: workers.max(1),
            loaded: OnceCell::new(),
        }
    }

    /// Whether the model has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        matches!(self.loaded.get(), Some(Ok(_)))
    }

    /// The loaded model. Loading is attempted once; later calls get the
    /// same model or the same error.
    async fn model(&self) -> Result<Arc<LoadedModel>> {
        let outcome = self
            .loaded
            .get_or_init(|| async {
                let dir = self.model_dir.clone();
                let workers = self.workers;
                let loaded = tokio::task::spawn_blocking(move || load_model(&dir, workers))
                    .await
                    .map_err(|e| Error::Model(format!("model loader panicked: {e}")))
                    .and_then(|r| r);

                match loaded {
                    Ok(model) => Ok(Arc::new(model)),
                    Err(e) => {
                        warn!(error = %e, dir = %self.model_dir.display(), "Entity model failed to load");
                        Err(match e {
                            Error::Model(message) => message,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;

        match outcome {
            Ok(model) => Ok(Arc::clone(model)),
            Err(message) => Err(Error::Model(message.clone())),
        }
    }
}

fn load_model(dir: &Path, workers: usize) -> Result<LoadedModel> {
    let model_path = dir.join(MODEL_FILE);
    let tokenizer_path = dir.join(TOKENIZER_FILE);
    let config_path = dir.join(CONFIG_FILE);

    for path in [&model_path, &tokenizer_path, &config_path] {
        if !path.exists() {
            return Err(Error::Model(format!(
                "{} not found\nRun `biblioscope download-model` to download it.",
                path.display()
            )));
        }
    }

    let config: ModelConfig = serde_json::from_str(
        &std::fs::read_to_string(&config_path)
            .map_err(|e| Error::Model(format!("Failed to read {}: {e}", config_path.display())))?,
    )?;
    let labels = labels_from_config(&config.id2label)?;

    let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| Error::Model(format!("Failed to load tokenizer: {e}")))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_TOKENS,
            stride: WINDOW_STRIDE,
            ..Default::default()
        }))
        .map_err(|e| Error::Model(format!("Failed to configure truncation: {e}")))?;

    let sessions = (0..workers)
        .map(|_| -> Result<Mutex<Session>> {
            let session = Session::builder()
                .map_err(|e| Error::Model(format!("Failed to create ONNX session builder: {e}")))?
                .commit_from_file(&model_path)
                .map_err(|e| {
                    Error::Model(format!(
                        "Failed to load ONNX model from {}: {e}",
                        model_path.display()
                    ))
                })?;
            Ok(Mutex::new(session))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        dir = %dir.display(),
        workers = workers,
        labels = labels.len(),
        "Loaded ONNX entity model"
    );

    Ok(LoadedModel {
        sessions,
        tokenizer,
        labels,
    })
}

/// Turn `{"0": "O", "1": "B-PER", ...}` into an index-ordered list.
fn labels_from_config(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    let mut labels = vec![String::new(); id2label.len()];
    for (id, label) in id2label {
        let idx: usize = id
            .parse()
            .map_err(|_| Error::Model(format!("config.json: bad label id {id:?}")))?;
        let slot = labels
            .get_mut(idx)
            .ok_or_else(|| Error::Model(format!("config.json: label id {idx} out of range")))?;
        *slot = label.clone();
    }
    Ok(labels)
}

#[async_trait]
impl EntityRecognizer for OnnxEntityRecognizer {
    async fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let workers = model.sessions.len();
        run_chunked(texts, workers, move |chunk_idx, chunk| {
            recognize_sync(&model, chunk_idx % model.sessions.len(), &chunk)
        })
        .await
    }
}

/// Split `items` into at most `workers` contiguous chunks, run `f` on each in
/// a blocking task, and concatenate the results.
///
/// `f` gets the chunk index (below `workers`) and the chunk. Chunks are joined
/// in spawn order, so output order matches input order whatever the worker
/// count and whichever chunk finishes first.
pub async fn run_chunked<T, R, F>(items: &[T], workers: usize, f: F) -> Result<Vec<R>>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(usize, Vec<T>) -> Result<Vec<R>> + Send + Sync + 'static,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let workers = workers.clamp(1, items.len());
    let chunk_size = items.len().div_ceil(workers);
    let f = Arc::new(f);

    let tasks = items.chunks(chunk_size).enumerate().map(|(i, chunk)| {
        let f = Arc::clone(&f);
        let chunk = chunk.to_vec();
        async move {
            tokio::task::spawn_blocking(move || (*f)(i, chunk))
                .await
                .map_err(|e| Error::Model(format!("NER worker panicked: {e}")))?
        }
    });

    let per_chunk = try_join_all(tasks).await?;
    Ok(per_chunk.into_iter().flatten().collect())
}

/// Tokenize, run one forward pass, and decode spans for a chunk of texts.
fn recognize_sync(
    model: &LoadedModel,
    session_idx: usize,
    texts: &[String],
) -> Result<Vec<Vec<EntitySpan>>> {
    let encodings = texts
        .iter()
        .map(|t| {
            model
                .tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| Error::Model(format!("Tokenization failed: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    // Every window of every text is one row of the batch, tagged with the
    // text it came from. Overflow windows keep offsets into the full text.
    let windows: Vec<(usize, &Encoding)> = encodings
        .iter()
        .enumerate()
        .flat_map(|(i, enc)| {
            std::iter::once((i, enc)).chain(enc.get_overflowing().iter().map(move |w| (i, w)))
        })
        .collect();

    let batch_size = windows.len();
    let max_len = windows
        .iter()
        .map(|(_, e)| e.get_ids().len())
        .max()
        .unwrap_or(0);

    if max_len == 0 {
        return Ok(vec![Vec::new(); texts.len()]);
    }

    if batch_size > texts.len() {
        debug!(texts = texts.len(), windows = batch_size, "Split long texts into windows");
    }

    // BERT inputs, right-padded with 0 to max_len.
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for (_, enc) in &windows {
        let seq_len = enc.get_ids().len();
        input_ids_flat.extend(enc.get_ids().iter().map(|&id| id as i64));
        attention_mask_flat.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, seq_len));

        let pad_len = max_len - seq_len;
        input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];
    let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
        .map_err(|e| Error::Model(format!("Failed to create input_ids tensor: {e}")))?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat))
        .map_err(|e| Error::Model(format!("Failed to create attention_mask tensor: {e}")))?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
        .map_err(|e| Error::Model(format!("Failed to create token_type_ids tensor: {e}")))?;

    // Output: logits [batch, max_len, num_labels]
    let logits = {
        let mut session = model.sessions[session_idx]
            .lock()
            .map_err(|e| Error::Model(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .map_err(|e| Error::Model(format!("ONNX inference failed: {e}")))?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Model(format!("Failed to extract logits: {e}")))?;

        data.to_vec()
    };

    let num_labels = model.labels.len();
    if num_labels == 0 || logits.len() != batch_size * max_len * num_labels {
        return Err(Error::Model(format!(
            "Unexpected logits size {} for batch {batch_size}x{max_len}x{num_labels}",
            logits.len()
        )));
    }

    let mut per_text: Vec<Vec<EntitySpan>> = vec![Vec::new(); texts.len()];
    for (row, (text_idx, enc)) in windows.iter().enumerate() {
        let tokens: Vec<TaggedToken> = enc
            .get_word_ids()
            .iter()
            .zip(enc.get_offsets())
            .enumerate()
            .map(|(j, (&word_id, &(start, end)))| {
                let offset = (row * max_len + j) * num_labels;
                let class = argmax(&logits[offset..offset + num_labels]);
                TaggedToken {
                    word_id,
                    start,
                    end,
                    tag: model.labels[class].clone(),
                }
            })
            .collect();

        per_text[*text_idx].extend(decode_bio(&texts[*text_idx], &tokens));
    }

    let results: Vec<Vec<EntitySpan>> = per_text.into_iter().map(merge_window_spans).collect();
    debug!(
        spans = results.iter().map(Vec::len).sum::<usize>(),
        "Recognized entities"
    );
    Ok(results)
}

/// Merge spans decoded from the overlapping windows of one text.
///
/// Spans come back in text order. Where two overlap, the longer wins, so a
/// span cut at a window edge gives way to the whole one from the next window
/// and a span seen in both windows is kept once.
pub fn merge_window_spans(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut merged: Vec<EntitySpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => {
                if span.end - span.start > last.end - last.start {
                    *last = span;
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// One subword token with its predicted tag.
#[derive(Debug, Clone)]
pub struct TaggedToken {
    /// Word the token belongs to; `None` for special tokens ([CLS], [SEP])
    pub word_id: Option<u32>,
    /// Byte offsets into the source text
    pub start: usize,
    pub end: usize,
    pub tag: String,
}

/// Merge BIO-tagged tokens into entity spans.
///
/// A word takes the tag of its first subword. `B-X` opens a span, `I-X`
/// extends an open span of the same type (or opens one), `O` closes.
/// Unprefixed tags behave like `I-`.
pub fn decode_bio(text: &str, tokens: &[TaggedToken]) -> Vec<EntitySpan> {
    // Lift subword tags to words.
    let mut words: Vec<(usize, usize, &str)> = Vec::new();
    let mut last_word: Option<u32> = None;
    for token in tokens {
        let Some(word_id) = token.word_id else {
            last_word = None;
            continue;
        };
        if last_word == Some(word_id) {
            if let Some(word) = words.last_mut() {
                word.1 = token.end;
            }
            continue;
        }
        last_word = Some(word_id);
        words.push((token.start, token.end, token.tag.as_str()));
    }

    let mut spans = Vec::new();
    let mut open: Option<(usize, usize, &str)> = None;

    for (start, end, tag) in words {
        let (begins, label) = split_tag(tag);
        match (label, open) {
            (None, _) => {
                flush(text, open.take(), &mut spans);
            }
            (Some(label), Some((open_start, _, open_label))) if !begins && open_label == label => {
                open = Some((open_start, end, open_label));
            }
            (Some(label), _) => {
                flush(text, open.take(), &mut spans);
                open = Some((start, end, label));
            }
        }
    }
    flush(text, open, &mut spans);

    spans
}

/// `"B-LOC"` → `(true, Some("LOC"))`, `"I-LOC"` → `(false, Some("LOC"))`,
/// `"O"` → `(false, None)`.
fn split_tag(tag: &str) -> (bool, Option<&str>) {
    if tag == "O" || tag.is_empty() {
        return (false, None);
    }
    match tag.split_once('-') {
        Some(("B", label)) => (true, Some(label)),
        Some(("I", label)) => (false, Some(label)),
        _ => (false, Some(tag)),
    }
}

fn flush(text: &str, open: Option<(usize, usize, &str)>, spans: &mut Vec<EntitySpan>) {
    let Some((start, end, label)) = open else {
        return;
    };
    if let Some(surface) = text.get(start..end) {
        spans.push(EntitySpan {
            text: surface.to_string(),
            label: canonical_label(label).to_string(),
            start,
            end,
        });
    }
}

/// Map CoNLL-style labels onto the OntoNotes names used in configuration.
fn canonical_label(label: &str) -> &str {
    match label {
        "PER" => "PERSON",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(word_id: Option<u32>, start: usize, end: usize, tag: &str) -> TaggedToken {
        TaggedToken {
            word_id,
            start,
            end,
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_decode_bio_multiword_location() {
        let text = "Slavery in New York City";
        let tokens = vec![
            tok(None, 0, 0, "O"),
            tok(Some(0), 0, 7, "O"),
            tok(Some(1), 8, 10, "O"),
            tok(Some(2), 11, 14, "B-LOC"),
            tok(Some(3), 15, 19, "I-LOC"),
            tok(Some(4), 20, 24, "I-LOC"),
            tok(None, 0, 0, "O"),
        ];
        let spans = decode_bio(text, &tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "New York City");
        assert_eq!(spans[0].label, "LOC");
    }

    #[test]
    fn test_decode_bio_subwords_take_first_tag() {
        let text = "Guadeloupe";
        let tokens = vec![
            tok(Some(0), 0, 4, "B-LOC"),
            tok(Some(0), 4, 7, "I-MISC"),
            tok(Some(0), 7, 10, "O"),
        ];
        let spans = decode_bio(text, &tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Guadeloupe");
    }

    #[test]
    fn test_decode_bio_adjacent_b_tags_split() {
        let text = "Haiti Jamaica";
        let tokens = vec![tok(Some(0), 0, 5, "B-LOC"), tok(Some(1), 6, 13, "B-LOC")];
        let spans = decode_bio(text, &tokens);
        let names: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(names, vec!["Haiti", "Jamaica"]);
    }

    #[test]
    fn test_decode_bio_label_change_splits() {
        let text = "Oxford University Press";
        let tokens = vec![
            tok(Some(0), 0, 6, "B-LOC"),
            tok(Some(1), 7, 17, "I-ORG"),
            tok(Some(2), 18, 23, "I-ORG"),
        ];
        let spans = decode_bio(text, &tokens);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, "LOC");
        assert_eq!(spans[1].text, "University Press");
        assert_eq!(spans[1].label, "ORG");
    }

    #[test]
    fn test_decode_bio_maps_per_to_person() {
        let text = "Toussaint";
        let tokens = vec![tok(Some(0), 0, 9, "B-PER")];
        assert_eq!(decode_bio(text, &tokens)[0].label, "PERSON");
    }

    #[test]
    fn test_decode_bio_all_outside_is_empty() {
        let tokens = vec![tok(Some(0), 0, 3, "O"), tok(Some(1), 4, 7, "O")];
        assert!(decode_bio("foo bar", &tokens).is_empty());
    }

    #[test]
    fn test_labels_from_config_orders_by_id() {
        let map: HashMap<String, String> = [
            ("1".to_string(), "B-LOC".to_string()),
            ("0".to_string(), "O".to_string()),
        ]
        .into();
        assert_eq!(labels_from_config(&map).unwrap(), vec!["O", "B-LOC"]);
    }

    #[test]
    fn test_labels_from_config_rejects_gap() {
        let map: HashMap<String, String> = [("5".to_string(), "O".to_string())].into();
        assert!(labels_from_config(&map).is_err());
    }

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 2.5, -1.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_overlapping_windows_merge_to_whole_spans() {
        let text = "Claims from New York City and Haiti";
        // First window ends inside "New York City"; the second starts at
        // "New" and runs to the end, so both see part of the same entity.
        let first = vec![
            tok(None, 0, 0, "O"),
            tok(Some(0), 0, 6, "O"),
            tok(Some(1), 7, 11, "O"),
            tok(Some(2), 12, 15, "B-LOC"),
            tok(Some(3), 16, 20, "I-LOC"),
            tok(None, 0, 0, "O"),
        ];
        let second = vec![
            tok(None, 0, 0, "O"),
            tok(Some(2), 12, 15, "B-LOC"),
            tok(Some(3), 16, 20, "I-LOC"),
            tok(Some(4), 21, 25, "I-LOC"),
            tok(Some(5), 26, 29, "O"),
            tok(Some(6), 30, 35, "B-LOC"),
            tok(None, 0, 0, "O"),
        ];

        let mut spans = decode_bio(text, &first);
        spans.extend(decode_bio(text, &second));
        assert_eq!(spans.len(), 3);

        let merged = merge_window_spans(spans);
        let names: Vec<&str> = merged.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(names, vec!["New York City", "Haiti"]);
    }

    #[test]
    fn test_merge_keeps_span_seen_in_both_windows_once() {
        let span = |text: &str, start| EntitySpan {
            text: text.to_string(),
            label: "LOC".to_string(),
            start,
            end: start + text.len(),
        };
        let merged = merge_window_spans(vec![
            span("Cuba", 40),
            span("Haiti", 10),
            span("Haiti", 10),
            span("Cuba", 40),
        ]);
        assert_eq!(merged, vec![span("Haiti", 10), span("Cuba", 40)]);
    }

    #[tokio::test]
    async fn test_run_chunked_keeps_input_order_for_any_worker_count() {
        let items: Vec<u32> = (0..10).collect();
        let expected: Vec<u32> = items.iter().map(|x| x * 10).collect();

        for workers in [1, 3, 25] {
            let out: Vec<u32> = run_chunked(&items, workers, move |chunk_idx, chunk: Vec<u32>| {
                assert!(chunk_idx < workers);
                // Earlier chunks finish last.
                std::thread::sleep(std::time::Duration::from_millis(20 / (chunk_idx as u64 + 1)));
                Ok(chunk.into_iter().map(|x| x * 10).collect())
            })
            .await
            .unwrap();
            assert_eq!(out, expected, "workers = {workers}");
        }
    }

    #[tokio::test]
    async fn test_run_chunked_splits_into_at_most_workers_chunks() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let items: Vec<u32> = (0..10).collect();
        let out = run_chunked(&items, 3, move |_, chunk: Vec<u32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(chunk)
        })
        .await
        .unwrap();

        assert_eq!(out, items);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(run_chunked(&Vec::<u32>::new(), 3, |_, c: Vec<u32>| Ok(c))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_run_chunked_propagates_chunk_error() {
        let items: Vec<u32> = (0..6).collect();
        let err = run_chunked(&items, 2, |chunk_idx, chunk: Vec<u32>| {
            if chunk_idx == 1 {
                Err(Error::Model("session failed".into()))
            } else {
                Ok(chunk)
            }
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("session failed"));
    }

    #[tokio::test]
    async fn test_failed_load_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = OnnxEntityRecognizer::new(dir.path(), 1);
        let texts = vec!["Paris".to_string()];
        assert!(recognizer.recognize_batch(&texts).await.is_err());

        // Files appearing later would fail differently if loading ran again.
        std::fs::create_dir_all(dir.path().join("onnx")).unwrap();
        for file in [MODEL_FILE, TOKENIZER_FILE, CONFIG_FILE] {
            std::fs::write(dir.path().join(file), b"not a model").unwrap();
        }

        let err = recognizer.recognize_batch(&texts).await.unwrap_err();
        assert!(err.to_string().contains("download-model"));
        assert!(!recognizer.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_model_files_fail_with_hint() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = OnnxEntityRecognizer::new(dir.path(), 1);
        let err = recognizer
            .recognize_batch(&["Paris".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("download-model"));
        assert!(!recognizer.is_loaded());
    }
}
