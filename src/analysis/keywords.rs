// TF-IDF keyword ranking over a text field.
//
// Each work is one document, so terms common to the whole corpus sink and
// terms concentrated in a subset of works rise.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};
use tracing::info;

/// Academic boilerplate that tops every ranking otherwise.
pub const DOMAIN_STOP_WORDS: [&str; 6] = [
    "study",
    "research",
    "paper",
    "article",
    "analysis",
    "discussion",
];

/// Rank the top `n` terms across `texts`.
pub fn rank_keywords(texts: &[String], n: usize) -> Vec<(String, f32)> {
    rank_keywords_excluding(texts, n, &[])
}

/// Rank the top `n` terms, also ignoring `extra_stop_words` (for instance
/// the search terms themselves, which would otherwise dominate).
pub fn rank_keywords_excluding(texts: &[String], n: usize, extra_stop_words: &[String]) -> Vec<(String, f32)> {
    let documents: Vec<String> = texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    if documents.is_empty() || n == 0 {
        return Vec::new();
    }

    let mut stop_words: Vec<String> = get(LANGUAGE::English);
    stop_words.extend(DOMAIN_STOP_WORDS.iter().map(|w| w.to_string()));
    stop_words.extend(extra_stop_words.iter().map(|w| w.to_lowercase()));

    let params = TfIdfParams::UnprocessedDocuments(&documents, &stop_words, None);
    let tfidf = TfIdf::new(params);
    let ranked: Vec<(String, f32)> = tfidf.get_ranked_word_scores(n);

    if let Some((top, score)) = ranked.first() {
        info!(
            documents = documents.len(),
            keywords = ranked.len(),
            top_keyword = %top,
            top_score = score,
            "Ranked TF-IDF keywords"
        );
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "This study examines compensation claims for plantation labor".to_string(),
            "Research on plantation economies and colonial compensation".to_string(),
            "A paper about maritime insurance records".to_string(),
            "".to_string(),
        ]
    }

    #[test]
    fn test_ranks_content_words() {
        let ranked = rank_keywords(&corpus(), 10);
        assert!(!ranked.is_empty());
        let words: Vec<&str> = ranked.iter().map(|(w, _)| w.as_str()).collect();
        assert!(words.contains(&"plantation") || words.contains(&"compensation"));
    }

    #[test]
    fn test_domain_and_extra_stop_words_excluded() {
        let ranked = rank_keywords_excluding(&corpus(), 50, &["Plantation".to_string()]);
        for (word, _) in &ranked {
            assert!(!DOMAIN_STOP_WORDS.contains(&word.as_str()), "{word} should be excluded");
            assert_ne!(word, "plantation");
        }
    }

    #[test]
    fn test_empty_input_ranks_nothing() {
        assert!(rank_keywords(&[], 5).is_empty());
        assert!(rank_keywords(&["   ".to_string()], 5).is_empty());
    }
}
