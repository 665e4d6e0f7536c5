//! Word-frequency aggregation over stored documents.
//!
//! Each document contributes a cumulative relative frequency of 1.0, so a
//! long document does not drown out short ones. Tokens are casefolded,
//! stripped of punctuation and digits, and filtered against an optional
//! stopword list (one word per line, `#` starts a comment line).

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::FrequencyConfig;
use crate::store::IngestionStore;

/// Characters removed from the text before tokenization, in addition to
/// ASCII punctuation and digits.
const STRIP_EXTRA: &[char] = &['„', '“', '”', '–', '—', '‚', '‘', '’', '»', '«'];

pub async fn collect_frequencies(
    store: &IngestionStore,
    cfg: &FrequencyConfig,
) -> Result<HashMap<String, f64>> {
    let stopwords = match &cfg.stopwords {
        Some(path) => load_stopwords(path)?,
        None => HashSet::new(),
    };

    let mut freqs: HashMap<String, f64> = HashMap::new();
    for content in store.all_content().await? {
        accumulate_document(&content, &stopwords, cfg.min_word_len, &mut freqs);
    }
    Ok(freqs)
}

/// Frequency table sorted by descending frequency, ties by word.
pub fn ranked(freqs: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut rows: Vec<(String, f64)> = freqs
        .iter()
        .map(|(word, freq)| (word.clone(), *freq))
        .collect();
    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    rows
}

fn accumulate_document(
    content: &str,
    stopwords: &HashSet<String>,
    min_word_len: usize,
    freqs: &mut HashMap<String, f64>,
) {
    let words = tokenize(content, stopwords, min_word_len);
    if words.is_empty() {
        return;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }

    // Normalize so this document contributes a cumulative 1.0.
    let total = words.len() as f64;
    for (word, count) in counts {
        *freqs.entry(word.to_string()).or_insert(0.0) += count as f64 / total;
    }
}

fn tokenize(content: &str, stopwords: &HashSet<String>, min_word_len: usize) -> Vec<String> {
    let cleaned: String = content
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .filter(|c| !c.is_ascii_punctuation() && !c.is_ascii_digit() && !STRIP_EXTRA.contains(c))
        .collect();

    cleaned
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= min_word_len && !stopwords.contains(w))
        .collect()
}

fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading stopword file {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_punctuation_digits_and_short_words() {
        let words = tokenize("Der Hund, der 3 Bälle hat! A", &HashSet::new(), 2);
        assert_eq!(words, vec!["der", "hund", "der", "bälle", "hat"]);
    }

    #[test]
    fn stopwords_are_excluded_casefolded() {
        let stopwords: HashSet<String> = ["der", "hat"].iter().map(|s| s.to_string()).collect();
        let words = tokenize("Der Hund hat Durst", &stopwords, 2);
        assert_eq!(words, vec!["hund", "durst"]);
    }

    #[test]
    fn each_document_contributes_one() {
        let mut freqs = HashMap::new();
        accumulate_document("aa bb aa cc", &HashSet::new(), 2, &mut freqs);
        let sum: f64 = freqs.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
        assert!((freqs["aa"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn frequencies_accumulate_across_documents() {
        let mut freqs = HashMap::new();
        accumulate_document("aa bb", &HashSet::new(), 2, &mut freqs);
        accumulate_document("aa aa", &HashSet::new(), 2, &mut freqs);
        assert!((freqs["aa"] - 1.5).abs() < 1e-9);
        assert!((freqs["bb"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ranked_sorts_by_frequency_then_word() {
        let mut freqs = HashMap::new();
        freqs.insert("b".to_string(), 0.5);
        freqs.insert("a".to_string(), 0.5);
        freqs.insert("c".to_string(), 1.0);
        let rows = ranked(&freqs);
        assert_eq!(rows[0].0, "c");
        assert_eq!(rows[1].0, "a");
        assert_eq!(rows[2].0, "b");
    }

    #[test]
    fn stopword_file_ignores_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "# kommentar\nder\n\nDie\n").unwrap();
        let stopwords = load_stopwords(&path).unwrap();
        assert!(stopwords.contains("der"));
        assert!(stopwords.contains("die"));
        assert_eq!(stopwords.len(), 2);
    }
}
