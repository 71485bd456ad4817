//! # Lexical Analysis
//!
//! Pure statistics over a corpus text. Two tokenizations coexist here and are
//! intentionally not unified:
//!
//! - word and sentence averages use a word-boundary regex (`\b\w+\b`) and the
//!   terminators `.`, `!`, `?`;
//! - tracked-term frequencies lowercase the whole text and count exact
//!   whitespace-delimited tokens, so `thou,` or `thou.` do not count as `thou`.
//!
//! Splitting on terminators keeps every fragment, including an empty one after
//! a trailing terminator, so `"Go. Stay?"` has three sentence fragments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::error::{PipelineError, PipelineResult};

const WORD_PATTERN: &str = r"\b\w+\b";
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

static WORD_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Statistics produced by one completed analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    /// Lowercased tracked term to occurrence count
    pub term_frequencies: BTreeMap<String, u64>,
}

/// Intermediate counts, exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub word_count: usize,
    pub total_word_chars: usize,
    pub sentence_count: usize,
    pub total_sentence_tokens: usize,
}

impl TextCounts {
    pub fn avg_word_length(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.total_word_chars as f64 / self.word_count as f64
        }
    }

    pub fn avg_sentence_length(&self) -> f64 {
        if self.sentence_count == 0 {
            0.0
        } else {
            self.total_sentence_tokens as f64 / self.sentence_count as f64
        }
    }
}

fn word_regex() -> PipelineResult<&'static Regex> {
    WORD_REGEX
        .get_or_init(|| Regex::new(WORD_PATTERN))
        .as_ref()
        .map_err(|e| PipelineError::compute(format!("word pattern failed to compile: {e}")))
}

/// Word and sentence counts for a text
pub fn count_text(text: &str) -> PipelineResult<TextCounts> {
    let mut counts = TextCounts::default();

    for word in word_regex()?.find_iter(text) {
        counts.word_count += 1;
        counts.total_word_chars += word.as_str().chars().count();
    }

    for fragment in text.split(SENTENCE_TERMINATORS) {
        counts.sentence_count += 1;
        counts.total_sentence_tokens += fragment.split_whitespace().count();
    }

    Ok(counts)
}

/// Case-insensitive whitespace-token counts for each tracked term
pub fn term_frequencies(text: &str, tracked_terms: &[String]) -> BTreeMap<String, u64> {
    let lowered = text.to_lowercase();
    let mut token_counts: HashMap<&str, u64> = HashMap::new();
    for token in lowered.split_whitespace() {
        *token_counts.entry(token).or_default() += 1;
    }

    tracked_terms
        .iter()
        .map(|term| {
            let key = term.to_lowercase();
            let count = token_counts.get(key.as_str()).copied().unwrap_or(0);
            (key, count)
        })
        .collect()
}

/// Full analysis of a corpus text
pub fn analyze(text: &str, tracked_terms: &[String]) -> PipelineResult<AnalysisResult> {
    let counts = count_text(text)?;
    Ok(AnalysisResult {
        avg_word_length: counts.avg_word_length(),
        avg_sentence_length: counts.avg_sentence_length(),
        term_frequencies: term_frequencies(text, tracked_terms),
    })
}

impl AnalysisResult {
    /// Display-ready rendering stored in the cache.
    ///
    /// Terms follow `order` (first occurrence, case-insensitive); any other
    /// terms in the result are appended alphabetically.
    pub fn to_display_string(&self, order: &[String]) -> String {
        let mut seen: Vec<String> = Vec::with_capacity(self.term_frequencies.len());
        for term in order {
            let key = term.to_lowercase();
            if self.term_frequencies.contains_key(&key) && !seen.contains(&key) {
                seen.push(key);
            }
        }
        for key in self.term_frequencies.keys() {
            if !seen.contains(key) {
                seen.push(key.clone());
            }
        }

        let frequencies = seen
            .iter()
            .map(|key| format!("'{}': {}", key, self.term_frequencies[key]))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Avg Word Length: {:?}, Avg Sentence Length: {:?}, Frequencies: {{{}}}",
            self.avg_word_length, self.avg_sentence_length, frequencies
        )
    }
}
