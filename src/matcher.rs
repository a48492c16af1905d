//! Symptom Matcher: map noisy symptom text onto graph vocabulary.
//!
//! Similarity is a weighted blend of normalized Levenshtein scores, in the
//! style of the classic "WRatio" heuristic:
//!
//! - **ratio**: `normalized_levenshtein(a, b) * 100`
//! - **token sort**: ratio of the whitespace tokens sorted and re-joined
//! - **token set**: ratio between the shared tokens and each side's
//!   shared + leftover tokens, so a subset phrase scores high
//! - **partial**: best ratio of the shorter string against every
//!   equal-length window of the longer one (substring awareness)
//!
//! When the two strings have similar lengths (ratio < 1.5) the full-string
//! token scores are used, scaled by 0.95. Otherwise the partial variants are
//! used, scaled by 0.9 (or 0.6 when one side is 8x longer). The best score
//! wins, rounded to an integer in `[0, 100]`. Inputs are lowercased and
//! punctuation becomes whitespace before scoring.
//!
//! Results are deterministic: candidates are ordered by score desc, then by
//! symptom name asc.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Default number of candidates kept per query.
pub const DEFAULT_TOP_K: usize = 3;
/// Default score a candidate must exceed.
pub const DEFAULT_MIN_SCORE: u8 = 80;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;
const PARTIAL_LEN_RATIO: f64 = 1.5;
const LONG_LEN_RATIO: f64 = 8.0;

/// Matcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Maximum number of candidates returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Candidates must score strictly above this, in `[0, 100]`.
    #[serde(default = "default_min_score")]
    pub min_score: u8,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_min_score() -> u8 {
    DEFAULT_MIN_SCORE
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// One vocabulary entry that qualified for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomMatch {
    pub symptom: String,
    pub score: u8,
}

/// Resolves free-text symptoms against a symptom vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SymptomMatcher {
    config: MatchConfig,
}

impl SymptomMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Best vocabulary matches for `text`, best first.
    ///
    /// At most `top_k` entries are returned, each scoring above `min_score`.
    /// An empty result means no entry qualified.
    pub fn find<S: AsRef<str>>(&self, text: &str, vocabulary: &[S]) -> Vec<SymptomMatch> {
        let query = preprocess(text);
        if query.is_empty() || self.config.top_k == 0 {
            return Vec::new();
        }

        let mut matches: Vec<SymptomMatch> = vocabulary
            .iter()
            .map(|entry| entry.as_ref())
            .filter_map(|entry| {
                let score = similarity_processed(&query, &preprocess(entry));
                (score > self.config.min_score).then(|| SymptomMatch {
                    symptom: entry.to_string(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.symptom.cmp(&b.symptom)));
        matches.dedup_by(|a, b| a.symptom == b.symptom);
        matches.truncate(self.config.top_k);

        tracing::debug!(
            text,
            matches = matches.len(),
            best = matches.first().map(|m| m.score),
            "matched symptom text"
        );
        matches
    }
}

/// Similarity of two raw strings in `[0, 100]`.
pub fn similarity(a: &str, b: &str) -> u8 {
    similarity_processed(&preprocess(a), &preprocess(b))
}

fn similarity_processed(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(a, b);
    let (la, lb) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = la.max(lb) / la.min(lb);

    let score = if len_ratio < PARTIAL_LEN_RATIO {
        let tsor = ratio(&sorted_tokens(a), &sorted_tokens(b)) * UNBASE_SCALE;
        let tser = token_set(a, b, ratio) * UNBASE_SCALE;
        base.max(tsor).max(tser)
    } else {
        let scale = if len_ratio < LONG_LEN_RATIO {
            PARTIAL_SCALE
        } else {
            LONG_PARTIAL_SCALE
        };
        let partial = partial_ratio(a, b) * scale;
        let ptsor = partial_ratio(&sorted_tokens(a), &sorted_tokens(b)) * UNBASE_SCALE * scale;
        let ptser = partial_token_set(a, b) * UNBASE_SCALE * scale;
        base.max(partial).max(ptsor).max(ptser)
    };

    score.round().clamp(0.0, 100.0) as u8
}

/// Lowercase, turn non-alphanumerics into spaces, collapse whitespace.
fn preprocess(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long): (Vec<char>, Vec<char>) = if a.chars().count() <= b.chars().count() {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };
    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&needle, &candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Shared tokens vs. each side's shared + leftover tokens.
fn token_set(a: &str, b: &str, score: fn(&str, &str) -> f64) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join(ta.intersection(&tb).copied());
    let only_a = join(ta.difference(&tb).copied());
    let only_b = join(tb.difference(&ta).copied());

    let with_a = format!("{shared} {only_a}").trim().to_string();
    let with_b = format!("{shared} {only_b}").trim().to_string();

    let mut best = score(&with_a, &with_b);
    if !shared.is_empty() {
        best = best.max(score(&shared, &with_a)).max(score(&shared, &with_b));
    }
    best
}

/// Any shared token scores 100, since the shared tokens prefix both sides.
fn partial_token_set(a: &str, b: &str) -> f64 {
    token_set(a, b, partial_ratio)
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}
