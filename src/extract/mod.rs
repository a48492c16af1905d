//! Text-to-symptoms collaborators.
//!
//! The inference core only needs `extract(text) -> symptoms`. Extraction
//! failures are the caller's to absorb: the session logs them and treats the
//! text as having produced no new symptoms.
//!
//! - [`ListExtractor`]: offline, reads the text as a symptom list
//! - [`OllamaExtractor`]: asks an Ollama-compatible LLM endpoint
//! - [`StaticExtractor`]: fixed output, for tests and demos

pub mod ollama;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::normalize::canonical_nonempty;

pub use ollama::OllamaExtractor;

/// Result type for extraction.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// `Symptoms:` label at the start of a line.
static RE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*symptoms\s*:").unwrap());

/// List item separators.
static RE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;\n]").unwrap());

/// Leading bullet or enumeration marker.
static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").unwrap());

/// Turns free text into symptom strings.
pub trait SymptomExtractor {
    /// Short backend name, for logs.
    fn name(&self) -> &str;

    /// Extract symptom strings from free text.
    fn extract(&self, text: &str) -> ExtractResult<Vec<String>>;
}

/// Parse a symptom list out of free text or a model reply.
///
/// If a line starts with `Symptoms:`, everything before it is dropped along
/// with the label. The rest is split on commas, semicolons and newlines;
/// bullet markers and trailing periods are stripped; items are
/// canonicalized and deduplicated in first-seen order.
pub fn parse_symptom_list(text: &str) -> Vec<String> {
    let body = match RE_LABEL.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };

    let mut out: Vec<String> = Vec::new();
    for item in RE_SPLIT.split(body) {
        let item = RE_BULLET.replace(item, "");
        let item = item.trim().trim_end_matches('.');
        if let Some(symptom) = canonical_nonempty(item) {
            if !out.contains(&symptom) {
                out.push(symptom);
            }
        }
    }
    out
}

/// Offline extractor: the text itself is the symptom list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListExtractor;

impl SymptomExtractor for ListExtractor {
    fn name(&self) -> &str {
        "list"
    }

    fn extract(&self, text: &str) -> ExtractResult<Vec<String>> {
        Ok(parse_symptom_list(text))
    }
}

/// Returns the same symptoms for any text.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    symptoms: Vec<String>,
}

impl StaticExtractor {
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
        }
    }
}

impl SymptomExtractor for StaticExtractor {
    fn name(&self) -> &str {
        "static"
    }

    fn extract(&self, _text: &str) -> ExtractResult<Vec<String>> {
        Ok(self.symptoms.clone())
    }
}

/// Which extractor to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    #[default]
    List,
    Ollama,
}

/// Extractor settings. Secrets are referenced by environment variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub backend: ExtractorBackend,
    /// Base URL of the Ollama-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding a bearer token, if the endpoint needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::default(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            api_key_env: None,
        }
    }
}

/// Construct the configured extractor.
pub fn build_extractor(config: &ExtractorConfig) -> ExtractResult<Box<dyn SymptomExtractor>> {
    match config.backend {
        ExtractorBackend::List => Ok(Box::new(ListExtractor)),
        ExtractorBackend::Ollama => Ok(Box::new(OllamaExtractor::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_comma_list() {
        assert_eq!(
            parse_symptom_list("Fever, Dry Cough ,headache"),
            vec!["fever", "dry cough", "headache"]
        );
    }

    #[test]
    fn label_and_preamble_are_dropped() {
        let reply = "Sure, here you go.\nSymptoms: fever, sore throat.";
        assert_eq!(parse_symptom_list(reply), vec!["fever", "sore throat"]);
    }

    #[test]
    fn bullets_and_newlines() {
        let reply = "SYMPTOMS:\n- Fever\n- Chills\n2) night sweats\n";
        assert_eq!(parse_symptom_list(reply), vec!["fever", "chills", "night sweats"]);
    }

    #[test]
    fn duplicates_and_empties_removed() {
        assert_eq!(parse_symptom_list("cough,, Cough ; ;fever"), vec!["cough", "fever"]);
        assert!(parse_symptom_list("  ").is_empty());
    }

    #[test]
    fn list_extractor_never_fails() {
        let out = ListExtractor.extract("rash; itching").unwrap();
        assert_eq!(out, vec!["rash", "itching"]);
    }

    #[test]
    fn static_extractor_ignores_text() {
        let ex = StaticExtractor::new(["fever"]);
        assert_eq!(ex.extract("anything").unwrap(), vec!["fever"]);
    }

    #[test]
    fn build_defaults_to_list() {
        let ex = build_extractor(&ExtractorConfig::default()).unwrap();
        assert_eq!(ex.name(), "list");
    }
}
