//! Diagnosis Scorer: match ratio and confidence per candidate disease.
//!
//! For each candidate, `match_ratio = |matched| / |all symptoms of disease|`
//! and `confidence = min(match_ratio * 100, 100)`. A candidate is reported
//! when `match_ratio >= threshold` (inclusive).
//!
//! Which confirmed symptoms count toward `matched` is a [`ConfirmationPolicy`]:
//! `Union` adds every confirmed symptom, so confirmations unrelated to a
//! disease still raise its ratio (and can push it past 1.0, where confidence
//! caps at 100); `Relevant` only adds confirmed symptoms the disease actually
//! has.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::candidates::CandidateSet;
use crate::graph::KnowledgeGraph;

/// Default inclusive match-ratio threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// How confirmed symptoms contribute to a disease's matched set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationPolicy {
    /// `matched ∪ confirmed`, unfiltered.
    #[default]
    Union,
    /// `matched ∪ (confirmed ∩ symptoms of disease)`.
    Relevant,
}

/// Scoring tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Inclusive match-ratio cutoff in `[0, 1]`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub confirmation_policy: ConfirmationPolicy,
    /// Order results by confidence desc instead of candidate order.
    #[serde(default)]
    pub sort_by_confidence: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            confirmation_policy: ConfirmationPolicy::default(),
            sort_by_confidence: false,
        }
    }
}

/// A candidate disease that met the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub disease: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub match_ratio: f64,
    /// Symptoms counted toward the ratio, sorted.
    pub matched: Vec<String>,
    /// Number of symptoms the disease has in the graph.
    pub total_symptoms: usize,
}

/// Score every candidate and keep those meeting the threshold.
///
/// Output follows candidate insertion order unless `sort_by_confidence`
/// is set, in which case it is stable-sorted by confidence desc.
pub fn score(
    graph: &KnowledgeGraph,
    candidates: &CandidateSet,
    confirmed: &BTreeSet<String>,
    config: &ScoreConfig,
) -> Vec<Diagnosis> {
    let mut diagnoses = Vec::new();

    for (disease, initial) in candidates.iter() {
        let all = graph.symptoms_of(disease);
        if all.is_empty() {
            tracing::debug!(disease, "disease has no symptom edges, not scored");
            continue;
        }

        let mut matched: BTreeSet<&str> = initial.iter().map(String::as_str).collect();
        match config.confirmation_policy {
            ConfirmationPolicy::Union => {
                matched.extend(confirmed.iter().map(String::as_str));
            }
            ConfirmationPolicy::Relevant => {
                matched.extend(
                    confirmed
                        .iter()
                        .map(String::as_str)
                        .filter(|s| all.contains(s)),
                );
            }
        }

        let match_ratio = matched.len() as f64 / all.len() as f64;
        let confidence = (match_ratio * 100.0).min(100.0);
        tracing::debug!(
            disease,
            matched = matched.len(),
            total = all.len(),
            match_ratio,
            "scored candidate"
        );

        if match_ratio >= config.threshold {
            diagnoses.push(Diagnosis {
                disease: disease.to_string(),
                confidence,
                match_ratio,
                matched: matched.into_iter().map(str::to_string).collect(),
                total_symptoms: all.len(),
            });
        }
    }

    if config.sort_by_confidence {
        diagnoses.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }
    diagnoses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kg() -> KnowledgeGraph {
        KnowledgeGraph::build([
            ("flu", "fever"),
            ("flu", "cough"),
            ("cold", "cough"),
            ("cold", "sneezing"),
            ("measles", "rash"),
            ("measles", "fever"),
            ("measles", "red eyes"),
            ("measles", "cough"),
        ])
    }

    fn candidates(pairs: &[(&str, &str)]) -> CandidateSet {
        let mut c = CandidateSet::new();
        for (d, s) in pairs {
            c.insert(d, s);
        }
        c
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn worked_example() {
        let c = candidates(&[("flu", "fever"), ("flu", "cough"), ("cold", "cough")]);
        let out = score(&kg(), &c, &BTreeSet::new(), &ScoreConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].disease, "flu");
        assert_eq!(out[0].confidence, 100.0);
        assert_eq!(out[1].disease, "cold");
        assert_eq!(out[1].confidence, 50.0);
        assert_eq!(out[1].matched, vec!["cough".to_string()]);
    }

    #[test]
    fn threshold_is_inclusive_and_filters() {
        // measles: 1 of 4 = 0.25
        let c = candidates(&[("measles", "rash"), ("cold", "cough")]);
        let out = score(&kg(), &c, &BTreeSet::new(), &ScoreConfig::default());
        let names: Vec<_> = out.iter().map(|d| d.disease.as_str()).collect();
        assert_eq!(names, vec!["cold"]);
    }

    #[test]
    fn union_counts_unrelated_confirmations() {
        let c = candidates(&[("cold", "cough")]);
        let confirmed = set(&["rash", "red eyes"]);
        let out = score(&kg(), &c, &confirmed, &ScoreConfig::default());
        // 3 matched over 2 known: ratio 1.5, confidence capped.
        assert_eq!(out[0].match_ratio, 1.5);
        assert_eq!(out[0].confidence, 100.0);
    }

    #[test]
    fn relevant_policy_ignores_unrelated_confirmations() {
        let c = candidates(&[("cold", "cough")]);
        let confirmed = set(&["rash", "sneezing"]);
        let config = ScoreConfig {
            confirmation_policy: ConfirmationPolicy::Relevant,
            ..Default::default()
        };
        let out = score(&kg(), &c, &confirmed, &config);
        assert_eq!(out[0].matched, vec!["cough".to_string(), "sneezing".to_string()]);
        assert_eq!(out[0].confidence, 100.0);

        let only_rash = set(&["rash"]);
        let out = score(&kg(), &c, &only_rash, &config);
        assert_eq!(out[0].confidence, 50.0);
    }

    #[test]
    fn confidence_stays_in_range() {
        let c = candidates(&[("flu", "fever"), ("cold", "cough"), ("measles", "rash")]);
        let confirmed = set(&["sneezing", "red eyes", "cough", "fever", "rash"]);
        let config = ScoreConfig {
            threshold: 0.0,
            ..Default::default()
        };
        for d in score(&kg(), &c, &confirmed, &config) {
            assert!((0.0..=100.0).contains(&d.confidence));
            assert_eq!(d.confidence == 100.0, d.match_ratio >= 1.0);
        }
    }

    #[test]
    fn disease_without_edges_is_skipped() {
        let c = candidates(&[("ghost", "fever"), ("flu", "fever")]);
        let config = ScoreConfig {
            threshold: 0.0,
            ..Default::default()
        };
        let out = score(&kg(), &c, &BTreeSet::new(), &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].disease, "flu");
    }

    #[test]
    fn optional_sort_by_confidence() {
        let c = candidates(&[("cold", "cough"), ("flu", "fever"), ("flu", "cough")]);
        let config = ScoreConfig {
            sort_by_confidence: true,
            ..Default::default()
        };
        let out = score(&kg(), &c, &BTreeSet::new(), &config);
        let names: Vec<_> = out.iter().map(|d| d.disease.as_str()).collect();
        assert_eq!(names, vec!["flu", "cold"]);
    }

    #[test]
    fn empty_candidates_score_to_nothing() {
        let out = score(&kg(), &CandidateSet::new(), &set(&["fever"]), &ScoreConfig::default());
        assert!(out.is_empty());
    }
}
